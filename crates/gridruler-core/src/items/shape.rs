//! Basic geometric shape item.

use super::{ItemBase, ItemId, Layer, SerializableColor};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

/// Kind of shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShapeType {
    Rectangle,
    Circle,
    Triangle,
    Hexagon,
}

/// A filled shape centered on its position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub base: ItemBase,
    pub shape_type: ShapeType,
    pub size: Size,
    pub fill_color: SerializableColor,
    pub stroke_color: SerializableColor,
    #[serde(default)]
    pub stroke_opacity: f64,
    #[serde(default)]
    pub stroke_width: f64,
}

impl Shape {
    /// Create a circle of the given diameter on the ruler layer.
    pub fn circle(id: impl Into<ItemId>, center: Point, diameter: f64) -> Self {
        Self {
            base: ItemBase::new(id, Layer::Ruler, center),
            shape_type: ShapeType::Circle,
            size: Size::new(diameter, diameter),
            fill_color: SerializableColor::black(),
            stroke_color: SerializableColor::white(),
            stroke_opacity: 1.0,
            stroke_width: 0.0,
        }
    }
}
