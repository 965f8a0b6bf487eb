//! Polyline item.

use super::{ItemBase, ItemId, Layer, SerializableColor};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// An open polyline through a list of points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    pub base: ItemBase,
    pub points: Vec<Point>,
    pub stroke_color: SerializableColor,
    #[serde(default = "default_opacity")]
    pub stroke_opacity: f64,
    pub stroke_width: f64,
    /// Dash pattern (dash, gap). Empty means solid.
    #[serde(default)]
    pub stroke_dash: Vec<f64>,
    #[serde(default)]
    pub fill_opacity: f64,
    /// Smoothing; zero keeps sharp corners.
    #[serde(default)]
    pub tension: f64,
}

fn default_opacity() -> f64 {
    1.0
}

impl Curve {
    /// Create a solid curve on the ruler layer.
    pub fn new(id: impl Into<ItemId>, points: Vec<Point>) -> Self {
        Self {
            base: ItemBase::new(id, Layer::Ruler, Point::ZERO),
            points,
            stroke_color: SerializableColor::black(),
            stroke_opacity: 1.0,
            stroke_width: 1.0,
            stroke_dash: Vec::new(),
            fill_opacity: 0.0,
            tension: 0.0,
        }
    }

    /// Length of the polyline in canvas units.
    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| w[0].distance(w[1])).sum()
    }
}
