//! Scene item definitions.
//!
//! Items are the host's unit of storage: tokens, and the curve, label and
//! shape primitives a ruler is built from.

mod curve;
mod image;
mod label;
mod shape;

pub use curve::Curve;
pub use image::Image;
pub use label::Label;
pub use shape::{Shape, ShapeType};

use kurbo::{Point, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    /// Largest of the three color channels.
    pub fn max_channel(&self) -> u8 {
        self.r.max(self.g).max(self.b)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Unique identifier for items.
pub type ItemId = String;

/// Scene layer an item lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Layer {
    Map,
    Grid,
    Drawing,
    #[default]
    Prop,
    Mount,
    Character,
    Attachment,
    Note,
    Text,
    Ruler,
    Fog,
    Pointer,
}

impl Layer {
    /// Layers whose tokens the ruler may drag along a measured path.
    pub fn is_draggable(self) -> bool {
        matches!(self, Layer::Character | Layer::Mount | Layer::Prop)
    }
}

/// Properties every item carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemBase {
    pub id: ItemId,
    /// Rendering/grouping parent. Never implies ownership.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attached_to: Option<ItemId>,
    pub layer: Layer,
    pub position: Point,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub z_index: i32,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub disable_hit: bool,
}

fn default_visible() -> bool {
    true
}

impl ItemBase {
    pub fn new(id: impl Into<ItemId>, layer: Layer, position: Point) -> Self {
        Self {
            id: id.into(),
            attached_to: None,
            layer,
            position,
            visible: true,
            z_index: 0,
            locked: false,
            disable_hit: false,
        }
    }
}

/// A scene item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Item {
    Curve(Curve),
    Label(Label),
    Shape(Shape),
    Image(Image),
}

impl Item {
    pub fn base(&self) -> &ItemBase {
        match self {
            Item::Curve(c) => &c.base,
            Item::Label(l) => &l.base,
            Item::Shape(s) => &s.base,
            Item::Image(i) => &i.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut ItemBase {
        match self {
            Item::Curve(c) => &mut c.base,
            Item::Label(l) => &mut l.base,
            Item::Shape(s) => &mut s.base,
            Item::Image(i) => &mut i.base,
        }
    }

    pub fn id(&self) -> &str {
        &self.base().id
    }

    pub fn position(&self) -> Point {
        self.base().position
    }

    pub fn set_position(&mut self, position: Point) {
        self.base_mut().position = position;
    }

    /// Move the item by `delta`.
    pub fn translate(&mut self, delta: Vec2) {
        let base = self.base_mut();
        base.position += delta;
    }

    pub fn layer(&self) -> Layer {
        self.base().layer
    }

    pub fn attached_to(&self) -> Option<&str> {
        self.base().attached_to.as_deref()
    }

    pub fn is_visible(&self) -> bool {
        self.base().visible
    }

    /// Whether this item is a token the ruler may move.
    pub fn is_draggable(&self) -> bool {
        match self {
            Item::Image(image) => !image.base.locked && image.base.layer.is_draggable(),
            Item::Curve(_) | Item::Label(_) | Item::Shape(_) => false,
        }
    }
}
