//! Text label item.

use super::{ItemBase, ItemId, Layer};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// A plain-text label with a translucent background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub base: ItemBase,
    pub text: String,
    #[serde(default)]
    pub background_opacity: f64,
    /// Height of the speech-bubble pointer; zero hides it.
    #[serde(default)]
    pub pointer_height: f64,
}

impl Label {
    pub fn new(id: impl Into<ItemId>, position: Point, text: impl Into<String>) -> Self {
        Self {
            base: ItemBase::new(id, Layer::Ruler, position),
            text: text.into(),
            background_opacity: 0.0,
            pointer_height: 0.0,
        }
    }
}
