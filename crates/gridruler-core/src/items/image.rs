//! Image item (tokens, maps, props).

use super::{ItemBase, ItemId, Layer};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// An image placed on the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub base: ItemBase,
    /// Asset reference. Loading it is the host's business.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub name: String,
}

impl Image {
    pub fn new(id: impl Into<ItemId>, layer: Layer, position: Point) -> Self {
        Self {
            base: ItemBase::new(id, layer, position),
            url: String::new(),
            name: String::new(),
        }
    }

    /// Builder-style name setter.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}
