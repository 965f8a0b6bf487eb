//! Tool, mode and action descriptors registered with the host.

use crate::drag::RulerVariant;
use crate::error::MeasureResult;
use crate::ids::{self, is_ruler_item_id};
use crate::items::{Item, Layer};
use crate::player::Player;
use crate::scene::{SceneService, Scope};
use serde::Serialize;

/// Cursor shown by a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Cursor {
    Grab,
    Crosshair,
}

/// The toolbar entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolDescriptor {
    pub id: String,
    pub label: String,
    pub shortcut: String,
}

impl Default for ToolDescriptor {
    fn default() -> Self {
        Self {
            id: ids::tool_id(),
            label: "Segmentable Ruler".to_string(),
            shortcut: "Z".to_string(),
        }
    }
}

/// One ruler mode of the tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModeDescriptor {
    pub id: String,
    pub label: String,
    #[serde(skip)]
    pub variant: RulerVariant,
}

impl ModeDescriptor {
    pub fn for_variant(variant: RulerVariant) -> Self {
        match variant {
            RulerVariant::Shared => Self {
                id: ids::drag_mode_id(),
                label: "Ruler".to_string(),
                variant,
            },
            RulerVariant::Private => Self {
                id: ids::private_drag_mode_id(),
                label: "Private Ruler".to_string(),
                variant,
            },
        }
    }

    /// Cursor over `target`: grab where a drag would move it.
    pub fn cursor_for(&self, target: Option<&Item>) -> Cursor {
        if self.variant.moves(target) {
            Cursor::Grab
        } else {
            Cursor::Crosshair
        }
    }
}

/// Context menu action that deletes every shared ruler.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClearRulersAction;

impl ClearRulersAction {
    pub fn id(&self) -> String {
        ids::clear_rulers_action_id()
    }

    /// Only the GM may clear rulers.
    pub fn is_available(&self, player: &Player) -> bool {
        player.is_gm()
    }

    /// Delete all rulers from the shared store, returning how many items
    /// went.
    pub async fn run<S: SceneService + ?Sized>(
        &self,
        scene: &S,
        player: &Player,
    ) -> MeasureResult<usize> {
        if !self.is_available(player) {
            log::warn!("Player {} may not clear rulers", player.id);
            return Ok(0);
        }
        let is_ruler = |item: &Item| item.layer() == Layer::Ruler && is_ruler_item_id(item.id());
        let rulers = scene.query_items(Scope::Shared, &is_ruler).await?;
        let count = rulers.len();
        if count > 0 {
            let ids = rulers.into_iter().map(|item| item.id().to_string()).collect();
            scene.delete_items(ids, Scope::Shared).await?;
        }
        log::info!("Cleared {} ruler items", count);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridConfig, Metric};
    use crate::items::{Curve, Image};
    use crate::player::Role;
    use crate::scene::MemoryScene;
    use crate::testing::block_on;
    use kurbo::Point;

    fn image(layer: Layer, locked: bool) -> Item {
        let mut image = Image::new("tok", layer, Point::ZERO);
        image.base.locked = locked;
        Item::Image(image)
    }

    #[test]
    fn test_tool_descriptor() {
        let tool = ToolDescriptor::default();
        assert_eq!(tool.id, "com.measure-extension/tool");
        assert_eq!(tool.shortcut, "Z");
    }

    #[test]
    fn test_cursor_rules() {
        let ruler = ModeDescriptor::for_variant(RulerVariant::Shared);
        assert_eq!(ruler.cursor_for(Some(&image(Layer::Character, false))), Cursor::Grab);
        assert_eq!(ruler.cursor_for(Some(&image(Layer::Character, true))), Cursor::Crosshair);
        // Map images never move, locked or not.
        assert_eq!(ruler.cursor_for(Some(&image(Layer::Map, false))), Cursor::Crosshair);
        assert_eq!(ruler.cursor_for(None), Cursor::Crosshair);

        let private = ModeDescriptor::for_variant(RulerVariant::Private);
        assert_eq!(private.cursor_for(Some(&image(Layer::Character, false))), Cursor::Crosshair);
        assert_eq!(private.id, "com.measure-extension/privateDragMode");
    }

    #[test]
    fn test_clear_action_id() {
        assert_eq!(ClearRulersAction.id(), "com.measure-extension/deleteAction");
    }

    #[test]
    fn test_clear_rulers_deletes_only_rulers() {
        let scene = MemoryScene::new(GridConfig::square(100.0, Metric::Chebyshev), Player::default());
        scene.insert(
            Item::Curve(Curve::new(ids::item_id("line", "p1", false), vec![Point::ZERO])),
            Scope::Shared,
        );
        scene.insert(
            Item::Curve(Curve::new(ids::item_id("line", "p2", false), vec![Point::ZERO])),
            Scope::Shared,
        );
        // Drawn by someone else on the ruler layer.
        scene.insert(Item::Curve(Curve::new("sketch", vec![Point::ZERO])), Scope::Shared);
        scene.insert(image(Layer::Map, false), Scope::Shared);

        let gm = Player::new("gm", "#000000", Role::Gm);
        let removed = block_on(ClearRulersAction.run(&scene, &gm)).unwrap();

        assert_eq!(removed, 2);
        let left: Vec<_> = scene.items(Scope::Shared).iter().map(|i| i.id().to_string()).collect();
        assert_eq!(left, vec!["sketch".to_string(), "tok".to_string()]);
    }

    #[test]
    fn test_clear_rulers_requires_gm() {
        let scene = MemoryScene::new(GridConfig::square(100.0, Metric::Chebyshev), Player::default());
        scene.insert(
            Item::Curve(Curve::new(ids::item_id("line", "p1", false), vec![Point::ZERO])),
            Scope::Shared,
        );
        let player = Player::new("p1", "#000000", Role::Player);

        assert!(!ClearRulersAction.is_available(&player));
        assert_eq!(block_on(ClearRulersAction.run(&scene, &player)).unwrap(), 0);
        assert_eq!(scene.items(Scope::Shared).len(), 1);
    }
}
