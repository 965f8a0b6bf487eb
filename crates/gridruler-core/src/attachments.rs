//! Moves items attached to a dragged token along with it.

use crate::items::Item;
use crate::scene::{SceneResult, SceneService, Scope};
use kurbo::Vec2;

/// Attachments of a dragged token, split by store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attachments {
    pub shared: Vec<Item>,
    pub local: Vec<Item>,
}

impl Attachments {
    pub fn new(shared: Vec<Item>, local: Vec<Item>) -> Self {
        Self { shared, local }
    }

    pub fn len(&self) -> usize {
        self.shared.len() + self.local.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.is_empty() && self.local.is_empty()
    }

    /// Shift every attachment by `delta`, leaving out `token_id`.
    ///
    /// Hosts report the token itself among its attachments; it is moved
    /// separately and must not be shifted twice.
    pub fn propagate(&self, delta: Vec2, token_id: &str) -> Attachments {
        let shift = |items: &[Item]| -> Vec<Item> {
            items
                .iter()
                .filter(|item| item.id() != token_id)
                .cloned()
                .map(|mut item| {
                    item.translate(delta);
                    item
                })
                .collect()
        };
        Attachments {
            shared: shift(&self.shared),
            local: shift(&self.local),
        }
    }

    /// Write shared attachments to the shared store and local ones to the
    /// local store. Empty sets are skipped.
    pub async fn commit<S: SceneService + ?Sized>(self, scene: &S) -> SceneResult<()> {
        if !self.shared.is_empty() {
            scene.write_items(self.shared, Scope::Shared).await?;
        }
        if !self.local.is_empty() {
            scene.write_items(self.local, Scope::Local).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridConfig, Metric};
    use crate::items::{Image, Layer};
    use crate::player::Player;
    use crate::scene::MemoryScene;
    use crate::testing::block_on;
    use kurbo::Point;

    fn image(id: &str, x: f64, y: f64, parent: Option<&str>) -> Item {
        let mut image = Image::new(id, Layer::Attachment, Point::new(x, y));
        image.base.attached_to = parent.map(str::to_string);
        Item::Image(image)
    }

    #[test]
    fn test_propagate_excludes_token() {
        let attachments = Attachments::new(
            vec![
                image("tok", 0.0, 0.0, None),
                image("aura", 10.0, 10.0, Some("tok")),
            ],
            vec![image("note", 5.0, 0.0, Some("tok"))],
        );
        let moved = attachments.propagate(Vec2::new(100.0, -50.0), "tok");

        assert_eq!(moved.len(), attachments.len() - 1);
        assert_eq!(moved.shared.len(), 1);
        assert_eq!(moved.shared[0].position(), Point::new(110.0, -40.0));
        assert_eq!(moved.local[0].position(), Point::new(105.0, -50.0));
    }

    #[test]
    fn test_propagate_without_self_reference_keeps_count() {
        let attachments = Attachments::new(vec![image("aura", 0.0, 0.0, Some("tok"))], vec![]);
        let moved = attachments.propagate(Vec2::new(1.0, 1.0), "tok");
        assert_eq!(moved.len(), attachments.len());
    }

    #[test]
    fn test_commit_writes_each_store() {
        let scene = MemoryScene::new(GridConfig::square(100.0, Metric::Chebyshev), Player::default());
        let attachments = Attachments::new(
            vec![image("aura", 0.0, 0.0, Some("tok"))],
            vec![image("note", 0.0, 0.0, Some("tok"))],
        );
        block_on(attachments.commit(&scene)).unwrap();

        let stats = scene.stats();
        assert_eq!(stats.writes_to(Scope::Shared).len(), 1);
        assert_eq!(stats.writes_to(Scope::Local).len(), 1);
        assert!(scene.item("aura", Scope::Shared).is_some());
        assert!(scene.item("note", Scope::Local).is_some());
    }

    #[test]
    fn test_commit_skips_empty_sets() {
        let scene = MemoryScene::new(GridConfig::square(100.0, Metric::Chebyshev), Player::default());
        block_on(Attachments::default().commit(&scene)).unwrap();
        assert!(scene.stats().writes.is_empty());
    }
}
