//! In-memory scene implementation.

use super::{
    BoxFuture, HostSnap, ItemFilter, ItemMutator, LiveEdit, SceneError, SceneResult,
    SceneService, Scope,
};
use crate::grid::GridConfig;
use crate::items::{Item, ItemId};
use crate::player::Player;
use crate::snap::{nearest_center, nearest_vertex};
use kurbo::Point;
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::task::{Context, Poll, Waker};

/// Observable side effects, for tests and diagnostics.
#[derive(Debug, Clone, Default)]
pub struct SceneStats {
    pub live_edits_opened: usize,
    pub live_edits_released: usize,
    /// Live edits dropped without `release`.
    pub live_edits_leaked: usize,
    /// Number of `apply` calls, one entry per live edit in opening order.
    pub applies: Vec<usize>,
    /// Ids of every write batch, in order.
    pub writes: Vec<(Scope, Vec<ItemId>)>,
    pub deletes: Vec<(Scope, Vec<ItemId>)>,
    pub snap_calls: usize,
    pub distance_calls: usize,
}

impl SceneStats {
    /// Write batches that went to `scope`.
    pub fn writes_to(&self, scope: Scope) -> Vec<&[ItemId]> {
        self.writes
            .iter()
            .filter(|(s, _)| *s == scope)
            .map(|(_, ids)| ids.as_slice())
            .collect()
    }
}

#[derive(Default)]
struct Hold {
    held: bool,
    wakers: Vec<Waker>,
}

#[derive(Default)]
struct SceneInner {
    grid: RwLock<GridConfig>,
    player: RwLock<Player>,
    shared: RwLock<Vec<Item>>,
    local: RwLock<Vec<Item>>,
    stats: RwLock<SceneStats>,
    hold: Mutex<Hold>,
    write_hold: Mutex<Hold>,
    fail_writes: AtomicBool,
}

impl SceneInner {
    fn store(&self, scope: Scope) -> &RwLock<Vec<Item>> {
        match scope {
            Scope::Shared => &self.shared,
            Scope::Local => &self.local,
        }
    }

    fn record<F: FnOnce(&mut SceneStats)>(&self, f: F) {
        let mut stats = self.stats.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut stats);
    }
}

fn lock_error<E: std::fmt::Display>(e: E) -> SceneError {
    SceneError::Lock(e.to_string())
}

/// In-memory scene for testing and headless use.
///
/// Non-square grid primitives are approximated with square-lattice math.
#[derive(Clone, Default)]
pub struct MemoryScene {
    inner: Arc<SceneInner>,
}

impl MemoryScene {
    /// Create an empty scene.
    pub fn new(grid: GridConfig, player: Player) -> Self {
        let scene = Self::default();
        scene.set_grid(grid);
        *scene.inner.player.write().unwrap_or_else(PoisonError::into_inner) = player;
        scene
    }

    /// Replace the host grid configuration.
    pub fn set_grid(&self, grid: GridConfig) {
        *self.inner.grid.write().unwrap_or_else(PoisonError::into_inner) = grid;
    }

    /// Seed an item without recording a write.
    pub fn insert(&self, item: Item, scope: Scope) {
        let mut store = self.inner.store(scope).write().unwrap_or_else(PoisonError::into_inner);
        upsert(&mut store, item);
    }

    /// Snapshot of a store.
    pub fn items(&self, scope: Scope) -> Vec<Item> {
        self.inner
            .store(scope)
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Look up one item.
    pub fn item(&self, id: &str, scope: Scope) -> Option<Item> {
        self.items(scope).into_iter().find(|item| item.id() == id)
    }

    pub fn stats(&self) -> SceneStats {
        self.inner
            .stats
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Keep every subsequent live-edit request pending until
    /// [`resume_live_edits`](Self::resume_live_edits).
    pub fn hold_live_edits(&self) {
        self.inner.hold.lock().unwrap_or_else(PoisonError::into_inner).held = true;
    }

    /// Let pending live-edit requests resolve.
    pub fn resume_live_edits(&self) {
        resume(&self.inner.hold);
    }

    /// Keep every subsequent write pending until
    /// [`resume_writes`](Self::resume_writes).
    pub fn hold_writes(&self) {
        self.inner.write_hold.lock().unwrap_or_else(PoisonError::into_inner).held = true;
    }

    /// Let pending writes go through.
    pub fn resume_writes(&self) {
        resume(&self.inner.write_hold);
    }

    /// Make every write and delete fail with [`SceneError::Rejected`].
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> SceneResult<()> {
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(SceneError::Rejected("scene is read-only".to_string()));
        }
        Ok(())
    }
}

fn resume(hold: &Mutex<Hold>) {
    let wakers = {
        let mut hold = hold.lock().unwrap_or_else(PoisonError::into_inner);
        hold.held = false;
        std::mem::take(&mut hold.wakers)
    };
    for waker in wakers {
        waker.wake();
    }
}

fn upsert(store: &mut Vec<Item>, item: Item) {
    match store.iter_mut().find(|existing| existing.id() == item.id()) {
        Some(existing) => *existing = item,
        None => store.push(item),
    }
}

/// Resolves once `hold` is lifted.
struct Held<'a> {
    hold: &'a Mutex<Hold>,
}

impl Future for Held<'_> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let mut hold = self.hold.lock().unwrap_or_else(PoisonError::into_inner);
        if hold.held {
            hold.wakers.push(cx.waker().clone());
            Poll::Pending
        } else {
            Poll::Ready(())
        }
    }
}

struct MemoryLiveEdit {
    index: usize,
    items: Vec<Item>,
    inner: Arc<SceneInner>,
    released: bool,
}

impl LiveEdit for MemoryLiveEdit {
    fn apply(&mut self, mutator: ItemMutator<'_>) -> Vec<Item> {
        mutator(&mut self.items);
        let index = self.index;
        self.inner.record(|stats| stats.applies[index] += 1);
        self.items.clone()
    }

    fn release(mut self: Box<Self>) {
        self.released = true;
        self.inner.record(|stats| stats.live_edits_released += 1);
        log::debug!("Live edit {} released", self.index);
    }
}

impl Drop for MemoryLiveEdit {
    fn drop(&mut self) {
        if !self.released {
            log::warn!("Live edit {} dropped without release", self.index);
            self.inner.record(|stats| stats.live_edits_leaked += 1);
        }
    }
}

impl SceneService for MemoryScene {
    fn grid_config(&self) -> BoxFuture<'_, SceneResult<GridConfig>> {
        Box::pin(async move {
            let grid = self.inner.grid.read().map_err(lock_error)?;
            Ok(grid.clone())
        })
    }

    fn player(&self) -> BoxFuture<'_, SceneResult<Player>> {
        Box::pin(async move {
            let player = self.inner.player.read().map_err(lock_error)?;
            Ok(player.clone())
        })
    }

    fn snap_position(&self, point: Point, mode: HostSnap) -> BoxFuture<'_, SceneResult<Point>> {
        Box::pin(async move {
            let cell = self.inner.grid.read().map_err(lock_error)?.cell_size;
            self.inner.record(|stats| stats.snap_calls += 1);
            Ok(match mode {
                HostSnap::Corner => nearest_vertex(point, cell),
                HostSnap::Center => nearest_center(point, cell),
            })
        })
    }

    fn distance_between(&self, a: Point, b: Point) -> BoxFuture<'_, SceneResult<f64>> {
        Box::pin(async move {
            let cell = self.inner.grid.read().map_err(lock_error)?.cell_size;
            self.inner.record(|stats| stats.distance_calls += 1);
            Ok(a.distance(b) / cell)
        })
    }

    fn open_live_edit(&self, items: Vec<Item>) -> BoxFuture<'_, SceneResult<Box<dyn LiveEdit>>> {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            Held { hold: &inner.hold }.await;
            let index = {
                let mut stats = inner.stats.write().map_err(lock_error)?;
                stats.live_edits_opened += 1;
                stats.applies.push(0);
                stats.applies.len() - 1
            };
            log::debug!("Live edit {} opened over {} items", index, items.len());
            let edit: Box<dyn LiveEdit> = Box::new(MemoryLiveEdit {
                index,
                items,
                inner,
                released: false,
            });
            Ok(edit)
        })
    }

    fn get_attachments(&self, id: &str, scope: Scope) -> BoxFuture<'_, SceneResult<Vec<Item>>> {
        let id = id.to_string();
        Box::pin(async move {
            let store = self.inner.store(scope).read().map_err(lock_error)?;
            // The host reports the item itself followed by everything attached
            // to it, transitively.
            let mut family: HashSet<&str> = HashSet::new();
            family.insert(id.as_str());
            let mut grew = true;
            while grew {
                grew = false;
                for item in store.iter() {
                    if let Some(parent) = item.attached_to() {
                        if family.contains(parent) && family.insert(item.id()) {
                            grew = true;
                        }
                    }
                }
            }
            Ok(store
                .iter()
                .filter(|item| family.contains(item.id()))
                .cloned()
                .collect())
        })
    }

    fn write_items(&self, items: Vec<Item>, scope: Scope) -> BoxFuture<'_, SceneResult<()>> {
        Box::pin(async move {
            Held {
                hold: &self.inner.write_hold,
            }
            .await;
            self.check_writable()?;
            let ids = items.iter().map(|item| item.id().to_string()).collect();
            let mut store = self.inner.store(scope).write().map_err(lock_error)?;
            for item in items {
                upsert(&mut store, item);
            }
            self.inner.record(|stats| stats.writes.push((scope, ids)));
            Ok(())
        })
    }

    fn delete_items(&self, ids: Vec<ItemId>, scope: Scope) -> BoxFuture<'_, SceneResult<()>> {
        Box::pin(async move {
            Held {
                hold: &self.inner.write_hold,
            }
            .await;
            self.check_writable()?;
            let mut store = self.inner.store(scope).write().map_err(lock_error)?;
            store.retain(|item| !ids.iter().any(|id| id == item.id()));
            self.inner.record(|stats| stats.deletes.push((scope, ids)));
            Ok(())
        })
    }

    fn query_items<'a>(
        &'a self,
        scope: Scope,
        filter: ItemFilter<'a>,
    ) -> BoxFuture<'a, SceneResult<Vec<Item>>> {
        Box::pin(async move {
            let store = self.inner.store(scope).read().map_err(lock_error)?;
            Ok(store.iter().filter(|item| filter(item)).cloned().collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::{Image, Label, Layer};
    use crate::testing::{block_on, poll_once};

    fn token(id: &str, x: f64, y: f64) -> Item {
        Item::Image(Image::new(id, Layer::Character, Point::new(x, y)))
    }

    #[test]
    fn test_write_and_query() {
        let scene = MemoryScene::default();
        block_on(scene.write_items(vec![token("a", 0.0, 0.0), token("b", 1.0, 1.0)], Scope::Shared))
            .unwrap();
        block_on(scene.write_items(vec![token("a", 5.0, 5.0)], Scope::Shared)).unwrap();

        let items = scene.items(Scope::Shared);
        assert_eq!(items.len(), 2);
        assert_eq!(scene.item("a", Scope::Shared).unwrap().position(), Point::new(5.0, 5.0));
        assert!(scene.items(Scope::Local).is_empty());

        let filter = |item: &Item| item.id() == "b";
        let found = block_on(scene.query_items(Scope::Shared, &filter)).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(scene.stats().writes_to(Scope::Shared).len(), 2);
    }

    #[test]
    fn test_delete_ignores_unknown_ids() {
        let scene = MemoryScene::default();
        scene.insert(token("a", 0.0, 0.0), Scope::Local);
        block_on(scene.delete_items(vec!["a".into(), "zzz".into()], Scope::Local)).unwrap();
        assert!(scene.items(Scope::Local).is_empty());
    }

    #[test]
    fn test_attachments_include_item_and_descendants() {
        let scene = MemoryScene::default();
        scene.insert(token("hero", 0.0, 0.0), Scope::Shared);
        let mut name = Item::Label(Label::new("name", Point::ZERO, "Hero"));
        name.base_mut().attached_to = Some("hero".into());
        let mut badge = Item::Label(Label::new("badge", Point::ZERO, "*"));
        badge.base_mut().attached_to = Some("name".into());
        scene.insert(badge, Scope::Shared);
        scene.insert(name, Scope::Shared);
        scene.insert(token("other", 0.0, 0.0), Scope::Shared);

        let attached = block_on(scene.get_attachments("hero", Scope::Shared)).unwrap();
        let mut ids: Vec<&str> = attached.iter().map(|item| item.id()).collect();
        ids.sort();
        assert_eq!(ids, vec!["badge", "hero", "name"]);
    }

    #[test]
    fn test_failing_writes() {
        let scene = MemoryScene::default();
        scene.set_fail_writes(true);
        let result = block_on(scene.write_items(vec![token("a", 0.0, 0.0)], Scope::Shared));
        assert!(matches!(result, Err(SceneError::Rejected(_))));
        assert!(scene.items(Scope::Shared).is_empty());
    }

    #[test]
    fn test_held_live_edit_resolves_after_resume() {
        let scene = MemoryScene::default();
        scene.hold_live_edits();

        let mut pending = scene.open_live_edit(vec![token("a", 0.0, 0.0)]);
        assert!(poll_once(pending.as_mut()).is_pending());
        assert_eq!(scene.stats().live_edits_opened, 0);

        scene.resume_live_edits();
        let edit = match poll_once(pending.as_mut()) {
            Poll::Ready(result) => result.unwrap(),
            Poll::Pending => panic!("live edit should resolve once resumed"),
        };
        edit.release();

        let stats = scene.stats();
        assert_eq!(stats.live_edits_opened, 1);
        assert_eq!(stats.live_edits_released, 1);
        assert_eq!(stats.live_edits_leaked, 0);
        assert_eq!(stats.applies, vec![0]);
    }

    #[test]
    fn test_held_write_lands_after_resume() {
        let scene = MemoryScene::default();
        scene.hold_writes();

        let mut pending = scene.write_items(vec![token("a", 0.0, 0.0)], Scope::Shared);
        assert!(poll_once(pending.as_mut()).is_pending());
        assert!(scene.items(Scope::Shared).is_empty());

        scene.resume_writes();
        assert!(matches!(poll_once(pending.as_mut()), Poll::Ready(Ok(()))));
        assert_eq!(scene.items(Scope::Shared).len(), 1);
    }

    #[test]
    fn test_live_edit_apply_and_leak_detection() {
        let scene = MemoryScene::default();
        let mut edit = block_on(scene.open_live_edit(vec![token("a", 0.0, 0.0)])).unwrap();
        let items = edit.apply(&mut |items| items[0].set_position(Point::new(3.0, 4.0)));
        assert_eq!(items[0].position(), Point::new(3.0, 4.0));
        // Nothing is committed by a live edit.
        assert!(scene.items(Scope::Shared).is_empty());
        drop(edit);

        let stats = scene.stats();
        assert_eq!(stats.applies, vec![1]);
        assert_eq!(stats.live_edits_leaked, 1);
    }
}
