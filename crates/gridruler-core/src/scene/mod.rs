//! Scene service abstraction.
//!
//! The ruler never owns scene state. Everything it reads or writes goes
//! through [`SceneService`], which a host integration implements.

mod memory;

pub use memory::{MemoryScene, SceneStats};

use crate::grid::GridConfig;
use crate::items::{Item, ItemId};
use crate::player::Player;
use kurbo::Point;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Scene errors.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Request rejected by host: {0}")]
    Rejected(String),
    #[error("Lock error: {0}")]
    Lock(String),
    #[error("Scene error: {0}")]
    Other(String),
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Which item store a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Persistent store visible to every player.
    Shared,
    /// Store visible only to the local player.
    Local,
}

/// Snap mode for the host's grid primitive on non-square grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostSnap {
    /// Snap to cell corners.
    Corner,
    /// Snap to cell centers.
    Center,
}

/// Predicate used by [`SceneService::query_items`].
pub type ItemFilter<'a> = &'a (dyn Fn(&Item) -> bool + 'a);

/// Mutator passed to [`LiveEdit::apply`].
pub type ItemMutator<'a> = &'a mut dyn FnMut(&mut [Item]);

/// A transient editing session over a set of items.
///
/// Items inside a live edit are rendered by the host but not committed.
/// `release` consumes the handle, so it can run at most once.
pub trait LiveEdit {
    /// Transform the current items and return the result.
    fn apply(&mut self, mutator: ItemMutator<'_>) -> Vec<Item>;

    /// End the session and hand the item ids back to the host.
    fn release(self: Box<Self>);
}

/// Host scene contract.
pub trait SceneService {
    /// Current grid configuration.
    fn grid_config(&self) -> BoxFuture<'_, SceneResult<GridConfig>>;

    /// The local player.
    fn player(&self) -> BoxFuture<'_, SceneResult<Player>>;

    /// Snap a point with the host's grid primitive.
    fn snap_position(&self, point: Point, mode: HostSnap) -> BoxFuture<'_, SceneResult<Point>>;

    /// Grid distance between two points, in cells.
    fn distance_between(&self, a: Point, b: Point) -> BoxFuture<'_, SceneResult<f64>>;

    /// Start a live edit over `items`.
    fn open_live_edit(&self, items: Vec<Item>) -> BoxFuture<'_, SceneResult<Box<dyn LiveEdit>>>;

    /// Items attached to `id`, as the host reports them.
    fn get_attachments(&self, id: &str, scope: Scope) -> BoxFuture<'_, SceneResult<Vec<Item>>>;

    /// Insert or replace items.
    fn write_items(&self, items: Vec<Item>, scope: Scope) -> BoxFuture<'_, SceneResult<()>>;

    /// Delete items by id. Unknown ids are ignored.
    fn delete_items(&self, ids: Vec<ItemId>, scope: Scope) -> BoxFuture<'_, SceneResult<()>>;

    /// Items matching `filter`.
    fn query_items<'a>(
        &'a self,
        scope: Scope,
        filter: ItemFilter<'a>,
    ) -> BoxFuture<'a, SceneResult<Vec<Item>>>;
}
