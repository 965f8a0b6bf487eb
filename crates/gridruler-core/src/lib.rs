//! GridRuler Core Library
//!
//! Multi-segment measuring rulers for grid-based tabletop scenes: grid
//! snapping, distance metrics, live ruler previews and the drag controller
//! that commits them to a host scene.

pub mod attachments;
pub mod config;
pub mod drag;
pub mod error;
pub mod extension;
pub mod grid;
pub mod ids;
pub mod input;
pub mod items;
pub mod measure;
pub mod path;
pub mod player;
pub mod ruler;
pub mod scene;
pub mod snap;
pub mod tools;

#[cfg(test)]
mod testing;

pub use attachments::Attachments;
pub use config::{KeyBindings, RulerSettings};
pub use drag::{DragController, DragState, RulerVariant};
pub use error::{MeasureError, MeasureResult};
pub use extension::Extension;
pub use grid::{GridConfig, GridScale, GridType, Metric, Shared, shared};
pub use ids::RulerIds;
pub use input::{DragEvent, KeyEvent, RulerKey};
pub use items::{Item, ItemBase, ItemId, Layer};
pub use measure::display_distance;
pub use path::Path;
pub use player::{Player, Role};
pub use ruler::{RulerBuilder, RulerPreview};
pub use scene::{HostSnap, LiveEdit, MemoryScene, SceneError, SceneResult, SceneService, Scope};
pub use snap::{snap_segment_end, snap_to_grid};
pub use tools::{ClearRulersAction, Cursor, ModeDescriptor, ToolDescriptor};
