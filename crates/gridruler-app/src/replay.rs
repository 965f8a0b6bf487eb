//! Scripted replay of ruler interactions.
//!
//! A script seeds a [`MemoryScene`], starts the extension and feeds it a list
//! of events. Each event runs to completion before the next one.

use gridruler_core::{
    DragEvent, Extension, GridConfig, Item, ItemId, KeyEvent, MeasureError, MemoryScene, Player,
    RulerSettings, RulerVariant, Scope,
};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::rc::Rc;
use thiserror::Error;

/// Replay errors.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Script error: {0}")]
    Script(#[from] serde_json::Error),
    #[error(transparent)]
    Measure(#[from] MeasureError),
    #[error("Unknown drag target: {0}")]
    UnknownTarget(ItemId),
    #[error("Extension is not running")]
    NotRunning,
}

/// Which ruler mode an event goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeName {
    #[default]
    Shared,
    Private,
}

impl From<ModeName> for RulerVariant {
    fn from(mode: ModeName) -> Self {
        match mode {
            ModeName::Shared => RulerVariant::Shared,
            ModeName::Private => RulerVariant::Private,
        }
    }
}

/// One scripted event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptEvent {
    DragStart {
        #[serde(default)]
        mode: ModeName,
        at: Point,
        /// Id of a shared item under the pointer.
        #[serde(default)]
        target: Option<ItemId>,
    },
    DragMove {
        #[serde(default)]
        mode: ModeName,
        at: Point,
    },
    Key {
        #[serde(default)]
        mode: ModeName,
        code: String,
    },
    DragEnd {
        #[serde(default)]
        mode: ModeName,
        at: Point,
    },
    DragCancel {
        #[serde(default)]
        mode: ModeName,
    },
    ClearRulers,
}

/// A replay script.
#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub player: Player,
    #[serde(default)]
    pub settings: RulerSettings,
    /// Items in the shared store before the first event.
    #[serde(default)]
    pub shared: Vec<Item>,
    /// Items in the local store before the first event.
    #[serde(default)]
    pub local: Vec<Item>,
    pub events: Vec<ScriptEvent>,
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Scene contents after the replay.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    /// Tool, mode and action ids registered while the script ran.
    pub registered: Vec<String>,
    pub shared: Vec<Item>,
    pub local: Vec<Item>,
    /// Events that failed, as `"<index>: <error>"`. The replay keeps going.
    pub errors: Vec<String>,
}

/// Run a script to completion.
pub async fn run(script: Script) -> Result<Outcome, ReplayError> {
    let scene = MemoryScene::new(script.grid, script.player);
    for item in script.shared {
        scene.insert(item, Scope::Shared);
    }
    for item in script.local {
        scene.insert(item, Scope::Local);
    }

    let extension = Extension::new(Rc::new(scene.clone()), script.settings);
    extension.scene_ready_changed(true).await?;

    let registered = extension.registered_ids();
    let mut errors = Vec::new();
    for (index, event) in script.events.into_iter().enumerate() {
        log::debug!("Event {}: {:?}", index, event);
        if let Err(e) = apply_event(&extension, &scene, event).await {
            log::warn!("Event {} failed: {}", index, e);
            errors.push(format!("{}: {}", index, e));
        }
    }
    extension.scene_ready_changed(false).await?;

    Ok(Outcome {
        registered,
        shared: scene.items(Scope::Shared),
        local: scene.items(Scope::Local),
        errors,
    })
}

async fn apply_event(
    extension: &Extension<MemoryScene>,
    scene: &MemoryScene,
    event: ScriptEvent,
) -> Result<(), ReplayError> {
    let controller = |mode: ModeName| extension.mode(mode.into()).ok_or(ReplayError::NotRunning);
    match event {
        ScriptEvent::DragStart { mode, at, target } => {
            let target = match target {
                Some(id) => Some(
                    scene
                        .item(&id, Scope::Shared)
                        .ok_or(ReplayError::UnknownTarget(id))?,
                ),
                None => None,
            };
            let event = DragEvent {
                pointer_position: at,
                target,
            };
            controller(mode)?.drag_start(event).await?;
        }
        ScriptEvent::DragMove { mode, at } => {
            controller(mode)?.drag_move(DragEvent::at(at)).await?;
        }
        ScriptEvent::Key { mode, code } => {
            controller(mode)?.key_down(&KeyEvent::pressed(code)).await?;
        }
        ScriptEvent::DragEnd { mode, at } => {
            controller(mode)?.drag_end(DragEvent::at(at)).await?;
        }
        ScriptEvent::DragCancel { mode } => controller(mode)?.drag_cancel(),
        ScriptEvent::ClearRulers => {
            let removed = extension.clear_rulers().await?;
            log::info!("Clear rulers removed {} items", removed);
        }
    }
    Ok(())
}
