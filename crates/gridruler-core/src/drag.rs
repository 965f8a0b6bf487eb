//! Drag interaction controller.
//!
//! A drag goes `Idle -> Opening -> Active -> Closing -> Idle`. Opening the
//! live edit is asynchronous, so any event may arrive while it is pending.
//! Every drag gets a generation number; a continuation that wakes up to find
//! a different generation, or its own generation marked expired, releases
//! whatever it acquired and leaves the phase alone.
//!
//! No `RefCell` borrow is held across an await.

use crate::attachments::Attachments;
use crate::config::RulerSettings;
use crate::error::MeasureResult;
use crate::grid::{GridConfig, Shared};
use crate::ids::RulerIds;
use crate::input::{DragEvent, KeyEvent, RulerKey};
use crate::items::Item;
use crate::measure::display_distance;
use crate::path::Path;
use crate::player::Player;
use crate::ruler::{RulerBuilder, RulerUpdate, ruler_members};
use crate::scene::{LiveEdit, SceneResult, SceneService, Scope};
use crate::snap::{snap_segment_end, snap_to_grid};
use futures_util::future::join3;
use kurbo::{Point, Vec2};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Which kind of ruler a controller draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RulerVariant {
    /// Visible to everyone, committed to the shared store, moves tokens.
    #[default]
    Shared,
    /// Visible only to the local player and never moves tokens.
    Private,
}

impl RulerVariant {
    /// Store the finished ruler is committed to.
    pub fn scope(self) -> Scope {
        match self {
            RulerVariant::Shared => Scope::Shared,
            RulerVariant::Private => Scope::Local,
        }
    }

    pub fn is_local(self) -> bool {
        self == RulerVariant::Private
    }

    /// Whether a drag on `target` moves it. The shared ruler moves
    /// draggable tokens; anything else just measures.
    pub fn moves(self, target: Option<&Item>) -> bool {
        self == RulerVariant::Shared && target.is_some_and(Item::is_draggable)
    }
}

/// Observable controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    /// Waiting for the live edit to open.
    Opening,
    Active,
    /// Committing the finished ruler.
    Closing,
}

/// Per-drag data, alive while the live edit is open.
struct Session {
    generation: u64,
    ids: RulerIds,
    pointer: Point,
    path: Path,
    /// The dragged token as it was before the drag.
    token: Option<Item>,
    attachments: Attachments,
    /// Live end of the last applied update.
    last_end: Option<Point>,
}

struct ActiveDrag {
    session: Session,
    handle: Box<dyn LiveEdit>,
}

impl ActiveDrag {
    /// Put the token back and release the handle.
    fn cancel(mut self) {
        if let Some(token) = &self.session.token {
            let id = token.id();
            let origin = token.position();
            self.handle.apply(&mut |items: &mut [Item]| {
                for item in items.iter_mut().filter(|item| item.id() == id) {
                    item.set_position(origin);
                }
            });
        }
        self.handle.release();
    }
}

enum Phase {
    Idle,
    Opening {
        generation: u64,
        pointer: Point,
        /// Set when the drag ended before the live edit opened.
        expired: bool,
    },
    Active(ActiveDrag),
    Closing {
        generation: u64,
    },
}

/// What a continuation finds when its live edit resolves.
enum Resolution {
    Current(Point),
    Expired,
    Superseded,
}

/// Drives one ruler mode. Methods take `&self` so that events can be
/// delivered while an earlier event is still waiting on the host.
pub struct DragController<S: SceneService + ?Sized> {
    scene: Rc<S>,
    grid: Shared<GridConfig>,
    player: Shared<Player>,
    variant: RulerVariant,
    settings: RulerSettings,
    phase: RefCell<Phase>,
    generation: Cell<u64>,
}

impl<S: SceneService + ?Sized> DragController<S> {
    pub fn new(
        scene: Rc<S>,
        grid: Shared<GridConfig>,
        player: Shared<Player>,
        variant: RulerVariant,
        settings: RulerSettings,
    ) -> Self {
        Self {
            scene,
            grid,
            player,
            variant,
            settings,
            phase: RefCell::new(Phase::Idle),
            generation: Cell::new(0),
        }
    }

    pub fn variant(&self) -> RulerVariant {
        self.variant
    }

    pub fn state(&self) -> DragState {
        match &*self.phase.borrow() {
            Phase::Idle => DragState::Idle,
            Phase::Opening { .. } => DragState::Opening,
            Phase::Active(_) => DragState::Active,
            Phase::Closing { .. } => DragState::Closing,
        }
    }

    /// Committed waypoints of the active drag.
    pub fn waypoints(&self) -> Option<Vec<Point>> {
        match &*self.phase.borrow() {
            Phase::Active(active) => Some(active.session.path.waypoints().to_vec()),
            _ => None,
        }
    }

    /// Begin a drag.
    ///
    /// Resolves once the live edit is open, or once it turns out the drag was
    /// ended, cancelled or replaced while it was opening. A start that
    /// arrives while the previous ruler is still being committed is dropped.
    pub async fn drag_start(&self, event: DragEvent) -> MeasureResult<()> {
        if let Phase::Closing { generation } = &*self.phase.borrow() {
            log::debug!("Ignoring drag start while drag {} commits", generation);
            return Ok(());
        }
        self.drag_cancel();

        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        *self.phase.borrow_mut() = Phase::Opening {
            generation,
            pointer: event.pointer_position,
            expired: false,
        };
        log::debug!("Drag {} starting at {:?}", generation, event.pointer_position);

        let result = self.open(generation, event).await;
        if result.is_err() {
            let mut phase = self.phase.borrow_mut();
            if matches!(&*phase, Phase::Opening { generation: g, .. } if *g == generation) {
                *phase = Phase::Idle;
            }
        }
        result
    }

    async fn open(&self, generation: u64, event: DragEvent) -> MeasureResult<()> {
        let grid = self.grid.borrow().clone();
        let player = self.player.borrow().clone();
        let ids = RulerIds::new(&player.id, self.variant.is_local());
        let scene = &*self.scene;

        if let Err(e) = scene.delete_items(ids.to_vec(), self.variant.scope()).await {
            log::warn!("Failed to remove previous ruler: {}", e);
        }

        let target = event.target.filter(Item::is_draggable);
        let origin = target.as_ref().map_or(event.pointer_position, Item::position);
        let first = snap_to_grid(&grid, scene, origin).await?;
        if !matches!(self.resolution(generation), Resolution::Current(_)) {
            self.settle_opening(generation);
            return Ok(());
        }

        let token = target.filter(|t| self.variant.moves(Some(t)));
        let path = Path::start(first);
        let text = self.label_text(&grid, path.waypoints()).await?;
        let visible = token.as_ref().is_none_or(Item::is_visible);
        let mut items = RulerBuilder::new(&ids, &grid, &player, &self.settings)
            .build(path.with_end(first), &text, visible, token.is_none())
            .into_items();
        if let Some(token) = &token {
            items.push(token.clone());
        }

        let (handle, shared, local) = match &token {
            Some(token) => {
                join3(
                    scene.open_live_edit(items),
                    scene.get_attachments(token.id(), Scope::Shared),
                    scene.get_attachments(token.id(), Scope::Local),
                )
                .await
            }
            None => (scene.open_live_edit(items).await, Ok(Vec::new()), Ok(Vec::new())),
        };
        let handle = handle?;
        let attachments = match (shared, local) {
            (Ok(shared), Ok(local)) => Attachments::new(shared, local),
            (Err(e), _) | (_, Err(e)) => {
                handle.release();
                return Err(e.into());
            }
        };

        let pointer = match self.resolution(generation) {
            Resolution::Current(pointer) => pointer,
            Resolution::Expired | Resolution::Superseded => {
                log::debug!("Drag {} ended before its live edit opened", generation);
                handle.release();
                self.settle_opening(generation);
                return Ok(());
            }
        };

        *self.phase.borrow_mut() = Phase::Active(ActiveDrag {
            session: Session {
                generation,
                ids,
                pointer,
                path,
                token,
                attachments,
                last_end: None,
            },
            handle,
        });
        self.refresh(true).await
    }

    fn resolution(&self, generation: u64) -> Resolution {
        match &*self.phase.borrow() {
            Phase::Opening {
                generation: g,
                pointer,
                expired,
            } if *g == generation => {
                if *expired {
                    Resolution::Expired
                } else {
                    Resolution::Current(*pointer)
                }
            }
            _ => Resolution::Superseded,
        }
    }

    /// Return to idle if this generation still owns the opening phase.
    fn settle_opening(&self, generation: u64) {
        let mut phase = self.phase.borrow_mut();
        if matches!(&*phase, Phase::Opening { generation: g, .. } if *g == generation) {
            *phase = Phase::Idle;
        }
    }

    fn set_pointer(&self, position: Point) {
        match &mut *self.phase.borrow_mut() {
            Phase::Opening { pointer, .. } => *pointer = position,
            Phase::Active(active) => active.session.pointer = position,
            Phase::Idle | Phase::Closing { .. } => {}
        }
    }

    /// Follow the pointer.
    pub async fn drag_move(&self, event: DragEvent) -> MeasureResult<()> {
        self.set_pointer(event.pointer_position);
        self.refresh(false).await
    }

    /// Handle a key press. Keys are ignored unless the live edit is open.
    pub async fn key_down(&self, event: &KeyEvent) -> MeasureResult<()> {
        let Some(key) = RulerKey::from_event(event, &self.settings.keys) else {
            return Ok(());
        };
        match key {
            RulerKey::AddSegment => self.add_segment().await,
            RulerKey::RemoveSegment => self.remove_segment().await,
            RulerKey::Commit => self.finalize().await,
        }
    }

    async fn add_segment(&self) -> MeasureResult<()> {
        let snapshot = match &*self.phase.borrow() {
            Phase::Active(active) => Some((
                active.session.generation,
                active.session.path.revision(),
                active.session.path.last(),
                active.session.pointer,
            )),
            _ => None,
        };
        let Some((generation, revision, start, pointer)) = snapshot else {
            return Ok(());
        };

        let grid = self.grid.borrow().clone();
        let end = snap_segment_end(&grid, &*self.scene, start, pointer).await?;
        {
            let mut phase = self.phase.borrow_mut();
            let Phase::Active(active) = &mut *phase else {
                return Ok(());
            };
            let session = &mut active.session;
            if session.generation != generation || session.path.revision() != revision {
                return Ok(());
            }
            session.path.push(end);
            log::debug!("Drag {} waypoint {} at {:?}", generation, session.path.len(), end);
        }
        self.refresh(true).await
    }

    async fn remove_segment(&self) -> MeasureResult<()> {
        let removed = match &mut *self.phase.borrow_mut() {
            Phase::Active(active) => active.session.path.pop(),
            _ => None,
        };
        if removed.is_none() {
            return Ok(());
        }
        self.refresh(true).await
    }

    async fn label_text(&self, grid: &GridConfig, points: &[Point]) -> SceneResult<String> {
        let text = display_distance(grid, &*self.scene, points).await?;
        Ok(match self.variant {
            RulerVariant::Shared => text,
            RulerVariant::Private => format!("{}{}", self.settings.private_label_prefix, text),
        })
    }

    /// Recompute the live end and push it into the live edit.
    ///
    /// The label is only re-measured when the live end moved to another cell
    /// or `force` is set.
    async fn refresh(&self, force: bool) -> MeasureResult<()> {
        let snapshot = match &*self.phase.borrow() {
            Phase::Active(active) => Some((
                active.session.generation,
                active.session.path.clone(),
                active.session.pointer,
                active.session.last_end,
            )),
            _ => None,
        };
        let Some((generation, path, pointer, last_end)) = snapshot else {
            return Ok(());
        };

        let grid = self.grid.borrow().clone();
        let end = snap_segment_end(&grid, &*self.scene, path.last(), pointer).await?;
        if !force && last_end == Some(end) {
            return Ok(());
        }
        let points = path.with_end(end);
        let text = self.label_text(&grid, &points).await?;

        let mut phase = self.phase.borrow_mut();
        let Phase::Active(active) = &mut *phase else {
            return Ok(());
        };
        let session = &mut active.session;
        if session.generation != generation || session.path.revision() != path.revision() {
            return Ok(());
        }
        session.last_end = Some(end);
        let update = RulerUpdate {
            ids: &session.ids,
            points,
            end,
            cell_size: grid.cell_size,
            text: Some(text.as_str()),
            dragged: session.token.as_ref().map(Item::id),
        };
        active.handle.apply(&mut |items: &mut [Item]| update.apply(items));
        Ok(())
    }

    /// Release the pointer and commit the ruler.
    pub async fn drag_end(&self, event: DragEvent) -> MeasureResult<()> {
        self.set_pointer(event.pointer_position);
        self.finalize().await
    }

    /// Commit the active ruler.
    ///
    /// A drag that is still opening is marked expired and commits nothing.
    /// A failed final snap leaves the drag open; a failed write still
    /// releases the live edit and reports the error.
    async fn finalize(&self) -> MeasureResult<()> {
        let generation = match &mut *self.phase.borrow_mut() {
            Phase::Idle | Phase::Closing { .. } => return Ok(()),
            Phase::Opening { expired, .. } => {
                *expired = true;
                return Ok(());
            }
            Phase::Active(active) => active.session.generation,
        };

        self.refresh(false).await?;

        let active = {
            let mut phase = self.phase.borrow_mut();
            match std::mem::replace(&mut *phase, Phase::Closing { generation }) {
                Phase::Active(active) if active.session.generation == generation => active,
                other => {
                    // Another finalize got here first.
                    *phase = other;
                    return Ok(());
                }
            }
        };

        let ActiveDrag {
            session,
            mut handle,
        } = active;
        let items = handle.apply(&mut |_: &mut [Item]| {});
        let result = self.commit(&session, &items).await;
        handle.release();

        {
            let mut phase = self.phase.borrow_mut();
            if matches!(&*phase, Phase::Closing { generation: g } if *g == generation) {
                *phase = Phase::Idle;
            }
        }
        match &result {
            Ok(()) => log::info!(
                "Committed ruler with {} waypoints to {:?}",
                session.path.len(),
                self.variant.scope()
            ),
            Err(e) => log::error!("Failed to commit ruler: {}", e),
        }
        result
    }

    async fn commit(&self, session: &Session, items: &[Item]) -> MeasureResult<()> {
        let scene = &*self.scene;
        if let Some(token) = &session.token {
            let end = items
                .iter()
                .find(|item| item.id() == token.id())
                .map_or(token.position(), Item::position);
            let delta = end - token.position();
            if delta != Vec2::ZERO {
                let mut moved = token.clone();
                moved.set_position(end);
                scene.write_items(vec![moved], Scope::Shared).await?;
                session
                    .attachments
                    .propagate(delta, token.id())
                    .commit(scene)
                    .await?;
            }
        }
        let ruler = ruler_members(items, &session.ids);
        scene.write_items(ruler, self.variant.scope()).await?;
        Ok(())
    }

    /// Abandon the drag without committing.
    ///
    /// A drag that is still opening is marked expired; an active one puts the
    /// token back and releases the live edit. A commit in progress is left to
    /// finish.
    pub fn drag_cancel(&self) {
        let mut phase = self.phase.borrow_mut();
        match std::mem::replace(&mut *phase, Phase::Idle) {
            Phase::Idle => {}
            Phase::Opening {
                generation,
                pointer,
                ..
            } => {
                *phase = Phase::Opening {
                    generation,
                    pointer,
                    expired: true,
                };
            }
            Phase::Active(active) => {
                log::debug!("Drag {} cancelled", active.session.generation);
                active.cancel();
            }
            closing @ Phase::Closing { .. } => *phase = closing,
        }
    }
}
