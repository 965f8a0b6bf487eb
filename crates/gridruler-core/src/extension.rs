//! Extension lifecycle: wires the ruler modes to a host scene.

use crate::config::RulerSettings;
use crate::drag::{DragController, RulerVariant};
use crate::error::MeasureResult;
use crate::grid::{GridConfig, Shared, shared};
use crate::player::Player;
use crate::scene::SceneService;
use crate::tools::{ClearRulersAction, ModeDescriptor, ToolDescriptor};
use futures_util::future::join;
use std::cell::RefCell;
use std::rc::Rc;

/// Everything registered while the scene is ready.
struct Registration<S: SceneService + ?Sized> {
    grid: Shared<GridConfig>,
    player: Shared<Player>,
    tool: ToolDescriptor,
    modes: [ModeDescriptor; 2],
    ruler: Rc<DragController<S>>,
    private_ruler: Rc<DragController<S>>,
    clear_action: Option<ClearRulersAction>,
}

/// The ruler extension.
pub struct Extension<S: SceneService + ?Sized> {
    scene: Rc<S>,
    settings: RulerSettings,
    registration: RefCell<Option<Registration<S>>>,
}

impl<S: SceneService + ?Sized> Extension<S> {
    pub fn new(scene: Rc<S>, settings: RulerSettings) -> Self {
        Self {
            scene,
            settings,
            registration: RefCell::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.registration.borrow().is_some()
    }

    /// React to the host scene becoming ready or going away.
    pub async fn scene_ready_changed(&self, ready: bool) -> MeasureResult<()> {
        if ready {
            self.start().await
        } else {
            self.stop();
            Ok(())
        }
    }

    /// Fetch the grid and player and register the tool, modes and action.
    pub async fn start(&self) -> MeasureResult<()> {
        let (grid, player) = join(self.scene.grid_config(), self.scene.player()).await;
        let (grid, player) = (grid?, player?);
        grid.validate()?;

        // A restart replaces any previous registration.
        self.stop();

        let grid = shared(grid);
        let player = shared(player);
        let controller = |variant| {
            Rc::new(DragController::new(
                Rc::clone(&self.scene),
                Rc::clone(&grid),
                Rc::clone(&player),
                variant,
                self.settings.clone(),
            ))
        };
        let ruler = controller(RulerVariant::Shared);
        let private_ruler = controller(RulerVariant::Private);
        let clear_action = player.borrow().is_gm().then_some(ClearRulersAction);

        log::info!(
            "Ruler extension started for player {} (cell size {})",
            player.borrow().id,
            grid.borrow().cell_size
        );
        *self.registration.borrow_mut() = Some(Registration {
            grid,
            player,
            tool: ToolDescriptor::default(),
            modes: [
                ModeDescriptor::for_variant(RulerVariant::Shared),
                ModeDescriptor::for_variant(RulerVariant::Private),
            ],
            ruler,
            private_ruler,
            clear_action,
        });
        Ok(())
    }

    /// Unregister everything, cancelling any drag in progress.
    pub fn stop(&self) {
        if let Some(registration) = self.registration.borrow_mut().take() {
            registration.ruler.drag_cancel();
            registration.private_ruler.drag_cancel();
            log::info!("Ruler extension stopped");
        }
    }

    /// Host grid change. Invalid updates keep the previous grid.
    pub fn grid_changed(&self, next: GridConfig) {
        let registration = self.registration.borrow();
        let Some(registration) = registration.as_ref() else {
            return;
        };
        if let Err(e) = registration.grid.borrow_mut().update(next) {
            log::warn!("Ignoring grid update: {}", e);
        }
    }

    /// Host player change. Re-evaluates whether rulers may be cleared.
    pub fn player_changed(&self, next: Player) {
        let mut registration = self.registration.borrow_mut();
        let Some(registration) = registration.as_mut() else {
            return;
        };
        registration.clear_action = next.is_gm().then_some(ClearRulersAction);
        *registration.player.borrow_mut() = next;
    }

    pub fn tool(&self) -> Option<ToolDescriptor> {
        self.registration.borrow().as_ref().map(|r| r.tool.clone())
    }

    pub fn modes(&self) -> Vec<ModeDescriptor> {
        self.registration
            .borrow()
            .as_ref()
            .map(|r| r.modes.to_vec())
            .unwrap_or_default()
    }

    /// Ids of the tool, modes and action currently registered with the host.
    pub fn registered_ids(&self) -> Vec<String> {
        let registration = self.registration.borrow();
        let Some(registration) = registration.as_ref() else {
            return Vec::new();
        };
        let mut ids = vec![registration.tool.id.clone()];
        ids.extend(registration.modes.iter().map(|mode| mode.id.clone()));
        ids.extend(registration.clear_action.map(|action| action.id()));
        ids
    }

    /// Controller behind a mode.
    pub fn mode(&self, variant: RulerVariant) -> Option<Rc<DragController<S>>> {
        self.registration.borrow().as_ref().map(|r| match variant {
            RulerVariant::Shared => Rc::clone(&r.ruler),
            RulerVariant::Private => Rc::clone(&r.private_ruler),
        })
    }

    pub fn grid(&self) -> Option<GridConfig> {
        self.registration.borrow().as_ref().map(|r| r.grid.borrow().clone())
    }

    pub fn clear_action(&self) -> Option<ClearRulersAction> {
        self.registration.borrow().as_ref().and_then(|r| r.clear_action)
    }

    /// Run the clear action if it is registered. Returns the number of items
    /// deleted.
    pub async fn clear_rulers(&self) -> MeasureResult<usize> {
        let (action, player) = {
            let registration = self.registration.borrow();
            match registration.as_ref() {
                Some(r) => (r.clear_action, r.player.borrow().clone()),
                None => return Ok(0),
            }
        };
        match action {
            Some(action) => action.run(&*self.scene, &player).await,
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drag::DragState;
    use crate::grid::{GridScale, GridType, Metric};
    use crate::input::DragEvent;
    use crate::player::Role;
    use crate::scene::MemoryScene;
    use crate::testing::{block_on, poll_once};
    use kurbo::Point;

    fn extension(role: Role) -> (MemoryScene, Extension<MemoryScene>) {
        let scene = MemoryScene::new(
            GridConfig::square(100.0, Metric::Chebyshev),
            Player::new("p1", "#336699", role),
        );
        let extension = Extension::new(Rc::new(scene.clone()), RulerSettings::default());
        (scene, extension)
    }

    #[test]
    fn test_start_registers_everything() {
        let (_scene, extension) = extension(Role::Gm);
        block_on(extension.scene_ready_changed(true)).unwrap();

        assert!(extension.is_running());
        assert_eq!(extension.tool().unwrap().label, "Segmentable Ruler");
        assert_eq!(extension.modes().len(), 2);
        assert!(extension.clear_action().is_some());
        assert_eq!(
            extension.mode(RulerVariant::Private).unwrap().variant(),
            RulerVariant::Private
        );
    }

    #[test]
    fn test_invalid_host_grid_fails_start() {
        let (scene, extension) = extension(Role::Player);
        scene.set_grid(GridConfig::square(0.0, Metric::Chebyshev));
        assert!(block_on(extension.start()).is_err());
        assert!(!extension.is_running());
    }

    #[test]
    fn test_grid_change_updates_in_place() {
        let (_scene, extension) = extension(Role::Player);
        block_on(extension.start()).unwrap();

        let hex = GridConfig::new(
            80.0,
            GridType::HexHorizontal,
            Metric::HostDefined,
            GridScale::new(1.5, "m"),
        );
        extension.grid_changed(hex.clone());
        assert_eq!(extension.grid(), Some(hex.clone()));

        extension.grid_changed(GridConfig::square(-1.0, Metric::Manhattan));
        assert_eq!(extension.grid(), Some(hex));
    }

    #[test]
    fn test_player_change_toggles_clear_action() {
        let (_scene, extension) = extension(Role::Player);
        block_on(extension.start()).unwrap();
        assert!(extension.clear_action().is_none());
        assert_eq!(block_on(extension.clear_rulers()).unwrap(), 0);

        extension.player_changed(Player::new("p1", "#336699", Role::Gm));
        assert!(extension.clear_action().is_some());
    }

    #[test]
    fn test_registered_ids_follow_role() {
        let (_scene, extension) = extension(Role::Player);
        assert!(extension.registered_ids().is_empty());

        block_on(extension.start()).unwrap();
        assert_eq!(
            extension.registered_ids(),
            vec![
                "com.measure-extension/tool".to_string(),
                "com.measure-extension/dragMode".to_string(),
                "com.measure-extension/privateDragMode".to_string(),
            ]
        );

        extension.player_changed(Player::new("p1", "#336699", Role::Gm));
        assert_eq!(
            extension.registered_ids().last().map(String::as_str),
            Some("com.measure-extension/deleteAction")
        );

        extension.stop();
        assert!(extension.registered_ids().is_empty());
    }

    #[test]
    fn test_scene_not_ready_cancels_drag() {
        let (scene, extension) = extension(Role::Player);
        block_on(extension.start()).unwrap();
        let ruler = extension.mode(RulerVariant::Shared).unwrap();

        scene.hold_live_edits();
        let start = ruler.drag_start(DragEvent::at(Point::new(10.0, 10.0)));
        let mut start = std::pin::pin!(start);
        assert!(poll_once(start.as_mut()).is_pending());

        block_on(extension.scene_ready_changed(false)).unwrap();
        assert!(!extension.is_running());

        scene.resume_live_edits();
        block_on(start).unwrap();
        assert_eq!(ruler.state(), DragState::Idle);
        let stats = scene.stats();
        assert_eq!(stats.live_edits_released, 1);
        assert!(stats.writes.is_empty());
    }
}
