// globe.rs - 地球组件：持有投影状态、拖拽会话与经纬网

use crate::config::GlobeConfig;
use crate::drag::{DragSessionController, PointerEvent};
use crate::graticule::Graticule;
use crate::projection::{ProjectionState, Rotation};
use crate::scene::Scene;
use glam::DVec2;

/// One interactive globe instance.
///
/// All mutable state lives here and is handed by reference to the drag
/// controller; nothing else writes the rotation. Layout changes that arrive
/// mid-drag are held back until the session ends so the trackball frame stays
/// fixed for the whole drag.
pub struct Globe {
    projection: ProjectionState,
    controller: DragSessionController,
    graticule: Graticule,
    initial_rotation: Rotation,
    outline_segments: usize,
    pending_layout: Option<(f64, DVec2)>,
}

impl Globe {
    pub fn new(config: &GlobeConfig, scale: f64, translate: DVec2) -> Self {
        Self {
            projection: ProjectionState::new(scale, translate).with_rotation(config.initial_rotation),
            controller: DragSessionController::new(),
            graticule: config.graticule.build(),
            initial_rotation: config.initial_rotation,
            outline_segments: config.outline_segments,
            pending_layout: None,
        }
    }

    pub fn projection(&self) -> &ProjectionState {
        &self.projection
    }

    pub fn is_dragging(&self) -> bool {
        self.controller.is_dragging()
    }

    /// Routes a pointer event through the drag controller. `redraw` runs after
    /// every committed rotation change, and once more if a deferred layout is
    /// applied when the drag ends.
    pub fn handle(&mut self, event: PointerEvent, mut redraw: impl FnMut(&ProjectionState)) {
        self.controller.handle(event, &mut self.projection, &mut redraw);

        if !self.controller.is_dragging() {
            if let Some((scale, translate)) = self.pending_layout.take() {
                self.apply_layout(scale, translate);
                redraw(&self.projection);
            }
        }
    }

    /// Returns `true` when applied now, `false` when deferred until the drag ends.
    pub fn set_layout(&mut self, scale: f64, translate: DVec2) -> bool {
        if self.controller.is_dragging() {
            log::debug!("layout change deferred until drag ends");
            self.pending_layout = Some((scale, translate));
            return false;
        }
        self.apply_layout(scale, translate);
        true
    }

    fn apply_layout(&mut self, scale: f64, translate: DVec2) {
        self.projection.set_scale(scale);
        self.projection.set_translate(translate);
    }

    /// Rotation setter for callers outside a drag (menus, numeric input).
    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.controller.reset();
        self.projection.set_rotate(rotation);
    }

    pub fn reset_rotation(&mut self) {
        self.set_rotation(self.initial_rotation);
    }

    pub fn scene(&self) -> Scene {
        Scene::build(&self.projection, &self.graticule, self.outline_segments)
    }
}
