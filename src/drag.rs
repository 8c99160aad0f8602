// drag.rs - 指针事件驱动的拖拽旋转状态机

use crate::compose::composed_rotation;
use crate::projection::{ProjectionState, Rotation};
use crate::trackball::trackball_angles;
use glam::DVec2;

/// Discrete pointer events, in the same screen space as the projection center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(DVec2),
    Move(DVec2),
    Up(DVec2),
}

/// `Dragging` carries the per-drag anchors: rotation and trackball angle at drag start.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging { o0: Rotation, m0: (f64, f64) },
}

#[derive(Debug, Default)]
pub struct DragSessionController {
    state: DragState,
}

impl DragSessionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Single entry point for all pointer events.
    pub fn handle(
        &mut self,
        event: PointerEvent,
        projection: &mut ProjectionState,
        redraw: &mut impl FnMut(&ProjectionState),
    ) {
        match event {
            PointerEvent::Down(pt) => self.pointer_down(pt, projection),
            PointerEvent::Move(pt) => self.pointer_move(pt, projection, redraw),
            PointerEvent::Up(pt) => self.pointer_up(pt, projection, redraw),
        }
    }

    /// Starts a new session. Any session already in progress is replaced.
    pub fn pointer_down(&mut self, pt: DVec2, projection: &ProjectionState) {
        let o0 = projection.rotate();
        let m0 = trackball_angles(pt, projection.scale(), projection.translate());
        if self.is_dragging() {
            log::debug!("drag restarted at ({:.1}, {:.1})", pt.x, pt.y);
        } else {
            log::debug!("drag started at ({:.1}, {:.1})", pt.x, pt.y);
        }
        self.state = DragState::Dragging { o0, m0 };
    }

    pub fn pointer_move(
        &mut self,
        pt: DVec2,
        projection: &mut ProjectionState,
        redraw: &mut impl FnMut(&ProjectionState),
    ) {
        let DragState::Dragging { o0, m0 } = self.state else {
            return;
        };

        let m1 = trackball_angles(pt, projection.scale(), projection.translate());
        // 始终相对起点锚定计算，不做逐帧累加
        let rotation = composed_rotation(o0.lambda, o0.phi, o0.gamma, m1.0 - m0.0, m1.1 - m0.1);
        projection.set_rotate(rotation);
        redraw(projection);
    }

    pub fn pointer_up(
        &mut self,
        pt: DVec2,
        projection: &mut ProjectionState,
        redraw: &mut impl FnMut(&ProjectionState),
    ) {
        if !self.is_dragging() {
            return;
        }
        self.pointer_move(pt, projection, redraw);
        self.state = DragState::Idle;
        log::debug!("drag ended at ({:.1}, {:.1})", pt.x, pt.y);
    }

    /// Drops the current session without touching the rotation.
    pub fn reset(&mut self) {
        self.state = DragState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn reference_projection() -> ProjectionState {
        ProjectionState::new(250.0, DVec2::new(250.0, 250.0))
    }

    fn run(events: &[PointerEvent]) -> (ProjectionState, usize) {
        let mut projection = reference_projection().with_rotation(Rotation::new(10.0, -20.0, 5.0));
        let mut controller = DragSessionController::new();
        let mut redraws = 0;
        for &e in events {
            controller.handle(e, &mut projection, &mut |_| redraws += 1);
        }
        (projection, redraws)
    }

    fn assert_rotation_close(a: Rotation, b: Rotation) {
        assert!(
            (a.lambda - b.lambda).abs() < EPS && (a.phi - b.phi).abs() < EPS && (a.gamma - b.gamma).abs() < EPS,
            "{a:?} != {b:?}"
        );
    }

    fn p(x: f64, y: f64) -> DVec2 {
        DVec2::new(x, y)
    }

    #[test]
    fn starts_idle() {
        let c = DragSessionController::new();
        assert_eq!(c.state(), DragState::Idle);
        assert!(!c.is_dragging());
    }

    #[test]
    fn down_captures_anchors_without_redraw() {
        let mut projection = reference_projection();
        let mut c = DragSessionController::new();
        let mut redraws = 0;
        c.handle(PointerEvent::Down(p(250.0, 250.0)), &mut projection, &mut |_| redraws += 1);
        assert_eq!(redraws, 0);
        assert_eq!(
            c.state(),
            DragState::Dragging { o0: Rotation::IDENTITY, m0: (0.0, 0.0) }
        );
    }

    #[test]
    fn move_and_up_while_idle_are_ignored() {
        let (projection, redraws) = run(&[PointerEvent::Move(p(300.0, 200.0)), PointerEvent::Up(p(10.0, 10.0))]);
        assert_eq!(redraws, 0);
        assert_eq!(projection.rotate(), Rotation::new(10.0, -20.0, 5.0));
    }

    #[test]
    fn click_without_motion_keeps_rotation() {
        let (projection, redraws) = run(&[PointerEvent::Down(p(320.0, 180.0)), PointerEvent::Up(p(320.0, 180.0))]);
        assert_eq!(redraws, 1);
        assert_rotation_close(projection.rotate(), Rotation::new(10.0, -20.0, 5.0));
    }

    #[test]
    fn intermediate_moves_do_not_affect_result() {
        let (a, redraws_a) = run(&[
            PointerEvent::Down(p(250.0, 250.0)),
            PointerEvent::Move(p(400.0, 120.0)),
            PointerEvent::Move(p(310.0, 330.0)),
            PointerEvent::Up(p(310.0, 330.0)),
        ]);
        let (b, redraws_b) = run(&[
            PointerEvent::Down(p(250.0, 250.0)),
            PointerEvent::Move(p(310.0, 330.0)),
            PointerEvent::Up(p(310.0, 330.0)),
        ]);
        assert_eq!(redraws_a, 3);
        assert_eq!(redraws_b, 2);
        assert_eq!(a.rotate(), b.rotate());
    }

    #[test]
    fn duplicate_moves_are_idempotent() {
        let (a, _) = run(&[PointerEvent::Down(p(200.0, 200.0)), PointerEvent::Move(p(260.0, 290.0))]);
        let (b, _) = run(&[
            PointerEvent::Down(p(200.0, 200.0)),
            PointerEvent::Move(p(260.0, 290.0)),
            PointerEvent::Move(p(260.0, 290.0)),
        ]);
        assert_eq!(a.rotate(), b.rotate());
    }

    #[test]
    fn second_down_resets_session() {
        let mut projection = reference_projection();
        let mut c = DragSessionController::new();
        let mut noop = |_: &ProjectionState| {};
        c.handle(PointerEvent::Down(p(250.0, 250.0)), &mut projection, &mut noop);
        c.handle(PointerEvent::Move(p(330.0, 250.0)), &mut projection, &mut noop);
        let mid = projection.rotate();

        c.handle(PointerEvent::Down(p(100.0, 300.0)), &mut projection, &mut noop);
        assert_eq!(
            c.state(),
            DragState::Dragging {
                o0: mid,
                m0: trackball_angles(p(100.0, 300.0), 250.0, p(250.0, 250.0)),
            }
        );
        c.handle(PointerEvent::Move(p(140.0, 260.0)), &mut projection, &mut noop);
        c.handle(PointerEvent::Up(p(140.0, 260.0)), &mut projection, &mut noop);

        let m0 = trackball_angles(p(100.0, 300.0), 250.0, p(250.0, 250.0));
        let m1 = trackball_angles(p(140.0, 260.0), 250.0, p(250.0, 250.0));
        let want = composed_rotation(mid.lambda, mid.phi, mid.gamma, m1.0 - m0.0, m1.1 - m0.1);
        assert_eq!(projection.rotate(), want);
        assert_eq!(c.state(), DragState::Idle);
    }

    #[test]
    fn horizontal_drag_from_center_is_pure_yaw() {
        let mut projection = reference_projection();
        let mut c = DragSessionController::new();
        let mut seen = Vec::new();
        let mut record = |pr: &ProjectionState| seen.push(pr.rotate());
        c.handle(PointerEvent::Down(p(250.0, 250.0)), &mut projection, &mut record);
        c.handle(PointerEvent::Move(p(300.0, 250.0)), &mut projection, &mut record);

        let r = projection.rotate();
        assert!((r.lambda - 0.2f64.asin().to_degrees()).abs() < EPS);
        assert!(r.phi.abs() < EPS && r.gamma.abs() < EPS);
        assert_eq!(seen, vec![r]);

        // 起点处的中心点现在位于指针下方
        let under = projection.project(0.0, 0.0).unwrap();
        assert!((under.x - 300.0).abs() < 1e-6 && (under.y - 250.0).abs() < 1e-6);
    }

    #[test]
    fn reset_drops_session() {
        let mut projection = reference_projection();
        let mut c = DragSessionController::new();
        c.pointer_down(p(10.0, 10.0), &projection);
        c.reset();
        let mut redraws = 0;
        c.pointer_move(p(90.0, 90.0), &mut projection, &mut |_| redraws += 1);
        assert_eq!(redraws, 0);
        assert_eq!(projection.rotate(), Rotation::IDENTITY);
    }
}
