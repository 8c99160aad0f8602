// projection.rs - 球体旋转状态与正交投影参数

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

/// Sphere orientation as yaw / pitch / roll, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Rotation {
    pub lambda: f64,
    pub phi: f64,
    pub gamma: f64,
}

impl Rotation {
    pub const IDENTITY: Rotation = Rotation { lambda: 0.0, phi: 0.0, gamma: 0.0 };

    pub fn new(lambda: f64, phi: f64, gamma: f64) -> Self {
        Self { lambda, phi, gamma }
    }

    /// Each angle folded into [-180, 180). Display only; the drag math never wraps.
    pub fn wrapped(self) -> Self {
        Self {
            lambda: wrap_degrees(self.lambda),
            phi: wrap_degrees(self.phi),
            gamma: wrap_degrees(self.gamma),
        }
    }
}

fn wrap_degrees(a: f64) -> f64 {
    (a + 180.0).rem_euclid(360.0) - 180.0
}

/// 正交投影状态：旋转三元组 + 缩放(半径, 像素) + 屏幕中心。
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionState {
    rotation: Rotation,
    scale: f64,
    translate: DVec2,
}

impl ProjectionState {
    pub fn new(scale: f64, translate: DVec2) -> Self {
        Self {
            rotation: Rotation::IDENTITY,
            scale,
            translate,
        }
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn rotate(&self) -> Rotation {
        self.rotation
    }

    pub fn set_rotate(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn translate(&self) -> DVec2 {
        self.translate
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    pub fn set_translate(&mut self, translate: DVec2) {
        self.translate = translate;
    }

    /// Rotate a geographic point (degrees) into view space.
    ///
    /// Returns a unit vector whose `x` is depth toward the viewer, `y` the
    /// screen-right axis and `z` the screen-up axis. Axis order matches
    /// [`crate::compose::composed_rotation`]: λ is added to longitude, then the
    /// point is turned by ϕ about the y axis and by γ about the viewing axis.
    pub fn rotate_point(&self, lon: f64, lat: f64) -> DVec3 {
        let lambda = (lon + self.rotation.lambda).to_radians();
        let phi = lat.to_radians();
        let (s_dphi, c_dphi) = self.rotation.phi.to_radians().sin_cos();
        let (s_dgamma, c_dgamma) = self.rotation.gamma.to_radians().sin_cos();

        let x = phi.cos() * lambda.cos();
        let y = phi.cos() * lambda.sin();
        let z = phi.sin();
        let k = z * c_dphi + x * s_dphi;

        DVec3::new(
            x * c_dphi - z * s_dphi,
            y * c_dgamma - k * s_dgamma,
            k * c_dgamma + y * s_dgamma,
        )
    }

    /// 视空间单位向量 -> 屏幕坐标（屏幕 y 向下）。
    pub fn project_view(&self, v: DVec3) -> DVec2 {
        DVec2::new(
            self.translate.x + self.scale * v.y,
            self.translate.y - self.scale * v.z,
        )
    }

    /// Screen position of a geographic point, or `None` when it lies on the far hemisphere.
    pub fn project(&self, lon: f64, lat: f64) -> Option<DVec2> {
        let v = self.rotate_point(lon, lat);
        (v.x >= 0.0).then(|| self.project_view(v))
    }
}

/// Scale and center that fit a disk of `radius` plus `padding` on each side into the viewport.
pub fn fit_to_viewport(width: f64, height: f64, radius: f64, padding: f64) -> (f64, DVec2) {
    let extent = 2.0 * (radius + padding);
    let fit = width.min(height) / extent;
    (radius * fit, DVec2::new(width * 0.5, height * 0.5))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    #[test]
    fn identity_projects_origin_to_center() {
        let p = ProjectionState::new(250.0, DVec2::new(250.0, 250.0));
        let s = p.project(0.0, 0.0).unwrap();
        assert!(close(s.x, 250.0) && close(s.y, 250.0));

        let east = p.project(90.0, 0.0).unwrap();
        assert!(close(east.x, 500.0) && close(east.y, 250.0));

        let north = p.project(0.0, 90.0).unwrap();
        assert!(close(north.x, 250.0) && close(north.y, 0.0));
    }

    #[test]
    fn far_side_is_hidden() {
        let p = ProjectionState::new(100.0, DVec2::ZERO);
        assert!(p.project(180.0, 0.0).is_none());
        assert!(p.project(120.0, 10.0).is_none());
        assert!(p.project(60.0, 10.0).is_some());
    }

    #[test]
    fn yaw_shifts_longitude() {
        let p = ProjectionState::new(100.0, DVec2::ZERO).with_rotation(Rotation::new(-30.0, 0.0, 0.0));
        let s = p.project(30.0, 0.0).unwrap();
        assert!(close(s.x, 0.0) && close(s.y, 0.0));
    }

    #[test]
    fn pitch_brings_latitude_to_center() {
        let p = ProjectionState::new(100.0, DVec2::ZERO).with_rotation(Rotation::new(0.0, -40.0, 0.0));
        let s = p.project(0.0, 40.0).unwrap();
        assert!(close(s.x, 0.0) && close(s.y, 0.0));
    }

    #[test]
    fn rotated_points_stay_on_unit_sphere() {
        let p = ProjectionState::new(1.0, DVec2::ZERO).with_rotation(Rotation::new(37.0, -12.0, 71.0));
        for (lon, lat) in [(0.0, 0.0), (123.0, -45.0), (-170.0, 80.0), (55.5, 10.25)] {
            assert!(close(p.rotate_point(lon, lat).length(), 1.0));
        }
    }

    #[test]
    fn wrapped_folds_into_half_open_range() {
        let r = Rotation::new(190.0, -180.0, 540.0).wrapped();
        assert!(close(r.lambda, -170.0));
        assert!(close(r.phi, -180.0));
        assert!(close(r.gamma, -180.0));
        assert_eq!(Rotation::new(10.0, 20.0, -30.0).wrapped(), Rotation::new(10.0, 20.0, -30.0));
    }

    #[test]
    fn fit_matches_reference_layout() {
        // 250 px 半径 + 25 px 边距 -> 550 视框
        let (scale, center) = fit_to_viewport(550.0, 550.0, 250.0, 25.0);
        assert!(close(scale, 250.0));
        assert_eq!(center, DVec2::new(275.0, 275.0));

        let (scale, center) = fit_to_viewport(1280.0, 720.0, 250.0, 25.0);
        assert!(close(scale, 720.0 / 550.0 * 250.0));
        assert_eq!(center, DVec2::new(640.0, 360.0));
    }
}
