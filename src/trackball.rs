// trackball.rs - 屏幕坐标 -> 虚拟轨迹球角度

use glam::DVec2;

/// Angular position `(λ, ϕ)` in degrees of a screen point on a virtual trackball
/// of radius `r` centered at `c`.
///
/// Inside the inner region (`r² > 2·ss`) the point sits on the sphere itself;
/// beyond it the depth follows the hyperbolic sheet `z = r² / (2·√ss)`, which
/// meets the sphere at `ss = r²/2` with `z = r/√2`. Defined for every input.
pub fn trackball_angles(pt: DVec2, r: f64, c: DVec2) -> (f64, f64) {
    let x = pt.x - c.x;
    // 屏幕 y 向下，轨迹球 y 向上
    let y = -(pt.y - c.y);
    let ss = x * x + y * y;
    let z = trackball_depth(ss, r);

    (x.atan2(z).to_degrees(), y.atan2(z).to_degrees())
}

fn trackball_depth(ss: f64, r: f64) -> f64 {
    let rr = r * r;
    if rr > 2.0 * ss {
        (rr - ss).sqrt()
    } else {
        rr / (2.0 * ss.sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn center_maps_to_zero() {
        for (r, c) in [
            (250.0, DVec2::new(250.0, 250.0)),
            (1.0, DVec2::ZERO),
            (37.5, DVec2::new(-12.0, 900.0)),
        ] {
            assert_eq!(trackball_angles(c, r, c), (0.0, 0.0));
        }
    }

    #[test]
    fn depth_is_continuous_at_boundary() {
        let r: f64 = 250.0;
        let ss = r * r / 2.0;
        let sphere = (r * r - ss).sqrt();
        let sheet = r * r / (2.0 * ss.sqrt());
        let expected = r / 2f64.sqrt();
        assert!((sphere - expected).abs() < EPS);
        assert!((sheet - expected).abs() < EPS);

        let below = trackball_depth(ss * (1.0 - 1e-12), r);
        let above = trackball_depth(ss * (1.0 + 1e-12), r);
        assert!((below - above).abs() < 1e-6);
    }

    #[test]
    fn horizontal_offset_inside_disk() {
        let c = DVec2::new(250.0, 250.0);
        let (lambda, phi) = trackball_angles(DVec2::new(300.0, 250.0), 250.0, c);
        let expected = 50f64.atan2(60000f64.sqrt()).to_degrees();
        assert!((lambda - expected).abs() < EPS);
        assert!((lambda - 11.537).abs() < 1e-3);
        assert_eq!(phi, 0.0);
    }

    #[test]
    fn screen_up_is_positive_phi() {
        let c = DVec2::new(100.0, 100.0);
        let (_, up) = trackball_angles(DVec2::new(100.0, 60.0), 100.0, c);
        let (_, down) = trackball_angles(DVec2::new(100.0, 140.0), 100.0, c);
        assert!(up > 0.0);
        assert!((up + down).abs() < EPS);
    }

    #[test]
    fn far_outside_disk_is_finite_and_bounded() {
        let c = DVec2::ZERO;
        for pt in [DVec2::new(1e6, 0.0), DVec2::new(-3000.0, 4000.0), DVec2::new(0.0, -250.0)] {
            let (lambda, phi) = trackball_angles(pt, 250.0, c);
            assert!(lambda.is_finite() && phi.is_finite());
            assert!(lambda.abs() < 90.0 && phi.abs() < 90.0);
        }
    }

    #[test]
    fn angles_grow_monotonically_along_axis() {
        let c = DVec2::ZERO;
        let mut last = -1.0;
        for i in 0..=60 {
            let (lambda, _) = trackball_angles(DVec2::new(f64::from(i) * 10.0, 0.0), 250.0, c);
            assert!(lambda > last);
            last = lambda;
        }
    }
}
