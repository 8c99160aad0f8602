// compose.rs - 起始旋转 + 轨迹球增量 -> 等效旋转三元组

use crate::projection::Rotation;
use std::f64::consts::FRAC_PI_2;

/// Composes the drag-start rotation `(λ, ϕ, γ)` with the trackball offset
/// `(δλ, δϕ)` accumulated since drag start. All angles in degrees.
///
/// Per-axis addition is wrong as soon as more than one axis is involved, so the
/// five elementary rotations (λ, ϕ, γ, then δλ, δϕ) are multiplied out and an
/// equivalent triple is read back from the product matrix.
///
/// When `m01` and `m11` both vanish the decomposition is degenerate (gimbal
/// lock). That branch keeps yaw at its drag-start value and derives roll and
/// pitch from the remaining entries; it is a continuation rule, not an exact
/// inverse.
pub fn composed_rotation(lambda: f64, phi: f64, gamma: f64, d_lambda: f64, d_phi: f64) -> Rotation {
    let lambda = lambda.to_radians();
    let phi = phi.to_radians();
    let gamma = gamma.to_radians();
    let d_lambda = d_lambda.to_radians();
    let d_phi = d_phi.to_radians();

    let (sl, cl) = lambda.sin_cos();
    let (sp, cp) = phi.sin_cos();
    let (sg, cg) = gamma.sin_cos();
    let (sdl, cdl) = d_lambda.sin_cos();
    let (sdp, cdp) = d_phi.sin_cos();

    // 起始姿态中反复出现的组合项
    let a = sg * sl * sp + cg * cl;
    let b = sl * sp * cg - sg * cl;
    let c = sg * sp * cl - sl * cg;
    let d = sp * cg * cl + sg * sl;

    let m = Entries {
        m00: -sdl * sl * cp + a * cdl,
        m01: -sg * cdl * cp - sdl * sp,
        m10: -sdp * sl * cdl * cp - a * sdl * sdp - b * cdp,
        m11: sdl * sdp * sg * cp - sdp * sp * cdl + cdp * cg * cp,
        m20: -sl * cdl * cdp * cp - a * sdl * cdp + b * sdp,
        m21: sdl * sg * cdp * cp - sdp * cg * cp - sp * cdl * cdp,
        m22: cdl * cdp * cl * cp + c * sdl * cdp - d * sdp,
    };
    let (lambda_out, phi_out, gamma_out) = m.decompose(lambda);

    Rotation::new(lambda_out.to_degrees(), phi_out.to_degrees(), gamma_out.to_degrees())
}

/// The rotation-matrix entries needed to read the angles back (m02 and m12 are never used).
struct Entries {
    m00: f64,
    m01: f64,
    m10: f64,
    m11: f64,
    m20: f64,
    m21: f64,
    m22: f64,
}

impl Entries {
    /// `(λ', ϕ', γ')` in radians. `lambda` is the drag-start yaw, in radians.
    fn decompose(&self, lambda: f64) -> (f64, f64, f64) {
        if self.m01 != 0.0 || self.m11 != 0.0 {
            let gamma = (-self.m01).atan2(self.m11);
            let s = gamma.sin();
            // 取非零的那个分母
            let denom = if s == 0.0 { self.m11 / gamma.cos() } else { -self.m01 / s };
            let phi = (-self.m21).atan2(denom);
            let lambda = (-self.m20).atan2(self.m22);
            (lambda, phi, gamma)
        } else {
            let gamma = self.m10.atan2(self.m00) - self.m21 * lambda;
            let phi = -self.m21 * FRAC_PI_2;
            (lambda, phi, gamma)
        }
    }
}
