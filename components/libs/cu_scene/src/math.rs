use glam::{DQuat, DVec3};
use std::f64::consts::PI;

/// Default tolerance of [`approx_equals`].
pub const EPSILON: f64 = 0.00001;

pub fn approx_equals(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// Compare two unit floats once quantized to 8 bits.
pub fn uint8_equals(a: f32, b: f32) -> bool {
    (a * 255.0).trunc() == (b * 255.0).trunc()
}

pub fn is_zero_length(v: DVec3) -> bool {
    v.length_squared() < 1e-6 * 1e-6
}

/// Shortest rotation taking direction `src` onto direction `dst`.
///
/// Based on Stan Melax's method (Game Programming Gems). Opposite directions
/// rotate by half a turn around any axis orthogonal to `src`.
pub fn rotation_to(src: DVec3, dst: DVec3) -> DQuat {
    let v0 = src.normalize_or_zero();
    let v1 = dst.normalize_or_zero();

    let d = v0.dot(v1);
    if d >= 1.0 {
        return DQuat::IDENTITY;
    }
    if d < 1e-6 - 1.0 {
        let mut axis = DVec3::X.cross(src);
        if is_zero_length(axis) {
            axis = DVec3::Y.cross(src);
        }
        return DQuat::from_axis_angle(axis.normalize(), PI);
    }

    let s = ((1.0 + d) * 2.0).sqrt();
    let invs = 1.0 / s;
    let c = v0.cross(v1);
    DQuat::from_xyzw(c.x * invs, c.y * invs, c.z * invs, s * 0.5).normalize()
}
