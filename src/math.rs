//! Vector and quaternion helpers on top of glam.

pub use glam::{Mat3, Quat, Vec3};

/// Small epsilon value for floating-point comparisons
pub const EPSILON: f32 = 1e-6;

/// Squared-length threshold below which a vector is treated as zero
pub const SQR_EPSILON: f32 = 1e-8;

/// Drop the vertical component
#[inline]
pub fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Shortest rotation taking direction `from` onto direction `to`.
/// Either vector being zero yields identity.
pub fn from_to_rotation(from: Vec3, to: Vec3) -> Quat {
    let (Some(from), Some(to)) = (from.try_normalize(), to.try_normalize()) else {
        return Quat::IDENTITY;
    };
    Quat::from_rotation_arc(from, to)
}

/// Rotation whose local +Z points along `forward` and whose local +Y is as
/// close to `up` as possible.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let Some(z) = forward.try_normalize() else {
        return Quat::IDENTITY;
    };
    let x = up
        .cross(z)
        .try_normalize()
        .unwrap_or_else(|| z.any_orthonormal_vector());
    let y = z.cross(x);
    Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize()
}

/// Interior angle opposite the side of length `opposite` in a triangle with
/// the two other sides `a` and `b` (law of cosines, clamped to a valid cosine).
pub fn triangle_angle(opposite: f32, a: f32, b: f32) -> f32 {
    let denominator = 2.0 * a * b;
    if denominator <= EPSILON {
        return 0.0;
    }
    let cos = ((a * a + b * b - opposite * opposite) / denominator).clamp(-1.0, 1.0);
    cos.acos()
}

/// Scale a rotation's angle by `t` (0 = identity, 1 = `rotation`)
#[inline]
pub fn weighted_rotation(rotation: Quat, t: f32) -> Quat {
    Quat::IDENTITY.slerp(rotation, t)
}

/// Wrap an angle in degrees into (-180, 180]
pub fn normalize_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Heading of a rotation around world +Y, in degrees (-180, 180]
pub fn yaw_degrees(rotation: Quat) -> f32 {
    let forward = rotation * Vec3::Z;
    if horizontal(forward).length_squared() < SQR_EPSILON {
        let (yaw, _, _) = rotation.to_euler(glam::EulerRot::YXZ);
        return normalize_degrees(yaw.to_degrees());
    }
    normalize_degrees(forward.x.atan2(forward.z).to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_look_rotation_axes() {
        let rot = look_rotation(Vec3::X, Vec3::Y);
        assert!((rot * Vec3::Z).distance(Vec3::X) < 1e-5);
        assert!((rot * Vec3::Y).distance(Vec3::Y) < 1e-5);

        // Up parallel to forward still gives a valid rotation
        let rot = look_rotation(Vec3::Y, Vec3::Y);
        assert!((rot * Vec3::Z).distance(Vec3::Y) < 1e-5);
        assert!(rot.is_normalized());
    }

    #[test]
    fn test_from_to_rotation() {
        let rot = from_to_rotation(Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 5.0));
        assert!((rot * Vec3::X).distance(Vec3::Z) < 1e-5);
        assert_eq!(from_to_rotation(Vec3::ZERO, Vec3::X), Quat::IDENTITY);
    }

    #[test]
    fn test_triangle_angle() {
        // Equilateral
        assert!((triangle_angle(1.0, 1.0, 1.0) - PI / 3.0).abs() < 1e-5);
        // Straight chain
        assert!((triangle_angle(2.0, 1.0, 1.0) - PI).abs() < 1e-3);
        // Right angle
        assert!((triangle_angle(2f32.sqrt(), 1.0, 1.0) - FRAC_PI_2).abs() < 1e-5);
        // Unreachable clamps instead of NaN
        assert!((triangle_angle(5.0, 1.0, 1.0) - PI).abs() < 1e-5);
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(190.0), -170.0);
        assert_eq!(normalize_degrees(-190.0), 170.0);
        assert_eq!(normalize_degrees(180.0), 180.0);
        assert_eq!(normalize_degrees(-180.0), 180.0);
        assert_eq!(normalize_degrees(45.0), 45.0);
    }

    #[test]
    fn test_yaw_degrees() {
        let rot = Quat::from_rotation_y(30f32.to_radians());
        assert!((yaw_degrees(rot) - 30.0).abs() < 1e-3);
        let rot = Quat::from_rotation_y(-120f32.to_radians());
        assert!((yaw_degrees(rot) + 120.0).abs() < 1e-3);
    }
}
