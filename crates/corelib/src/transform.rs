use crate::{EulerRot, Mat4, Quat, Vec3};

/// Rigid transform with uniform or non-uniform scale (Euler XYZ).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    /// Euler angles in radians (XYZ order).
    pub rotation_euler: Vec3,
    pub scale: Vec3,
}

impl Transform {
    #[inline]
    pub const fn identity() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation_euler: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    #[inline]
    pub fn from_trs(translation: Vec3, rotation_euler: Vec3, scale: Vec3) -> Self {
        Self {
            translation,
            rotation_euler,
            scale,
        }
    }

    /// Centers an axis-aligned box at the origin and scales it so its
    /// bounding sphere has radius 1. Degenerate boxes keep unit scale.
    pub fn fit_bounds(min: Vec3, max: Vec3) -> Self {
        let center = (min + max) * 0.5;
        let radius = (max - min).length() * 0.5;
        let s = if radius > f32::EPSILON { 1.0 / radius } else { 1.0 };
        Self {
            translation: -center * s,
            rotation_euler: Vec3::ZERO,
            scale: Vec3::splat(s),
        }
    }

    /// Build matrix = T * R * S (column-major Mat4 per glam).
    #[inline]
    pub fn matrix(&self) -> Mat4 {
        let q = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation_euler.x,
            self.rotation_euler.y,
            self.rotation_euler.z,
        );
        Mat4::from_scale_rotation_translation(self.scale, q, self.translation)
    }

    /// This transform followed by a spin of `yaw` radians around world +Y.
    #[inline]
    pub fn spun(&self, yaw: f32) -> Mat4 {
        Mat4::from_rotation_y(yaw) * self.matrix()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec3;

    #[test]
    fn fit_bounds_centers_and_normalizes() {
        let t = Transform::fit_bounds(vec3(2.0, 0.0, 0.0), vec3(6.0, 4.0, 2.0));
        let m = t.matrix();
        let lo = m.transform_point3(vec3(2.0, 0.0, 0.0));
        let hi = m.transform_point3(vec3(6.0, 4.0, 2.0));
        assert!(((lo + hi) * 0.5).length() < 1e-5);
        assert!(((hi - lo).length() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn degenerate_bounds_keep_unit_scale() {
        let p = vec3(1.0, 1.0, 1.0);
        let t = Transform::fit_bounds(p, p);
        assert_eq!(t.scale, Vec3::ONE);
        assert_eq!(t.translation, -p);
    }

    #[test]
    fn spin_rotates_around_vertical_axis() {
        let t = Transform::identity();
        let p = t
            .spun(std::f32::consts::FRAC_PI_2)
            .transform_point3(vec3(1.0, 2.0, 0.0));
        assert!((p - vec3(0.0, 2.0, -1.0)).length() < 1e-5);
    }
}
