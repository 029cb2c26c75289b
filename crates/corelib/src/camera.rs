use crate::{Mat4, Vec3, vec3};

/// Simple perspective camera (right-handed).
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_rad: f32,
    pub z_near: f32,
    pub z_far: f32,
    pub aspect: f32,
}

impl Camera {
    #[allow(clippy::too_many_arguments)]
    pub fn new_perspective(
        eye: Vec3,
        target: Vec3,
        up: Vec3,
        fov_y_rad: f32,
        z_near: f32,
        z_far: f32,
        aspect: f32,
    ) -> Self {
        Self {
            eye,
            target,
            up,
            fov_y_rad,
            z_near,
            z_far,
            aspect,
        }
    }

    #[inline]
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// glam's `perspective_rh` already maps depth to [0, 1] as wgpu expects.
    #[inline]
    pub fn proj(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_rad,
            self.aspect.max(1e-6),
            self.z_near,
            self.z_far,
        )
    }

    #[inline]
    pub fn proj_view(&self) -> Mat4 {
        self.proj() * self.view()
    }

    #[inline]
    pub fn with_aspect(mut self, aspect: f32) -> Self {
        self.aspect = aspect;
        self
    }
}

/// Orbit controls around a fixed target: drag rotates, wheel zooms.
#[derive(Clone, Copy, Debug)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    /// Radians around +Y.
    pub yaw: f32,
    /// Radians above the horizon, clamped short of the poles.
    pub pitch: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Radians per pixel of pointer motion.
    pub rotate_speed: f32,
}

impl OrbitCamera {
    const MAX_PITCH: f32 = 1.5;

    pub fn new(target: Vec3, distance: f32) -> Self {
        Self {
            target,
            distance,
            yaw: 0.0,
            pitch: 0.25,
            min_distance: 1.5,
            max_distance: 8.0,
            rotate_speed: 0.008,
        }
    }

    /// Apply a pointer drag delta in physical pixels.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * self.rotate_speed;
        self.pitch = (self.pitch + dy * self.rotate_speed).clamp(-Self::MAX_PITCH, Self::MAX_PITCH);
    }

    /// Positive `steps` zoom in. One step scales distance by 10%.
    pub fn zoom(&mut self, steps: f32) {
        self.distance = (self.distance * 0.9f32.powf(steps)).clamp(self.min_distance, self.max_distance);
    }

    pub fn eye(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        self.target + vec3(cp * sy, sp, cp * cy) * self.distance
    }

    pub fn camera(&self, aspect: f32) -> Camera {
        Camera::new_perspective(
            self.eye(),
            self.target,
            Vec3::Y,
            45f32.to_radians(),
            0.05,
            100.0,
            aspect,
        )
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 3.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eye_keeps_distance_from_target() {
        let mut orbit = OrbitCamera::default();
        orbit.orbit(120.0, -40.0);
        assert!(((orbit.eye() - orbit.target).length() - orbit.distance).abs() < 1e-4);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut orbit = OrbitCamera::default();
        orbit.orbit(0.0, 1.0e6);
        assert!(orbit.pitch <= 1.5);
        orbit.orbit(0.0, -1.0e6);
        assert!(orbit.pitch >= -1.5);
    }

    #[test]
    fn zoom_respects_limits() {
        let mut orbit = OrbitCamera::default();
        orbit.zoom(100.0);
        assert_eq!(orbit.distance, orbit.min_distance);
        orbit.zoom(-100.0);
        assert_eq!(orbit.distance, orbit.max_distance);
    }

    #[test]
    fn default_eye_looks_from_front() {
        let orbit = OrbitCamera::default();
        let eye = orbit.eye();
        assert!(eye.z > 0.0 && eye.y > 0.0);
        let pv = orbit.camera(16.0 / 9.0).proj_view();
        assert!(pv.to_cols_array().iter().all(|f| f.is_finite()));
    }
}
