use glam::{Mat4, Vec3};

/// Perspective camera consumed by the renderer. Position and aim are owned
/// by the orbit controller while one is attached.
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov: f32, // radians
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 10.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: 35f32.to_radians(),
            near: 0.4,
            far: 100.0,
        }
    }

    /// Normalized view direction, from the eye toward the target.
    pub fn forward(&self) -> Vec3 {
        (self.target - self.eye).normalize()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov, aspect, self.near, self.far)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_is_unit_length() {
        let mut camera = Camera::new();
        camera.eye = Vec3::new(-6.0, 5.0, 10.0);
        assert!((camera.forward().length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn view_matrix_maps_eye_to_origin() {
        let mut camera = Camera::new();
        camera.eye = Vec3::new(3.0, 4.0, 5.0);
        let mapped = camera.view_matrix().transform_point3(camera.eye);
        assert!(mapped.length() < 1e-5);
    }

    #[test]
    fn view_matrix_looks_down_negative_z() {
        let camera = Camera::new();
        let mapped = camera.view_matrix().transform_point3(camera.target);
        assert!(mapped.x.abs() < 1e-5 && mapped.y.abs() < 1e-5);
        assert!(mapped.z < 0.0);
    }
}
