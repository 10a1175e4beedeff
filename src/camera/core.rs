use glam::{Mat4, Vec3, Vec4};

use crate::options::CameraOptions;

/// Perspective camera defined by eye position, target, projection
/// parameters and the viewport it renders into.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Eye (camera) position in world space.
    pub eye: Vec3,
    /// Look-at target position.
    pub target: Vec3,
    /// Up direction vector.
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fovy: f32,
    /// Near clipping plane distance.
    pub znear: f32,
    /// Far clipping plane distance.
    pub zfar: f32,
    /// Viewport width in pixels.
    pub width: f32,
    /// Viewport height in pixels.
    pub height: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_options(&CameraOptions::default())
    }
}

impl Camera {
    /// Camera placed and shaped by `opts`.
    pub fn from_options(opts: &CameraOptions) -> Self {
        Self {
            eye: Vec3::from_array(opts.eye),
            target: Vec3::from_array(opts.target),
            up: Vec3::Y,
            fovy: opts.fovy,
            znear: opts.znear,
            zfar: opts.zfar,
            width: opts.width as f32,
            height: opts.height as f32,
        }
    }

    /// Viewport aspect ratio (width / height), 1 for a degenerate viewport.
    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// Resize the viewport.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.width = width as f32;
        self.height = height as f32;
    }

    /// World to view matrix.
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// View to world matrix.
    pub fn inv_view(&self) -> Mat4 {
        self.view().inverse()
    }

    /// View to clip matrix.
    pub fn projection(&self) -> Mat4 {
        // perspective_rh already uses [0,1] depth range (wgpu/Vulkan
        // convention)
        Mat4::perspective_rh(
            self.fovy.to_radians(),
            self.aspect(),
            self.znear,
            self.zfar,
        )
    }

    /// Viewport width, viewport height, near plane, far plane.
    pub fn dims(&self) -> Vec4 {
        Vec4::new(self.width, self.height, self.znear, self.zfar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera {
            eye: Vec3::new(0.0, 2.0, 10.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fovy: 45.0,
            znear: 0.1,
            zfar: 100.0,
            width: 800.0,
            height: 600.0,
        }
    }

    #[test]
    fn inv_view_maps_origin_to_eye() {
        let cam = camera();
        let eye = cam.inv_view().transform_point3(Vec3::ZERO);
        assert!(eye.abs_diff_eq(cam.eye, 1e-5));
    }

    #[test]
    fn dims_carry_viewport_and_planes() {
        assert_eq!(camera().dims(), Vec4::new(800.0, 600.0, 0.1, 100.0));
    }

    #[test]
    fn degenerate_viewport_has_unit_aspect() {
        let mut cam = camera();
        cam.set_viewport(640, 0);
        assert_eq!(cam.aspect(), 1.0);
        assert!(cam.projection().is_finite());
    }
}
