/// Camera - view and projection matrices with an eagerly cached product.
///
/// Column-vector convention: a world-space point `p` reaches clip space as
/// `view_projection * p`, with `view_projection = projection * view`.
/// Every setter recomputes `view_projection` before returning, so the cached
/// product is never stale.

use glam::{Mat4, Vec3, Vec4};
use crate::config::CameraConfig;

/// Perspective camera
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    view: Mat4,
    projection: Mat4,
    view_projection: Mat4,
    near: f32,
    far: f32,
    projection_size: f32,
    location: Vec3,
    at: Vec3,
    direction: Vec3,
    up: Vec3,
    right: Vec3,
}

impl Camera {
    /// Camera with identity matrices; call `set_view` and `set_projection`
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            view_projection: Mat4::IDENTITY,
            near: config.near,
            far: config.far,
            projection_size: config.projection_size,
            location: Vec3::ZERO,
            at: Vec3::ZERO,
            direction: Vec3::NEG_Z,
            up: Vec3::Y,
            right: Vec3::X,
        }
    }

    // ===== SETTERS =====

    /// Place the camera at `location` looking at `at`
    ///
    /// `up` only orients the camera; the stored up vector is re-orthogonalized
    /// against the view direction.
    pub fn set_view(&mut self, location: Vec3, at: Vec3, up: Vec3) {
        self.location = location;
        self.at = at;
        self.direction = (at - location).normalize_or_zero();
        self.right = self.direction.cross(up).normalize_or_zero();
        self.up = self.right.cross(self.direction).normalize_or_zero();
        self.view = Mat4::look_at_rh(location, at, up);
        self.update_view_projection();
    }

    /// Perspective projection for a `width` x `height` frame
    ///
    /// The near-plane window is `projection_size` on its smaller side and
    /// widened along the larger side to keep the aspect ratio.
    pub fn set_projection(&mut self, width: u32, height: u32) {
        let width = width.max(1) as f32;
        let height = height.max(1) as f32;
        let mut rx = self.projection_size / 2.0;
        let mut ry = rx;
        if width > height {
            rx *= width / height;
        } else {
            ry *= height / width;
        }
        self.projection = frustum(-rx, rx, -ry, ry, self.near, self.far);
        self.update_view_projection();
    }

    /// Move the camera keeping its view direction
    pub fn translate(&mut self, offset: Vec3) {
        self.set_view(self.location + offset, self.at + offset, self.up);
    }

    /// Rotate the location around the look-at point about the world Y axis
    pub fn orbit_y(&mut self, angle: f32) {
        let offset = Mat4::from_rotation_y(angle).transform_vector3(self.location - self.at);
        self.set_view(self.at + offset, self.at, self.up);
    }

    fn update_view_projection(&mut self) {
        self.view_projection = self.projection * self.view;
    }

    // ===== GETTERS =====

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// `projection * view`
    pub fn view_projection(&self) -> Mat4 {
        self.view_projection
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn projection_size(&self) -> f32 {
        self.projection_size
    }

    pub fn location(&self) -> Vec3 {
        self.location
    }

    /// Look-at point
    pub fn at(&self) -> Vec3 {
        self.at
    }

    /// Unit view direction
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }
}

impl Default for Camera {
    /// At (5, 5, 5) looking at the origin, Y up, 800x600 projection
    fn default() -> Self {
        let mut camera = Camera::new(&CameraConfig::default());
        camera.set_view(Vec3::splat(5.0), Vec3::ZERO, Vec3::Y);
        camera.set_projection(800, 600);
        camera
    }
}

/// Right-handed off-center perspective frustum with a [0, 1] depth range
pub fn frustum(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    Mat4::from_cols(
        Vec4::new(2.0 * near / (right - left), 0.0, 0.0, 0.0),
        Vec4::new(0.0, 2.0 * near / (top - bottom), 0.0, 0.0),
        Vec4::new(
            (right + left) / (right - left),
            (top + bottom) / (top - bottom),
            far / (near - far),
            -1.0,
        ),
        Vec4::new(0.0, 0.0, near * far / (near - far), 0.0),
    )
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
