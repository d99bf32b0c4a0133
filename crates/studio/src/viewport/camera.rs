//! Arc-ball camera: orbit controls, screen-ray construction, and
//! bounds-driven auto-framing of the active part.

use glam::{Mat4, Vec2, Vec3, Vec4};

use super::picking::Ray;
use crate::geometry::Aabb;

/// How far past the fitting distance the camera sits when framing
const FRAME_DISTANCE_FACTOR: f32 = 2.0;

/// Render surface dimensions in pixels
#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }
}

/// Arc-ball camera for the 3D viewport
pub struct ArcBallCamera {
    /// Horizontal rotation angle (radians)
    pub yaw: f32,
    /// Vertical rotation angle (radians)
    pub pitch: f32,
    /// Distance from target
    pub distance: f32,
    /// Camera target point
    pub target: Vec3,
    /// Vertical field of view (radians)
    pub fov: f32,
}

impl ArcBallCamera {
    pub fn new() -> Self {
        Self {
            yaw: 0.6,
            pitch: 0.4,
            distance: 6.0,
            target: Vec3::ZERO,
            fov: 45.0_f32.to_radians(),
        }
    }

    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw += dx.to_radians();
        self.pitch = (self.pitch + dy.to_radians()).clamp(-1.5, 1.5);
    }

    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance * (1.0 - delta)).clamp(0.05, 100.0);
    }

    /// Reposition to frame the given bounds: target on the center,
    /// eye lifted half the largest extent and pulled back far enough
    /// for the whole box to fit the field of view.
    ///
    /// An empty box leaves the camera untouched; callers report that
    /// condition themselves.
    pub fn frame(&mut self, bounds: &Aabb) {
        if bounds.is_empty() {
            return;
        }
        let center = bounds.center();
        let max_dim = bounds.max_dim();
        let fit = max_dim / (2.0 * (self.fov * 0.5).tan());
        let offset = Vec3::new(0.0, max_dim * 0.5, fit * FRAME_DISTANCE_FACTOR);

        self.target = center;
        self.distance = offset.length();
        self.yaw = 0.0;
        self.pitch = (offset.y / self.distance).asin();
    }

    /// Camera position in world space
    pub fn eye_position(&self) -> Vec3 {
        let cy = self.yaw.cos();
        let sy = self.yaw.sin();
        let cp = self.pitch.cos();
        let sp = self.pitch.sin();

        self.target
            + Vec3::new(
                self.distance * cp * sy,
                self.distance * sp,
                self.distance * cp * cy,
            )
    }

    /// View matrix (world -> camera)
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye_position(), self.target, Vec3::Y)
    }

    /// Projection matrix (camera -> clip)
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov, aspect, 0.01, 1000.0)
    }

    /// Combined view-projection matrix
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    /// Project a 3D point to screen pixels; None when behind the eye
    pub fn project(&self, point: Vec3, viewport: Viewport) -> Option<Vec2> {
        let vp = self.view_projection(viewport.aspect());
        let p = vp * Vec4::new(point.x, point.y, point.z, 1.0);
        if p.w <= 0.0 {
            return None;
        }
        let ndc = p.truncate() / p.w;
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * viewport.width,
            (1.0 - ndc.y) * 0.5 * viewport.height,
        ))
    }

    /// Cast a ray from a screen pixel position into the scene
    pub fn screen_ray(&self, screen_pos: Vec2, viewport: Viewport) -> Ray {
        let ndc_x = (screen_pos.x / viewport.width) * 2.0 - 1.0;
        let ndc_y = 1.0 - (screen_pos.y / viewport.height) * 2.0;

        let vp_inv = self.view_projection(viewport.aspect()).inverse();

        let near_world = vp_inv * Vec4::new(ndc_x, ndc_y, -1.0, 1.0);
        let far_world = vp_inv * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);

        let near = near_world.truncate() / near_world.w;
        let far = far_world.truncate() / far_world.w;

        Ray {
            origin: self.eye_position(),
            direction: (far - near).normalize_or_zero(),
        }
    }
}

impl Default for ArcBallCamera {
    fn default() -> Self {
        Self::new()
    }
}
