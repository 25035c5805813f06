//! Orbit camera with damping.

use glam::{Mat4, Vec3};

/// Vertical field of view in degrees.
const FOV_Y_DEGREES: f32 = 75.0;
const NEAR: f32 = 0.1;
const FAR: f32 = 100.0;
const MIN_DISTANCE: f32 = 0.5;
const MAX_DISTANCE: f32 = 50.0;
const PITCH_LIMIT: f32 = 1.5;

/// Orbit camera for viewing the galaxy.
///
/// Input adds angular and zoom velocity; [`update`](Self::update) applies a
/// fraction of it each frame and decays the rest, so motion eases out after
/// the mouse is released.
pub struct Camera {
    /// Horizontal rotation angle in radians.
    pub yaw: f32,
    /// Vertical rotation angle in radians.
    pub pitch: f32,
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
    /// Width / height of the viewport.
    pub aspect: f32,
    /// Fraction of pending motion applied per frame. 1.0 disables damping.
    pub damping: f32,
    yaw_velocity: f32,
    pitch_velocity: f32,
    zoom_velocity: f32,
}

impl Camera {
    /// Camera at (3, 3, 3) looking at the origin.
    pub fn new(aspect: f32) -> Self {
        let start = Vec3::splat(3.0);
        let distance = start.length();
        Self {
            yaw: start.x.atan2(start.z),
            pitch: (start.y / distance).asin(),
            distance,
            target: Vec3::ZERO,
            aspect,
            damping: 0.05,
            yaw_velocity: 0.0,
            pitch_velocity: 0.0,
            zoom_velocity: 0.0,
        }
    }

    /// Calculate the camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    /// Perspective projection for the current aspect ratio.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(FOV_Y_DEGREES.to_radians(), self.aspect, NEAR, FAR)
    }

    /// Queue a rotation from a mouse drag, in radians.
    pub fn rotate(&mut self, d_yaw: f32, d_pitch: f32) {
        self.yaw_velocity += d_yaw;
        self.pitch_velocity += d_pitch;
    }

    /// Queue a zoom. Positive moves closer.
    pub fn zoom(&mut self, amount: f32) {
        self.zoom_velocity += amount;
    }

    /// Apply damped motion. Call once per frame.
    pub fn update(&mut self) {
        let damping = self.damping.clamp(0.0, 1.0);

        self.yaw += self.yaw_velocity * damping;
        let pitch = self.pitch + self.pitch_velocity * damping;
        self.pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        let distance = self.distance - self.zoom_velocity * damping;
        self.distance = distance.clamp(MIN_DISTANCE, MAX_DISTANCE);

        let decay = 1.0 - damping;
        self.yaw_velocity *= decay;
        self.pitch_velocity *= decay;
        self.zoom_velocity *= decay;
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(16.0 / 9.0)
    }
}
