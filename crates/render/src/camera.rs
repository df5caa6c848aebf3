use glam::{Mat4, Vec3};
use shadebench_common::{CameraConfig, CameraMovement};

pub const PITCH_LIMIT_DEG: f32 = 89.0;
pub const ZOOM_MIN_DEG: f32 = 1.0;
pub const ZOOM_MAX_DEG: f32 = 45.0;
pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 1000.0;
/// Starting field of view. Outside the scroll range until the first scroll.
pub const DEFAULT_ZOOM_DEG: f32 = 50.0;

/// Fly camera driven by discrete movement commands, look deltas and scroll zoom.
///
/// Yaw, pitch and zoom are in degrees. The front/right/up basis is cached and
/// recomputed on every orientation change.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub speed: f32,
    pub sensitivity: f32,
    yaw: f32,
    pitch: f32,
    zoom: f32,
    world_up: Vec3,
    front: Vec3,
    right: Vec3,
    up: Vec3,
    fps_locked: bool,
    fps_height: f32,
    zoom_enabled: bool,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl Camera {
    pub fn new(position: Vec3) -> Self {
        let mut camera = Self {
            position,
            speed: 3.0,
            sensitivity: 0.1,
            yaw: -90.0,
            pitch: 0.0,
            zoom: DEFAULT_ZOOM_DEG,
            world_up: Vec3::Y,
            front: Vec3::NEG_Z,
            right: Vec3::X,
            up: Vec3::Y,
            fps_locked: false,
            fps_height: 0.0,
            zoom_enabled: false,
        };
        camera.update_basis();
        camera
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        let mut camera = Self::new(config.position);
        camera.speed = config.speed;
        camera.sensitivity = config.sensitivity;
        camera.zoom = config.zoom;
        camera.set_fps_camera(config.fps_lock, config.fps_height);
        camera.set_zoom_enabled(config.zoom_enabled);
        camera
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn fps_locked(&self) -> bool {
        self.fps_locked
    }

    pub fn zoom_enabled(&self) -> bool {
        self.zoom_enabled
    }

    /// Set the field of view directly, bypassing the scroll clamp.
    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom;
    }

    /// Lock the eye height to `height` after every movement.
    pub fn set_fps_camera(&mut self, enabled: bool, height: f32) {
        self.fps_locked = enabled;
        self.fps_height = height;
    }

    pub fn set_zoom_enabled(&mut self, enabled: bool) {
        self.zoom_enabled = enabled;
    }

    pub fn set_orientation(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch.clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG);
        self.update_basis();
    }

    pub fn process_movement(&mut self, direction: CameraMovement, dt: f32) {
        let velocity = self.speed * dt;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
            CameraMovement::Up => self.position += self.up * velocity,
            CameraMovement::Down => self.position -= self.up * velocity,
        }
        if self.fps_locked {
            self.position.y = self.fps_height;
        }
    }

    pub fn process_look_delta(&mut self, dx: f32, dy: f32) {
        self.set_orientation(
            self.yaw + dx * self.sensitivity,
            self.pitch + dy * self.sensitivity,
        );
    }

    pub fn process_zoom_delta(&mut self, offset: f32) {
        if !self.zoom_enabled {
            return;
        }
        self.zoom = (self.zoom - offset).clamp(ZOOM_MIN_DEG, ZOOM_MAX_DEG);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.zoom.to_radians(), aspect, NEAR_PLANE, FAR_PLANE)
    }

    fn update_basis(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(
            pitch.cos() * yaw.cos(),
            pitch.sin(),
            pitch.cos() * yaw.sin(),
        )
        .normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}
