use crate::camera::Camera;
use crate::hierarchy::HierarchicalModel;
use crate::shader::{ShaderProgram, uniforms};
use glam::{Mat4, Vec3};
use shadebench_common::{DemoConfig, LayoutConfig, LightingModel, RenderParams};
use shadebench_input::Action;
use std::time::Duration;

/// Background colour every frame is cleared to.
pub const CLEAR_COLOR: [f64; 4] = [0.1, 0.1, 0.1, 1.0];

/// Monotonic frame timer. Owned by the render loop for the process lifetime.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    previous: Duration,
    elapsed: f32,
    delta: f32,
}

impl FrameClock {
    /// `start` is the timestamp the first frame's delta is measured from.
    pub fn new(start: Duration) -> Self {
        Self {
            previous: start,
            ..Self::default()
        }
    }

    /// Advance to `now` and return the seconds since the previous frame.
    /// A timestamp earlier than the previous one yields a zero delta.
    pub fn tick(&mut self, now: Duration) -> f32 {
        self.delta = now.saturating_sub(self.previous).as_secs_f32();
        self.previous = self.previous.max(now);
        self.elapsed += self.delta;
        self.delta
    }

    pub fn delta(&self) -> f32 {
        self.delta
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

/// Angle accumulator in degrees, always kept in `[0, 360)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spinner {
    rate_deg_per_sec: f32,
    angle: f32,
}

impl Spinner {
    pub fn new(rate_deg_per_sec: f32) -> Self {
        Self {
            rate_deg_per_sec,
            angle: 0.0,
        }
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn rate(&self) -> f32 {
        self.rate_deg_per_sec
    }

    pub fn advance(&mut self, dt: f32) -> f32 {
        self.angle = wrap_degrees(self.angle + self.rate_deg_per_sec * dt);
        self.angle
    }
}

fn wrap_degrees(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Quadrant placement of the four lighting-model instances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceLayout {
    pub dist_apart: f32,
    pub model_origin_offset: Vec3,
}

impl From<&LayoutConfig> for InstanceLayout {
    fn from(config: &LayoutConfig) -> Self {
        Self {
            dist_apart: config.dist_apart,
            model_origin_offset: config.model_origin_offset,
        }
    }
}

impl InstanceLayout {
    /// World positions in [`LightingModel::ALL`] order: TL, TR, BL, BR.
    pub fn positions(&self) -> [Vec3; 4] {
        let d = self.dist_apart;
        [
            Vec3::new(-d, d, 0.0),
            Vec3::new(d, d, 0.0),
            Vec3::new(-d, -d, 0.0),
            Vec3::new(d, -d, 0.0),
        ]
        .map(|p| p - self.model_origin_offset)
    }

    pub fn instances(&self) -> impl Iterator<Item = (LightingModel, Vec3)> + use<> {
        LightingModel::ALL.into_iter().zip(self.positions())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    ShuttingDown,
}

/// All mutable per-frame state of the demo.
///
/// Backends drive it once per frame: [`RenderLoop::begin_frame`] with the
/// current time and polled actions, then [`RenderLoop::draw`] with a shader.
#[derive(Debug, Clone)]
pub struct RenderLoop {
    pub camera: Camera,
    pub params: RenderParams,
    pub layout: InstanceLayout,
    clock: FrameClock,
    body_spin: Spinner,
    part_spin: Spinner,
    viewport: Viewport,
    state: LoopState,
    frame_index: u64,
}

impl RenderLoop {
    pub fn new(config: &DemoConfig, start: Duration) -> Self {
        Self {
            camera: Camera::from_config(&config.camera),
            params: config.params,
            layout: InstanceLayout::from(&config.layout),
            clock: FrameClock::new(start),
            body_spin: Spinner::new(config.layout.body_spin_deg_per_sec),
            part_spin: Spinner::new(config.layout.part_spin_deg_per_sec),
            viewport: Viewport {
                width: config.window.width,
                height: config.window.height,
            },
            state: LoopState::Running,
            frame_index: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Request shutdown; the loop stops before its next frame.
    pub fn request_exit(&mut self) {
        if self.state == LoopState::Running {
            tracing::info!(frames = self.frame_index, "render loop shutting down");
        }
        self.state = LoopState::ShuttingDown;
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn body_angle(&self) -> f32 {
        self.body_spin.angle()
    }

    pub fn part_angle(&self) -> f32 {
        self.part_spin.angle()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Viewport { width, height };
        tracing::debug!(width, height, "viewport resized");
    }

    /// Advance the clock to `now` and route this frame's input to the camera.
    pub fn begin_frame(&mut self, now: Duration, actions: &[Action]) -> LoopState {
        if !self.is_running() {
            return self.state;
        }
        let dt = self.clock.tick(now);
        for action in actions {
            self.apply_action(*action, dt);
        }
        self.state
    }

    fn apply_action(&mut self, action: Action, dt: f32) {
        match action {
            Action::Move(direction) => self.camera.process_movement(direction, dt),
            Action::Look { dx, dy } => self.camera.process_look_delta(dx, dy),
            Action::Zoom(offset) => self.camera.process_zoom_delta(offset),
            Action::Exit => self.request_exit(),
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.camera.view_matrix()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.camera.projection_matrix(self.viewport.aspect())
    }

    /// Model transform of one instance before the part tree is applied.
    pub fn instance_transform(&self, position: Vec3) -> Mat4 {
        Mat4::from_translation(position) * Mat4::from_rotation_y(self.body_angle().to_radians())
    }

    /// Set frame uniforms, advance the spinners and draw all four instances.
    pub fn draw<S: ShaderProgram + ?Sized>(&mut self, shader: &mut S, model: &HierarchicalModel) {
        if !self.is_running() {
            return;
        }
        let params = self.params;
        shader.use_program();
        shader.set_vec3(uniforms::AMBIENT, params.ambient_colour());
        shader.set_float(uniforms::ROUGHNESS, params.roughness);
        shader.set_float(uniforms::SPECULAR_EXPONENT, params.specular_exponent);
        shader.set_float(uniforms::FRESNEL_REFLECTANCE, params.fresnel_reflectance);
        shader.set_vec3(uniforms::LIGHT_COLOUR, params.light_colour);
        shader.set_vec3(uniforms::OBJECT_COLOUR, params.object_colour);
        shader.set_vec3(uniforms::VIEW_POS, self.camera.position);
        shader.set_mat4(uniforms::VIEW, self.view_matrix());
        shader.set_mat4(uniforms::PROJECTION, self.projection_matrix());

        let dt = self.clock.delta();
        self.body_spin.advance(dt);
        let part_angle = self.part_spin.advance(dt);

        let light_offset = params.light_offset_vector();
        for (lighting, position) in self.layout.instances() {
            shader.set_int(uniforms::LIGHTING_ID, lighting.id());
            shader.set_vec3(uniforms::LIGHT_POS, position + light_offset);
            let instance = self.instance_transform(position);
            shader.set_mat4(uniforms::MODEL, instance);
            model.draw_hierarchy(shader, instance, part_angle);
        }
        self.frame_index += 1;
    }

    /// One full iteration: clock, input, then draw if still running.
    pub fn frame<S: ShaderProgram + ?Sized>(
        &mut self,
        now: Duration,
        actions: &[Action],
        shader: &mut S,
        model: &HierarchicalModel,
    ) -> LoopState {
        if self.begin_frame(now, actions) == LoopState::Running {
            self.draw(shader, model);
        }
        self.state
    }
}
