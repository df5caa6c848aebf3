use glam::{Mat4, Vec3};
use serde::Serialize;
use shadebench_common::{LightingModel, MeshId};

/// Uniform names shared by the render loop and every backend.
pub mod uniforms {
    pub const MODEL: &str = "model";
    pub const VIEW: &str = "view";
    pub const PROJECTION: &str = "projection";
    pub const VIEW_POS: &str = "viewPos";
    pub const LIGHTING_ID: &str = "lightingID";
    pub const LIGHT_POS: &str = "lightPos";
    pub const AMBIENT: &str = "ambient";
    pub const ROUGHNESS: &str = "roughness";
    pub const SPECULAR_EXPONENT: &str = "specularExponent";
    pub const FRESNEL_REFLECTANCE: &str = "fresnelReflectance";
    pub const LIGHT_COLOUR: &str = "lightColour";
    pub const OBJECT_COLOUR: &str = "objectColour";
}

/// A bound shader program that accepts named uniforms and mesh draws.
///
/// Setting a uniform the program does not declare is silently ignored, the
/// same way a GPU driver drops writes to an unknown uniform location.
pub trait ShaderProgram {
    fn use_program(&mut self);
    fn set_float(&mut self, name: &str, value: f32);
    fn set_int(&mut self, name: &str, value: i32);
    fn set_vec3(&mut self, name: &str, value: Vec3);
    fn set_mat4(&mut self, name: &str, value: Mat4);
    /// Draw a mesh with the uniform values currently set.
    fn draw_mesh(&mut self, mesh: MeshId);
}

/// Uniforms shared by every draw in a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameUniforms {
    pub view: Mat4,
    pub projection: Mat4,
    pub view_pos: Vec3,
    pub ambient: Vec3,
    pub light_colour: Vec3,
    pub object_colour: Vec3,
    pub roughness: f32,
    pub specular_exponent: f32,
    pub fresnel_reflectance: f32,
}

impl Default for FrameUniforms {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            view_pos: Vec3::ZERO,
            ambient: Vec3::ZERO,
            light_colour: Vec3::ONE,
            object_colour: Vec3::ONE,
            roughness: 0.5,
            specular_exponent: 32.0,
            fresnel_reflectance: 0.04,
        }
    }
}

/// One mesh draw with the per-draw uniforms captured at submission time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DrawCommand {
    pub mesh: MeshId,
    pub model: Mat4,
    pub lighting_id: i32,
    pub light_pos: Vec3,
}

impl DrawCommand {
    pub fn lighting_model(&self) -> Option<LightingModel> {
        LightingModel::from_id(self.lighting_id)
    }
}

/// Everything a backend needs to render one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecordedFrame {
    pub uniforms: FrameUniforms,
    pub draws: Vec<DrawCommand>,
}

/// [`ShaderProgram`] that records uniform writes and draws into a
/// [`RecordedFrame`] for a backend to replay.
///
/// Frame-wide uniforms keep their last written value. `model`, `lightingID`
/// and `lightPos` are latched into each [`DrawCommand`] when it is issued.
#[derive(Debug, Default)]
pub struct FrameRecorder {
    active: bool,
    frame: RecordedFrame,
    model: Mat4,
    lighting_id: i32,
    light_pos: Vec3,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self {
            model: Mat4::IDENTITY,
            ..Self::default()
        }
    }

    pub fn draw_count(&self) -> usize {
        self.frame.draws.len()
    }

    /// Hand out the recorded frame and reset for the next one.
    pub fn finish(&mut self) -> RecordedFrame {
        self.active = false;
        self.model = Mat4::IDENTITY;
        std::mem::take(&mut self.frame)
    }

    fn accepts(&self, name: &str) -> bool {
        if !self.active {
            tracing::trace!(name, "uniform write before use_program ignored");
        }
        self.active
    }
}

impl ShaderProgram for FrameRecorder {
    fn use_program(&mut self) {
        self.active = true;
    }

    fn set_float(&mut self, name: &str, value: f32) {
        if !self.accepts(name) {
            return;
        }
        let u = &mut self.frame.uniforms;
        match name {
            uniforms::ROUGHNESS => u.roughness = value,
            uniforms::SPECULAR_EXPONENT => u.specular_exponent = value,
            uniforms::FRESNEL_REFLECTANCE => u.fresnel_reflectance = value,
            _ => tracing::trace!(name, "unknown float uniform"),
        }
    }

    fn set_int(&mut self, name: &str, value: i32) {
        if !self.accepts(name) {
            return;
        }
        match name {
            uniforms::LIGHTING_ID => self.lighting_id = value,
            _ => tracing::trace!(name, "unknown int uniform"),
        }
    }

    fn set_vec3(&mut self, name: &str, value: Vec3) {
        if !self.accepts(name) {
            return;
        }
        let u = &mut self.frame.uniforms;
        match name {
            uniforms::LIGHT_POS => self.light_pos = value,
            uniforms::VIEW_POS => u.view_pos = value,
            uniforms::AMBIENT => u.ambient = value,
            uniforms::LIGHT_COLOUR => u.light_colour = value,
            uniforms::OBJECT_COLOUR => u.object_colour = value,
            _ => tracing::trace!(name, "unknown vec3 uniform"),
        }
    }

    fn set_mat4(&mut self, name: &str, value: Mat4) {
        if !self.accepts(name) {
            return;
        }
        match name {
            uniforms::MODEL => self.model = value,
            uniforms::VIEW => self.frame.uniforms.view = value,
            uniforms::PROJECTION => self.frame.uniforms.projection = value,
            _ => tracing::trace!(name, "unknown mat4 uniform"),
        }
    }

    fn draw_mesh(&mut self, mesh: MeshId) {
        if !self.active {
            tracing::trace!(mesh = mesh.0, "draw before use_program ignored");
            return;
        }
        self.frame.draws.push(DrawCommand {
            mesh,
            model: self.model,
            lighting_id: self.lighting_id,
            light_pos: self.light_pos,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_capture_current_per_draw_uniforms() {
        let mut rec = FrameRecorder::new();
        rec.use_program();
        rec.set_int(uniforms::LIGHTING_ID, 2);
        rec.set_vec3(uniforms::LIGHT_POS, Vec3::new(1.0, 2.0, 3.0));
        rec.set_mat4(uniforms::MODEL, Mat4::from_translation(Vec3::X));
        rec.draw_mesh(MeshId(0));
        rec.set_mat4(uniforms::MODEL, Mat4::from_translation(Vec3::Y));
        rec.draw_mesh(MeshId(1));

        let frame = rec.finish();
        assert_eq!(frame.draws.len(), 2);
        assert_eq!(frame.draws[0].model, Mat4::from_translation(Vec3::X));
        assert_eq!(frame.draws[1].model, Mat4::from_translation(Vec3::Y));
        assert_eq!(frame.draws[1].mesh, MeshId(1));
        assert_eq!(
            frame.draws[0].lighting_model(),
            Some(LightingModel::CookTorrance)
        );
        assert_eq!(frame.draws[1].light_pos, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn frame_uniforms_keep_last_value() {
        let mut rec = FrameRecorder::new();
        rec.use_program();
        rec.set_float(uniforms::ROUGHNESS, 0.3);
        rec.set_float(uniforms::ROUGHNESS, 0.7);
        rec.set_vec3(uniforms::AMBIENT, Vec3::splat(0.2));
        let frame = rec.finish();
        assert_eq!(frame.uniforms.roughness, 0.7);
        assert_eq!(frame.uniforms.ambient, Vec3::splat(0.2));
    }

    #[test]
    fn unknown_names_and_type_mismatches_are_ignored() {
        let mut rec = FrameRecorder::new();
        rec.use_program();
        rec.set_float("doesNotExist", 1.0);
        rec.set_float(uniforms::MODEL, 1.0);
        rec.set_int(uniforms::ROUGHNESS, 9);
        rec.set_mat4("lightPos", Mat4::ZERO);
        let frame = rec.finish();
        assert_eq!(frame.uniforms, FrameUniforms::default());
        assert!(frame.draws.is_empty());
    }

    #[test]
    fn writes_before_use_are_dropped() {
        let mut rec = FrameRecorder::new();
        rec.set_float(uniforms::ROUGHNESS, 0.9);
        rec.draw_mesh(MeshId(0));
        assert_eq!(rec.draw_count(), 0);
        rec.use_program();
        rec.draw_mesh(MeshId(0));
        let frame = rec.finish();
        assert_eq!(frame.draws.len(), 1);
        assert_eq!(frame.uniforms.roughness, FrameUniforms::default().roughness);
    }

    #[test]
    fn finish_resets_for_next_frame() {
        let mut rec = FrameRecorder::new();
        rec.use_program();
        rec.draw_mesh(MeshId(3));
        assert_eq!(rec.finish().draws.len(), 1);
        assert_eq!(rec.draw_count(), 0);
    }
}
