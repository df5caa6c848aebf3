//! Backend-agnostic render core.
//!
//! Owns the camera, the hierarchical model traversal and the per-frame
//! orchestration that draws the same model four times under four lighting
//! models. GPU work goes through the [`ShaderProgram`] seam; the wgpu backend
//! replays what a [`FrameRecorder`] captured.
//!
//! # Invariants
//! - Camera basis vectors stay orthonormal.
//! - Spinner angles stay in `[0, 360)`.
//! - A part's world transform is `parent × offset × animated rotation`.

pub mod camera;
pub mod frame;
pub mod hierarchy;
pub mod shader;

pub use camera::Camera;
pub use frame::{
    CLEAR_COLOR, FrameClock, InstanceLayout, LoopState, RenderLoop, Spinner, Viewport,
};
pub use hierarchy::{HierarchicalModel, Part, PartAnimation};
pub use shader::{DrawCommand, FrameRecorder, FrameUniforms, RecordedFrame, ShaderProgram};

pub fn crate_info() -> &'static str {
    "shadebench-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
