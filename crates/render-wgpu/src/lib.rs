//! wgpu render backend for the shadebench demo.
//!
//! Uploads model meshes once and replays each frame recorded by the render
//! core: one globals uniform buffer, one instance record per draw.
//!
//! # Invariants
//! - The renderer never mutates the model or the render loop.
//! - Draws are submitted in recorded order.

mod context;
mod gpu;
mod shaders;

pub use context::{GpuContext, GpuError};
pub use gpu::{DEPTH_FORMAT, WgpuRenderer};
pub use shaders::LIGHTING_SHADER;
