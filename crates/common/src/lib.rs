//! Shared types for the shadebench demo: lighting model ids, movement
//! commands, mesh data, shader parameters and the YAML demo configuration.

pub mod config;
pub mod params;
pub mod types;

pub use config::{CameraConfig, ConfigError, DemoConfig, LayoutConfig, Preset, WindowConfig};
pub use params::RenderParams;
pub use types::{CameraMovement, LightingModel, MeshData, MeshId};

pub fn crate_info() -> &'static str {
    "shadebench-common v0.1.0"
}
