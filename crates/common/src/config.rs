use crate::params::RenderParams;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Errors from loading or validating a demo configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("unknown preset: {0} (expected teapot or airplane)")]
    UnknownPreset(String),
}

/// Built-in scene tunings for the two bundled model kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    #[default]
    Teapot,
    Airplane,
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "teapot" => Ok(Preset::Teapot),
            "airplane" | "plane" => Ok(Preset::Airplane),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }
}

/// Placement and animation of the four model instances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Half the distance between neighbouring instances on each axis.
    pub dist_apart: f32,
    /// Subtracted from every instance position so the model's visual centre
    /// sits on the quadrant point.
    pub model_origin_offset: Vec3,
    pub body_spin_deg_per_sec: f32,
    pub part_spin_deg_per_sec: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            dist_apart: 3.5,
            model_origin_offset: Vec3::new(0.0, 1.5, 0.0),
            body_spin_deg_per_sec: 20.0,
            part_spin_deg_per_sec: 360.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    pub speed: f32,
    pub sensitivity: f32,
    /// Initial field of view in degrees.
    pub zoom: f32,
    pub fps_lock: bool,
    pub fps_height: f32,
    pub zoom_enabled: bool,
    pub mouse_look: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(-2.0, 0.0, 14.0),
            speed: 3.0,
            sensitivity: 0.1,
            zoom: 50.0,
            fps_lock: false,
            fps_height: 0.0,
            zoom_enabled: false,
            mouse_look: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fullscreen: false,
        }
    }
}

/// Complete demo configuration, loadable from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// glTF/GLB model to load. `None` uses the built-in procedural plane.
    pub model: Option<PathBuf>,
    /// Case-insensitive name fragments marking parts that spin independently.
    pub animated_parts: Vec<String>,
    /// Model-space axis the animated parts spin about.
    pub animation_axis: Vec3,
    pub layout: LayoutConfig,
    pub camera: CameraConfig,
    pub params: RenderParams,
    pub window: WindowConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            model: None,
            animated_parts: vec!["propeller".to_string()],
            animation_axis: Vec3::Z,
            layout: LayoutConfig::default(),
            camera: CameraConfig::default(),
            params: RenderParams::default(),
            window: WindowConfig::default(),
        }
    }
}

impl DemoConfig {
    pub fn preset(preset: Preset) -> Self {
        let mut config = Self::default();
        config.apply_preset(preset);
        config
    }

    /// Overwrite the layout and camera start with the preset's tuning.
    pub fn apply_preset(&mut self, preset: Preset) {
        match preset {
            Preset::Teapot => {
                self.layout.dist_apart = 3.5;
                self.layout.model_origin_offset = Vec3::new(0.0, 1.5, 0.0);
                self.camera.position = Vec3::new(-2.0, 0.0, 14.0);
            }
            Preset::Airplane => {
                self.layout.dist_apart = 5.0;
                self.layout.model_origin_offset = Vec3::new(0.0, 0.8, 0.0);
                self.camera.position = Vec3::new(-2.0, 0.0, 18.0);
            }
        }
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validated()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&data)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject values the render loop cannot use and clamp shader parameters
    /// into their panel ranges.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        if !self.layout.dist_apart.is_finite() || self.layout.dist_apart < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "layout.dist_apart must be a non-negative number, got {}",
                self.layout.dist_apart
            )));
        }
        if !self.animation_axis.is_finite() || self.animation_axis.length_squared() == 0.0 {
            return Err(ConfigError::Invalid(
                "animation_axis must be a non-zero vector".into(),
            ));
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        if !self.camera.position.is_finite() {
            return Err(ConfigError::Invalid("camera.position must be finite".into()));
        }
        self.animation_axis = self.animation_axis.normalize();
        self.params = self.params.clamped();
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_teapot_preset() {
        assert_eq!(DemoConfig::default(), DemoConfig::preset(Preset::Teapot));
    }

    #[test]
    fn airplane_preset_spreads_instances_further() {
        let config = DemoConfig::preset(Preset::Airplane);
        assert_eq!(config.layout.dist_apart, 5.0);
        assert_eq!(config.layout.model_origin_offset, Vec3::new(0.0, 0.8, 0.0));
        assert_eq!(config.camera.position.z, 18.0);
    }

    #[test]
    fn preset_parses_case_insensitively() {
        assert_eq!("Airplane".parse::<Preset>().unwrap(), Preset::Airplane);
        assert_eq!("teapot".parse::<Preset>().unwrap(), Preset::Teapot);
        assert!("cube".parse::<Preset>().is_err());
    }

    #[test]
    fn partial_yaml_fills_defaults_and_clamps_params() {
        let yaml = r#"
layout:
  dist_apart: 6.0
camera:
  zoom_enabled: true
params:
  specular_exponent: 1000.0
"#;
        let config = DemoConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.layout.dist_apart, 6.0);
        assert_eq!(config.layout.body_spin_deg_per_sec, 20.0);
        assert!(config.camera.zoom_enabled);
        assert_eq!(config.camera.speed, 3.0);
        assert_eq!(config.params.specular_exponent, 128.0);
        assert_eq!(config.animated_parts, vec!["propeller".to_string()]);
    }

    #[test]
    fn zero_window_is_rejected() {
        let yaml = "window:\n  width: 0\n";
        let err = DemoConfig::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn yaml_round_trip_preserves_config() {
        let config = DemoConfig::preset(Preset::Airplane);
        let yaml = config.to_yaml().unwrap();
        assert_eq!(DemoConfig::from_yaml_str(&yaml).unwrap(), config);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.yaml");
        std::fs::write(&path, "model: models/teapot.glb\n").unwrap();
        let config = DemoConfig::load(&path).unwrap();
        assert_eq!(config.model, Some(PathBuf::from("models/teapot.glb")));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = DemoConfig::load("/nonexistent/shadebench.yaml").unwrap_err();
        assert!(err.to_string().contains("shadebench.yaml"));
    }
}
