use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const SPECULAR_EXPONENT_RANGE: RangeInclusive<f32> = 2.0..=128.0;
pub const ROUGHNESS_RANGE: RangeInclusive<f32> = 0.01..=1.0;
pub const FRESNEL_RANGE: RangeInclusive<f32> = 0.01..=1.0;
pub const AMBIENT_RANGE: RangeInclusive<f32> = 0.01..=1.0;
pub const LIGHT_OFFSET_RANGE: RangeInclusive<f32> = 1.0..=10.0;

/// User-tunable shading parameters, edited live by the control panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderParams {
    pub roughness: f32,
    pub specular_exponent: f32,
    pub fresnel_reflectance: f32,
    /// Ambient intensity, applied equally to all channels.
    pub ambient: f32,
    /// Light distance from each instance, applied equally along every axis.
    pub light_offset: f32,
    pub light_colour: Vec3,
    pub object_colour: Vec3,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            roughness: 0.25,
            specular_exponent: 32.0,
            fresnel_reflectance: 0.1,
            ambient: 0.1,
            light_offset: 2.0,
            light_colour: Vec3::ONE,
            object_colour: Vec3::new(0.3, 0.6, 0.8),
        }
    }
}

impl RenderParams {
    pub fn ambient_colour(&self) -> Vec3 {
        Vec3::splat(self.ambient)
    }

    pub fn light_offset_vector(&self) -> Vec3 {
        Vec3::splat(self.light_offset)
    }

    /// Pull every scalar back into the range the control panel allows.
    pub fn clamped(self) -> Self {
        Self {
            roughness: clamp_to(self.roughness, &ROUGHNESS_RANGE),
            specular_exponent: clamp_to(self.specular_exponent, &SPECULAR_EXPONENT_RANGE),
            fresnel_reflectance: clamp_to(self.fresnel_reflectance, &FRESNEL_RANGE),
            ambient: clamp_to(self.ambient, &AMBIENT_RANGE),
            light_offset: clamp_to(self.light_offset, &LIGHT_OFFSET_RANGE),
            light_colour: self.light_colour.clamp(Vec3::ZERO, Vec3::ONE),
            object_colour: self.object_colour.clamp(Vec3::ZERO, Vec3::ONE),
        }
    }
}

fn clamp_to(value: f32, range: &RangeInclusive<f32>) -> f32 {
    if value.is_nan() {
        return *range.start();
    }
    value.clamp(*range.start(), *range.end())
}
