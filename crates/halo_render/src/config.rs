//! Render configuration.
//!
//! Every field has a default, so a JSON config file only needs to name the
//! settings it changes.

use crate::bvh::BvhConfig;
use crate::error::ConfigError;
use halo_math::Vec3;
use serde::{Deserialize, Serialize};

/// Largest accepted bounce ceiling, bounding recursion depth.
pub const MAX_DEPTH_LIMIT: u32 = 1024;

/// Settings for one render run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Pinhole position; the camera looks down +Z
    pub eye: Vec3,
    /// Samples per pixel
    pub samples_per_pixel: u32,
    /// Worker threads, each rendering one contiguous band of rows
    pub threads: usize,
    /// Seed for the per-row random streams
    pub seed: u64,
    /// Jitter primary rays inside the pixel footprint
    pub jitter: bool,
    #[serde(flatten)]
    pub trace: TraceSettings,
    pub bvh: BvhConfig,
    /// Exponent applied to each clamped channel on output
    pub gamma: f32,
}

/// Settings consumed by the path integrator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceSettings {
    /// Probability of continuing a path at each bounce
    pub russian_roulette: f32,
    /// Hard ceiling on bounce depth; deeper bounces contribute nothing
    pub max_depth: u32,
    /// Shadow rays count as unoccluded when they stop within this distance
    /// of the sampled light point
    pub shadow_epsilon: f32,
    /// Smallest ray parameter accepted as a hit, to step off the surface
    pub ray_t_min: f32,
    /// Floor on the material pdf in the indirect term
    pub pdf_epsilon: f32,
    /// Skip the indirect term (direct lighting only)
    pub direct_only: bool,
}

impl Default for TraceSettings {
    fn default() -> Self {
        Self {
            russian_roulette: 0.8,
            max_depth: 64,
            shadow_epsilon: 1e-2,
            ray_t_min: 1e-3,
            pdf_epsilon: 1e-4,
            direct_only: false,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 784,
            height: 784,
            fov: 40.0,
            eye: Vec3::new(278.0, 273.0, -800.0),
            samples_per_pixel: 16,
            threads: default_threads(),
            seed: 0,
            jitter: false,
            trace: TraceSettings::default(),
            bvh: BvhConfig::default(),
            gamma: 0.6,
        }
    }
}

/// One thread per available core.
fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl RenderConfig {
    /// Check the settings before any work starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyImage {
                width: self.width,
                height: self.height,
            });
        }
        if self.samples_per_pixel == 0 {
            return Err(ConfigError::NoSamples);
        }
        if self.threads == 0 {
            return Err(ConfigError::NoThreads);
        }
        if !(self.fov > 0.0 && self.fov < 180.0) {
            return Err(ConfigError::FieldOfView(self.fov));
        }
        let depth = self.trace.max_depth;
        if !(1..=MAX_DEPTH_LIMIT).contains(&depth) {
            return Err(ConfigError::MaxDepth {
                depth,
                limit: MAX_DEPTH_LIMIT,
            });
        }
        let rr = self.trace.russian_roulette;
        if !(rr > 0.0 && rr <= 1.0) {
            return Err(ConfigError::RussianRoulette(rr));
        }
        if !(self.gamma > 0.0) {
            return Err(ConfigError::Invalid(format!("gamma must be positive, got {}", self.gamma)));
        }
        if !(self.trace.shadow_epsilon > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "shadow_epsilon must be positive, got {}",
                self.trace.shadow_epsilon
            )));
        }
        if !(self.trace.ray_t_min >= 0.0) || !(self.trace.pdf_epsilon > 0.0) {
            return Err(ConfigError::Invalid(
                "ray_t_min must be non-negative and pdf_epsilon positive".to_string(),
            ));
        }
        if !self.eye.is_finite() {
            return Err(ConfigError::Invalid("eye position must be finite".to_string()));
        }
        Ok(())
    }

    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set sample count and worker threads.
    pub fn with_quality(mut self, samples_per_pixel: u32, threads: usize) -> Self {
        self.samples_per_pixel = samples_per_pixel;
        self.threads = threads;
        self
    }

    /// Set the pinhole camera.
    pub fn with_camera(mut self, eye: Vec3, fov: f32) -> Self {
        self.eye = eye;
        self.fov = fov;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bvh::SplitMethod;

    #[test]
    fn test_defaults_validate() {
        let config = RenderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.samples_per_pixel, 16);
        assert_eq!(config.trace.russian_roulette, 0.8);
        assert!(config.threads >= 1);
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let base = RenderConfig::default();

        let c = base.clone().with_resolution(0, 10);
        assert_eq!(c.validate(), Err(ConfigError::EmptyImage { width: 0, height: 10 }));

        let c = base.clone().with_quality(0, 4);
        assert_eq!(c.validate(), Err(ConfigError::NoSamples));

        let c = base.clone().with_quality(4, 0);
        assert_eq!(c.validate(), Err(ConfigError::NoThreads));

        let mut c = base.clone();
        c.trace.russian_roulette = 0.0;
        assert_eq!(c.validate(), Err(ConfigError::RussianRoulette(0.0)));
        c.trace.russian_roulette = 1.5;
        assert!(c.validate().is_err());

        let mut c = base.clone();
        c.trace.max_depth = 0;
        assert_eq!(
            c.validate(),
            Err(ConfigError::MaxDepth { depth: 0, limit: MAX_DEPTH_LIMIT })
        );
        c.trace.max_depth = u32::MAX;
        assert!(matches!(c.validate(), Err(ConfigError::MaxDepth { .. })));
        c.trace.max_depth = MAX_DEPTH_LIMIT;
        assert!(c.validate().is_ok());

        let c = base.clone().with_camera(Vec3::ZERO, 180.0);
        assert_eq!(c.validate(), Err(ConfigError::FieldOfView(180.0)));

        let mut c = base;
        c.gamma = 0.0;
        assert!(matches!(c.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "width": 64,
            "height": 32,
            "samples_per_pixel": 4,
            "russian_roulette": 0.5,
            "bvh": { "split": "sah" }
        }"#;
        let config: RenderConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.width, 64);
        assert_eq!(config.height, 32);
        assert_eq!(config.samples_per_pixel, 4);
        assert_eq!(config.trace.russian_roulette, 0.5);
        assert_eq!(config.trace.max_depth, 64);
        assert_eq!(config.bvh.split, SplitMethod::Sah);
        assert_eq!(config.bvh.max_prims_in_node, 1);
        assert_eq!(config.gamma, 0.6);
        assert!(config.validate().is_ok());
    }
}
