//! Pinhole camera for primary ray generation.

use crate::config::RenderConfig;
use crate::sampling::sample_square;
use halo_math::{Ray, Vec3};
use rand::RngCore;

/// Fixed pinhole looking down +Z with +Y up.
///
/// Screen x grows to the left of the image, so the image is mirrored to
/// match a right-handed scene viewed from negative z.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    eye: Vec3,
    width: u32,
    height: u32,
    /// tan(fov / 2)
    scale: f32,
    aspect: f32,
    jitter: bool,
}

impl Camera {
    /// Create a camera for a `width` x `height` image with a vertical field
    /// of view of `fov` degrees.
    pub fn new(eye: Vec3, fov: f32, width: u32, height: u32) -> Self {
        Self {
            eye,
            width,
            height,
            scale: (0.5 * fov).to_radians().tan(),
            aspect: width as f32 / height.max(1) as f32,
            jitter: false,
        }
    }

    /// Camera described by a render config.
    pub fn from_config(config: &RenderConfig) -> Self {
        Self::new(config.eye, config.fov, config.width, config.height).with_jitter(config.jitter)
    }

    /// Spread samples over the pixel footprint instead of its center.
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Primary ray through pixel column `i`, row `j` (row 0 at the top).
    pub fn get_ray(&self, i: u32, j: u32, rng: &mut dyn RngCore) -> Ray {
        let (dx, dy) = if self.jitter {
            sample_square(rng)
        } else {
            (0.0, 0.0)
        };

        let u = (i as f32 + 0.5 + dx) / self.width as f32;
        let v = (j as f32 + 0.5 + dy) / self.height as f32;
        let x = (2.0 * u - 1.0) * self.aspect * self.scale;
        let y = (1.0 - 2.0 * v) * self.scale;

        Ray::new(self.eye, Vec3::new(-x, y, 1.0).normalize())
    }
}
