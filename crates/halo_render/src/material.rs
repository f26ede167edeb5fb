//! Material trait for surface scattering.
//!
//! Every material answers the same four questions: how much light is
//! reflected between two directions (`eval`), how to pick a new direction
//! (`sample`), the density of that choice (`pdf`), and what it emits.

use crate::sampling::uniform_hemisphere;
use halo_math::Vec3;
use rand::RngCore;
use std::f32::consts::{FRAC_1_PI, PI};

/// Color type alias (linear RGB radiance or reflectance)
pub type Color = Vec3;

/// Trait for materials that describe how light interacts with surfaces.
///
/// Directions follow the usual convention: `wo` points from the surface
/// toward the viewer, `wi` from the surface toward the incoming light, and
/// `normal` is a unit vector on the same side as `wo`.
pub trait Material: Send + Sync {
    /// BRDF value for light arriving along `wi` and leaving along `wo`.
    fn eval(&self, wo: Vec3, wi: Vec3, normal: Vec3) -> Color;

    /// Pick an incoming direction for the next bounce.
    fn sample(&self, wo: Vec3, normal: Vec3, rng: &mut dyn RngCore) -> Vec3;

    /// Solid-angle density of `sample` returning `wi`.
    fn pdf(&self, wo: Vec3, wi: Vec3, normal: Vec3) -> f32;

    /// Radiance emitted by the surface.
    ///
    /// Most materials return black (no emission).
    fn emission(&self) -> Color {
        Color::ZERO
    }

    /// Whether the surface is a light source.
    fn has_emission(&self) -> bool {
        self.emission().max_element() > 0.0
    }
}

/// Lambertian (diffuse) material.
#[derive(Debug, Clone)]
pub struct Lambertian {
    albedo: Color,
}

impl Lambertian {
    /// Create a new Lambertian material with the given albedo color.
    pub const fn new(albedo: Color) -> Self {
        Self { albedo }
    }
}

impl Material for Lambertian {
    fn eval(&self, _wo: Vec3, wi: Vec3, normal: Vec3) -> Color {
        if wi.dot(normal) > 0.0 {
            self.albedo * FRAC_1_PI
        } else {
            Color::ZERO
        }
    }

    fn sample(&self, _wo: Vec3, normal: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        uniform_hemisphere(normal, rng)
    }

    fn pdf(&self, _wo: Vec3, wi: Vec3, normal: Vec3) -> f32 {
        if wi.dot(normal) > 0.0 {
            0.5 / PI
        } else {
            0.0
        }
    }
}

/// Diffuse light emitter.
///
/// Emits `emit` uniformly from the front side of its surface. The path
/// tracer never shades a light, but the scattering methods still describe a
/// diffuse reflector so the material is usable on its own.
#[derive(Debug, Clone)]
pub struct DiffuseLight {
    emit: Color,
    albedo: Color,
}

impl DiffuseLight {
    /// Create a new diffuse light with the given emission color.
    pub fn new(emit: Color) -> Self {
        Self {
            emit,
            albedo: Color::splat(0.65),
        }
    }

    /// Set the reflectance of the light's surface.
    pub fn with_albedo(mut self, albedo: Color) -> Self {
        self.albedo = albedo;
        self
    }
}

impl Material for DiffuseLight {
    fn eval(&self, _wo: Vec3, wi: Vec3, normal: Vec3) -> Color {
        if wi.dot(normal) > 0.0 {
            self.albedo * FRAC_1_PI
        } else {
            Color::ZERO
        }
    }

    fn sample(&self, _wo: Vec3, normal: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        uniform_hemisphere(normal, rng)
    }

    fn pdf(&self, _wo: Vec3, wi: Vec3, normal: Vec3) -> f32 {
        if wi.dot(normal) > 0.0 {
            0.5 / PI
        } else {
            0.0
        }
    }

    fn emission(&self) -> Color {
        self.emit
    }
}
