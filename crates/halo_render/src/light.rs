//! Area-weighted sampling of emissive primitives for next-event estimation.

use crate::primitive::Primitive;
use crate::sampling::gen_f32;
use crate::Color;
use halo_math::Vec3;
use rand::RngCore;
use std::sync::Arc;

/// A point on a light, with everything the direct-lighting term needs.
#[derive(Debug, Clone, Copy)]
pub struct LightSample {
    pub point: Vec3,
    /// Outward geometric normal of the light at `point`
    pub normal: Vec3,
    pub emission: Color,
    /// Density with respect to area over all lights combined
    pub pdf: f32,
}

/// The emissive subset of a scene.
#[derive(Default, Clone)]
pub struct LightSampler {
    lights: Vec<Arc<dyn Primitive>>,
    total_area: f32,
}

impl LightSampler {
    /// Collect the emitters among `primitives`.
    pub fn new(primitives: &[Arc<dyn Primitive>]) -> Self {
        let lights: Vec<_> = primitives
            .iter()
            .filter(|p| p.has_emission())
            .cloned()
            .collect();
        let total_area = lights.iter().map(|l| l.area()).sum();
        Self { lights, total_area }
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    /// Summed surface area of all emitters.
    pub fn total_area(&self) -> f32 {
        self.total_area
    }

    /// Pick an emitter with probability proportional to its area, then a
    /// uniform point on it.
    ///
    /// Returns `None` when the scene has no lights.
    pub fn sample(&self, rng: &mut dyn RngCore) -> Option<LightSample> {
        if self.lights.is_empty() || !(self.total_area > 0.0) {
            return None;
        }

        let target = gen_f32(rng) * self.total_area;
        let mut running = 0.0;
        // Rounding in the running sum can leave `target` just past the last
        // light; fall back to that light
        let mut chosen = self.lights.len() - 1;
        for (i, light) in self.lights.iter().enumerate() {
            running += light.area();
            if target <= running {
                chosen = i;
                break;
            }
        }

        let light = &self.lights[chosen];
        let surface = light.sample(rng);
        // (area / total) picks the light, surface.pdf picks the point
        let pdf = surface.pdf * light.area() / self.total_area;

        Some(LightSample {
            point: surface.point,
            normal: surface.normal,
            emission: light.material().emission(),
            pdf,
        })
    }
}
