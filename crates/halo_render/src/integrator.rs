//! Recursive radiance estimator.
//!
//! At each hit the outgoing radiance is the sum of a direct term, from one
//! explicitly sampled light point, and an indirect term, from one sampled
//! bounce continued with Russian roulette.

use crate::config::TraceSettings;
use crate::primitive::Intersection;
use crate::sampling::gen_f32;
use crate::{Color, Scene};
use halo_math::{Interval, Ray, Vec3};
use rand::RngCore;

/// Radiance arriving at the ray origin along `ray`.
///
/// `depth` counts bounces taken so far; camera rays start at 0. A miss sees a
/// black background. The result is non-negative on every channel.
pub fn cast_ray(
    ray: &Ray,
    scene: &Scene,
    depth: u32,
    settings: &TraceSettings,
    rng: &mut dyn RngCore,
) -> Color {
    let hit = scene.intersect(ray, Interval::from_min(settings.ray_t_min));
    if !hit.happened {
        return Color::ZERO;
    }

    let wo = -ray.direction().normalize();
    sanitize(shade(&hit, wo, scene, depth, settings, rng))
}

/// Outgoing radiance at `hit` toward `wo` (unit, pointing away from the
/// surface).
fn shade(
    hit: &Intersection<'_>,
    wo: Vec3,
    scene: &Scene,
    depth: u32,
    settings: &TraceSettings,
    rng: &mut dyn RngCore,
) -> Color {
    // Rays that land on a light see its radiance, not its shading
    if hit.is_emissive() {
        return hit.emission;
    }

    let direct = direct_light(hit, wo, scene, settings, rng);

    if settings.direct_only {
        return direct;
    }
    direct + indirect_light(hit, wo, scene, depth, settings, rng)
}

/// Next-event estimation: one shadow ray toward one sampled light point.
fn direct_light(
    hit: &Intersection<'_>,
    wo: Vec3,
    scene: &Scene,
    settings: &TraceSettings,
    rng: &mut dyn RngCore,
) -> Color {
    let Some(material) = hit.material else {
        return Color::ZERO;
    };
    let Some(light) = scene.sample_light(rng) else {
        return Color::ZERO;
    };

    let to_light = light.point - hit.point;
    let dist2 = to_light.length_squared();
    if !(dist2 > 0.0) {
        return Color::ZERO;
    }
    let ws = to_light / dist2.sqrt();

    let cos_surface = hit.normal.dot(ws);
    let cos_light = light.normal.dot(-ws);
    if cos_surface <= 0.0 || cos_light <= 0.0 {
        return Color::ZERO;
    }

    // Unoccluded only if the shadow ray ends at the sampled point itself
    let shadow = scene.intersect(
        &Ray::new(hit.point, ws),
        Interval::from_min(settings.ray_t_min),
    );
    if !shadow.happened || (shadow.point - light.point).length() >= settings.shadow_epsilon {
        return Color::ZERO;
    }

    light.emission * material.eval(wo, ws, hit.normal) * cos_surface * cos_light
        / dist2
        / light.pdf
}

/// One material-sampled bounce, kept with the continuation probability and
/// reweighted by its inverse.
fn indirect_light(
    hit: &Intersection<'_>,
    wo: Vec3,
    scene: &Scene,
    depth: u32,
    settings: &TraceSettings,
    rng: &mut dyn RngCore,
) -> Color {
    let Some(material) = hit.material else {
        return Color::ZERO;
    };
    // Russian roulette terminates almost surely; the ceiling bounds the
    // worst case stack depth
    if depth + 1 >= settings.max_depth {
        return Color::ZERO;
    }
    if gen_f32(rng) >= settings.russian_roulette {
        return Color::ZERO;
    }

    let wi = material.sample(wo, hit.normal, rng);
    let cos_surface = wi.dot(hit.normal);
    if cos_surface <= 0.0 {
        return Color::ZERO;
    }

    let next = scene.intersect(
        &Ray::new(hit.point, wi),
        Interval::from_min(settings.ray_t_min),
    );
    // Lights are already counted by the direct term
    if !next.happened || next.is_emissive() {
        return Color::ZERO;
    }

    let incoming = shade(&next, -wi, scene, depth + 1, settings, rng);
    let pdf = material.pdf(wo, wi, hit.normal).max(settings.pdf_epsilon);
    incoming * material.eval(wo, wi, hit.normal) * cos_surface / pdf / settings.russian_roulette
}

/// Clamp away negative or non-finite channels.
#[inline]
fn sanitize(color: Color) -> Color {
    if color.is_finite() {
        color.max(Color::ZERO)
    } else {
        Color::ZERO
    }
}
