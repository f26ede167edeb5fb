//! Random sampling helpers shared by materials, primitives and the camera.

use halo_math::Vec3;
use rand::{Rng, RngCore};
use std::f32::consts::PI;

/// Uniform float in `[0, 1)`.
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Uniform direction on the hemisphere around `normal`.
///
/// `normal` must be unit length. The pdf with respect to solid angle is
/// `1 / (2 pi)`.
pub fn uniform_hemisphere(normal: Vec3, rng: &mut dyn RngCore) -> Vec3 {
    let z = gen_f32(rng);
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * PI * gen_f32(rng);
    let local = Vec3::new(r * phi.cos(), r * phi.sin(), z);
    to_world(local, normal)
}

/// Uniform direction on the unit sphere.
pub fn uniform_sphere(rng: &mut dyn RngCore) -> Vec3 {
    let z = 1.0 - 2.0 * gen_f32(rng);
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * PI * gen_f32(rng);
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

/// Sample a random point in the square [-0.5, 0.5] x [-0.5, 0.5].
pub fn sample_square(rng: &mut dyn RngCore) -> (f32, f32) {
    (gen_f32(rng) - 0.5, gen_f32(rng) - 0.5)
}

/// Rotate a vector given in a local frame with +Z up into the frame whose
/// up axis is `normal`.
fn to_world(local: Vec3, normal: Vec3) -> Vec3 {
    let (tangent, bitangent) = normal.any_orthonormal_pair();
    tangent * local.x + bitangent * local.y + normal * local.z
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_hemisphere_stays_above_normal() {
        let mut rng = StdRng::seed_from_u64(7);
        let normal = Vec3::new(1.0, 2.0, -0.5).normalize();

        for _ in 0..1000 {
            let d = uniform_hemisphere(normal, &mut rng);
            assert!((d.length() - 1.0).abs() < 1e-4);
            assert!(d.dot(normal) >= -1e-6);
        }
    }

    #[test]
    fn test_hemisphere_mean_cosine() {
        // E[cos theta] over the uniform hemisphere is 1/2
        let mut rng = StdRng::seed_from_u64(11);
        let n = 20_000;
        let sum: f32 = (0..n)
            .map(|_| uniform_hemisphere(Vec3::Y, &mut rng).y)
            .sum();
        assert!((sum / n as f32 - 0.5).abs() < 0.02);
    }

    #[test]
    fn test_sphere_is_unit_and_centered() {
        let mut rng = StdRng::seed_from_u64(3);
        let n = 20_000;
        let mut mean = Vec3::ZERO;
        for _ in 0..n {
            let d = uniform_sphere(&mut rng);
            assert!((d.length() - 1.0).abs() < 1e-4);
            mean += d;
        }
        assert!((mean / n as f32).length() < 0.03);
    }
}
