//! A renderable scene: primitives, their BVH and the light list.

use crate::bvh::{Bvh, BvhConfig};
use crate::error::SceneError;
use crate::light::{LightSample, LightSampler};
use crate::primitive::{Intersection, Primitive};
use halo_math::{Interval, Ray};
use log::info;
use rand::RngCore;
use std::sync::Arc;

/// Immutable scene shared by every render thread.
pub struct Scene {
    primitives: Vec<Arc<dyn Primitive>>,
    bvh: Bvh,
    lights: LightSampler,
}

impl Scene {
    /// Validate `primitives` and build the acceleration structure.
    ///
    /// Malformed input is rejected here, before any tree is built.
    pub fn new(primitives: Vec<Arc<dyn Primitive>>, config: BvhConfig) -> Result<Self, SceneError> {
        for (index, primitive) in primitives.iter().enumerate() {
            if !primitive.bounding_box().is_finite() {
                return Err(SceneError::NonFiniteBounds { index });
            }
            if primitive.has_emission() {
                let area = primitive.area();
                if !(area > 0.0) {
                    return Err(SceneError::DegenerateLight { index, area });
                }
            }
        }

        let bvh = Bvh::build(&primitives, config);
        let lights = LightSampler::new(&primitives);
        info!(
            "Scene ready: {} primitives, {} emitters (area {:.3})",
            primitives.len(),
            lights.len(),
            lights.total_area()
        );

        Ok(Self {
            primitives,
            bvh,
            lights,
        })
    }

    /// A scene with nothing in it; every ray misses.
    pub fn empty() -> Self {
        Self {
            primitives: Vec::new(),
            bvh: Bvh::build(&[], BvhConfig::default()),
            lights: LightSampler::default(),
        }
    }

    /// Nearest hit along the ray.
    pub fn intersect(&self, ray: &Ray, ray_t: Interval) -> Intersection<'_> {
        self.bvh.intersect(ray, ray_t)
    }

    /// Area-weighted point on an emitter, or `None` without lights.
    pub fn sample_light(&self, rng: &mut dyn RngCore) -> Option<LightSample> {
        self.lights.sample(rng)
    }

    pub fn primitives(&self) -> &[Arc<dyn Primitive>] {
        &self.primitives
    }

    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    pub fn lights(&self) -> &LightSampler {
        &self.lights
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Bounds3, Color, DiffuseLight, Lambertian, Material, Sphere, SurfaceSample};
    use halo_math::Vec3;

    /// A primitive with a broken box, as a buggy loader might produce.
    struct BadBounds;

    impl Primitive for BadBounds {
        fn intersect<'a>(&'a self, _ray: &Ray, _ray_t: Interval) -> Intersection<'a> {
            Intersection::miss()
        }
        fn bounding_box(&self) -> Bounds3 {
            Bounds3 {
                min: Vec3::splat(f32::NAN),
                max: Vec3::ONE,
            }
        }
        fn area(&self) -> f32 {
            1.0
        }
        fn sample(&self, _rng: &mut dyn RngCore) -> SurfaceSample {
            SurfaceSample {
                point: Vec3::ZERO,
                normal: Vec3::Y,
                pdf: 1.0,
            }
        }
        fn material(&self) -> &dyn Material {
            static GREY: Lambertian = Lambertian::new(Color::splat(0.5));
            &GREY
        }
    }

    #[test]
    fn test_empty_scene_misses() {
        let scene = Scene::empty();
        assert!(scene.is_empty());
        assert!(scene.bvh().root().is_none());

        let hit = scene.intersect(&Ray::new(Vec3::ZERO, Vec3::X), Interval::from_min(0.001));
        assert!(!hit.happened);

        let mut rng = <rand::rngs::StdRng as rand::SeedableRng>::seed_from_u64(0);
        assert!(scene.sample_light(&mut rng).is_none());
    }

    #[test]
    fn test_scene_collects_lights() {
        let grey: Arc<dyn Material> = Arc::new(Lambertian::new(Color::splat(0.5)));
        let light: Arc<dyn Material> = Arc::new(DiffuseLight::new(Color::ONE));
        let objects: Vec<Arc<dyn Primitive>> = vec![
            Arc::new(Sphere::new(Vec3::ZERO, 1.0, grey)),
            Arc::new(Sphere::new(Vec3::new(0.0, 5.0, 0.0), 0.5, light)),
        ];

        let scene = Scene::new(objects, BvhConfig::default()).unwrap();
        assert_eq!(scene.primitives().len(), 2);
        assert_eq!(scene.lights().len(), 1);

        let hit = scene.intersect(&Ray::new(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z), Interval::from_min(0.001));
        assert!(hit.happened);
        assert!((hit.distance - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_rejects_non_finite_bounds() {
        let objects: Vec<Arc<dyn Primitive>> = vec![Arc::new(BadBounds)];
        let err = Scene::new(objects, BvhConfig::default()).err();
        assert_eq!(err, Some(SceneError::NonFiniteBounds { index: 0 }));
    }

    #[test]
    fn test_rejects_zero_area_light() {
        let light: Arc<dyn Material> = Arc::new(DiffuseLight::new(Color::ONE));
        let objects: Vec<Arc<dyn Primitive>> =
            vec![Arc::new(Sphere::new(Vec3::ZERO, 0.0, light))];
        let err = Scene::new(objects, BvhConfig::default()).err();
        assert!(matches!(err, Some(SceneError::DegenerateLight { index: 0, .. })));
    }
}
