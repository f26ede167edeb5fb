//! Sphere primitive for ray tracing.

use crate::primitive::{Intersection, Primitive, SurfaceSample};
use crate::sampling::uniform_sphere;
use crate::Material;
use halo_math::{Bounds3, Interval, Ray, Vec3};
use rand::RngCore;
use std::f32::consts::PI;
use std::sync::Arc;

/// A sphere primitive.
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Arc<dyn Material>,
    bbox: Bounds3,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32, material: Arc<dyn Material>) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        Self {
            center,
            radius,
            material,
            bbox: Bounds3::new(center - rvec, center + rvec),
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }
}

impl Primitive for Sphere {
    fn intersect<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Intersection<'a> {
        let oc = self.center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 || a == 0.0 {
            return Intersection::miss();
        }

        // Find the nearest root that lies in the acceptable range
        let sqrtd = discriminant.sqrt();
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return Intersection::miss();
            }
        }

        let outward_normal = (ray.at(root) - self.center) / self.radius;
        Intersection::hit(ray, root, outward_normal, self)
    }

    fn bounding_box(&self) -> Bounds3 {
        self.bbox
    }

    fn area(&self) -> f32 {
        4.0 * PI * self.radius * self.radius
    }

    fn sample(&self, rng: &mut dyn RngCore) -> SurfaceSample {
        let normal = uniform_sphere(rng);
        SurfaceSample {
            point: self.center + normal * self.radius,
            normal,
            pdf: 1.0 / self.area(),
        }
    }

    fn material(&self) -> &dyn Material {
        self.material.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Lambertian;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn unit_sphere_at(center: Vec3) -> Sphere {
        Sphere::new(center, 1.0, Arc::new(Lambertian::new(Vec3::splat(0.5))))
    }

    #[test]
    fn test_sphere_hit_front() {
        let sphere = unit_sphere_at(Vec3::new(0.0, 0.0, -5.0));
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let hit = sphere.intersect(&ray, Interval::from_min(0.001));
        assert!(hit.happened);
        assert!((hit.distance - 4.0).abs() < 1e-4);
        assert!(hit.front_face);
        assert!((hit.normal - Vec3::Z).length() < 1e-4);
    }

    #[test]
    fn test_sphere_hit_from_inside() {
        let sphere = unit_sphere_at(Vec3::ZERO);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        let hit = sphere.intersect(&ray, Interval::from_min(0.001));
        assert!(hit.happened);
        assert!((hit.distance - 1.0).abs() < 1e-4);
        assert!(!hit.front_face);
        assert!((hit.normal + Vec3::X).length() < 1e-4);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = unit_sphere_at(Vec3::new(0.0, 0.0, -5.0));
        let ray = Ray::new(Vec3::new(3.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(!sphere.intersect(&ray, Interval::from_min(0.001)).happened);
    }

    #[test]
    fn test_sphere_area_and_samples() {
        let sphere = Sphere::new(
            Vec3::new(1.0, 2.0, 3.0),
            2.0,
            Arc::new(Lambertian::new(Vec3::ONE)),
        );
        assert!((sphere.area() - 16.0 * PI).abs() < 1e-4);

        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..100 {
            let s = sphere.sample(&mut rng);
            assert!(((s.point - sphere.center()).length() - 2.0).abs() < 1e-4);
            assert!((s.pdf * sphere.area() - 1.0).abs() < 1e-5);
        }
    }
}
