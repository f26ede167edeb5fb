//! Primitive trait and Intersection record for ray-object queries.

use crate::{Color, Material};
use halo_math::{Bounds3, Interval, Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// Result of a ray query.
///
/// A miss has `happened == false` and `distance == f32::INFINITY`, so
/// [`Intersection::closer`] ranks it behind every real hit.
#[derive(Clone)]
pub struct Intersection<'a> {
    /// Whether anything was hit
    pub happened: bool,
    /// Ray parameter t of the hit
    pub distance: f32,
    /// Point of intersection
    pub point: Vec3,
    /// Surface normal at intersection (always points against ray)
    pub normal: Vec3,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
    /// The primitive that was hit
    pub primitive: Option<&'a dyn Primitive>,
    /// Material at the intersection point
    pub material: Option<&'a dyn Material>,
    /// Emitted radiance at the hit (zero for non-lights)
    pub emission: Color,
}

impl<'a> Intersection<'a> {
    /// The "no hit" record.
    pub fn miss() -> Self {
        Self {
            happened: false,
            distance: f32::INFINITY,
            point: Vec3::ZERO,
            normal: Vec3::ZERO,
            front_face: false,
            primitive: None,
            material: None,
            emission: Color::ZERO,
        }
    }

    /// Record a hit at parameter `t` on `primitive`.
    ///
    /// The stored normal is flipped to face against the ray, so shading
    /// code can treat every surface as two-sided.
    pub fn hit(
        ray: &Ray,
        t: f32,
        outward_normal: Vec3,
        primitive: &'a dyn Primitive,
    ) -> Self {
        let material = primitive.material();
        let front_face = ray.direction().dot(outward_normal) < 0.0;
        Self {
            happened: true,
            distance: t,
            point: ray.at(t),
            normal: if front_face {
                outward_normal
            } else {
                -outward_normal
            },
            front_face,
            primitive: Some(primitive),
            material: Some(material),
            emission: material.emission(),
        }
    }

    /// Whichever of the two records is nearer along the ray.
    ///
    /// Ties keep `self`.
    #[inline]
    pub fn closer(self, other: Intersection<'a>) -> Intersection<'a> {
        if other.distance < self.distance {
            other
        } else {
            self
        }
    }

    /// True when the hit surface is a light source.
    pub fn is_emissive(&self) -> bool {
        self.material.is_some_and(|m| m.has_emission())
    }
}

impl Default for Intersection<'_> {
    fn default() -> Self {
        Self::miss()
    }
}

/// A point drawn uniformly from a primitive's surface.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceSample {
    pub point: Vec3,
    /// Outward geometric normal at `point`
    pub normal: Vec3,
    /// Density with respect to surface area
    pub pdf: f32,
}

/// Trait for scene objects that can be hit by rays and sampled as lights.
pub trait Primitive: Send + Sync {
    /// Nearest intersection with parameter inside `ray_t`, or a miss.
    fn intersect<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Intersection<'a>;

    /// Get the axis-aligned bounding box of this object.
    fn bounding_box(&self) -> Bounds3;

    /// Total surface area.
    fn area(&self) -> f32;

    /// Uniformly sample a point on the surface.
    fn sample(&self, rng: &mut dyn RngCore) -> SurfaceSample;

    /// Surface material.
    fn material(&self) -> &dyn Material;

    /// Whether the surface emits light.
    fn has_emission(&self) -> bool {
        self.material().has_emission()
    }
}

/// A flat list of primitives tested one by one.
///
/// Used as the brute-force reference that the BVH must agree with.
#[derive(Default, Clone)]
pub struct PrimitiveList {
    objects: Vec<Arc<dyn Primitive>>,
    bbox: Bounds3,
}

impl PrimitiveList {
    /// Create a new empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object to the list.
    pub fn add(&mut self, object: Arc<dyn Primitive>) {
        self.bbox = self.bbox.union(&object.bounding_box());
        self.objects.push(object);
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn bounding_box(&self) -> Bounds3 {
        self.bbox
    }

    /// Nearest hit over every object, without any culling.
    pub fn intersect(&self, ray: &Ray, ray_t: Interval) -> Intersection<'_> {
        self.objects
            .iter()
            .fold(Intersection::miss(), |best, object| {
                best.closer(object.intersect(ray, ray_t))
            })
    }
}

impl FromIterator<Arc<dyn Primitive>> for PrimitiveList {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Primitive>>>(iter: I) -> Self {
        let mut list = Self::new();
        for object in iter {
            list.add(object);
        }
        list
    }
}
