//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use crate::primitive::{Intersection, Primitive, SurfaceSample};
use crate::sampling::gen_f32;
use crate::Material;
use halo_math::{Bounds3, Interval, Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// Minimum thickness of a triangle's bounding box on any axis.
const BBOX_PAD: f32 = 0.0001;

/// A triangle primitive.
pub struct Triangle {
    /// Vertices
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    /// Edges from v0, cached for intersection
    e1: Vec3,
    e2: Vec3,
    /// Pre-computed face normal (unit length, right-handed winding)
    normal: Vec3,
    area: f32,
    material: Arc<dyn Material>,
    bbox: Bounds3,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: Arc<dyn Material>) -> Self {
        let e1 = v1 - v0;
        let e2 = v2 - v0;
        let cross = e1.cross(e2);

        // Pad thin dimensions to avoid degenerate boxes
        let mut bbox = Bounds3::from_points([v0, v1, v2]);
        let thin = bbox.diagonal().cmplt(Vec3::splat(BBOX_PAD));
        bbox.min = Vec3::select(thin, bbox.min - Vec3::splat(BBOX_PAD * 0.5), bbox.min);
        bbox.max = Vec3::select(thin, bbox.max + Vec3::splat(BBOX_PAD * 0.5), bbox.max);

        Self {
            v0,
            v1,
            v2,
            e1,
            e2,
            normal: cross.normalize_or_zero(),
            area: 0.5 * cross.length(),
            material,
            bbox,
        }
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn centroid(&self) -> Vec3 {
        (self.v0 + self.v1 + self.v2) / 3.0
    }
}

impl Primitive for Triangle {
    fn intersect<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Intersection<'a> {
        let h = ray.direction().cross(self.e2);
        let a = self.e1.dot(h);

        // Ray is parallel to triangle (or the triangle is degenerate)
        if a.abs() < 1e-8 {
            return Intersection::miss();
        }

        let f = 1.0 / a;
        let s = ray.origin() - self.v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return Intersection::miss();
        }

        let q = s.cross(self.e1);
        let v = f * ray.direction().dot(q);
        if v < 0.0 || u + v > 1.0 {
            return Intersection::miss();
        }

        let t = f * self.e2.dot(q);
        if !ray_t.contains(t) {
            return Intersection::miss();
        }

        Intersection::hit(ray, t, self.normal, self)
    }

    fn bounding_box(&self) -> Bounds3 {
        self.bbox
    }

    fn area(&self) -> f32 {
        self.area
    }

    fn sample(&self, rng: &mut dyn RngCore) -> SurfaceSample {
        // Square-root warp gives a uniform density over the triangle
        let x = gen_f32(rng).sqrt();
        let y = gen_f32(rng);
        let point = self.v0 * (1.0 - x) + self.v1 * (x * (1.0 - y)) + self.v2 * (x * y);
        SurfaceSample {
            point,
            normal: self.normal,
            pdf: 1.0 / self.area,
        }
    }

    fn material(&self) -> &dyn Material {
        self.material.as_ref()
    }
}

/// Triangles sharing one material.
///
/// A thin builder for scene construction; each triangle ends up as its own
/// primitive in the BVH.
pub struct Mesh {
    material: Arc<dyn Material>,
    triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new(material: Arc<dyn Material>) -> Self {
        Self {
            material,
            triangles: Vec::new(),
        }
    }

    /// Add a triangle with the given winding.
    pub fn triangle(mut self, v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        self.triangles
            .push(Triangle::new(v0, v1, v2, self.material.clone()));
        self
    }

    /// Add a planar quad `a b c d` whose normal points along `facing`.
    ///
    /// The winding is flipped if needed, which matters for one-sided
    /// emitters.
    pub fn quad(self, corners: [Vec3; 4], facing: Vec3) -> Self {
        let [a, b, c, d] = corners;
        let normal = (b - a).cross(c - a);
        if normal.dot(facing) >= 0.0 {
            self.triangle(a, b, c).triangle(a, c, d)
        } else {
            self.triangle(a, c, b).triangle(a, d, c)
        }
    }

    /// Add the four side faces and top face of a block standing on a floor,
    /// oriented outward from its centre.
    pub fn block(mut self, top: [Vec3; 4], floor_y: f32) -> Self {
        let center = top.iter().copied().sum::<Vec3>() / 4.0;
        let center = Vec3::new(center.x, (center.y + floor_y) * 0.5, center.z);

        self = self.quad(top, Vec3::Y);
        for i in 0..4 {
            let a = top[i];
            let b = top[(i + 1) % 4];
            let side = [
                Vec3::new(a.x, floor_y, a.z),
                Vec3::new(b.x, floor_y, b.z),
                b,
                a,
            ];
            let face_center = side.iter().copied().sum::<Vec3>() / 4.0;
            self = self.quad(side, face_center - center);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn area(&self) -> f32 {
        self.triangles.iter().map(|t| t.area()).sum()
    }

    /// Hand the triangles over as scene primitives.
    pub fn into_primitives(self) -> Vec<Arc<dyn Primitive>> {
        self.triangles
            .into_iter()
            .map(|t| Arc::new(t) as Arc<dyn Primitive>)
            .collect()
    }
}
