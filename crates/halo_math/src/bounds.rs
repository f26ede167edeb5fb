use crate::{axis_component, Interval, Ray, Vec3};

/// Axis-aligned bounding box used by the BVH.
///
/// `Bounds3::EMPTY` is the identity for [`Bounds3::union`]; once a box holds
/// at least one point `min[i] <= max[i]` on every axis.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Bounds3 {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds3 {
    /// The empty box (contains nothing).
    pub const EMPTY: Bounds3 = Bounds3 {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Create a box from two corner points, in any order.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Degenerate box holding a single point.
    pub fn from_point(p: Vec3) -> Self {
        Self { min: p, max: p }
    }

    /// Smallest box enclosing a set of points.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        points
            .into_iter()
            .fold(Self::EMPTY, |acc, p| acc.union_point(p))
    }

    /// Smallest box enclosing both boxes.
    pub fn union(&self, other: &Bounds3) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Smallest box enclosing this box and a point.
    pub fn union_point(&self, p: Vec3) -> Self {
        Self {
            min: self.min.min(p),
            max: self.max.max(p),
        }
    }

    /// True when no point has been added yet.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// True when every corner coordinate is finite.
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Vector from the min corner to the max corner.
    pub fn diagonal(&self) -> Vec3 {
        self.max - self.min
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Total area of the six faces. Zero for an empty box.
    pub fn surface_area(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let d = self.diagonal();
        2.0 * (d.x * d.y + d.y * d.z + d.z * d.x)
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the largest span.
    pub fn max_extent(&self) -> usize {
        let d = self.diagonal();
        if d.x > d.y && d.x > d.z {
            0
        } else if d.y > d.z {
            1
        } else {
            2
        }
    }

    /// Lower and upper bound along one axis.
    pub fn axis_range(&self, axis: usize) -> Interval {
        Interval::new(axis_component(self.min, axis), axis_component(self.max, axis))
    }

    /// Slab test returning the parametric range `[t_enter, t_exit]` where the
    /// ray is inside the box, clipped to `ray_t`.
    ///
    /// Uses the ray's cached inverse direction and sign bits, so the near and
    /// far planes are picked without comparisons.
    pub fn hit_range(&self, ray: &Ray, ray_t: Interval) -> Option<Interval> {
        let corners = [self.min, self.max];
        let mut t = ray_t;

        for axis in 0..3 {
            let neg = ray.dir_is_neg[axis];
            let origin = axis_component(ray.origin, axis);
            let inv = axis_component(ray.inv_direction, axis);

            let t0 = (axis_component(corners[neg], axis) - origin) * inv;
            let t1 = (axis_component(corners[1 - neg], axis) - origin) * inv;

            // f32::max/min drop a NaN from a zero direction on the slab plane
            t.min = t.min.max(t0);
            t.max = t.max.min(t1);
            if t.max < t.min {
                return None;
            }
        }

        Some(t)
    }

    /// Test if a ray intersects this box within the given interval.
    #[inline]
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> bool {
        self.hit_range(ray, ray_t).is_some()
    }
}

impl Default for Bounds3 {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Bounds3 {
        Bounds3::new(Vec3::splat(-1.0), Vec3::splat(1.0))
    }

    #[test]
    fn test_bounds_new_orders_corners() {
        let b = Bounds3::new(Vec3::new(5.0, -1.0, 2.0), Vec3::new(0.0, 3.0, -2.0));
        assert_eq!(b.min, Vec3::new(0.0, -1.0, -2.0));
        assert_eq!(b.max, Vec3::new(5.0, 3.0, 2.0));
    }

    #[test]
    fn test_empty_is_union_identity() {
        let b = unit_box();
        assert_eq!(Bounds3::EMPTY.union(&b), b);
        assert_eq!(b.union(&Bounds3::EMPTY), b);
        assert!(Bounds3::EMPTY.is_empty());
        assert_eq!(Bounds3::EMPTY.surface_area(), 0.0);
    }

    #[test]
    fn test_union_associative_and_commutative() {
        let a = Bounds3::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 2.0, 3.0));
        let b = Bounds3::new(Vec3::new(-4.0, 1.0, 0.5), Vec3::new(0.5, 1.5, 9.0));
        let c = Bounds3::new(Vec3::new(2.0, -3.0, -1.0), Vec3::new(2.5, 0.0, 0.0));

        assert_eq!(a.union(&b).union(&c), a.union(&b.union(&c)));
        assert_eq!(a.union(&b), b.union(&a));
        assert_eq!(a.union(&c).union(&b), c.union(&b).union(&a));
    }

    #[test]
    fn test_centroid_and_surface_area() {
        let b = Bounds3::new(Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(b.centroid(), Vec3::new(0.5, 1.0, 1.5));
        assert_eq!(b.surface_area(), 2.0 * (2.0 + 6.0 + 3.0));

        let point = Bounds3::from_point(Vec3::ONE);
        assert_eq!(point.surface_area(), 0.0);
        assert!(!point.is_empty());
    }

    #[test]
    fn test_max_extent() {
        assert_eq!(Bounds3::new(Vec3::ZERO, Vec3::new(10.0, 1.0, 1.0)).max_extent(), 0);
        assert_eq!(Bounds3::new(Vec3::ZERO, Vec3::new(1.0, 10.0, 1.0)).max_extent(), 1);
        assert_eq!(Bounds3::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 10.0)).max_extent(), 2);
    }

    #[test]
    fn test_from_points() {
        let b = Bounds3::from_points([
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(-1.0, 2.0, 0.0),
            Vec3::new(0.0, 0.0, -3.0),
        ]);
        assert_eq!(b.min, Vec3::new(-1.0, 0.0, -3.0));
        assert_eq!(b.max, Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_hit_slabs() {
        let b = unit_box();

        let toward = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        let range = b.hit_range(&toward, Interval::from_min(0.0)).unwrap();
        assert!((range.min - 4.0).abs() < 1e-6);
        assert!((range.max - 6.0).abs() < 1e-6);

        let away = Ray::new(Vec3::new(0.0, 0.0, -5.0), -Vec3::Z);
        assert!(!b.hit(&away, Interval::from_min(0.0)));

        let beside = Ray::new(Vec3::new(10.0, 0.0, 0.0), Vec3::Z);
        assert!(!b.hit(&beside, Interval::from_min(0.0)));
    }

    #[test]
    fn test_hit_negative_direction() {
        let b = unit_box();
        let ray = Ray::new(Vec3::new(3.0, 3.0, 3.0), Vec3::new(-1.0, -1.0, -1.0));
        let range = b.hit_range(&ray, Interval::from_min(0.0)).unwrap();
        assert!((range.min - 2.0).abs() < 1e-6);
        assert!((range.max - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_hit_respects_ray_interval() {
        let b = unit_box();
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        assert!(!b.hit(&ray, Interval::new(0.0, 3.0)));
        assert!(b.hit(&ray, Interval::new(0.0, 4.5)));
    }

    #[test]
    fn test_hit_flat_box() {
        // Zero thickness along Y, as for an axis-aligned triangle
        let flat = Bounds3::new(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 0.0, 1.0));
        let down = Ray::new(Vec3::new(0.2, 4.0, 0.3), -Vec3::Y);
        assert!(flat.hit(&down, Interval::from_min(0.0)));
    }

    #[test]
    fn test_hit_axis_parallel_ray() {
        let b = unit_box();
        // Direction has zero X and Y; origin lies exactly on the x = 1 plane
        let grazing = Ray::new(Vec3::new(1.0, 0.0, -5.0), Vec3::Z);
        assert!(b.hit(&grazing, Interval::from_min(0.0)));

        let outside = Ray::new(Vec3::new(1.5, 0.0, -5.0), Vec3::Z);
        assert!(!b.hit(&outside, Interval::from_min(0.0)));
    }

    #[test]
    fn test_empty_box_never_hit() {
        let ray = Ray::new(Vec3::ZERO, Vec3::ONE);
        assert!(!Bounds3::EMPTY.hit(&ray, Interval::UNIVERSE));
    }
}
