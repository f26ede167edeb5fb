use crate::Vec3;

/// A ray in 3D space with origin and direction.
///
/// The reciprocal of the direction and its per-axis sign are computed once
/// at construction for the slab test.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    /// Component-wise `1 / direction` (infinite on zero components)
    pub inv_direction: Vec3,
    /// `1` where the direction component is negative, `0` otherwise
    pub dir_is_neg: [usize; 3],
}

impl Ray {
    /// Create a new ray.
    ///
    /// The direction is stored as given; hit distances are expressed in
    /// units of its length.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        let inv_direction = direction.recip();
        Self {
            origin,
            direction,
            inv_direction,
            dir_is_neg: [
                (inv_direction.x < 0.0) as usize,
                (inv_direction.y < 0.0) as usize,
                (inv_direction.z < 0.0) as usize,
            ],
        }
    }

    /// Get the origin point of the ray.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Get the direction vector of the ray.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

impl Default for Ray {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::Z)
    }
}
