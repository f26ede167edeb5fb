// Re-export glam for convenience
pub use glam::*;

// Halo math types
mod bounds;
mod interval;
mod ray;

pub use bounds::Bounds3;
pub use interval::Interval;
pub use ray::Ray;

/// Index of a vector component by axis (0=X, 1=Y, 2=Z).
#[inline]
pub fn axis_component(v: Vec3, axis: usize) -> f32 {
    match axis {
        0 => v.x,
        1 => v.y,
        _ => v.z,
    }
}
