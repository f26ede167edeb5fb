//! Halo - BVH-accelerated CPU path tracing
//!
//! Scenes are built from triangles and spheres, accelerated with a bounding
//! volume hierarchy (median or SAH splits) and rendered by a Monte Carlo path
//! tracer with next-event estimation and Russian roulette.

mod sampling;
mod material;
mod primitive;
mod triangle;
mod sphere;
mod bvh;
mod light;
mod scene;
mod config;
mod error;
mod integrator;
mod camera;
mod renderer;
mod framebuffer;

pub use sampling::{gen_f32, sample_square, uniform_hemisphere, uniform_sphere};
pub use material::{Color, DiffuseLight, Lambertian, Material};
pub use primitive::{Intersection, Primitive, PrimitiveList, SurfaceSample};
pub use triangle::{Mesh, Triangle};
pub use sphere::Sphere;
pub use bvh::{
    find_sah_split, sah_candidates, Bvh, BvhConfig, BvhNode, BvhStats, SahSplit,
    SplitMethod, MAX_PRIMS_IN_NODE_LIMIT, SAH_BINS,
};
pub use light::{LightSample, LightSampler};
pub use scene::Scene;
pub use config::{RenderConfig, TraceSettings, MAX_DEPTH_LIMIT};
pub use error::{ConfigError, OutputError, OutputResult, RenderError, SceneError};
pub use integrator::cast_ray;
pub use camera::Camera;
pub use renderer::{render, row_bands, Progress};
pub use framebuffer::{tone_map, Framebuffer, Rgb8};

/// Re-export Vec3 and common math types from halo_math
pub use halo_math::{Bounds3, Interval, Ray, Vec3};
