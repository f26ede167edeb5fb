//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree of boxes built once over the scene primitives and queried
//! read-only afterwards. Two split strategies are available: a median split
//! on the longest centroid axis, and a binned Surface Area Heuristic.

use crate::primitive::{Intersection, Primitive};
use halo_math::{axis_component, Bounds3, Interval, Ray};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Upper bound for [`BvhConfig::max_prims_in_node`].
pub const MAX_PRIMS_IN_NODE_LIMIT: usize = 255;

/// Number of equal-width centroid bins per axis in the SAH build.
pub const SAH_BINS: usize = 32;

/// How an over-full node is partitioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMethod {
    /// Sort by centroid on the longest axis and cut at the middle index.
    #[default]
    Median,
    /// Pick the cheapest binned split under the surface area heuristic.
    Sah,
}

/// BVH build settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BvhConfig {
    pub split: SplitMethod,
    /// Largest primitive count stored in one leaf, clamped to `[1, 255]`
    pub max_prims_in_node: usize,
}

impl Default for BvhConfig {
    fn default() -> Self {
        Self {
            split: SplitMethod::Median,
            max_prims_in_node: 1,
        }
    }
}

/// BVH node - either a branch with two children or a leaf with primitives.
pub enum BvhNode {
    /// Internal node; its box is the union of the children's boxes.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Bounds3,
    },
    /// Leaf node referencing scene primitives.
    Leaf {
        objects: Vec<Arc<dyn Primitive>>,
        bbox: Bounds3,
    },
}

/// Shape of a built tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BvhStats {
    pub primitives: usize,
    pub nodes: usize,
    pub leaves: usize,
    /// Number of nodes on the longest root-to-leaf path
    pub max_depth: usize,
}

/// A built hierarchy. `root` is `None` for an empty scene.
pub struct Bvh {
    root: Option<Box<BvhNode>>,
    config: BvhConfig,
    stats: BvhStats,
}

impl Bvh {
    /// Build a BVH over `primitives`.
    ///
    /// Never fails: an empty input produces a tree without a root, and every
    /// query against it reports a miss.
    pub fn build(primitives: &[Arc<dyn Primitive>], config: BvhConfig) -> Self {
        let leaf_size = config
            .max_prims_in_node
            .clamp(1, MAX_PRIMS_IN_NODE_LIMIT);
        if leaf_size != config.max_prims_in_node {
            warn!(
                "max_prims_in_node {} clamped to {}",
                config.max_prims_in_node, leaf_size
            );
        }
        let config = BvhConfig {
            max_prims_in_node: leaf_size,
            ..config
        };

        if primitives.is_empty() {
            info!("BVH build skipped: scene has no primitives");
            return Self {
                root: None,
                config,
                stats: BvhStats::default(),
            };
        }

        let start = Instant::now();
        let root = build_recursive(primitives.to_vec(), config.split, leaf_size);
        let stats = root.stats(primitives.len());

        info!(
            "BVH ({:?}) built over {} primitives in {:.2?}: {} nodes, {} leaves, depth {}",
            config.split,
            stats.primitives,
            start.elapsed(),
            stats.nodes,
            stats.leaves,
            stats.max_depth
        );

        Self {
            root: Some(Box::new(root)),
            config,
            stats,
        }
    }

    /// Nearest hit along the ray, or a miss.
    pub fn intersect(&self, ray: &Ray, ray_t: Interval) -> Intersection<'_> {
        match &self.root {
            Some(root) => root.intersect(ray, ray_t),
            None => Intersection::miss(),
        }
    }

    pub fn root(&self) -> Option<&BvhNode> {
        self.root.as_deref()
    }

    pub fn config(&self) -> BvhConfig {
        self.config
    }

    pub fn stats(&self) -> BvhStats {
        self.stats
    }

    /// Box around the whole scene (empty when there is no root).
    pub fn bounding_box(&self) -> Bounds3 {
        self.root
            .as_ref()
            .map_or(Bounds3::EMPTY, |root| root.bounding_box())
    }
}

impl BvhNode {
    fn leaf(objects: Vec<Arc<dyn Primitive>>) -> Self {
        let bbox = union_bounds(&objects);
        BvhNode::Leaf { objects, bbox }
    }

    fn branch(left: BvhNode, right: BvhNode) -> Self {
        let bbox = left.bounding_box().union(&right.bounding_box());
        BvhNode::Branch {
            left: Box::new(left),
            right: Box::new(right),
            bbox,
        }
    }

    pub fn bounding_box(&self) -> Bounds3 {
        match self {
            BvhNode::Leaf { bbox, .. } => *bbox,
            BvhNode::Branch { bbox, .. } => *bbox,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, BvhNode::Leaf { .. })
    }

    /// Nearest hit in this subtree.
    ///
    /// Both children are always visited once the node's box passes: sibling
    /// boxes may overlap, so the first hit found is not necessarily the
    /// nearest.
    pub fn intersect<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Intersection<'a> {
        if !self.bounding_box().hit(ray, ray_t) {
            return Intersection::miss();
        }

        match self {
            BvhNode::Leaf { objects, .. } => objects
                .iter()
                .fold(Intersection::miss(), |best, object| {
                    best.closer(object.intersect(ray, ray_t))
                }),
            BvhNode::Branch { left, right, .. } => {
                let hit_left = left.intersect(ray, ray_t);
                let hit_right = right.intersect(ray, ray_t);
                hit_left.closer(hit_right)
            }
        }
    }

    fn stats(&self, primitives: usize) -> BvhStats {
        let mut stats = BvhStats {
            primitives,
            ..BvhStats::default()
        };
        self.accumulate_stats(1, &mut stats);
        stats
    }

    fn accumulate_stats(&self, depth: usize, stats: &mut BvhStats) {
        stats.nodes += 1;
        stats.max_depth = stats.max_depth.max(depth);
        match self {
            BvhNode::Leaf { .. } => stats.leaves += 1,
            BvhNode::Branch { left, right, .. } => {
                left.accumulate_stats(depth + 1, stats);
                right.accumulate_stats(depth + 1, stats);
            }
        }
    }
}

/// Recursive BVH construction.
fn build_recursive(
    mut objects: Vec<Arc<dyn Primitive>>,
    split: SplitMethod,
    leaf_size: usize,
) -> BvhNode {
    let n = objects.len();

    if n <= leaf_size {
        return BvhNode::leaf(objects);
    }

    // Two primitives always become two singleton leaves; centroid binning
    // has nothing meaningful to compare at this size.
    if n == 2 {
        let right = objects.split_off(1);
        return BvhNode::branch(BvhNode::leaf(objects), BvhNode::leaf(right));
    }

    let mid = match split {
        SplitMethod::Median => median_split(&mut objects),
        SplitMethod::Sah => sah_split(&mut objects),
    };

    let right_objects = objects.split_off(mid);
    let left = build_recursive(objects, split, leaf_size);
    let right = build_recursive(right_objects, split, leaf_size);
    BvhNode::branch(left, right)
}

fn union_bounds(objects: &[Arc<dyn Primitive>]) -> Bounds3 {
    objects
        .iter()
        .fold(Bounds3::EMPTY, |acc, o| acc.union(&o.bounding_box()))
}

/// Box around the primitives' bounding-box centroids.
fn centroid_bounds(objects: &[Arc<dyn Primitive>]) -> Bounds3 {
    objects
        .iter()
        .fold(Bounds3::EMPTY, |acc, o| acc.union_point(o.bounding_box().centroid()))
}

#[inline]
fn centroid_on(object: &Arc<dyn Primitive>, axis: usize) -> f32 {
    axis_component(object.bounding_box().centroid(), axis)
}

fn sort_by_centroid(objects: &mut [Arc<dyn Primitive>], axis: usize) {
    objects.sort_by(|a, b| centroid_on(a, axis).total_cmp(&centroid_on(b, axis)));
}

/// Sort on the longest centroid axis and return the middle index.
fn median_split(objects: &mut [Arc<dyn Primitive>]) -> usize {
    let axis = centroid_bounds(objects).max_extent();
    sort_by_centroid(objects, axis);
    objects.len() / 2
}

/// Reorder along the cheapest SAH split and return its left count.
///
/// Falls back to the median split when every centroid coincides, since no
/// bin boundary can then separate the primitives.
fn sah_split(objects: &mut [Arc<dyn Primitive>]) -> usize {
    match find_sah_split(objects) {
        Some(best) => {
            sort_by_centroid(objects, best.axis);
            best.left_count
        }
        None => median_split(objects),
    }
}

/// One candidate partition evaluated by the SAH.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SahSplit {
    pub axis: usize,
    /// Primitives left of the bin boundary
    pub left_count: usize,
    /// `area(left) * left_count + area(right) * right_count`
    pub cost: f32,
}

#[derive(Debug, Clone, Copy, Default)]
struct SahBin {
    count: usize,
    bounds: Bounds3,
}

/// Bin holding a centroid coordinate; the upper bound lands in the last bin.
#[inline]
fn bin_index(centroid: f32, min: f32, extent: f32) -> usize {
    let scaled = (centroid - min) / extent * SAH_BINS as f32;
    // `as` saturates negatives and NaN to 0
    (scaled as usize).min(SAH_BINS - 1)
}

/// Every non-trivial split position on every axis, with its SAH cost.
///
/// Axes on which all centroids coincide are skipped, as are boundaries that
/// would leave one side empty.
pub fn sah_candidates(objects: &[Arc<dyn Primitive>]) -> Vec<SahSplit> {
    let n = objects.len();
    let centroids = centroid_bounds(objects);
    let mut candidates = Vec::with_capacity(3 * (SAH_BINS - 1));

    for axis in 0..3 {
        let range = centroids.axis_range(axis);
        let extent = range.size();
        if !(extent > 0.0) {
            continue;
        }

        let mut bins = [SahBin::default(); SAH_BINS];
        for object in objects {
            let bounds = object.bounding_box();
            let bin = &mut bins[bin_index(centroid_on(object, axis), range.min, extent)];
            bin.count += 1;
            bin.bounds = bin.bounds.union(&bounds);
        }

        // suffix[j] is the union of bins j..SAH_BINS
        let mut suffix = [Bounds3::EMPTY; SAH_BINS];
        let mut acc = Bounds3::EMPTY;
        for j in (0..SAH_BINS).rev() {
            acc = acc.union(&bins[j].bounds);
            suffix[j] = acc;
        }

        let mut left_bounds = Bounds3::EMPTY;
        let mut left_count = 0;
        for j in 1..SAH_BINS {
            left_bounds = left_bounds.union(&bins[j - 1].bounds);
            left_count += bins[j - 1].count;
            let right_count = n - left_count;
            if left_count == 0 || right_count == 0 {
                continue;
            }

            let cost = left_bounds.surface_area() * left_count as f32
                + suffix[j].surface_area() * right_count as f32;
            candidates.push(SahSplit {
                axis,
                left_count,
                cost,
            });
        }
    }

    candidates
}

/// The cheapest candidate from [`sah_candidates`]; the earliest wins ties.
pub fn find_sah_split(objects: &[Arc<dyn Primitive>]) -> Option<SahSplit> {
    sah_candidates(objects)
        .into_iter()
        .fold(None, |best: Option<SahSplit>, candidate| match best {
            Some(b) if b.cost <= candidate.cost => Some(b),
            _ => Some(candidate),
        })
}
