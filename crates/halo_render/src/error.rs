//! Error types for scene setup, render configuration and image output.

use std::path::PathBuf;
use thiserror::Error;

/// Rejected scene input, reported before the BVH is built.
#[derive(Error, Debug, PartialEq)]
pub enum SceneError {
    #[error("Primitive {index} has a non-finite bounding box")]
    NonFiniteBounds { index: usize },

    #[error("Emissive primitive {index} has non-positive area {area}")]
    DegenerateLight { index: usize, area: f32 },
}

/// Invalid render settings.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Image size must be non-zero, got {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    #[error("Samples per pixel must be at least 1")]
    NoSamples,

    #[error("Thread count must be at least 1")]
    NoThreads,

    #[error("Russian roulette probability must be in (0, 1], got {0}")]
    RussianRoulette(f32),

    #[error("Field of view must be in (0, 180) degrees, got {0}")]
    FieldOfView(f32),

    #[error("Max depth must be in 1..={limit}, got {depth}")]
    MaxDepth { depth: u32, limit: u32 },

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Failure while running a render.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid render configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to start render threads: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Failure while writing the framebuffer to disk.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Framebuffer size {width}x{height} does not match {len} pixels")]
    SizeMismatch { width: u32, height: u32, len: usize },
}

pub type OutputResult<T> = Result<T, OutputError>;
