//! halo - render the Cornell box with the BVH path tracer
//!
//! Settings come from defaults, an optional JSON config file, then command
//! line flags, in that order.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use halo_render::{render, RenderConfig, Scene, SplitMethod};
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

mod cornell;

#[derive(Parser)]
#[command(name = "halo")]
#[command(about = "BVH-accelerated Monte Carlo path tracer", long_about = None)]
struct Cli {
    /// Output image (.ppm is written directly, other extensions via the image crate)
    #[arg(short, long, default_value = "binary.ppm")]
    output: PathBuf,

    /// JSON render config; missing fields keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Samples per pixel
    #[arg(long)]
    spp: Option<u32>,

    /// Worker threads (one band of rows each)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Image width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Image height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// BVH split strategy
    #[arg(long, value_enum)]
    split: Option<Split>,

    /// Maximum primitives per BVH leaf (clamped to 1..=255)
    #[arg(long)]
    max_leaf: Option<usize>,

    /// Seed for the per-row random streams
    #[arg(long)]
    seed: Option<u64>,

    /// Russian roulette continuation probability
    #[arg(long)]
    russian_roulette: Option<f32>,

    /// Shadow ray distance tolerance in world units
    #[arg(long)]
    shadow_epsilon: Option<f32>,

    /// Direct lighting only
    #[arg(long)]
    direct_only: bool,

    /// Jitter primary rays inside each pixel
    #[arg(long)]
    jitter: bool,

    /// Don't draw the progress bar
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Split {
    Median,
    Sah,
}

impl From<Split> for SplitMethod {
    fn from(split: Split) -> Self {
        match split {
            Split::Median => SplitMethod::Median,
            Split::Sah => SplitMethod::Sah,
        }
    }
}

impl Cli {
    fn render_config(&self) -> Result<RenderConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("Failed to parse config {}", path.display()))?
            }
            None => RenderConfig::default(),
        };

        if let Some(spp) = self.spp {
            config.samples_per_pixel = spp;
        }
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(split) = self.split {
            config.bvh.split = split.into();
        }
        if let Some(max_leaf) = self.max_leaf {
            config.bvh.max_prims_in_node = max_leaf;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(rr) = self.russian_roulette {
            config.trace.russian_roulette = rr;
        }
        if let Some(eps) = self.shadow_epsilon {
            config.trace.shadow_epsilon = eps;
        }
        config.trace.direct_only |= self.direct_only;
        config.jitter |= self.jitter;

        config.validate().context("Invalid render settings")?;
        Ok(config)
    }
}

/// Text progress bar on stderr, redrawn in place.
fn draw_progress(fraction: f32) {
    const WIDTH: usize = 70;
    let filled = (WIDTH as f32 * fraction) as usize;
    let bar: String = (0..WIDTH)
        .map(|i| match i.cmp(&filled) {
            std::cmp::Ordering::Less => '=',
            std::cmp::Ordering::Equal => '>',
            std::cmp::Ordering::Greater => ' ',
        })
        .collect();

    let mut stderr = std::io::stderr().lock();
    let _ = write!(stderr, "[{}] {} %\r", bar, (fraction * 100.0) as u32);
    if fraction >= 1.0 {
        let _ = writeln!(stderr);
    }
    let _ = stderr.flush();
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();
    let config = cli.render_config()?;

    log::info!("Building Cornell box scene");
    let scene = Scene::new(cornell::cornell_box(), config.bvh).context("Invalid scene")?;

    let start = Instant::now();
    let quiet = cli.quiet;
    let image = render(&scene, &config, |fraction: f32| {
        if !quiet {
            draw_progress(fraction);
        }
    })
    .context("Render failed")?;
    log::info!("Render complete: {:.2?}", start.elapsed());

    image
        .save(&cli.output, config.gamma)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;
    log::info!("Wrote {}", cli.output.display());

    Ok(())
}
