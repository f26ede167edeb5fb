//! Multi-threaded render driver.
//!
//! The image is cut into one contiguous band of rows per worker. Bands are
//! fixed before any work starts and each worker writes only its own rows of
//! the framebuffer. A mutex-guarded row counter drives progress reporting.

use crate::camera::Camera;
use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::framebuffer::Framebuffer;
use crate::integrator::cast_ray;
use crate::{Color, Scene};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::ops::Range;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

/// Receives the fraction of rows finished, in `[0, 1]`.
///
/// Calls are serialized and non-decreasing; the last call is exactly `1.0`.
pub trait Progress {
    fn report(&mut self, fraction: f32);
}

impl<F: FnMut(f32)> Progress for F {
    fn report(&mut self, fraction: f32) {
        self(fraction)
    }
}

struct RowCounter<P> {
    completed: u32,
    total: u32,
    progress: P,
}

impl<P: Progress> RowCounter<P> {
    fn row_done(&mut self) {
        self.completed += 1;
        let fraction = self.completed as f32 / self.total as f32;
        self.progress.report(fraction.min(1.0));
    }
}

/// Split `height` rows into at most `threads` contiguous bands.
///
/// When the rows don't divide evenly the first bands take one extra row.
pub fn row_bands(height: u32, threads: usize) -> Vec<Range<u32>> {
    if height == 0 {
        return Vec::new();
    }
    // Clamp before narrowing; `threads` may exceed u32::MAX
    let count = threads.clamp(1, height as usize) as u32;

    let base = height / count;
    let extra = height % count;
    let mut bands = Vec::with_capacity(count as usize);
    let mut start = 0;
    for i in 0..count {
        let rows = base + u32::from(i < extra);
        bands.push(start..start + rows);
        start += rows;
    }
    bands
}

/// Seed for the random stream of one image row.
#[inline]
fn row_seed(seed: u64, row: u32) -> u64 {
    seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ u64::from(row)
}

/// Render `scene` with the settings in `config`.
///
/// Blocks until every band is finished. Each row draws from its own seeded
/// generator, so the image depends on `config.seed` but not on the thread
/// count.
pub fn render<P: Progress + Send>(
    scene: &Scene,
    config: &RenderConfig,
    progress: P,
) -> Result<Framebuffer, RenderError> {
    config.validate()?;

    let (width, height) = (config.width, config.height);
    let camera = Camera::from_config(config);
    let bands = row_bands(height, config.threads);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(bands.len())
        .thread_name(|i| format!("halo-band-{i}"))
        .build()?;

    info!(
        "Rendering {}x{} at {} spp on {} threads",
        width,
        height,
        config.samples_per_pixel,
        bands.len()
    );
    let start = Instant::now();

    let mut pixels = vec![Color::ZERO; width as usize * height as usize];
    let counter = Mutex::new(RowCounter {
        completed: 0,
        total: height,
        progress,
    });

    pool.scope(|s| {
        let mut rest: &mut [Color] = &mut pixels;
        for band in &bands {
            let (chunk, tail) = std::mem::take(&mut rest).split_at_mut(band.len() * width as usize);
            rest = tail;
            let band = band.clone();
            let (camera, counter) = (&camera, &counter);
            s.spawn(move |_| render_band(scene, camera, config, band, chunk, counter));
        }
    });

    counter
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner)
        .progress
        .report(1.0);

    info!("Render finished in {:.2?}", start.elapsed());
    Ok(Framebuffer {
        width,
        height,
        pixels,
    })
}

/// Render the rows in `band` into `out`, which holds exactly those rows.
fn render_band<P: Progress>(
    scene: &Scene,
    camera: &Camera,
    config: &RenderConfig,
    band: Range<u32>,
    out: &mut [Color],
    counter: &Mutex<RowCounter<P>>,
) {
    debug!("Band rows {}..{} started", band.start, band.end);
    let width = config.width as usize;
    let spp = config.samples_per_pixel;

    for (row, line) in band.clone().zip(out.chunks_mut(width)) {
        let mut rng = StdRng::seed_from_u64(row_seed(config.seed, row));
        for (i, pixel) in line.iter_mut().enumerate() {
            let mut sum = Color::ZERO;
            for _ in 0..spp {
                let ray = camera.get_ray(i as u32, row, &mut rng);
                sum += cast_ray(&ray, scene, 0, &config.trace, &mut rng);
            }
            *pixel = sum / spp as f32;
        }

        counter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .row_done();
    }
    debug!("Band rows {}..{} done", band.start, band.end);
}
