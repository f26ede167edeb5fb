//! Linear radiance framebuffer and 8-bit image output.

use crate::error::{OutputError, OutputResult};
use crate::Color;
use bytemuck::{Pod, Zeroable};
use image::{ImageFormat, RgbImage};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// One tone-mapped output pixel.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Map one linear channel to 8 bits: clamp to [0, 1], raise to `gamma`,
/// scale to 255.
#[inline]
pub fn tone_map(channel: f32, gamma: f32) -> u8 {
    (255.0 * channel.clamp(0.0, 1.0).powf(gamma)) as u8
}

/// Row-major image of linear radiance, row 0 at the top.
#[derive(Debug, Clone, PartialEq)]
pub struct Framebuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl Framebuffer {
    /// Create a new framebuffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    /// Wrap already rendered pixels.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Color>) -> OutputResult<Self> {
        if pixels.len() != width as usize * height as usize {
            return Err(OutputError::SizeMismatch {
                width,
                height,
                len: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let i = self.index(x, y);
        self.pixels[i] = color;
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Tone-mapped copy of the image.
    pub fn to_rgb8(&self, gamma: f32) -> Vec<Rgb8> {
        self.pixels
            .iter()
            .map(|c| Rgb8 {
                r: tone_map(c.x, gamma),
                g: tone_map(c.y, gamma),
                b: tone_map(c.z, gamma),
            })
            .collect()
    }

    /// Write a binary PPM (`P6`) to `writer`.
    pub fn write_ppm<W: Write>(&self, writer: &mut W, gamma: f32) -> std::io::Result<()> {
        write!(writer, "P6\n{} {}\n255\n", self.width, self.height)?;
        writer.write_all(bytemuck::cast_slice(&self.to_rgb8(gamma)))?;
        writer.flush()
    }

    /// Save the image to `path`.
    ///
    /// `.ppm` files use the P6 writer, other extensions go through the
    /// `image` crate. The image is written to a sibling temporary file and
    /// renamed into place once complete, so a failed write leaves no
    /// partial file under `path`.
    pub fn save(&self, path: impl AsRef<Path>, gamma: f32) -> OutputResult<()> {
        let path = path.as_ref();
        let partial = partial_path(path);

        let result = self.write_file(path, &partial, gamma).and_then(|()| {
            fs::rename(&partial, path).map_err(|source| OutputError::Io {
                path: path.to_path_buf(),
                source,
            })
        });
        if result.is_err() {
            // Best effort cleanup; report the write error
            let _ = fs::remove_file(&partial);
        }
        result
    }

    fn write_file(&self, target: &Path, partial: &Path, gamma: f32) -> OutputResult<()> {
        let io_err = |source: std::io::Error| OutputError::Io {
            path: partial.to_path_buf(),
            source,
        };

        if is_ppm(target) {
            let file = File::create(partial).map_err(io_err)?;
            let mut writer = BufWriter::new(file);
            self.write_ppm(&mut writer, gamma).map_err(io_err)?;
            return Ok(());
        }

        // The temporary name hides the extension, so resolve the format first
        let format = ImageFormat::from_path(target)?;
        let bytes = bytemuck::cast_slice(&self.to_rgb8(gamma)).to_vec();
        let image = RgbImage::from_raw(self.width, self.height, bytes).ok_or(
            OutputError::SizeMismatch {
                width: self.width,
                height: self.height,
                len: self.pixels.len(),
            },
        )?;
        image.save_with_format(partial, format)?;
        Ok(())
    }
}

fn is_ppm(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("ppm"))
        .unwrap_or(false)
}

/// `<name>.partial` next to `path`.
fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}
