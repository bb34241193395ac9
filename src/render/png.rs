//! PNG output for atlas surfaces.
//!
//! Writes a surface to a PNG file with optional integer scaling.

use std::path::Path;

use image::{ImageBuffer, RgbaImage};

use crate::error::{MosaicError, Result};

/// Write an atlas surface to a PNG file.
///
/// # Arguments
///
/// * `surface` - The surface to write
/// * `path` - Output file path
/// * `scale` - Integer scale factor (1 = no scaling)
pub fn write_png(surface: &RgbaImage, path: &Path, scale: u32) -> Result<()> {
    let scaled = scale_surface(surface, scale);

    scaled.save(path).map_err(|e| MosaicError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to write PNG: {}", e),
    })?;

    Ok(())
}

/// Scale a surface by an integer factor.
///
/// Uses nearest-neighbour scaling for crisp pixel art.
pub fn scale_surface(surface: &RgbaImage, scale: u32) -> RgbaImage {
    let scale = scale.max(1); // Minimum scale of 1
    if scale == 1 {
        return surface.clone();
    }

    let mut img: RgbaImage = ImageBuffer::new(surface.width() * scale, surface.height() * scale);

    for (x, y, &pixel) in surface.enumerate_pixels() {
        for sy in 0..scale {
            for sx in 0..scale {
                img.put_pixel(x * scale + sx, y * scale + sy, pixel);
            }
        }
    }

    img
}
