//! Object rasterizer - converts one animation frame of an object to pixels.

use image::{Rgba, RgbaImage};

use crate::types::{native_to_pixel, Colour, Palette, RenderableObject, FRAME_PIXELS, FRAME_SIDE};

/// A rendered 8×8 cell in the atlas surface's native pixel words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileBitmap {
    pixels: [u32; FRAME_PIXELS],
}

impl TileBitmap {
    /// A cell filled with one colour.
    pub fn filled(colour: Colour) -> Self {
        Self {
            pixels: [colour.to_native(); FRAME_PIXELS],
        }
    }

    /// Native pixel words, row-major.
    pub fn pixels(&self) -> &[u32; FRAME_PIXELS] {
        &self.pixels
    }

    /// Pixel at `(x, y)` as an image pixel.
    pub fn get(&self, x: usize, y: usize) -> Option<Rgba<u8>> {
        if x < FRAME_SIDE && y < FRAME_SIDE {
            Some(native_to_pixel(self.pixels[y * FRAME_SIDE + x]))
        } else {
            None
        }
    }

    /// Copy the cell into `surface` with its top-left corner at `(ox, oy)`.
    pub fn blit(&self, surface: &mut RgbaImage, ox: u32, oy: u32) {
        for (i, &native) in self.pixels.iter().enumerate() {
            let x = ox + (i % FRAME_SIDE) as u32;
            let y = oy + (i / FRAME_SIDE) as u32;
            if x < surface.width() && y < surface.height() {
                surface.put_pixel(x, y, native_to_pixel(native));
            }
        }
    }
}

/// Rasterize one animation phase of `object` using `palette`.
///
/// Foreground pixels take the colour in the object's palette slot; a slot the
/// palette does not declare falls back to the tile colour slot, then black.
pub fn rasterize(object: &RenderableObject, palette: &Palette, phase: usize) -> TileBitmap {
    let frame = object.graphic.frame(phase);

    let foreground = palette
        .get(object.palette_color_index)
        .or_else(|| palette.tile_color())
        .unwrap_or(Colour::BLACK)
        .to_native();
    let background = palette.background().unwrap_or(Colour::BLACK).to_native();

    let mut pixels = [background; FRAME_PIXELS];
    for (pixel, &on) in pixels.iter_mut().zip(frame.cells()) {
        if on {
            *pixel = foreground;
        }
    }

    TileBitmap { pixels }
}
