//! Colour type and packing.
//!
//! Documents describe colours as decimal `r,g,b` triples. Internally a colour
//! is an RGBA value that can be packed into a `u32` with R in the highest-order
//! byte and A in the lowest, which is the layout palettes are compared in.

use std::fmt;

use image::Rgba;

/// An RGBA colour value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Colour {
    /// Create a new colour from RGBA components.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create a new opaque colour from RGB components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// White.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Unpack from `0xRRGGBBAA`.
    pub const fn from_packed(packed: u32) -> Self {
        let [r, g, b, a] = packed.to_be_bytes();
        Self { r, g, b, a }
    }

    /// Pack into `0xRRGGBBAA`.
    pub const fn to_packed(self) -> u32 {
        u32::from_be_bytes([self.r, self.g, self.b, self.a])
    }

    /// Convert to the atlas surface's native pixel word.
    ///
    /// Surfaces store RGBA bytes in memory, so read as a little-endian `u32`
    /// the channels sit in `0xAABBGGRR` order: alpha is forced opaque and
    /// red and blue trade places relative to the packed form.
    pub const fn to_native(self) -> u32 {
        0xFF00_0000 | (self.b as u32) << 16 | (self.g as u32) << 8 | self.r as u32
    }
}

/// Turn a native surface word back into an image pixel.
pub fn native_to_pixel(native: u32) -> Rgba<u8> {
    Rgba(native.to_le_bytes())
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_layout() {
        let c = Colour::rgb(0x12, 0x34, 0x56);
        assert_eq!(c.to_packed(), 0x123456FF);
        assert_eq!(Colour::from_packed(0x123456FF), c);
    }

    #[test]
    fn test_native_swaps_red_and_blue() {
        let red = Colour::rgb(255, 0, 0);
        assert_eq!(red.to_native(), 0xFF0000FF);
        assert_eq!(native_to_pixel(red.to_native()).0, [255, 0, 0, 255]);

        let blue = Colour::rgb(0, 0, 255);
        assert_eq!(blue.to_native(), 0xFFFF0000);
        assert_eq!(native_to_pixel(blue.to_native()).0, [0, 0, 255, 255]);
    }

    #[test]
    fn test_native_forces_opaque() {
        let faint = Colour::new(10, 20, 30, 0);
        assert_eq!(native_to_pixel(faint.to_native()).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Colour::rgb(255, 0, 0)), "#FF0000");
        assert_eq!(format!("{}", Colour::new(255, 0, 0, 128)), "#FF000080");
    }

    #[test]
    fn test_constants() {
        assert_eq!(Colour::BLACK, Colour::rgb(0, 0, 0));
        assert_eq!(Colour::WHITE, Colour::rgb(255, 255, 255));
        assert_eq!(Colour::BLACK.a, 255);
    }
}
