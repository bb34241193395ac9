//! A single resolution level of the atlas.

use std::collections::HashMap;

use image::{imageops, RgbaImage};

use crate::error::{MosaicError, Result};
use crate::render::TileBitmap;
use crate::types::{CatalogEntry, FRAME_SIDE};

use super::lookup::ProvenanceMap;

/// Pixels per cell side.
pub const CELL_PIXELS: u32 = FRAME_SIDE as u32;

/// Number of animation phases kept per level.
pub const PHASES: usize = 2;

/// One square grid of cells with a surface per animation phase.
#[derive(Debug, Clone)]
pub struct AtlasLevel {
    size: u32,
    frames: [RgbaImage; PHASES],
    cells: HashMap<(u32, u32), CatalogEntry>,
}

impl AtlasLevel {
    /// Allocate an empty level `size` cells on a side.
    pub fn allocate(size: u32) -> Result<Self> {
        Self::allocate_within(size, usize::MAX)
    }

    /// Allocate an empty level, failing if one surface would exceed `limit` bytes.
    pub fn allocate_within(size: u32, limit: usize) -> Result<Self> {
        Ok(Self {
            size,
            frames: [allocate_surface(size, limit)?, allocate_surface(size, limit)?],
            cells: HashMap::new(),
        })
    }

    /// Allocate the next level up, tiling `previous` into all four quadrants.
    pub fn grown_from(previous: &AtlasLevel, limit: usize) -> Result<Self> {
        let mut next = Self::allocate_within(previous.size * 2, limit)?;
        let side = i64::from(previous.pixel_side());

        for (target, source) in next.frames.iter_mut().zip(&previous.frames) {
            for (qx, qy) in [(0, 0), (side, 0), (0, side), (side, side)] {
                imageops::replace(target, source, qx, qy);
            }
        }

        Ok(next)
    }

    /// Cells on a side.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Number of cells.
    pub fn capacity(&self) -> u64 {
        u64::from(self.size) * u64::from(self.size)
    }

    /// Pixels on a side.
    pub fn pixel_side(&self) -> u32 {
        self.size * CELL_PIXELS
    }

    /// Surface for animation phase `phase` (wraps).
    pub fn frame(&self, phase: usize) -> &RgbaImage {
        &self.frames[phase % PHASES]
    }

    /// Write both phases of a cell and record its provenance.
    pub(crate) fn write(&mut self, x: u32, y: u32, bitmaps: &[TileBitmap; PHASES], entry: CatalogEntry) {
        for (surface, bitmap) in self.frames.iter_mut().zip(bitmaps) {
            bitmap.blit(surface, x * CELL_PIXELS, y * CELL_PIXELS);
        }
        self.cells.insert((x, y), entry);
    }

    /// Provenance recorded at `(x, y)` on this level.
    pub fn entry_at(&self, x: u32, y: u32) -> Option<&CatalogEntry> {
        self.cells.get(&(x, y))
    }

    /// All recorded cells.
    pub fn cells(&self) -> impl Iterator<Item = (&(u32, u32), &CatalogEntry)> {
        self.cells.iter()
    }

    /// Number of recorded cells.
    pub fn placed(&self) -> usize {
        self.cells.len()
    }
}

impl ProvenanceMap for AtlasLevel {
    fn size(&self) -> u32 {
        self.size
    }

    fn entry_at(&self, x: u32, y: u32) -> Option<&CatalogEntry> {
        AtlasLevel::entry_at(self, x, y)
    }
}

/// Allocate a zeroed surface without aborting on allocation failure.
fn allocate_surface(size: u32, limit: usize) -> Result<RgbaImage> {
    let side = size.checked_mul(CELL_PIXELS);
    let bytes = side.and_then(|s| (s as usize).checked_mul(s as usize)?.checked_mul(4));

    let (side, bytes) = match (side, bytes) {
        (Some(side), Some(bytes)) => (side, bytes),
        _ => return Err(MosaicError::Allocation { size, bytes: usize::MAX }),
    };

    if bytes > limit {
        return Err(MosaicError::Allocation { size, bytes });
    }

    let mut buffer: Vec<u8> = Vec::new();
    buffer
        .try_reserve_exact(bytes)
        .map_err(|_| MosaicError::Allocation { size, bytes })?;
    buffer.resize(bytes, 0);

    RgbaImage::from_raw(side, side, buffer).ok_or(MosaicError::Allocation { size, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Colour;

    fn entry(id: &str) -> CatalogEntry {
        CatalogEntry::new(id, "title", "author")
    }

    fn bitmaps(a: Colour, b: Colour) -> [TileBitmap; PHASES] {
        [TileBitmap::filled(a), TileBitmap::filled(b)]
    }

    #[test]
    fn test_allocate_dimensions() {
        let level = AtlasLevel::allocate(4).unwrap();
        assert_eq!(level.size(), 4);
        assert_eq!(level.capacity(), 16);
        assert_eq!(level.frame(0).dimensions(), (32, 32));
        assert_eq!(level.frame(1).dimensions(), (32, 32));
        assert_eq!(level.placed(), 0);
    }

    #[test]
    fn test_write_both_phases() {
        let mut level = AtlasLevel::allocate(2).unwrap();
        level.write(1, 0, &bitmaps(Colour::WHITE, Colour::rgb(9, 8, 7)), entry("a"));

        assert_eq!(level.frame(0).get_pixel(8, 0).0, [255, 255, 255, 255]);
        assert_eq!(level.frame(1).get_pixel(15, 7).0, [9, 8, 7, 255]);
        assert_eq!(level.frame(0).get_pixel(0, 0).0, [0, 0, 0, 0]);
        assert_eq!(level.entry_at(1, 0), Some(&entry("a")));
        assert_eq!(level.entry_at(0, 0), None);
    }

    #[test]
    fn test_grown_from_replicates_quadrants() {
        let mut small = AtlasLevel::allocate(1).unwrap();
        small.write(0, 0, &bitmaps(Colour::WHITE, Colour::rgb(255, 0, 0)), entry("a"));

        let big = AtlasLevel::grown_from(&small, usize::MAX).unwrap();
        assert_eq!(big.size(), 2);
        for (x, y) in [(0, 0), (8, 0), (0, 8), (8, 8), (15, 15)] {
            assert_eq!(big.frame(0).get_pixel(x, y).0, [255, 255, 255, 255]);
            assert_eq!(big.frame(1).get_pixel(x, y).0, [255, 0, 0, 255]);
        }
        // Provenance stays with the level it was placed on
        assert_eq!(big.placed(), 0);
    }

    #[test]
    fn test_surface_limit() {
        // One 8×8 cell surface is 256 bytes
        assert!(AtlasLevel::allocate_within(1, 256).is_ok());
        let err = AtlasLevel::allocate_within(2, 256).unwrap_err();
        assert!(matches!(err, MosaicError::Allocation { size: 2, bytes: 1024 }));
    }

    #[test]
    fn test_oversized_level_is_allocation_error() {
        let err = AtlasLevel::allocate(u32::MAX).unwrap_err();
        assert!(matches!(err, MosaicError::Allocation { .. }));
    }
}
