//! Growable multi-resolution tile atlas.
//!
//! The atlas places 8×8 cells along a space-filling curve. Each level is a
//! square grid twice the side of the one before; when the active level fills
//! up, the next level is allocated with the current image tiled into all four
//! quadrants and placement carries on with the same counter. Because the
//! curve keeps every distance below `4^k` inside the `2^k` square, cells
//! placed before growth are never overwritten by cells placed after it.
//!
//! # Example
//!
//! ```ignore
//! use mosaic::atlas::AtlasStore;
//!
//! let mut atlas = AtlasStore::new(0, 6)?;
//! atlas.grow_if_needed()?;
//! let (x, y) = atlas.place(bitmaps, entry)?;
//! assert_eq!(atlas.locate(x as i64, y as i64), Some(&entry));
//! ```

mod level;
mod lookup;

use tracing::{info, trace};

use crate::config::MosaicConfig;
use crate::curve::distance_to_coord;
use crate::error::{MosaicError, Result};
use crate::render::TileBitmap;
use crate::types::CatalogEntry;

pub use level::{AtlasLevel, CELL_PIXELS, PHASES};
pub use lookup::{locate_in, AtlasIndex, IndexLevel, ProvenanceMap};

/// Largest supported level count; level 15 is 32768 cells on a side.
pub const MAX_LEVELS: u32 = 16;

/// The atlas: allocated levels, the active one, and the shared placement counter.
#[derive(Debug)]
pub struct AtlasStore {
    /// Allocated levels, smallest first
    levels: Vec<AtlasLevel>,
    active: usize,
    counter: u64,
    ceiling: u64,
    max_size: u32,
    /// Largest single surface, in bytes, growth may allocate
    surface_limit: usize,
}

impl AtlasStore {
    /// Create an atlas whose first level is `2^initial_level` cells on a side
    /// and whose largest level is `2^(levels - 1)`.
    pub fn new(initial_level: u32, levels: u32) -> Result<Self> {
        if levels == 0 || levels > MAX_LEVELS || initial_level >= levels {
            return Err(MosaicError::Config {
                message: format!(
                    "invalid atlas levels: initial level {} of {} (maximum {})",
                    initial_level, levels, MAX_LEVELS
                ),
                help: Some("Use 1 to 16 levels with initial_level below levels".to_string()),
            });
        }

        let max_size = 1u32 << (levels - 1);
        let first = AtlasLevel::allocate(1 << initial_level)?;

        Ok(Self {
            levels: vec![first],
            active: 0,
            counter: 0,
            ceiling: u64::from(max_size) * u64::from(max_size),
            max_size,
            surface_limit: usize::MAX,
        })
    }

    /// Create an atlas sized and limited by `config`.
    pub fn from_config(config: &MosaicConfig) -> Result<Self> {
        let store = Self::new(config.initial_level, config.levels)?;
        Ok(match config.max_surface_bytes {
            Some(limit) => store.with_surface_limit(limit),
            None => store,
        })
    }

    /// Refuse to grow into a level whose surfaces exceed `bytes` each.
    pub fn with_surface_limit(mut self, bytes: usize) -> Self {
        self.surface_limit = bytes;
        self
    }

    /// The level currently being placed into and displayed.
    pub fn active_level(&self) -> &AtlasLevel {
        &self.levels[self.active]
    }

    /// Position of the active level in [`AtlasStore::levels`].
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// All allocated levels, smallest first.
    pub fn levels(&self) -> &[AtlasLevel] {
        &self.levels
    }

    /// Distance the next placement will use.
    pub fn placement_counter(&self) -> u64 {
        self.counter
    }

    /// Counter modulus: the capacity of the largest level.
    pub fn ceiling(&self) -> u64 {
        self.ceiling
    }

    /// Allocate and switch to the next level if the active one is full.
    ///
    /// Returns whether growth happened. On allocation failure the active level
    /// is left unchanged.
    pub fn grow_if_needed(&mut self) -> Result<bool> {
        let current = self.active_level();
        if self.counter != current.capacity() || current.size() >= self.max_size {
            return Ok(false);
        }

        if self.active + 1 == self.levels.len() {
            let next = AtlasLevel::grown_from(current, self.surface_limit)?;
            self.levels.push(next);
        }
        self.active += 1;

        info!(
            level = self.active,
            size = self.active_level().size(),
            counter = self.counter,
            "Grew atlas"
        );
        Ok(true)
    }

    /// Place a cell's two phases at the next curve position.
    ///
    /// Returns the cell written. Fails if the active level is full; call
    /// [`AtlasStore::grow_if_needed`] first.
    pub fn place(&mut self, bitmaps: [TileBitmap; PHASES], entry: CatalogEntry) -> Result<(u32, u32)> {
        let d = self.counter;
        let (x, y) = distance_to_coord(d);
        let size = u64::from(self.active_level().size());

        if x >= size || y >= size {
            return Err(MosaicError::Build {
                message: format!("placement {} falls outside the {}×{} active level", d, size, size),
                help: Some("Call grow_if_needed before placing".to_string()),
            });
        }

        let (x, y) = (x as u32, y as u32);
        trace!(counter = d, x, y, source_id = %entry.source_id, "Placing cell");

        self.levels[self.active].write(x, y, &bitmaps, entry);
        self.counter = (self.counter + 1) % self.ceiling;

        Ok((x, y))
    }

    /// Grow if needed, then place.
    pub fn insert(&mut self, bitmaps: [TileBitmap; PHASES], entry: CatalogEntry) -> Result<(u32, u32)> {
        self.grow_if_needed()?;
        self.place(bitmaps, entry)
    }

    /// Provenance shown at grid coordinate `(x, y)` of the repeating display.
    pub fn locate(&self, x: i64, y: i64) -> Option<&CatalogEntry> {
        locate_in(&self.levels, self.active, x, y)
    }

    /// Serialisable snapshot of the reverse lookup maps.
    pub fn index(&self) -> AtlasIndex {
        AtlasIndex::from_store(self)
    }
}
