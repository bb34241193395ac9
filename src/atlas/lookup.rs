//! Reverse coordinate lookup.
//!
//! The displayed surface repeats, so a clicked grid coordinate is wrapped into
//! each level's grid before looking it up. Levels are searched from the active
//! level down to the smallest; the first hit wins.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MosaicError, Result};
use crate::types::CatalogEntry;

use super::AtlasStore;

/// A level that can answer "what was placed at this cell".
pub trait ProvenanceMap {
    /// Cells on a side.
    fn size(&self) -> u32;

    /// Provenance at an in-range cell.
    fn entry_at(&self, x: u32, y: u32) -> Option<&CatalogEntry>;
}

/// Walk `levels[..=active]` from largest to smallest looking for `(x, y)`.
pub fn locate_in<L: ProvenanceMap>(levels: &[L], active: usize, x: i64, y: i64) -> Option<&CatalogEntry> {
    let top = active.min(levels.len().checked_sub(1)?);

    levels[..=top].iter().rev().find_map(|level| {
        let size = i64::from(level.size());
        let wx = x.rem_euclid(size) as u32;
        let wy = y.rem_euclid(size) as u32;
        level.entry_at(wx, wy)
    })
}

/// Serialisable snapshot of every level's provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtlasIndex {
    /// Index into `levels` of the displayed level
    pub active: usize,
    pub levels: Vec<IndexLevel>,
}

/// One level's provenance keyed by `"x,y"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexLevel {
    pub size: u32,
    pub cells: BTreeMap<String, CatalogEntry>,
}

fn cell_key(x: u32, y: u32) -> String {
    format!("{},{}", x, y)
}

impl ProvenanceMap for IndexLevel {
    fn size(&self) -> u32 {
        self.size
    }

    fn entry_at(&self, x: u32, y: u32) -> Option<&CatalogEntry> {
        self.cells.get(&cell_key(x, y))
    }
}

impl AtlasIndex {
    /// Snapshot a live store.
    pub fn from_store(store: &AtlasStore) -> Self {
        let levels = store
            .levels()
            .iter()
            .map(|level| IndexLevel {
                size: level.size(),
                cells: level
                    .cells()
                    .map(|(&(x, y), entry)| (cell_key(x, y), entry.clone()))
                    .collect(),
            })
            .collect();

        Self {
            active: store.active_index(),
            levels,
        }
    }

    /// Same walk as [`AtlasStore::locate`].
    pub fn locate(&self, x: i64, y: i64) -> Option<&CatalogEntry> {
        locate_in(&self.levels, self.active, x, y)
    }

    /// Write as pretty JSON.
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| MosaicError::Build {
            message: format!("Failed to serialize atlas index: {}", e),
            help: None,
        })?;
        fs::write(path, json).map_err(|e| MosaicError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to write atlas index: {}", e),
        })
    }

    /// Read back an index written by [`AtlasIndex::write`].
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| MosaicError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read atlas index: {}", e),
        })?;
        serde_json::from_str(&content).map_err(|e| MosaicError::Build {
            message: format!("Invalid atlas index {}: {}", path.display(), e),
            help: Some("Regenerate it with `mosaic build`".to_string()),
        })
    }
}
