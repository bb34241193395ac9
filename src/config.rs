//! Run configuration (mosaic.yaml) parsing.
//!
//! Every field is optional; a missing file or an empty document gives the
//! defaults. Command-line flags override values read from the file.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::atlas::MAX_LEVELS;
use crate::error::{MosaicError, Result};
use crate::types::Bucket;

/// Conventional configuration file name.
pub const CONFIG_FILE: &str = "mosaic.yaml";

/// Atlas and ingestion settings loaded from mosaic.yaml.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MosaicConfig {
    /// Number of levels; level `i` is `2^i` cells on a side.
    pub levels: u32,

    /// Level allocated at startup.
    pub initial_level: u32,

    /// Buckets whose objects are placed.
    pub show: Vec<Bucket>,

    /// Shuffle the catalog before ingesting.
    pub shuffle: bool,

    /// Seed for a reproducible shuffle.
    pub seed: Option<u64>,

    /// Only ingest entries by these authors. Empty means everyone.
    pub authors: Vec<String>,

    /// Maximum decomposed objects waiting for placement.
    pub pending_ceiling: usize,

    pub retrieval_interval_ms: u64,
    pub placement_interval_ms: u64,
    pub animation_interval_ms: u64,

    /// Refuse to grow the atlas into surfaces larger than this many bytes.
    pub max_surface_bytes: Option<usize>,
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            levels: 6,
            initial_level: 0,
            show: Bucket::ALL.to_vec(),
            shuffle: true,
            seed: None,
            authors: vec![],
            pending_ceiling: 64,
            retrieval_interval_ms: 100,
            placement_interval_ms: 20,
            animation_interval_ms: 400,
            max_surface_bytes: None,
        }
    }
}

impl MosaicConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| MosaicError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read config: {}", e),
        })?;

        Self::parse(&content)
    }

    /// Load `dir/mosaic.yaml` if present, defaults otherwise.
    pub fn load_or_default(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from a YAML string and validate it.
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = serde_yaml::from_str(content).map_err(|e| MosaicError::Config {
            message: format!("Invalid config: {}", e),
            help: Some(format!("Check {} syntax", CONFIG_FILE)),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the atlas or scheduler cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.levels == 0 || self.levels > MAX_LEVELS {
            return Err(invalid(
                format!("levels must be between 1 and {}, got {}", MAX_LEVELS, self.levels),
                "Level 15 is already 32768 cells on a side",
            ));
        }

        if self.initial_level >= self.levels {
            return Err(invalid(
                format!(
                    "initial_level {} must be below levels ({})",
                    self.initial_level, self.levels
                ),
                "Use initial_level: 0 to start from a single cell",
            ));
        }

        if self.pending_ceiling == 0 {
            return Err(invalid(
                "pending_ceiling must be at least 1".to_string(),
                "With a ceiling of 0 no document would ever be retrieved",
            ));
        }

        let intervals = [
            ("retrieval_interval_ms", self.retrieval_interval_ms),
            ("placement_interval_ms", self.placement_interval_ms),
            ("animation_interval_ms", self.animation_interval_ms),
        ];
        if let Some((name, _)) = intervals.iter().find(|(_, ms)| *ms == 0) {
            return Err(invalid(
                format!("{} must be greater than zero", name),
                "Intervals are in milliseconds",
            ));
        }

        Ok(())
    }

    pub fn retrieval_interval(&self) -> Duration {
        Duration::from_millis(self.retrieval_interval_ms)
    }

    pub fn placement_interval(&self) -> Duration {
        Duration::from_millis(self.placement_interval_ms)
    }

    pub fn animation_interval(&self) -> Duration {
        Duration::from_millis(self.animation_interval_ms)
    }

    /// Whether objects in `bucket` are placed.
    pub fn shows(&self, bucket: Bucket) -> bool {
        self.show.contains(&bucket)
    }
}

fn invalid(message: String, help: &str) -> MosaicError {
    MosaicError::Config {
        message,
        help: Some(help.to_string()),
    }
}
