//! Locate command implementation.
//!
//! Answers "which document is this cell from" against a written atlas index.

use std::path::PathBuf;

use clap::Args;

use crate::atlas::AtlasIndex;
use crate::error::{MosaicError, Result};
use crate::types::CatalogEntry;

/// Print the provenance of a grid cell as JSON
#[derive(Args, Debug)]
pub struct LocateArgs {
    /// Atlas index written by `mosaic build`
    pub index: PathBuf,

    /// Grid column (wraps around the repeating surface)
    #[arg(allow_negative_numbers = true)]
    pub x: i64,

    /// Grid row (wraps around the repeating surface)
    #[arg(allow_negative_numbers = true)]
    pub y: i64,
}

/// Look up a cell in the index at `args.index`.
pub fn lookup(args: &LocateArgs) -> Result<CatalogEntry> {
    let index = AtlasIndex::load(&args.index)?;
    index
        .locate(args.x, args.y)
        .cloned()
        .ok_or_else(|| MosaicError::Build {
            message: format!("Nothing placed at {},{}", args.x, args.y),
            help: Some("Coordinates are grid cells, not pixels".to_string()),
        })
}

pub fn run(args: LocateArgs) -> Result<()> {
    let entry = lookup(&args)?;
    let json = serde_json::to_string_pretty(&entry).map_err(|e| MosaicError::Build {
        message: format!("Failed to serialize entry: {}", e),
        help: None,
    })?;
    println!("{}", json);
    Ok(())
}
