//! Inspect command implementation.
//!
//! Parses one world document and prints what the atlas would take from it.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::error::{MosaicError, Result};
use crate::output::{display_path, plural, Printer};
use crate::parser::parse_world_str;
use crate::render::select_palette;
use crate::types::{Bucket, World};

/// Parse a world document and summarise it
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// World document (*.bitsy.txt)
    pub file: PathBuf,

    /// Print the summary as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// What a document contributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorldSummary {
    pub palettes: usize,
    pub tiles: usize,
    pub sprites: usize,
    pub items: usize,
    pub rooms: usize,
    /// Id of the palette objects are drawn with
    pub palette: String,
}

impl WorldSummary {
    pub fn of(world: &World) -> Self {
        Self {
            palettes: world.palettes.len(),
            tiles: world.bucket(Bucket::Tile).len(),
            sprites: world.bucket(Bucket::Sprite).len(),
            items: world.bucket(Bucket::Item).len(),
            rooms: world.rooms.len(),
            palette: select_palette(world).id,
        }
    }
}

pub fn run(args: InspectArgs, printer: &Printer) -> Result<()> {
    let source = fs::read_to_string(&args.file).map_err(|e| MosaicError::Io {
        path: args.file.clone(),
        message: format!("Failed to read file: {}", e),
    })?;
    let world = parse_world_str(&source)?;
    let summary = WorldSummary::of(&world);

    if args.json {
        let json = serde_json::to_string_pretty(&summary).map_err(|e| MosaicError::Build {
            message: format!("Failed to serialize summary: {}", e),
            help: None,
        })?;
        println!("{}", json);
        return Ok(());
    }

    printer.status("Parsed", &display_path(&args.file));
    printer.info("Palettes", &plural(summary.palettes, "palette", "palettes"));
    for bucket in Bucket::ALL {
        let names: Vec<&str> = world.bucket(bucket).keys().map(String::as_str).collect();
        let count = plural(names.len(), "object", "objects");
        printer.info(bucket.as_str(), &format!("{} {}", count, printer.dim(&names.join(", "))));
    }
    printer.info("Rooms", &plural(summary.rooms, "room", "rooms"));
    printer.info("Selected", &format!("palette {}", summary.palette));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_summary() {
        let frame = "00000000\n".repeat(8);
        let source = format!(
            "PAL 1\n10,10,10\n10,10,10\n\nPAL 2\n0,0,0\n255,255,255\n\nROOM r\nPAL 2\n\nTIL a\n{f}\nSPR b\n{f}\nITM c\n{f}\nITM d\n{f}",
            f = frame
        );
        let world = parse_world_str(&source).unwrap();

        assert_eq!(
            WorldSummary::of(&world),
            WorldSummary {
                palettes: 2,
                tiles: 1,
                sprites: 1,
                items: 2,
                rooms: 1,
                palette: "2".to_string(),
            }
        );
    }

    #[test]
    fn test_run_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("w.bitsy.txt");
        fs::write(&path, "PAL 0\n0,0,0\n255,255,255\n").unwrap();

        let args = InspectArgs { file: path, json: true };
        run(args, &Printer::plain()).unwrap();
    }

    #[test]
    fn test_run_missing_file() {
        let args = InspectArgs {
            file: PathBuf::from("/nonexistent/w.bitsy.txt"),
            json: false,
        };
        assert!(run(args, &Printer::plain()).is_err());
    }
}
