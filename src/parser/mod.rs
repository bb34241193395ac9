//! Parser modules for mosaic input files.
//!
//! - [`world`] parses world documents (palettes, tiles, sprites, items, rooms)
//!   with an explicit destructive [`LineCursor`].
//! - [`catalog`] parses the catalog index that lists available documents.
//!
//! # Usage
//!
//! ```ignore
//! use mosaic::parser::parse_world_str;
//!
//! let source = std::fs::read_to_string("archive/955B75C9.bitsy.txt")?;
//! let world = parse_world_str(&source)?;
//!
//! for tile in world.tiles.values() {
//!     println!("Found: {}", tile.id);
//! }
//! ```

pub mod catalog;
mod cursor;
pub mod world;

pub use catalog::{parse_catalog, CatalogFormat};
pub use cursor::LineCursor;
pub use world::{parse_world, parse_world_str};
