//! Rendering module for mosaic.
//!
//! This module picks the palette a world is drawn with, rasterizes objects
//! into 8×8 cells, and writes atlas surfaces out as PNG.

mod png;
mod select;
mod tile;

pub use png::{scale_surface, write_png};
pub use select::{select_palette, DEFAULT_PALETTE_ID};
pub use tile::{rasterize, TileBitmap};
