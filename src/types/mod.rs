//! Core domain types for mosaic.
//!
//! This module contains the data model shared by the pipeline:
//! - `Colour` - RGBA colour values and their packed forms
//! - `Palette` - Ordered colour lists with role slots
//! - `Frame` / `AnimatedGraphic` - One-bit 8×8 animation frames
//! - `World` - A parsed document (palettes, objects, rooms)
//! - `CatalogEntry` - Provenance for a source document

mod catalog;
mod colour;
mod graphic;
pub mod palette;
mod world;

pub use catalog::CatalogEntry;
pub use colour::{native_to_pixel, Colour};
pub use graphic::{AnimatedGraphic, Frame, FRAME_PIXELS, FRAME_SIDE};
pub use palette::Palette;
pub use world::{Bucket, RenderableObject, Room, World};
