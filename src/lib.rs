//! mosaic - Growable tile atlas for pixel-art world documents
//!
//! A library for parsing small pixel-art world documents, rasterizing their
//! tiles, sprites and items, and packing them into a multi-resolution atlas
//! addressed by a space-filling curve.

pub mod archive;
pub mod atlas;
pub mod cli;
pub mod config;
pub mod curve;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod output;
pub mod parser;
pub mod render;
pub mod types;

pub use archive::{Catalog, DirectoryArchive};
pub use atlas::{AtlasIndex, AtlasLevel, AtlasStore};
pub use config::MosaicConfig;
pub use curve::distance_to_coord;
pub use error::{MosaicError, Result};
pub use ingest::{
    prepare_catalog, BlockingRetriever, DocumentSource, IngestionScheduler, Retriever, TickReport,
    ThreadedRetriever,
};
pub use parser::{parse_catalog, parse_world, parse_world_str, CatalogFormat};
pub use render::{rasterize, select_palette, write_png, TileBitmap};
pub use types::{
    AnimatedGraphic, Bucket, CatalogEntry, Colour, Frame, Palette, RenderableObject, Room, World,
};
