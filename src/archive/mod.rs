//! Local archive of world documents.
//!
//! An archive directory holds one `<id>.bitsy.txt` file per document and a
//! catalog index, either `index.jsonl` or `index.csv`:
//!
//! ```text
//! archive/
//!   index.csv
//!   0A1B2C3D.bitsy.txt
//!   5E6F7A8B.bitsy.txt
//! ```

mod scanner;

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{MosaicError, Result};
use crate::ingest::DocumentSource;
use crate::parser::{parse_catalog, CatalogFormat};
use crate::types::CatalogEntry;

pub use scanner::{document_id, scan_documents, DOCUMENT_SUFFIX};

/// Index file names, in lookup order.
pub const INDEX_FILES: [(&str, CatalogFormat); 2] = [
    ("index.jsonl", CatalogFormat::JsonLines),
    ("index.csv", CatalogFormat::Csv),
];

/// Supplies the ordered catalog and, optionally, the set of ids that exist.
pub trait Catalog {
    fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>>;

    /// `None` when the catalog cannot tell which documents exist.
    fn fetch_availability(&self) -> Result<Option<HashSet<String>>> {
        Ok(None)
    }
}

/// An archive directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct DirectoryArchive {
    root: PathBuf,
    index: PathBuf,
    format: CatalogFormat,
}

impl DirectoryArchive {
    /// Open an archive directory, locating its index file.
    pub fn open(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(MosaicError::Io {
                path: root.to_path_buf(),
                message: "Archive directory does not exist".to_string(),
            });
        }

        for (name, format) in INDEX_FILES {
            let index = root.join(name);
            if index.is_file() {
                debug!(index = %index.display(), "Opened archive");
                return Ok(Self {
                    root: root.to_path_buf(),
                    index,
                    format,
                });
            }
        }

        Err(MosaicError::Build {
            message: format!("No catalog index in {}", root.display()),
            help: Some("Add an index.jsonl or index.csv listing the archived documents".to_string()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index_path(&self) -> &Path {
        &self.index
    }

    /// Path a document with this id would live at.
    pub fn document_path(&self, source_id: &str) -> PathBuf {
        self.root.join(format!("{}{}", source_id, DOCUMENT_SUFFIX))
    }
}

impl Catalog for DirectoryArchive {
    fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>> {
        let content = fs::read_to_string(&self.index).map_err(|e| MosaicError::Io {
            path: self.index.clone(),
            message: format!("Failed to read catalog index: {}", e),
        })?;

        parse_catalog(&content, self.format)
    }

    fn fetch_availability(&self) -> Result<Option<HashSet<String>>> {
        Ok(Some(scan_documents(&self.root)))
    }
}

impl DocumentSource for DirectoryArchive {
    fn fetch_document(&self, source_id: &str) -> Result<String> {
        if source_id.is_empty() || source_id.contains(['/', '\\']) || source_id.starts_with('.') {
            return Err(MosaicError::NotFound {
                source_id: source_id.to_string(),
            });
        }

        fs::read_to_string(self.document_path(source_id)).map_err(|e| match e.kind() {
            ErrorKind::NotFound => MosaicError::NotFound {
                source_id: source_id.to_string(),
            },
            _ => MosaicError::Retrieval {
                source_id: source_id.to_string(),
                message: e.to_string(),
            },
        })
    }
}
