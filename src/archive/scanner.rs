//! Availability scan for archive directories.
//!
//! A document is available when `<id>.bitsy.txt` exists directly inside the
//! archive root.

use std::collections::HashSet;
use std::path::Path;

use walkdir::WalkDir;

/// File suffix of archived world documents.
pub const DOCUMENT_SUFFIX: &str = ".bitsy.txt";

/// Source id of a document file, if the file name has the document suffix.
pub fn document_id(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    let id = name.strip_suffix(DOCUMENT_SUFFIX)?;
    (!id.is_empty()).then_some(id)
}

/// Collect the ids of every document directly inside `root`.
pub fn scan_documents(root: &Path) -> HashSet<String> {
    if !root.exists() {
        return HashSet::new();
    }

    WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| document_id(entry.path()).map(str::to_string))
        .collect()
}
