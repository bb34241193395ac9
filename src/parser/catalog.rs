//! Catalog index parser.
//!
//! Two index formats are accepted, one record per line:
//! - quoted CSV: `"<sourceId>","<date>","<title>","<author>","<url>"`
//! - JSON lines: `{"boid": "...", "title": "...", "author": "...", "url": "..."}`

use crate::error::{MosaicError, Result};
use crate::types::CatalogEntry;

/// Index file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    Csv,
    JsonLines,
}

/// Parse a catalog index, skipping blank lines.
pub fn parse_catalog(source: &str, format: CatalogFormat) -> Result<Vec<CatalogEntry>> {
    source
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| match format {
            CatalogFormat::Csv => parse_csv_record(line, i + 1),
            CatalogFormat::JsonLines => parse_json_record(line, i + 1),
        })
        .collect()
}

/// Parse one quoted-CSV record.
fn parse_csv_record(line: &str, line_number: usize) -> Result<CatalogEntry> {
    let trimmed = line.trim();
    let inner = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    let fields: Vec<&str> = inner.split("\",\"").collect();

    if fields.len() < 4 {
        return Err(MosaicError::Parse {
            line: line_number,
            text: line.to_string(),
            message: format!("expected at least 4 catalog fields, found {}", fields.len()),
        });
    }

    let entry = CatalogEntry::new(fields[0], fields[2], fields[3]);
    Ok(match fields.get(4) {
        Some(url) if !url.is_empty() => entry.with_url(*url),
        _ => entry,
    })
}

/// Parse one JSON-lines record.
fn parse_json_record(line: &str, line_number: usize) -> Result<CatalogEntry> {
    serde_json::from_str(line).map_err(|e| MosaicError::Parse {
        line: line_number,
        text: line.to_string(),
        message: format!("invalid catalog record: {}", e),
    })
}
