//! Catalog provenance carried alongside every placed cell.

use serde::{Deserialize, Serialize};

/// One catalog row describing a source document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub title: String,
    #[serde(rename = "sourceId", alias = "boid")]
    pub source_id: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl CatalogEntry {
    pub fn new(
        source_id: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            source_id: source_id.into(),
            author: author.into(),
            url: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_boid_alias() {
        let entry: CatalogEntry =
            serde_json::from_str(r#"{"title":"Moss","boid":"0A1B2C3D","author":"ana"}"#).unwrap();
        assert_eq!(entry, CatalogEntry::new("0A1B2C3D", "Moss", "ana"));
    }

    #[test]
    fn test_serialize_skips_missing_url() {
        let entry = CatalogEntry::new("id", "t", "a");
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("url"));
        assert!(json.contains("\"sourceId\":\"id\""));
    }
}
