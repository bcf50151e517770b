//! Configuration for the place catalog

use std::path::PathBuf;

use sefer_core::COUNTRY_ROOT;
use serde::{Deserialize, Serialize};

/// Marker used in the source table for "this branch ends here"
pub const DEFAULT_SENTINEL: &str = "No Data";

/// Maximum number of search hits returned by default
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Configuration for loading and querying the place table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// JSON file holding the place rows
    pub source: Option<PathBuf>,
    /// Literal that marks an absent lower level
    pub sentinel: String,
    /// Label of the country root
    pub root_label: String,
    /// Maximum number of search hits
    pub search_limit: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source: None,
            sentinel: DEFAULT_SENTINEL.to_string(),
            root_label: COUNTRY_ROOT.to_string(),
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

impl CatalogConfig {
    /// Create a configuration reading rows from `path`
    pub fn with_source(path: impl Into<PathBuf>) -> Self {
        Self {
            source: Some(path.into()),
            ..Self::default()
        }
    }

    /// Set the sentinel literal
    pub fn with_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.sentinel = sentinel.into();
        self
    }

    /// Set the country root label
    pub fn with_root_label(mut self, label: impl Into<String>) -> Self {
        self.root_label = label.into();
        self
    }

    /// Set the search result limit
    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit;
        self
    }
}
