//! Substring search over the place table
//!
//! Search runs over the flat rows, not the tree. For each row whose names
//! contain the query (case-insensitively), the deepest matching level is the
//! hit. Hits keep source row order; a place reached by several rows is
//! reported once, and the list is truncated to the configured limit.

use std::collections::HashSet;
use std::sync::Arc;

use sefer_core::Level;
use serde::Serialize;
use tracing::trace;

use crate::catalog::join_path;
use crate::config::CatalogConfig;
use crate::record::PlaceRecord;

/// One search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    /// Name of the matched place
    pub name: String,
    /// Level of the matched place
    pub level: Level,
    /// "Mekelle is a Zone"
    pub title: String,
    /// "in Tigray", or the country label for regions
    pub subtitle: String,
    /// Catalog path of the matched place
    pub path: String,
}

/// Search over an immutable snapshot of place rows.
#[derive(Debug, Clone)]
pub struct SearchIndex {
    records: Arc<[PlaceRecord]>,
    sentinel: String,
    root_label: String,
    limit: usize,
}

impl SearchIndex {
    pub fn new(records: impl Into<Arc<[PlaceRecord]>>, config: &CatalogConfig) -> Self {
        Self {
            records: records.into(),
            sentinel: config.sentinel.clone(),
            root_label: config.root_label.clone(),
            limit: config.search_limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Return at most `limit` places whose names contain `query`
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() || self.limit == 0 {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        let mut hits = Vec::new();
        for record in self.records.iter() {
            let chain = record.chain(&self.sentinel);
            let Some(depth) = chain
                .iter()
                .rposition(|(_, name)| name.to_lowercase().contains(&needle))
            else {
                continue;
            };

            let matched = &chain[..=depth];
            let names: Vec<&str> = matched.iter().map(|(_, name)| *name).collect();
            if !seen.insert(names.clone()) {
                continue;
            }

            hits.push(self.hit(matched, join_path(names)));
            if hits.len() == self.limit {
                break;
            }
        }

        trace!(query, hits = hits.len(), "Place search");
        hits
    }

    /// Build a hit for the last entry of `matched`, with its ancestors as context
    fn hit(&self, matched: &[(Level, &str)], path: String) -> SearchHit {
        let (level, name) = matched[matched.len() - 1];
        let ancestors: Vec<&str> = matched[..matched.len() - 1]
            .iter()
            .rev()
            .take(2)
            .map(|(_, name)| *name)
            .collect();

        let subtitle = if ancestors.is_empty() {
            self.root_label.clone()
        } else {
            format!("in {}", ancestors.join(", "))
        };

        SearchHit {
            name: name.to_string(),
            level,
            title: format!("{} is a {}", name, level.label()),
            subtitle,
            path,
        }
    }
}
