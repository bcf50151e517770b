//! One immutable snapshot of the place table
//!
//! The catalog and the search index are both derived from the same rows and
//! never change afterwards, so a [`PlaceDirectory`] can be shared freely
//! across threads. [`PlaceDirectory::shared`] keeps one per process.

use std::sync::{Arc, OnceLock};

use sefer_core::PlaceError;
use tracing::info;

use crate::catalog::PlaceCatalog;
use crate::config::CatalogConfig;
use crate::record::{PlaceRecord, load_records};
use crate::search::{SearchHit, SearchIndex};
use crate::selection::{ScopeResolver, ScopeSelection};

static SHARED: OnceLock<Arc<PlaceDirectory>> = OnceLock::new();

/// Catalog and search index over one set of rows
#[derive(Debug, Clone)]
pub struct PlaceDirectory {
    config: CatalogConfig,
    catalog: Arc<PlaceCatalog>,
    search: SearchIndex,
}

impl PlaceDirectory {
    /// Build from rows already in memory
    pub fn from_records(records: Vec<PlaceRecord>, config: CatalogConfig) -> Self {
        let records: Arc<[PlaceRecord]> = records.into();
        let catalog = Arc::new(PlaceCatalog::build(&records, &config));
        let search = SearchIndex::new(Arc::clone(&records), &config);
        Self {
            config,
            catalog,
            search,
        }
    }

    /// Load rows from the configured source
    pub fn load(config: CatalogConfig) -> Result<Self, PlaceError> {
        let source = config
            .source
            .clone()
            .ok_or_else(|| PlaceError::Io("no place source configured".to_string()))?;
        let records = load_records(&source)?;
        let directory = Self::from_records(records, config);
        let report = directory.catalog.report();
        info!(
            source = %source.display(),
            rows = report.rows_seen,
            dropped = report.rows_dropped,
            nodes = report.nodes,
            "Place directory ready"
        );
        Ok(directory)
    }

    /// The process-wide directory, loading it on first use.
    ///
    /// Later calls return the cached directory and ignore `config`. If two
    /// threads race on the first load, the first to finish is kept.
    pub fn shared(config: CatalogConfig) -> Result<Arc<Self>, PlaceError> {
        if let Some(directory) = SHARED.get() {
            return Ok(Arc::clone(directory));
        }
        let loaded = Arc::new(Self::load(config)?);
        Ok(Arc::clone(SHARED.get_or_init(|| loaded)))
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn catalog(&self) -> &PlaceCatalog {
        &self.catalog
    }

    /// Shared handle to the catalog, for resolvers and filters
    pub fn catalog_handle(&self) -> Arc<PlaceCatalog> {
        Arc::clone(&self.catalog)
    }

    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        self.search.search(query)
    }

    /// A fresh resolver for one session
    pub fn resolver(&self) -> ScopeResolver {
        ScopeResolver::new(self.catalog_handle())
    }

    /// A resolver for one session, starting from a deep link
    pub fn resolver_from_query(&self, query: &str) -> ScopeResolver {
        ScopeResolver::from_query_str(self.catalog_handle(), query)
    }

    /// Decode a deep link against this directory's catalog
    pub fn parse_selection(&self, query: &str) -> ScopeSelection {
        ScopeSelection::from_query_str(query, &self.catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TABLE: &str = r#"[
        {"Level 1": "Ethiopia", "Level 2": "Tigray", "Level 3": "Mekelle", "Level 4": "No Data", "Level 5": "No Data"},
        {"Level 1": "Ethiopia", "Level 2": "Tigray", "Level 3": "Adwa", "Level 4": "No Data", "Level 5": "No Data"},
        {"Level 1": "Ethiopia", "Level 3": "Nowhere"}
    ]"#;

    fn table_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TABLE.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_from_source() {
        let file = table_file();
        let directory = PlaceDirectory::load(CatalogConfig::with_source(file.path())).unwrap();
        assert_eq!(directory.catalog().regions(), vec!["Tigray"]);
        assert_eq!(directory.catalog().report().rows_dropped, 1);
        assert_eq!(directory.search("kel")[0].title, "Mekelle is a Zone");
    }

    #[test]
    fn test_load_without_source_fails() {
        let err = PlaceDirectory::load(CatalogConfig::default()).unwrap_err();
        assert!(matches!(err, PlaceError::Io(_)));
    }

    #[test]
    fn test_resolver_and_deep_links() {
        let records = vec![PlaceRecord::new("Tigray", "Mekelle", "No Data", "No Data")];
        let directory = PlaceDirectory::from_records(records, CatalogConfig::default());

        let mut resolver = directory.resolver();
        assert!(resolver.select(sefer_core::Level::Region, "Tigray"));
        let selection = directory.parse_selection(&resolver.to_query_string());
        assert_eq!(&selection, resolver.selection());
    }

    #[test]
    fn test_root_label_reaches_search_and_resolution() {
        let records = vec![PlaceRecord::new("Tigray", "Mekelle", "No Data", "No Data")];
        let config = CatalogConfig::default().with_root_label("Federal Republic");
        let directory = PlaceDirectory::from_records(records, config);

        let region_hit = &directory.search("tig")[0];
        let country = directory.resolver().resolve();
        assert_eq!(region_hit.subtitle, "Federal Republic");
        assert_eq!(country.location_name, region_hit.subtitle);
        assert!(directory.catalog().resolves(&country));

        let linked = directory.resolver_from_query("zone=Mekelle");
        assert_eq!(linked.resolve(), country);
        let linked = directory.resolver_from_query("region=Tigray");
        assert_eq!(linked.resolve().location_name, "Tigray");
    }

    #[test]
    fn test_shared_directory_is_cached() {
        let file = table_file();
        let first = PlaceDirectory::shared(CatalogConfig::with_source(file.path())).unwrap();
        let second = PlaceDirectory::shared(CatalogConfig::default()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
