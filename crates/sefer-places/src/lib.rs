//! # Sefer Places
//!
//! The administrative hierarchy behind every scoped feed.
//!
//! A flat table of [`PlaceRecord`] rows (one per region/zone/woreda/kebele
//! combination) is turned into:
//!
//! - **[`PlaceCatalog`]**: an arena tree of [`PlaceNode`]s with
//!   level-scoped listing queries (regions, zones of a region, ...)
//! - **[`SearchIndex`]**: case-insensitive substring search over the rows,
//!   reporting the deepest matching level with breadcrumb context
//! - **[`ScopeSelection`] / [`ScopeResolver`]**: a user's partial selection,
//!   its canonical [`Scope`](sefer_core::Scope), and its query-string form
//!
//! [`PlaceDirectory`] bundles the three over one immutable snapshot and can
//! be cached for the lifetime of the process.
//!
//! ## Example
//!
//! ```rust
//! use sefer_places::{PlaceCatalog, PlaceRecord, ScopeSelection};
//! use sefer_core::LevelScope;
//!
//! let rows = vec![
//!     PlaceRecord::new("Tigray", "Mekelle", "No Data", "No Data"),
//!     PlaceRecord::new("Tigray", "Adwa", "No Data", "No Data"),
//! ];
//! let catalog = PlaceCatalog::from_records(&rows);
//! assert_eq!(catalog.regions(), vec!["Tigray"]);
//! assert_eq!(catalog.zones_of("Tigray"), vec!["Adwa", "Mekelle"]);
//!
//! let mut selection = ScopeSelection::new();
//! selection.set_region("Tigray");
//! selection.set_zone("Mekelle");
//! let scope = selection.resolve();
//! assert_eq!(scope.level_scope, LevelScope::Zone);
//! assert_eq!(scope.location_name, "Mekelle");
//! ```

pub mod catalog;
pub mod config;
pub mod directory;
pub mod record;
pub mod search;
pub mod selection;

pub use catalog::{
    CatalogReport, PATH_SEPARATOR, PlaceCatalog, PlaceId, PlaceNode, escape_segment, join_path,
};
pub use config::CatalogConfig;
pub use directory::PlaceDirectory;
pub use record::{PlaceRecord, load_records, records_from_json};
pub use search::{SearchHit, SearchIndex};
pub use selection::{ScopeResolver, ScopeSelection};
