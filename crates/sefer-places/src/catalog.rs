//! Arena-backed tree of administrative places
//!
//! The catalog is built once from the flat place table and never mutated
//! afterwards. Nodes live in a flat `Vec`; children and parents are indices
//! into it. A node is identified by its parent and its name, never by its
//! path string, so names containing the path separator cannot collide.
//!
//! ## Build
//!
//! Each row contributes the chain of its present levels (see
//! [`PlaceRecord::chain`]). Walking that chain, the first row to reach a
//! `(parent, name)` pair creates its node and later rows reuse it, so
//! repeated regions or zones collapse into one node regardless of row
//! order. Rows without a region are dropped and counted in the
//! [`CatalogReport`]; building never fails.
//!
//! ## Paths
//!
//! [`PlaceNode::path`] joins the chain with [`PATH_SEPARATOR`], escaping any
//! separator or backslash inside a name with a backslash. Distinct nodes
//! therefore always have distinct paths.

use std::borrow::Cow;
use std::collections::HashMap;

use sefer_core::{COUNTRY_ROOT, Level, Scope};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::CatalogConfig;
use crate::record::PlaceRecord;

/// Separator between ancestor names in a node path
pub const PATH_SEPARATOR: char = '/';

const PATH_ESCAPE: char = '\\';

/// Escape one name for use as a path segment
pub fn escape_segment(name: &str) -> Cow<'_, str> {
    if !name.contains([PATH_SEPARATOR, PATH_ESCAPE]) {
        return Cow::Borrowed(name);
    }
    let mut escaped = String::with_capacity(name.len() + 2);
    for c in name.chars() {
        if c == PATH_SEPARATOR || c == PATH_ESCAPE {
            escaped.push(PATH_ESCAPE);
        }
        escaped.push(c);
    }
    Cow::Owned(escaped)
}

/// Join names, region first, into a node path ("Tigray/Mekelle")
pub fn join_path<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    let mut path = String::new();
    for name in names {
        if !path.is_empty() {
            path.push(PATH_SEPARATOR);
        }
        path.push_str(&escape_segment(name));
    }
    path
}

/// Index of a node in the catalog arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PlaceId(u32);

impl PlaceId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A place in the administrative tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaceNode {
    pub name: String,
    pub level: Level,
    /// Ancestor names and this node's name, escaped and joined by [`PATH_SEPARATOR`]
    pub path: String,
    /// Children, sorted by name
    pub children: Vec<PlaceId>,
    /// Back-reference for breadcrumbs; regions have none
    pub parent: Option<PlaceId>,
}

impl PlaceNode {
    /// The scope a content item placed here would carry
    pub fn scope(&self) -> Scope {
        Scope::place(self.level, self.name.clone())
    }
}

/// Data-quality summary of a catalog build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatalogReport {
    /// Rows offered to the build
    pub rows_seen: usize,
    /// Rows dropped for lacking a region
    pub rows_dropped: usize,
    /// Rows whose values continued below an absent level
    pub rows_truncated: usize,
    /// Distinct nodes in the tree
    pub nodes: usize,
}

/// The administrative tree and its listing queries.
#[derive(Debug, Clone)]
pub struct PlaceCatalog {
    nodes: Vec<PlaceNode>,
    roots: Vec<PlaceId>,
    by_path: HashMap<String, PlaceId>,
    by_name: HashMap<Level, HashMap<String, Vec<PlaceId>>>,
    root_label: String,
    report: CatalogReport,
}

impl Default for PlaceCatalog {
    fn default() -> Self {
        Self::empty(COUNTRY_ROOT)
    }
}

impl PlaceCatalog {
    /// Build with the default sentinel
    pub fn from_records(records: &[PlaceRecord]) -> Self {
        Self::build(records, &CatalogConfig::default())
    }

    fn empty(root_label: &str) -> Self {
        Self {
            nodes: Vec::new(),
            roots: Vec::new(),
            by_path: HashMap::new(),
            by_name: HashMap::new(),
            root_label: root_label.to_string(),
            report: CatalogReport::default(),
        }
    }

    /// Build the tree from rows in one pass
    pub fn build(records: &[PlaceRecord], config: &CatalogConfig) -> Self {
        let mut catalog = Self::empty(&config.root_label);
        catalog.report.rows_seen = records.len();
        // (parent, name) -> node; only needed until children are sorted
        let mut by_child: HashMap<(Option<PlaceId>, &str), PlaceId> = HashMap::new();

        for (row, record) in records.iter().enumerate() {
            let chain = record.chain(&config.sentinel);
            if chain.is_empty() {
                warn!(row, "Dropping place row without a region");
                catalog.report.rows_dropped += 1;
                continue;
            }
            if record.has_orphaned_levels(&config.sentinel) {
                warn!(
                    row,
                    depth = chain.len(),
                    "Place row has values below an absent level; keeping the prefix"
                );
                catalog.report.rows_truncated += 1;
            }

            let mut parent: Option<PlaceId> = None;
            for (level, name) in chain {
                let id = match by_child.get(&(parent, name)) {
                    Some(&id) => id,
                    None => {
                        let id = catalog.insert(level, name, parent);
                        by_child.insert((parent, name), id);
                        id
                    }
                };
                parent = Some(id);
            }
        }

        catalog.sort_children();
        catalog.report.nodes = catalog.nodes.len();
        debug!(
            rows = catalog.report.rows_seen,
            dropped = catalog.report.rows_dropped,
            nodes = catalog.report.nodes,
            "Built place catalog"
        );
        catalog
    }

    /// Append a new node below `parent`
    fn insert(&mut self, level: Level, name: &str, parent: Option<PlaceId>) -> PlaceId {
        let segment = escape_segment(name);
        let path = match parent {
            Some(parent) => {
                format!("{}{}{}", self.nodes[parent.index()].path, PATH_SEPARATOR, segment)
            }
            None => segment.into_owned(),
        };

        let id = PlaceId(self.nodes.len() as u32);
        self.by_path.insert(path.clone(), id);
        self.nodes.push(PlaceNode {
            name: name.to_string(),
            level,
            path,
            children: Vec::new(),
            parent,
        });
        self.by_name
            .entry(level)
            .or_default()
            .entry(name.to_string())
            .or_default()
            .push(id);

        match parent {
            Some(parent) => self.nodes[parent.index()].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    fn sort_children(&mut self) {
        let names: Vec<String> = self.nodes.iter().map(|n| n.name.clone()).collect();
        self.roots.sort_by(|a, b| names[a.index()].cmp(&names[b.index()]));
        for node in &mut self.nodes {
            node.children
                .sort_by(|a, b| names[a.index()].cmp(&names[b.index()]));
        }
    }

    // ------------------------------------------------------------------
    // Listing queries
    // ------------------------------------------------------------------

    /// Distinct region names, sorted
    pub fn regions(&self) -> Vec<&str> {
        self.roots.iter().map(|&id| self.name(id)).collect()
    }

    /// Distinct zones of `region`, sorted
    pub fn zones_of(&self, region: &str) -> Vec<&str> {
        self.listing(&[region])
    }

    /// Distinct woredas of `region`/`zone`, sorted
    pub fn woredas_of(&self, region: &str, zone: &str) -> Vec<&str> {
        self.listing(&[region, zone])
    }

    /// Distinct kebeles of `region`/`zone`/`woreda`, sorted
    pub fn kebeles_of(&self, region: &str, zone: &str, woreda: &str) -> Vec<&str> {
        self.listing(&[region, zone, woreda])
    }

    /// Children names below the place named by `ancestors`.
    ///
    /// An empty slice lists regions; an unknown path lists nothing.
    pub fn listing(&self, ancestors: &[&str]) -> Vec<&str> {
        if ancestors.is_empty() {
            return self.regions();
        }
        self.lookup(ancestors)
            .map(|id| {
                self.nodes[id.index()]
                    .children
                    .iter()
                    .map(|&child| self.name(child))
                    .collect()
            })
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Node access
    // ------------------------------------------------------------------

    pub fn node(&self, id: PlaceId) -> Option<&PlaceNode> {
        self.nodes.get(id.index())
    }

    fn name(&self, id: PlaceId) -> &str {
        &self.nodes[id.index()].name
    }

    /// Look a node up by its full path ("Tigray/Mekelle"), as built by [`join_path`]
    pub fn find_path(&self, path: &str) -> Option<PlaceId> {
        self.by_path.get(path).copied()
    }

    /// Look a node up by its chain of names, region first.
    ///
    /// Walks the tree one name at a time; children are sorted by name.
    pub fn lookup(&self, names: &[&str]) -> Option<PlaceId> {
        let (first, rest) = names.split_first()?;
        let mut current = self.child_named(&self.roots, first)?;
        for name in rest {
            current = self.child_named(&self.nodes[current.index()].children, name)?;
        }
        Some(current)
    }

    fn child_named(&self, siblings: &[PlaceId], name: &str) -> Option<PlaceId> {
        siblings
            .binary_search_by(|&id| self.name(id).cmp(name))
            .ok()
            .map(|at| siblings[at])
    }

    /// Every node named `name` at `level`; names repeat under different parents
    pub fn find_by_name(&self, level: Level, name: &str) -> &[PlaceId] {
        self.by_name
            .get(&level)
            .and_then(|names| names.get(name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// True if some node at `level` is named `name`
    pub fn contains(&self, level: Level, name: &str) -> bool {
        !self.find_by_name(level, name).is_empty()
    }

    /// Label of the country root this catalog was built with
    pub fn root_label(&self) -> &str {
        &self.root_label
    }

    /// The country scope under this catalog's root label
    pub fn country_scope(&self) -> Scope {
        Scope::country_named(&self.root_label)
    }

    /// True if a geographic scope points at an existing place.
    ///
    /// The country scope resolves when it carries this catalog's root label;
    /// affiliation scopes never do.
    pub fn resolves(&self, scope: &Scope) -> bool {
        if scope.is_country() {
            return scope.location_name == self.root_label;
        }
        scope
            .level()
            .is_some_and(|level| self.contains(level, &scope.location_name))
    }

    pub fn roots(&self) -> &[PlaceId] {
        &self.roots
    }

    pub fn children(&self, id: PlaceId) -> &[PlaceId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn parent(&self, id: PlaceId) -> Option<PlaceId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Names from the region down to `id` inclusive
    pub fn breadcrumb(&self, id: PlaceId) -> Vec<&str> {
        let mut crumbs = Vec::new();
        let mut current = self.node(id).map(|_| id);
        while let Some(at) = current {
            crumbs.push(self.name(at));
            current = self.parent(at);
        }
        crumbs.reverse();
        crumbs
    }

    /// Every node below `id`, depth first, excluding `id` itself
    pub fn descendants(&self, id: PlaceId) -> Vec<PlaceId> {
        let mut out = Vec::new();
        let mut stack: Vec<PlaceId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Iterate every node in arena order
    pub fn iter(&self) -> impl Iterator<Item = (PlaceId, &PlaceNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (PlaceId(i as u32), node))
    }

    /// All node paths, for comparing catalogs
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.path.as_str())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn report(&self) -> CatalogReport {
        self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<PlaceRecord> {
        vec![
            PlaceRecord::new("Tigray", "Mekelle", "No Data", "No Data"),
            PlaceRecord::new("Tigray", "Adwa", "No Data", "No Data"),
            PlaceRecord::new("Amhara", "North Gondar", "Dabat", "01"),
            PlaceRecord::new("Amhara", "North Gondar", "Dabat", "02"),
            PlaceRecord::new("Amhara", "North Gondar", "Debark", "01"),
        ]
    }

    #[test]
    fn test_regions_sorted_and_deduplicated() {
        let catalog = PlaceCatalog::from_records(&sample());
        assert_eq!(catalog.regions(), vec!["Amhara", "Tigray"]);
    }

    #[test]
    fn test_listing_queries() {
        let catalog = PlaceCatalog::from_records(&sample());
        assert_eq!(catalog.zones_of("Tigray"), vec!["Adwa", "Mekelle"]);
        assert_eq!(
            catalog.woredas_of("Amhara", "North Gondar"),
            vec!["Dabat", "Debark"]
        );
        assert_eq!(
            catalog.kebeles_of("Amhara", "North Gondar", "Dabat"),
            vec!["01", "02"]
        );
        assert!(catalog.woredas_of("Tigray", "Mekelle").is_empty());
        assert!(catalog.zones_of("Afar").is_empty());
    }

    #[test]
    fn test_node_levels_follow_parents() {
        let catalog = PlaceCatalog::from_records(&sample());
        for (id, node) in catalog.iter() {
            match node.parent {
                None => assert_eq!(node.level, Level::Region),
                Some(parent) => {
                    let parent = catalog.node(parent).unwrap();
                    assert_eq!(Some(parent.level), node.level.parent());
                    assert!(parent.children.contains(&id));
                }
            }
        }
    }

    #[test]
    fn test_paths_are_unique() {
        let catalog = PlaceCatalog::from_records(&sample());
        let mut paths: Vec<&str> = catalog.paths().collect();
        let total = paths.len();
        paths.sort_unstable();
        paths.dedup();
        assert_eq!(paths.len(), total);
        // 2 regions, 3 zones, 2 woredas, 3 kebeles
        assert_eq!(total, 10);
    }

    #[test]
    fn test_repeated_names_under_different_parents() {
        let catalog = PlaceCatalog::from_records(&sample());
        let kebeles = catalog.find_by_name(Level::Kebele, "01");
        assert_eq!(kebeles.len(), 2);
        assert!(catalog.contains(Level::Kebele, "02"));
        assert!(!catalog.contains(Level::Zone, "01"));
    }

    #[test]
    fn test_breadcrumb_and_lookup() {
        let catalog = PlaceCatalog::from_records(&sample());
        let id = catalog
            .lookup(&["Amhara", "North Gondar", "Debark", "01"])
            .unwrap();
        assert_eq!(
            catalog.breadcrumb(id),
            vec!["Amhara", "North Gondar", "Debark", "01"]
        );
        assert_eq!(catalog.node(id).unwrap().path, "Amhara/North Gondar/Debark/01");
        assert_eq!(catalog.find_path("Amhara/North Gondar/Debark/01"), Some(id));
    }

    #[test]
    fn test_descendants() {
        let catalog = PlaceCatalog::from_records(&sample());
        let amhara = catalog.lookup(&["Amhara"]).unwrap();
        let names: Vec<&str> = catalog
            .descendants(amhara)
            .into_iter()
            .map(|id| catalog.node(id).unwrap().name.as_str())
            .collect();
        assert_eq!(names, vec!["North Gondar", "Dabat", "01", "02", "Debark", "01"]);

        let mekelle = catalog.lookup(&["Tigray", "Mekelle"]).unwrap();
        assert!(catalog.descendants(mekelle).is_empty());
    }

    #[test]
    fn test_rows_without_region_are_dropped() {
        let mut rows = sample();
        rows.push(PlaceRecord::new("", "Orphan Zone", "No Data", "No Data"));
        rows.push(PlaceRecord::new("No Data", "Other", "No Data", "No Data"));
        let catalog = PlaceCatalog::from_records(&rows);
        let report = catalog.report();
        assert_eq!(report.rows_seen, 7);
        assert_eq!(report.rows_dropped, 2);
        assert_eq!(report.nodes, catalog.len());
        assert!(!catalog.contains(Level::Zone, "Orphan Zone"));
    }

    #[test]
    fn test_branch_ends_at_first_sentinel() {
        let rows = vec![PlaceRecord::new("Somali", "No Data", "Jigjiga", "01")];
        let catalog = PlaceCatalog::from_records(&rows);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.report().rows_truncated, 1);
        assert!(!catalog.contains(Level::Woreda, "Jigjiga"));
    }

    #[test]
    fn test_empty_source_builds_empty_catalog() {
        let catalog = PlaceCatalog::from_records(&[]);
        assert!(catalog.is_empty());
        assert!(catalog.regions().is_empty());
    }

    #[test]
    fn test_separator_in_names_does_not_merge_places() {
        let slashed = PlaceRecord::new("A", "B/C", "No Data", "No Data");
        let nested = PlaceRecord::new("A", "B", "C", "No Data");

        for rows in [vec![slashed.clone(), nested.clone()], vec![nested, slashed]] {
            let catalog = PlaceCatalog::from_records(&rows);
            assert_eq!(catalog.len(), 4);
            assert_eq!(catalog.zones_of("A"), vec!["B", "B/C"]);
            assert_eq!(catalog.woredas_of("A", "B"), vec!["C"]);
            assert!(catalog.woredas_of("A", "B/C").is_empty());

            let zone = catalog.lookup(&["A", "B/C"]).unwrap();
            let woreda = catalog.lookup(&["A", "B", "C"]).unwrap();
            assert_eq!(catalog.node(zone).unwrap().level, Level::Zone);
            assert_eq!(catalog.node(woreda).unwrap().level, Level::Woreda);
            assert_eq!(catalog.node(zone).unwrap().path, "A/B\\/C");
            assert_eq!(catalog.node(woreda).unwrap().path, "A/B/C");
            assert_eq!(catalog.find_path(&join_path(["A", "B/C"])), Some(zone));
        }
    }

    #[test]
    fn test_escape_segment() {
        assert_eq!(escape_segment("Mekelle"), "Mekelle");
        assert!(matches!(escape_segment("Mekelle"), Cow::Borrowed(_)));
        assert_eq!(escape_segment("B/C"), "B\\/C");
        assert_eq!(escape_segment("B\\"), "B\\\\");
        // A trailing backslash cannot swallow the separator
        assert_ne!(join_path(["B\\", "C"]), join_path(["B\\/C"]));
    }

    #[test]
    fn test_lookup_unknown_chains() {
        let catalog = PlaceCatalog::from_records(&sample());
        assert_eq!(catalog.lookup(&[]), None);
        assert_eq!(catalog.lookup(&["Afar"]), None);
        assert_eq!(catalog.lookup(&["Tigray", "Dabat"]), None);
        assert_eq!(catalog.lookup(&["Amhara", "North Gondar", "Dabat", "01", "x"]), None);
    }

    #[test]
    fn test_resolves_scopes() {
        let catalog = PlaceCatalog::from_records(&sample());
        assert_eq!(catalog.root_label(), "Ethiopia");
        assert!(catalog.resolves(&Scope::country()));
        assert!(catalog.resolves(&Scope::place(Level::Zone, "Mekelle")));
        assert!(!catalog.resolves(&Scope::place(Level::Region, "Mekelle")));
        let school = Scope::affiliation(sefer_core::LevelScope::School, "Mekelle").unwrap();
        assert!(!catalog.resolves(&school));
    }

    #[test]
    fn test_custom_root_label() {
        let config = CatalogConfig::default().with_root_label("Ityop'iya");
        let catalog = PlaceCatalog::build(&sample(), &config);
        assert_eq!(catalog.country_scope(), Scope::country_named("Ityop'iya"));
        assert!(catalog.resolves(&catalog.country_scope()));
        assert!(!catalog.resolves(&Scope::country()));
    }

    #[test]
    fn test_custom_sentinel() {
        let rows = vec![PlaceRecord::new("Afar", "N/A", "N/A", "N/A")];
        let catalog = PlaceCatalog::build(&rows, &CatalogConfig::default().with_sentinel("N/A"));
        assert_eq!(catalog.len(), 1);
    }
}
