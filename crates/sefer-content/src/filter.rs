//! Scope filtering for feeds
//!
//! Every feed and tab narrows a content collection to one
//! `(levelScope, locationName)` pair. The default policy is exact match on
//! both fields: a kebele-scoped item does not appear in its woreda's feed.
//! Showing descendant content at an ancestor is available as an explicit
//! [`RollupPolicy::Descendants`], backed by the place catalog.

use std::collections::HashSet;
use std::sync::Arc;

use sefer_core::{Scope, StoreError};
use sefer_places::PlaceCatalog;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ContentStore;
use crate::item::{ContentItem, ContentKind};

/// Whether content scoped below a place is shown at that place
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollupPolicy {
    /// Only items scoped exactly to the requested place
    #[default]
    Exact,
    /// Also items scoped to any place below the requested one
    Descendants,
}

/// Feed filtering configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub rollup: RollupPolicy,
}

/// True iff both scope fields are equal
pub fn matches_exact(item: &ContentItem, scope: &Scope) -> bool {
    item.scope.level_scope == scope.level_scope && item.scope.location_name == scope.location_name
}

/// Newest first; equal timestamps keep insertion order
pub fn sort_newest_first(items: &mut [ContentItem]) {
    items.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.seq.cmp(&b.seq))
    });
}

/// Narrows content collections to a scope.
#[derive(Debug, Clone, Default)]
pub struct ContentScopeFilter {
    policy: RollupPolicy,
    catalog: Option<Arc<PlaceCatalog>>,
}

impl ContentScopeFilter {
    /// Exact-match filtering
    pub fn exact() -> Self {
        Self::default()
    }

    /// Include content scoped to descendants of the requested place
    pub fn with_rollup(catalog: Arc<PlaceCatalog>) -> Self {
        Self {
            policy: RollupPolicy::Descendants,
            catalog: Some(catalog),
        }
    }

    /// Build from configuration.
    ///
    /// Rollup needs the catalog; without one the filter falls back to exact.
    pub fn from_config(config: &FilterConfig, catalog: Option<Arc<PlaceCatalog>>) -> Self {
        match (config.rollup, catalog) {
            (RollupPolicy::Descendants, Some(catalog)) => Self::with_rollup(catalog),
            (RollupPolicy::Descendants, None) => {
                warn!("Rollup requested without a place catalog; using exact matching");
                Self::exact()
            }
            (RollupPolicy::Exact, catalog) => Self {
                policy: RollupPolicy::Exact,
                catalog,
            },
        }
    }

    pub fn policy(&self) -> RollupPolicy {
        self.policy
    }

    /// Every scope whose content is shown for `scope` under this policy
    pub fn audience(&self, scope: &Scope) -> HashSet<Scope> {
        let mut audience = HashSet::from([scope.clone()]);
        let catalog = match (&self.policy, &self.catalog) {
            (RollupPolicy::Descendants, Some(catalog)) => catalog,
            _ => return audience,
        };

        if scope.is_country() {
            audience.extend(catalog.iter().map(|(_, node)| node.scope()));
        } else if let Some(level) = scope.level() {
            // Names repeat across parents, so every same-named place contributes
            for &place in catalog.find_by_name(level, &scope.location_name) {
                audience.extend(
                    catalog
                        .descendants(place)
                        .into_iter()
                        .filter_map(|id| catalog.node(id))
                        .map(|node| node.scope()),
                );
            }
        }
        audience
    }

    /// True if `item` belongs in the feed for `scope`
    pub fn matches(&self, item: &ContentItem, scope: &Scope) -> bool {
        match self.policy {
            RollupPolicy::Exact => matches_exact(item, scope),
            RollupPolicy::Descendants => self.audience(scope).contains(&item.scope),
        }
    }

    /// The items belonging to `scope`, newest first
    pub fn filter<I>(&self, items: I, scope: &Scope) -> Vec<ContentItem>
    where
        I: IntoIterator<Item = ContentItem>,
    {
        let mut selected: Vec<ContentItem> = match self.policy {
            RollupPolicy::Exact => items
                .into_iter()
                .filter(|item| matches_exact(item, scope))
                .collect(),
            RollupPolicy::Descendants => {
                let audience = self.audience(scope);
                items
                    .into_iter()
                    .filter(|item| audience.contains(&item.scope))
                    .collect()
            }
        };
        sort_newest_first(&mut selected);
        selected
    }

    /// Fetch one kind of content from `store` and filter it to `scope`
    pub async fn feed<S>(
        &self,
        store: &S,
        kind: ContentKind,
        scope: &Scope,
    ) -> Result<Vec<ContentItem>, StoreError>
    where
        S: ContentStore + ?Sized,
    {
        let items = store.list(kind).await?;
        let total = items.len();
        let feed = self.filter(items, scope);
        debug!(
            ?kind,
            scope = %scope,
            policy = ?self.policy,
            total,
            shown = feed.len(),
            "Built scoped feed"
        );
        Ok(feed)
    }
}
