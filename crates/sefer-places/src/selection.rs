//! A user's hierarchical place selection and its canonical scope
//!
//! [`ScopeSelection`] is a plain value object: callers pass it into every
//! query instead of reading selection state from anywhere ambient. Changing
//! a level clears every level below it, so a selection is always a prefix
//! of some path in the catalog.
//!
//! The query-string form uses the keys `region`, `zone`, `woreda` and
//! `kebele`, omitting unselected levels. Decoding is validated against a
//! [`PlaceCatalog`]: a value that is not a child of the already-decoded
//! ancestors ends the selection there.
//!
//! Serialized, a selection uses the same keys as its query string
//! (`{"region":"Tigray","zone":"Mekelle"}`). Deserializing rejects a level
//! whose parent is missing but does not consult any catalog.

use std::sync::Arc;

use sefer_core::{COUNTRY_ROOT, Level, Scope, ScopeError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::PlaceCatalog;

/// Partial or complete choice of region, zone, woreda and kebele.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "SelectionKeys", try_from = "SelectionKeys")]
pub struct ScopeSelection {
    levels: [Option<String>; 4],
}

/// Wire form of a [`ScopeSelection`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct SelectionKeys {
    #[serde(skip_serializing_if = "Option::is_none")]
    region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    woreda: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kebele: Option<String>,
}

impl From<ScopeSelection> for SelectionKeys {
    fn from(selection: ScopeSelection) -> Self {
        let [region, zone, woreda, kebele] = selection.levels;
        Self {
            region,
            zone,
            woreda,
            kebele,
        }
    }
}

impl TryFrom<SelectionKeys> for ScopeSelection {
    type Error = ScopeError;

    fn try_from(keys: SelectionKeys) -> Result<Self, Self::Error> {
        let values = [keys.region, keys.zone, keys.woreda, keys.kebele];
        let mut selection = Self::new();
        for (level, value) in Level::ALL.into_iter().zip(values) {
            let Some(value) = value else { continue };
            if !selection.set(level, value) {
                return Err(ScopeError::SkippedLevel(level));
            }
        }
        Ok(selection)
    }
}

impl ScopeSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// The value chosen at `level`
    pub fn get(&self, level: Level) -> Option<&str> {
        self.levels[level.index()].as_deref()
    }

    pub fn region(&self) -> Option<&str> {
        self.get(Level::Region)
    }

    pub fn zone(&self) -> Option<&str> {
        self.get(Level::Zone)
    }

    pub fn woreda(&self) -> Option<&str> {
        self.get(Level::Woreda)
    }

    pub fn kebele(&self) -> Option<&str> {
        self.get(Level::Kebele)
    }

    /// Choose `value` at `level`, clearing every deeper level.
    ///
    /// Returns `false` and leaves the selection untouched if a shallower
    /// level is still unselected. An empty value clears `level` instead.
    pub fn set(&mut self, level: Level, value: impl Into<String>) -> bool {
        let value = value.into();
        let value = value.trim();
        if value.is_empty() {
            self.clear_from(level);
            return true;
        }
        if level.ancestors().iter().any(|&a| self.get(a).is_none()) {
            return false;
        }
        self.levels[level.index()] = Some(value.to_string());
        if let Some(child) = level.child() {
            self.clear_from(child);
        }
        true
    }

    pub fn set_region(&mut self, region: impl Into<String>) -> bool {
        self.set(Level::Region, region)
    }

    pub fn set_zone(&mut self, zone: impl Into<String>) -> bool {
        self.set(Level::Zone, zone)
    }

    pub fn set_woreda(&mut self, woreda: impl Into<String>) -> bool {
        self.set(Level::Woreda, woreda)
    }

    pub fn set_kebele(&mut self, kebele: impl Into<String>) -> bool {
        self.set(Level::Kebele, kebele)
    }

    /// Clear `level` and everything below it
    pub fn clear_from(&mut self, level: Level) {
        for slot in &mut self.levels[level.index()..] {
            *slot = None;
        }
    }

    /// Clear the whole selection
    pub fn clear(&mut self) {
        self.clear_from(Level::Region);
    }

    pub fn is_empty(&self) -> bool {
        self.region().is_none()
    }

    /// The deepest selected level
    pub fn depth(&self) -> Option<Level> {
        Level::ALL
            .into_iter()
            .rev()
            .find(|&level| self.get(level).is_some())
    }

    /// Selected values, shallowest first
    pub fn values(&self) -> Vec<&str> {
        self.levels.iter().map_while(|v| v.as_deref()).collect()
    }

    /// Canonicalize to the deepest selected level, or the default country root
    pub fn resolve(&self) -> Scope {
        self.resolve_under(COUNTRY_ROOT)
    }

    /// Canonicalize to the deepest selected level, or the country root
    /// labelled `root_label`
    pub fn resolve_under(&self, root_label: &str) -> Scope {
        match self.depth() {
            Some(level) => Scope::place(level, self.get(level).unwrap_or_default()),
            None => Scope::country_named(root_label),
        }
    }

    /// `(key, value)` pairs for the selected levels, shallowest first
    pub fn to_query_pairs(&self) -> Vec<(&'static str, &str)> {
        Level::ALL
            .into_iter()
            .filter_map(|level| self.get(level).map(|v| (level.as_str(), v)))
            .collect()
    }

    /// Encode as `region=...&zone=...`, percent-encoding values
    pub fn to_query_string(&self) -> String {
        self.to_query_pairs()
            .into_iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Rebuild a selection from decoded `(key, value)` pairs.
    ///
    /// Unknown keys are ignored. Levels are accepted shallowest first while
    /// each value is listed under the accepted ancestors; the first level that
    /// is missing or not listed ends the selection.
    pub fn from_pairs<'a, I>(pairs: I, catalog: &PlaceCatalog) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut raw: [Option<&str>; 4] = [None; 4];
        for (key, value) in pairs {
            if let Ok(level) = key.parse::<Level>() {
                raw[level.index()] = Some(value.trim());
            }
        }

        let mut selection = Self::new();
        for level in Level::ALL {
            let Some(value) = raw[level.index()].filter(|v| !v.is_empty()) else {
                break;
            };
            let ancestors = selection.values();
            if !catalog.listing(&ancestors).contains(&value) {
                debug!(
                    level = %level,
                    value,
                    "Ignoring scope value not listed under its ancestors"
                );
                break;
            }
            selection.levels[level.index()] = Some(value.to_string());
        }
        selection
    }

    /// Decode a query string, validating against `catalog`.
    ///
    /// A leading `?` is accepted and `+` decodes to a space. Undecodable
    /// values are dropped like unknown places.
    pub fn from_query_str(query: &str, catalog: &PlaceCatalog) -> Self {
        let decoded: Vec<(String, String)> = query
            .trim_start_matches('?')
            .split('&')
            .filter(|part| !part.is_empty())
            .filter_map(|part| {
                let (key, value) = part.split_once('=').unwrap_or((part, ""));
                let key = decode_component(key)?;
                let value = decode_component(value)?;
                Some((key, value))
            })
            .collect();

        Self::from_pairs(
            decoded.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            catalog,
        )
    }
}

fn decode_component(raw: &str) -> Option<String> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced).ok().map(|v| v.into_owned())
}

/// A selection validated against a shared catalog.
///
/// Owned by a single session; nothing here is shared between callers.
#[derive(Debug, Clone)]
pub struct ScopeResolver {
    catalog: Arc<PlaceCatalog>,
    selection: ScopeSelection,
}

impl ScopeResolver {
    pub fn new(catalog: Arc<PlaceCatalog>) -> Self {
        Self {
            catalog,
            selection: ScopeSelection::new(),
        }
    }

    /// Start from a deep link
    pub fn from_query_str(catalog: Arc<PlaceCatalog>, query: &str) -> Self {
        let selection = ScopeSelection::from_query_str(query, &catalog);
        Self { catalog, selection }
    }

    pub fn catalog(&self) -> &PlaceCatalog {
        &self.catalog
    }

    pub fn selection(&self) -> &ScopeSelection {
        &self.selection
    }

    /// The choices currently available at `level`.
    ///
    /// Empty when a shallower level is still unselected.
    pub fn options(&self, level: Level) -> Vec<&str> {
        let ancestors = self.selection.values();
        if ancestors.len() < level.index() {
            return Vec::new();
        }
        self.catalog.listing(&ancestors[..level.index()])
    }

    /// Choose `value` at `level` if the catalog lists it there.
    ///
    /// Returns `false` and leaves the selection untouched otherwise.
    pub fn select(&mut self, level: Level, value: &str) -> bool {
        let value = value.trim();
        if !self.options(level).contains(&value) {
            debug!(level = %level, value, "Rejected selection not listed in catalog");
            return false;
        }
        self.selection.set(level, value)
    }

    /// Clear `level` and everything below it
    pub fn clear_from(&mut self, level: Level) {
        self.selection.clear_from(level);
    }

    pub fn clear(&mut self) {
        self.selection.clear();
    }

    /// Canonical scope of the current selection, under the catalog's root label
    pub fn resolve(&self) -> Scope {
        self.selection.resolve_under(self.catalog.root_label())
    }

    pub fn to_query_string(&self) -> String {
        self.selection.to_query_string()
    }
}
