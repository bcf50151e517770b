//! Source rows of the place table
//!
//! The table is a JSON array of objects keyed `"Level 1"` (country) through
//! `"Level 5"` (kebele). A level may be missing, `null`, empty, or hold the
//! sentinel literal; any of those ends the branch at that level.

use std::fs;
use std::path::Path;

use sefer_core::{COUNTRY_ROOT, Level, PlaceError};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

/// One row of the place table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceRecord {
    #[serde(rename = "Level 1", default, deserialize_with = "lenient_text")]
    pub country: Option<String>,
    #[serde(rename = "Level 2", default, deserialize_with = "lenient_text")]
    pub region: Option<String>,
    #[serde(rename = "Level 3", default, deserialize_with = "lenient_text")]
    pub zone: Option<String>,
    #[serde(rename = "Level 4", default, deserialize_with = "lenient_text")]
    pub woreda: Option<String>,
    #[serde(rename = "Level 5", default, deserialize_with = "lenient_text")]
    pub kebele: Option<String>,
}

/// Accept strings and numbers (kebele codes are often numeric); anything
/// else reads as absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

impl PlaceRecord {
    /// Build a row under the default country root
    pub fn new(
        region: impl Into<String>,
        zone: impl Into<String>,
        woreda: impl Into<String>,
        kebele: impl Into<String>,
    ) -> Self {
        Self {
            country: Some(COUNTRY_ROOT.to_string()),
            region: Some(region.into()),
            zone: Some(zone.into()),
            woreda: Some(woreda.into()),
            kebele: Some(kebele.into()),
        }
    }

    /// The value stored for `level`, untouched
    pub fn raw(&self, level: Level) -> Option<&str> {
        match level {
            Level::Region => self.region.as_deref(),
            Level::Zone => self.zone.as_deref(),
            Level::Woreda => self.woreda.as_deref(),
            Level::Kebele => self.kebele.as_deref(),
        }
    }

    /// The trimmed value for `level`, or `None` if it is empty or the sentinel
    pub fn value(&self, level: Level, sentinel: &str) -> Option<&str> {
        self.raw(level)
            .map(str::trim)
            .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case(sentinel))
    }

    /// The chain of present levels, shallowest first.
    ///
    /// Stops at the first absent level: a woreda listed under a missing zone
    /// has no place in the tree. An empty result means the row has no region.
    pub fn chain(&self, sentinel: &str) -> Vec<(Level, &str)> {
        Level::ALL
            .into_iter()
            .map_while(|level| self.value(level, sentinel).map(|v| (level, v)))
            .collect()
    }

    /// True if a value appears below an absent level
    pub fn has_orphaned_levels(&self, sentinel: &str) -> bool {
        let depth = self.chain(sentinel).len();
        Level::ALL[depth..]
            .iter()
            .any(|&level| self.value(level, sentinel).is_some())
    }
}

/// Parse a JSON array of place rows
pub fn records_from_json(json: &str) -> Result<Vec<PlaceRecord>, PlaceError> {
    serde_json::from_str(json).map_err(|e| PlaceError::Malformed(e.to_string()))
}

/// Read and parse the place table at `path`
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<PlaceRecord>, PlaceError> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .map_err(|e| PlaceError::Io(format!("{}: {}", path.display(), e)))?;
    let records = records_from_json(&json)?;
    debug!(path = %path.display(), rows = records.len(), "Loaded place table");
    Ok(records)
}
