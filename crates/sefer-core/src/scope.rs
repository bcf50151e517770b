//! Administrative levels and content scopes
//!
//! A [`Scope`] is the `(levelScope, locationName)` pair stored on every
//! content item. Geographic scopes name a place at one of the [`Level`]s
//! (or the country root); affiliation scopes carry an opaque label that has
//! no backing in the place hierarchy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScopeError;

/// Label of the fixed country root above every region.
pub const COUNTRY_ROOT: &str = "Ethiopia";

/// An administrative depth below the country root.
///
/// Ordering follows depth: `Region < Zone < Woreda < Kebele`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Region,
    Zone,
    Woreda,
    Kebele,
}

impl Level {
    /// All levels, shallowest first
    pub const ALL: [Level; 4] = [Level::Region, Level::Zone, Level::Woreda, Level::Kebele];

    /// Zero-based position below the country root
    pub fn index(self) -> usize {
        match self {
            Level::Region => 0,
            Level::Zone => 1,
            Level::Woreda => 2,
            Level::Kebele => 3,
        }
    }

    /// Column number in the source table ("Level 2" for regions, ...)
    pub fn source_column(self) -> u8 {
        self.index() as u8 + 2
    }

    /// The level directly above, or `None` for regions
    pub fn parent(self) -> Option<Level> {
        match self {
            Level::Region => None,
            Level::Zone => Some(Level::Region),
            Level::Woreda => Some(Level::Zone),
            Level::Kebele => Some(Level::Woreda),
        }
    }

    /// The level directly below, or `None` for kebeles
    pub fn child(self) -> Option<Level> {
        match self {
            Level::Region => Some(Level::Zone),
            Level::Zone => Some(Level::Woreda),
            Level::Woreda => Some(Level::Kebele),
            Level::Kebele => None,
        }
    }

    /// Levels strictly above this one, shallowest first
    pub fn ancestors(self) -> &'static [Level] {
        &Level::ALL[..self.index()]
    }

    /// Lowercase tag, also used as the query-string key
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Region => "region",
            Level::Zone => "zone",
            Level::Woreda => "woreda",
            Level::Kebele => "kebele",
        }
    }

    /// Human-readable label ("Zone")
    pub fn label(self) -> &'static str {
        match self {
            Level::Region => "Region",
            Level::Zone => "Zone",
            Level::Woreda => "Woreda",
            Level::Kebele => "Kebele",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "region" => Ok(Level::Region),
            "zone" => Ok(Level::Zone),
            "woreda" => Ok(Level::Woreda),
            "kebele" => Ok(Level::Kebele),
            other => Err(ScopeError::UnknownLevel(other.to_string())),
        }
    }
}

/// The audience tag carried by a content item.
///
/// The first five variants are geographic; `Community`, `Workplace` and
/// `School` are flat affiliation scopes with no place-hierarchy backing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelScope {
    Country,
    Region,
    Zone,
    Woreda,
    Kebele,
    Community,
    Workplace,
    School,
}

impl LevelScope {
    pub const ALL: [LevelScope; 8] = [
        LevelScope::Country,
        LevelScope::Region,
        LevelScope::Zone,
        LevelScope::Woreda,
        LevelScope::Kebele,
        LevelScope::Community,
        LevelScope::Workplace,
        LevelScope::School,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LevelScope::Country => "country",
            LevelScope::Region => "region",
            LevelScope::Zone => "zone",
            LevelScope::Woreda => "woreda",
            LevelScope::Kebele => "kebele",
            LevelScope::Community => "community",
            LevelScope::Workplace => "workplace",
            LevelScope::School => "school",
        }
    }

    /// The administrative level this scope names, if it names one.
    ///
    /// `Country` is geographic but sits above the levels, so it returns `None`.
    pub fn level(self) -> Option<Level> {
        match self {
            LevelScope::Region => Some(Level::Region),
            LevelScope::Zone => Some(Level::Zone),
            LevelScope::Woreda => Some(Level::Woreda),
            LevelScope::Kebele => Some(Level::Kebele),
            _ => None,
        }
    }

    /// True for `Country` and the four administrative levels
    pub fn is_geographic(self) -> bool {
        !self.is_affiliation()
    }

    /// True for the flat, ungrouped scopes
    pub fn is_affiliation(self) -> bool {
        matches!(
            self,
            LevelScope::Community | LevelScope::Workplace | LevelScope::School
        )
    }
}

impl From<Level> for LevelScope {
    fn from(level: Level) -> Self {
        match level {
            Level::Region => LevelScope::Region,
            Level::Zone => LevelScope::Zone,
            Level::Woreda => LevelScope::Woreda,
            Level::Kebele => LevelScope::Kebele,
        }
    }
}

impl fmt::Display for LevelScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LevelScope {
    type Err = ScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        LevelScope::ALL
            .into_iter()
            .find(|scope| scope.as_str() == tag)
            .ok_or(ScopeError::UnknownScope(tag))
    }
}

/// Which audience a content item belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope {
    pub level_scope: LevelScope,
    pub location_name: String,
}

impl Scope {
    /// Construct a scope from its raw parts.
    ///
    /// Content written with a geographic scope should take it from a
    /// resolved selection rather than from free text; otherwise the item
    /// may never be reachable by a scoped query.
    pub fn new(level_scope: LevelScope, location_name: impl Into<String>) -> Self {
        Self {
            level_scope,
            location_name: location_name.into(),
        }
    }

    /// The whole-country scope
    pub fn country() -> Self {
        Self::new(LevelScope::Country, COUNTRY_ROOT)
    }

    /// The whole-country scope under a configured root label
    pub fn country_named(label: impl Into<String>) -> Self {
        Self::new(LevelScope::Country, label)
    }

    /// A scope naming a place at `level`
    pub fn place(level: Level, name: impl Into<String>) -> Self {
        Self::new(level.into(), name)
    }

    /// A community, workplace or school scope with an opaque label
    pub fn affiliation(level_scope: LevelScope, label: impl Into<String>) -> Result<Self, ScopeError> {
        if !level_scope.is_affiliation() {
            return Err(ScopeError::NotAffiliation(level_scope));
        }
        Ok(Self::new(level_scope, label))
    }

    pub fn is_country(&self) -> bool {
        self.level_scope == LevelScope::Country
    }

    /// The administrative level named by this scope, if any
    pub fn level(&self) -> Option<Level> {
        self.level_scope.level()
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::country()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.level_scope, self.location_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_navigation() {
        assert_eq!(Level::Region.parent(), None);
        assert_eq!(Level::Kebele.child(), None);
        assert_eq!(Level::Zone.parent(), Some(Level::Region));
        assert_eq!(Level::Woreda.child(), Some(Level::Kebele));
        assert_eq!(Level::Woreda.ancestors(), &[Level::Region, Level::Zone]);
        assert!(Level::Region.ancestors().is_empty());
    }

    #[test]
    fn test_level_source_columns() {
        assert_eq!(Level::Region.source_column(), 2);
        assert_eq!(Level::Kebele.source_column(), 5);
    }

    #[test]
    fn test_level_parse() {
        assert_eq!("Zone".parse::<Level>().unwrap(), Level::Zone);
        assert_eq!(" kebele ".parse::<Level>().unwrap(), Level::Kebele);
        assert!(matches!(
            "country".parse::<Level>(),
            Err(ScopeError::UnknownLevel(_))
        ));
    }

    #[test]
    fn test_level_scope_classification() {
        assert!(LevelScope::Country.is_geographic());
        assert!(LevelScope::Kebele.is_geographic());
        assert!(LevelScope::School.is_affiliation());
        assert_eq!(LevelScope::Country.level(), None);
        assert_eq!(LevelScope::Woreda.level(), Some(Level::Woreda));
        assert_eq!(LevelScope::Community.level(), None);
    }

    #[test]
    fn test_level_scope_round_trips_through_str() {
        for scope in LevelScope::ALL {
            assert_eq!(scope.as_str().parse::<LevelScope>().unwrap(), scope);
        }
        assert!("village".parse::<LevelScope>().is_err());
    }

    #[test]
    fn test_scope_constructors() {
        let country = Scope::country();
        assert!(country.is_country());
        assert_eq!(country.location_name, COUNTRY_ROOT);
        assert_eq!(Scope::default(), country);

        let named = Scope::country_named("Ityop'iya");
        assert!(named.is_country());
        assert_ne!(named, country);

        let zone = Scope::place(Level::Zone, "Mekelle");
        assert_eq!(zone.level_scope, LevelScope::Zone);
        assert_eq!(zone.to_string(), "zone:Mekelle");

        assert!(Scope::affiliation(LevelScope::School, "Bahir Dar University").is_ok());
        assert!(matches!(
            Scope::affiliation(LevelScope::Zone, "Mekelle"),
            Err(ScopeError::NotAffiliation(LevelScope::Zone))
        ));
    }

    #[test]
    fn test_scope_wire_format() {
        let scope = Scope::place(Level::Zone, "Mekelle");
        let json = serde_json::to_string(&scope).unwrap();
        assert_eq!(json, r#"{"levelScope":"zone","locationName":"Mekelle"}"#);
        let back: Scope = serde_json::from_str(&json).unwrap();
        assert_eq!(back, scope);
    }
}
