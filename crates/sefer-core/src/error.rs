//! Error types for Sefer

use thiserror::Error;

use crate::scope::{Level, LevelScope};

/// Top-level error type for Sefer
#[derive(Debug, Error)]
pub enum SeferError {
    #[error("Place error: {0}")]
    Place(#[from] PlaceError),

    #[error("Scope error: {0}")]
    Scope(#[from] ScopeError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors related to loading the place table.
///
/// Bad rows are not errors; only an unreadable or unparseable source is.
#[derive(Debug, Error)]
pub enum PlaceError {
    #[error("Place source I/O error: {0}")]
    Io(String),

    #[error("Malformed place source: {0}")]
    Malformed(String),
}

impl From<std::io::Error> for PlaceError {
    fn from(err: std::io::Error) -> Self {
        PlaceError::Io(err.to_string())
    }
}

/// Errors related to scope tags
#[derive(Debug, Error)]
pub enum ScopeError {
    #[error("Unknown level: {0}")]
    UnknownLevel(String),

    #[error("Unknown level scope: {0}")]
    UnknownScope(String),

    #[error("Not an affiliation scope: {0}")]
    NotAffiliation(LevelScope),

    #[error("{0} selected before its parent levels")]
    SkippedLevel(Level),
}

/// Errors reported by a content store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(String),

    #[error("Content not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Conflicting write: {0}")]
    Conflict(String),
}

impl StoreError {
    /// Create a new NotFound error
    pub fn not_found(item: impl Into<String>) -> Self {
        Self::NotFound(item.into())
    }

    /// Create a new PermissionDenied error
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied(message.into())
    }

    /// Create a new Unavailable error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

/// Result type alias for Sefer operations
pub type SeferResult<T> = Result<T, SeferError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_error_display() {
        let err = PlaceError::Malformed("expected array".to_string());
        assert!(format!("{}", err).contains("Malformed place source"));
        assert!(format!("{}", err).contains("expected array"));

        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "places.json");
        let err: PlaceError = io_err.into();
        assert!(matches!(err, PlaceError::Io(_)));
        assert!(format!("{}", err).contains("places.json"));
    }

    #[test]
    fn test_scope_error_display() {
        let err = ScopeError::UnknownLevel("village".to_string());
        assert!(format!("{}", err).contains("village"));

        let err = ScopeError::NotAffiliation(LevelScope::Zone);
        assert!(format!("{}", err).contains("zone"));

        let err = ScopeError::SkippedLevel(Level::Woreda);
        assert!(format!("{}", err).contains("before its parent levels"));
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::not_found("post-42");
        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(format!("{}", err).contains("post-42"));

        assert!(format!("{}", StoreError::permission_denied("guest")).contains("Permission denied"));
        assert!(format!("{}", StoreError::unavailable("offline")).contains("offline"));
    }

    #[test]
    fn test_error_conversions() {
        let err: SeferError = PlaceError::Io("disk".to_string()).into();
        assert!(matches!(err, SeferError::Place(_)));

        let err: SeferError = ScopeError::UnknownScope("x".to_string()).into();
        assert!(matches!(err, SeferError::Scope(_)));

        let err: SeferError = StoreError::Conflict("likes".to_string()).into();
        assert!(matches!(err, SeferError::Store(_)));
        assert!(format!("{}", err).contains("Store error"));
    }
}
