//! # Sefer Core
//!
//! Core types, traits, and errors shared by every Sefer crate.
//!
//! Every piece of community content is attached to a place in a fixed
//! administrative geography (region → zone → woreda → kebele) beneath a
//! single country root. This crate holds the vocabulary used to talk about
//! those places without depending on the place catalog itself.
//!
//! ## Key Types
//!
//! - [`Level`]: One of the four administrative depths below the country
//! - [`LevelScope`]: The audience tag carried by content (geographic or affiliation)
//! - [`Scope`]: A `(levelScope, locationName)` pair identifying an audience
//! - [`Clock`]: Time abstraction for testability

pub mod error;
pub mod scope;
pub mod traits;

// Re-export main types
pub use error::*;
pub use scope::*;
pub use traits::*;
