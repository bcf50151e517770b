//! # Sefer Content
//!
//! Scoped community content: posts, products, articles and organizations,
//! each attached to a [`Scope`](sefer_core::Scope) when it is created.
//!
//! ## Features
//!
//! - **ContentStore trait**: Abstraction over the external content store
//! - **InMemoryContentStore**: DashMap-backed implementation for tests and simulation
//! - **ContentScopeFilter**: Exact-match scope filtering, newest first, with an
//!   explicit [`RollupPolicy`] for descendant places
//! - **Optimistic counters**: Local-first likes/saves/views with rollback on failure
//!
//! ## Example
//!
//! ```rust,ignore
//! use sefer_content::{ContentDraft, ContentKind, ContentScopeFilter, ContentStore, InMemoryContentStore};
//! use sefer_core::{Level, Scope};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = InMemoryContentStore::new();
//!     let mekelle = Scope::place(Level::Zone, "Mekelle");
//!
//!     store
//!         .submit(ContentDraft::new(ContentKind::Post, "Market day moved"), mekelle.clone())
//!         .await
//!         .unwrap();
//!
//!     let feed = ContentScopeFilter::exact()
//!         .feed(&store, ContentKind::Post, &mekelle)
//!         .await
//!         .unwrap();
//!     assert_eq!(feed.len(), 1);
//! }
//! ```

pub mod filter;
pub mod item;
pub mod memory;
pub mod optimistic;

// Re-exports
pub use filter::{ContentScopeFilter, FilterConfig, RollupPolicy, matches_exact, sort_newest_first};
pub use item::{ContentDraft, ContentId, ContentItem, ContentKind, Counter, Counters};
pub use memory::InMemoryContentStore;
pub use optimistic::{CounterUpdate, apply_counter_update};
pub use sefer_core::StoreError;

use async_trait::async_trait;
use sefer_core::Scope;

/// Access to the external content store.
///
/// The store owns content; this crate only reads and writes through it.
/// Implementations report failures as [`StoreError`] and perform no retries
/// on behalf of the caller.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Persist a new item under `scope`.
    ///
    /// `scope` should come from resolving the author's current selection
    /// (or be an affiliation scope); the store does not validate it.
    async fn submit(&self, draft: ContentDraft, scope: Scope) -> Result<ContentItem, StoreError>;

    /// Fetch one item
    async fn get(&self, id: &ContentId) -> Result<Option<ContentItem>, StoreError>;

    /// All items of a kind, in no particular order
    async fn list(&self, kind: ContentKind) -> Result<Vec<ContentItem>, StoreError>;

    /// Add `delta` to a counter and return the stored value
    async fn adjust_counter(
        &self,
        id: &ContentId,
        counter: Counter,
        delta: i64,
    ) -> Result<u64, StoreError>;

    /// Number of stored items
    async fn count(&self) -> Result<usize, StoreError>;
}
