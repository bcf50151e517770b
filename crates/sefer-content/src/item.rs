//! Content items and their scope fields

use std::fmt;

use chrono::{DateTime, Utc};
use sefer_core::Scope;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier of a content item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentId(pub Uuid);

impl ContentId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The collections a feed can be built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Post,
    Product,
    Article,
    Organization,
}

/// Engagement counters kept per item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Counter {
    Likes,
    Saves,
    Views,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    pub likes: u64,
    pub saves: u64,
    pub views: u64,
}

impl Counters {
    pub fn get(&self, counter: Counter) -> u64 {
        match counter {
            Counter::Likes => self.likes,
            Counter::Saves => self.saves,
            Counter::Views => self.views,
        }
    }

    pub fn set(&mut self, counter: Counter, value: u64) {
        match counter {
            Counter::Likes => self.likes = value,
            Counter::Saves => self.saves = value,
            Counter::Views => self.views = value,
        }
    }

    /// Add `delta` to `counter`, saturating at zero. Returns the new value.
    pub fn apply(&mut self, counter: Counter, delta: i64) -> u64 {
        let current = self.get(counter);
        let next = if delta < 0 {
            current.saturating_sub(delta.unsigned_abs())
        } else {
            current.saturating_add(delta as u64)
        };
        self.set(counter, next);
        next
    }
}

/// What a user submits; the store assigns identity, time, and order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDraft {
    pub kind: ContentKind,
    pub title: String,
    pub body: String,
    pub author: String,
}

impl ContentDraft {
    pub fn new(kind: ContentKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            body: String::new(),
            author: String::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }
}

/// A stored post, product, article or organization.
///
/// The scope is fixed at creation and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: ContentId,
    pub kind: ContentKind,
    pub title: String,
    pub body: String,
    pub author: String,
    #[serde(flatten)]
    pub scope: Scope,
    pub created_at: DateTime<Utc>,
    /// Store insertion order; breaks ties between equal timestamps
    pub seq: u64,
    pub counters: Counters,
}

impl ContentItem {
    /// Materialize a draft with store-assigned fields
    pub fn from_draft(draft: ContentDraft, scope: Scope, created_at: DateTime<Utc>, seq: u64) -> Self {
        Self {
            id: ContentId::generate(),
            kind: draft.kind,
            title: draft.title,
            body: draft.body,
            author: draft.author,
            scope,
            created_at,
            seq,
            counters: Counters::default(),
        }
    }
}
