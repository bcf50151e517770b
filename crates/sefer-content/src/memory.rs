//! In-memory content store
//!
//! This module provides an in-memory implementation of [`ContentStore`],
//! suitable for testing and simulation environments.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use sefer_core::{Clock, Scope, StoreError, SystemClock};
use tracing::{debug, trace};

use crate::ContentStore;
use crate::item::{ContentDraft, ContentId, ContentItem, ContentKind, Counter};

/// In-memory implementation of ContentStore
///
/// Uses `DashMap` for concurrent access to stored items. Reads and writes
/// can be switched to fail, which lets tests exercise rollback paths.
#[derive(Debug)]
pub struct InMemoryContentStore<C: Clock = SystemClock> {
    /// Map from content ID to item
    items: DashMap<ContentId, ContentItem>,
    /// Next insertion sequence number
    next_seq: AtomicU64,
    /// Source of creation timestamps
    clock: C,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl Default for InMemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryContentStore {
    /// Create a new in-memory store stamped by the system clock
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<C: Clock> InMemoryContentStore<C> {
    /// Create a store stamped by a custom clock
    pub fn with_clock(clock: C) -> Self {
        Self {
            items: DashMap::new(),
            next_seq: AtomicU64::new(0),
            clock,
            fail_writes: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
        }
    }

    /// Make every subsequent write fail with [`StoreError::Unavailable`]
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent read fail with [`StoreError::Unavailable`]
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("content store rejected the write"));
        }
        Ok(())
    }

    fn check_readable(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("content store rejected the read"));
        }
        Ok(())
    }
}

#[async_trait]
impl<C: Clock> ContentStore for InMemoryContentStore<C> {
    async fn submit(&self, draft: ContentDraft, scope: Scope) -> Result<ContentItem, StoreError> {
        self.check_writable()?;

        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        let item = ContentItem::from_draft(draft, scope, self.clock.now_utc(), seq);
        trace!(id = %item.id, scope = %item.scope, seq, "Storing content");

        self.items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn get(&self, id: &ContentId) -> Result<Option<ContentItem>, StoreError> {
        self.check_readable()?;
        Ok(self.items.get(id).map(|item| item.clone()))
    }

    async fn list(&self, kind: ContentKind) -> Result<Vec<ContentItem>, StoreError> {
        self.check_readable()?;
        Ok(self
            .items
            .iter()
            .filter(|item| item.kind == kind)
            .map(|item| item.clone())
            .collect())
    }

    async fn adjust_counter(
        &self,
        id: &ContentId,
        counter: Counter,
        delta: i64,
    ) -> Result<u64, StoreError> {
        self.check_writable()?;

        let mut item = self
            .items
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(id.to_string()))?;
        let value = item.counters.apply(counter, delta);
        debug!(id = %id, ?counter, delta, value, "Adjusted counter");
        Ok(value)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        self.check_readable()?;
        Ok(self.items.len())
    }
}
