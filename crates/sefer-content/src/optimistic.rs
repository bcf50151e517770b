//! Optimistic counter updates
//!
//! Likes, saves and views change on screen before the store confirms them.
//! A [`CounterUpdate`] records the prior value when it is applied locally;
//! settling it adopts the store's value on success or restores the prior
//! value on failure. No retry is attempted.

use sefer_core::StoreError;
use tracing::{trace, warn};

use crate::ContentStore;
use crate::item::{ContentId, ContentItem, Counter};

/// A counter change applied locally and not yet confirmed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "an optimistic update must be sent and settled"]
pub struct CounterUpdate {
    id: ContentId,
    counter: Counter,
    delta: i64,
    prior: u64,
}

impl CounterUpdate {
    /// Apply `delta` to the local copy immediately
    pub fn begin(local: &mut ContentItem, counter: Counter, delta: i64) -> Self {
        let prior = local.counters.get(counter);
        let shown = local.counters.apply(counter, delta);
        trace!(id = %local.id, ?counter, prior, shown, "Applied optimistic update");
        Self {
            id: local.id,
            counter,
            delta,
            prior,
        }
    }

    /// Issue the mutation to the store
    pub async fn send<S>(&self, store: &S) -> Result<u64, StoreError>
    where
        S: ContentStore + ?Sized,
    {
        store.adjust_counter(&self.id, self.counter, self.delta).await
    }

    /// Reconcile the local copy with the store's answer
    pub fn settle(
        self,
        local: &mut ContentItem,
        outcome: Result<u64, StoreError>,
    ) -> Result<u64, StoreError> {
        match outcome {
            Ok(confirmed) => {
                local.counters.set(self.counter, confirmed);
                Ok(confirmed)
            }
            Err(err) => {
                warn!(id = %self.id, counter = ?self.counter, error = %err, "Rolling back optimistic update");
                local.counters.set(self.counter, self.prior);
                Err(err)
            }
        }
    }

    pub fn prior(&self) -> u64 {
        self.prior
    }
}

/// Apply, send and settle in one call
pub async fn apply_counter_update<S>(
    local: &mut ContentItem,
    counter: Counter,
    delta: i64,
    store: &S,
) -> Result<u64, StoreError>
where
    S: ContentStore + ?Sized,
{
    let update = CounterUpdate::begin(local, counter, delta);
    let outcome = update.send(store).await;
    update.settle(local, outcome)
}
