//! Concurrent table of in-flight exchanges

use crate::slot::{CorrelationSlot, SlotFulfiller};
use cuttlefish_core::{Error, ExchangeId, Response, Result};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, error, trace};

/// Pending exchanges keyed by [`ExchangeId`].
///
/// An entry is inserted when a request is dispatched and removed by the
/// first delivery for its id. A waiter that times out does not remove its
/// entry; see [`ExchangeTable::sweep`].
#[derive(Debug, Default)]
pub struct ExchangeTable {
    entries: DashMap<ExchangeId, SlotFulfiller>,
    next_id: AtomicU64,
}

impl ExchangeTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh exchange id. Ids are never reused.
    pub fn next_id(&self) -> ExchangeId {
        ExchangeId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Register a pending slot for `id`.
    ///
    /// Fails with [`Error::DuplicateExchange`] if `id` already has a live
    /// entry.
    pub fn register(&self, id: ExchangeId) -> Result<CorrelationSlot> {
        match self.entries.entry(id) {
            Entry::Occupied(_) => {
                error!(exchange_id = %id, "Exchange registered twice");
                Err(Error::DuplicateExchange(id))
            }
            Entry::Vacant(vacant) => {
                let (slot, fulfiller) = CorrelationSlot::pair(id);
                vacant.insert(fulfiller);
                trace!(exchange_id = %id, "Exchange registered");
                Ok(slot)
            }
        }
    }

    /// Remove the entry for `id` and deliver `response` to its waiter.
    ///
    /// Returns `true` if an entry was present, even when the waiter has
    /// already timed out and the response is discarded. Returns `false`
    /// if there was no entry, so a second delivery is a no-op.
    pub fn try_fulfill_and_remove(&self, id: ExchangeId, response: Response) -> bool {
        let Some((_, fulfiller)) = self.entries.remove(&id) else {
            return false;
        };

        if !fulfiller.fulfill(response) {
            debug!(exchange_id = %id, "Waiter gone, discarding late response");
        }
        true
    }

    /// Whether `id` has a live entry
    pub fn is_pending(&self, id: ExchangeId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evict entries registered at least `max_age` ago. Returns how many
    /// were removed.
    pub fn sweep(&self, max_age: Duration) -> usize {
        let now = Instant::now();
        let mut removed = 0;
        self.entries.retain(|_, fulfiller| {
            if now.duration_since(fulfiller.registered_at()) >= max_age {
                removed += 1;
                false
            } else {
                true
            }
        });

        if removed > 0 {
            debug!(removed, "Swept stale exchanges");
        }
        removed
    }

    /// Spawn a task that sweeps the table every `every`
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration, max_age: Duration) -> JoinHandle<()> {
        let table = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                table.sweep(max_age);
            }
        })
    }
}
