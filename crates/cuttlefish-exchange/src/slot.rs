//! Single-use rendezvous between one waiter and one fulfiller

use cuttlefish_core::{ExchangeId, Response};
use tokio::sync::oneshot;
use tokio::time::{timeout_at, Instant};
use tracing::trace;

/// Outcome of waiting on a [`CorrelationSlot`]
#[derive(Debug)]
pub enum WaitOutcome {
    /// A response was delivered before the deadline
    Fulfilled(Response),
    /// The deadline passed first
    Elapsed,
}

impl WaitOutcome {
    /// The delivered response, if any
    pub fn into_response(self) -> Option<Response> {
        match self {
            Self::Fulfilled(response) => Some(response),
            Self::Elapsed => None,
        }
    }

    /// Whether the wait timed out
    pub fn is_elapsed(&self) -> bool {
        matches!(self, Self::Elapsed)
    }
}

/// Waiting half of a correlation slot, held by the gateway task that
/// accepted the request
#[derive(Debug)]
pub struct CorrelationSlot {
    id: ExchangeId,
    rx: oneshot::Receiver<Response>,
}

/// Fulfilling half of a correlation slot, owned by the exchange table
#[derive(Debug)]
pub struct SlotFulfiller {
    id: ExchangeId,
    tx: oneshot::Sender<Response>,
    registered_at: Instant,
}

impl CorrelationSlot {
    /// Create a pending slot and its fulfiller
    pub fn pair(id: ExchangeId) -> (CorrelationSlot, SlotFulfiller) {
        let (tx, rx) = oneshot::channel();
        (
            CorrelationSlot { id, rx },
            SlotFulfiller {
                id,
                tx,
                registered_at: Instant::now(),
            },
        )
    }

    /// Exchange this slot belongs to
    pub fn id(&self) -> ExchangeId {
        self.id
    }

    /// Wait until the slot is fulfilled or `deadline` passes.
    ///
    /// A fulfiller dropped without delivering is indistinguishable from a
    /// timeout and yields [`WaitOutcome::Elapsed`] once noticed.
    pub async fn wait_until(self, deadline: Instant) -> WaitOutcome {
        match timeout_at(deadline, self.rx).await {
            Ok(Ok(response)) => WaitOutcome::Fulfilled(response),
            Ok(Err(_)) => {
                trace!(exchange_id = %self.id, "Fulfiller dropped without a response");
                WaitOutcome::Elapsed
            }
            Err(_) => WaitOutcome::Elapsed,
        }
    }
}

impl SlotFulfiller {
    /// Exchange this fulfiller belongs to
    pub fn id(&self) -> ExchangeId {
        self.id
    }

    /// When the slot was created
    pub fn registered_at(&self) -> Instant {
        self.registered_at
    }

    /// Deliver the response. Returns `false` if the waiter has already gone
    /// away; the response is then discarded.
    pub fn fulfill(self, response: Response) -> bool {
        self.tx.send(response).is_ok()
    }
}
