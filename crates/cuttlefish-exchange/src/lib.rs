//! # Cuttlefish Exchange
//!
//! Request/response correlation for the Cuttlefish gateway.
//!
//! A gateway task registers a [`CorrelationSlot`] in the [`ExchangeTable`]
//! under a fresh [`ExchangeId`](cuttlefish_core::ExchangeId), dispatches the
//! request, and waits on the slot with a deadline. Whoever produces the
//! response delivers it through the table, which removes the entry exactly
//! once.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod slot;
pub mod table;

pub use slot::{CorrelationSlot, SlotFulfiller, WaitOutcome};
pub use table::ExchangeTable;
