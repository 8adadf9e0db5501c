//! # Cuttlefish Router
//!
//! Downstream routing for translated CoAP requests:
//! - Scheme-based dispatch (`coap`/`coaps` vs `http`/`https`)
//! - Pluggable [`Forwarder`] capabilities
//! - In-process CoAP resources

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod forwarder;
pub mod local;
pub mod root;

pub use forwarder::Forwarder;
pub use local::{CounterResource, LocalResource, LocalResources};
pub use root::{Downstream, RootRouter, RootRouterBuilder, RouteDecision};
