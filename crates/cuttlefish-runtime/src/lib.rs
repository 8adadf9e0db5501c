//! # Cuttlefish Runtime
//!
//! Server lifecycle and the gateway stack:
//! - HTTP accept loop and per-mount dispatch
//! - Correlation of each request with its downstream response
//! - Dispatch of translated requests to downstream handlers
//! - Graceful shutdown with signal handling

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod gateway;
pub mod handler;
pub mod server;
pub mod shutdown;
pub mod worker;

pub use gateway::{
    Delivery, Exchange, ExchangeHandler, Gateway, GatewayBuilder, ProxyMount, RoutingHandler,
};
pub use handler::RequestHandler;
pub use server::{Server, ServerBuilder};
pub use shutdown::{ShutdownSignal, SignalHandler};
pub use worker::WorkerPool;

/// Runtime state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeState {
    /// Server is initializing
    Initializing,
    /// Server is running
    Running,
    /// Server is shutting down
    ShuttingDown,
    /// Server is stopped
    Stopped,
}

/// Re-export commonly used types
pub mod prelude {
    pub use crate::gateway::{Delivery, Exchange, ExchangeHandler, Gateway};
    pub use crate::server::{Server, ServerBuilder};
    pub use crate::shutdown::{ShutdownSignal, SignalHandler};
    pub use crate::RuntimeState;
}
