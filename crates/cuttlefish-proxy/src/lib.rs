//! # Cuttlefish HTTP Proxy
//!
//! CoAP to HTTP forwarding:
//! - Pooled HTTP/1.1 origin client with timeout
//! - Request and response translation around each origin call

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod client;
pub mod forwarder;

pub use client::HttpClient;
pub use forwarder::HttpForwarder;
