//! # Cuttlefish Translate
//!
//! Rule-based translation between HTTP and CoAP for the Cuttlefish gateway.
//!
//! Everything here is pure: the mapping tables are built once and shared,
//! and a [`Translator`] is a cheap handle over them.
//!
//! - Status codes, methods and media types
//! - Header <-> option mapping
//! - Proxy target extraction from templated paths
//! - Request and response assembly in both directions

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod headers;
pub mod tables;
pub mod template;
pub mod translator;

pub use tables::TranslationTables;
pub use template::{extract_proxy_target, UriTemplate};
pub use translator::Translator;
