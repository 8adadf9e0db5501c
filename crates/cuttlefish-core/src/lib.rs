//! # Cuttlefish Core
//!
//! Core types and error handling for the Cuttlefish HTTP-CoAP gateway.
//!
//! This crate provides the protocol-neutral vocabulary shared by every other
//! crate in the workspace:
//! - Request/response message model with typed CoAP options
//! - CoAP methods, status codes and media types
//! - Error types
//! - Gateway-wide constants

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod error;
pub mod media_type;
pub mod option;
pub mod request;
pub mod response;
pub mod status;
pub mod types;

pub use error::{Error, Result};
pub use media_type::MediaType;
pub use option::{CoapOption, OptionFormat, OptionType, OptionValue, Options};
pub use request::Request;
pub use response::{responses, Body, Response, ResponseBuilder};
pub use status::{CoapStatus, StatusClass};
pub use types::*;

pub use bytes::Bytes;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::media_type::MediaType;
    pub use crate::option::{CoapOption, OptionFormat, OptionType, OptionValue, Options};
    pub use crate::request::Request;
    pub use crate::response::Response;
    pub use crate::status::{CoapStatus, StatusClass};
    pub use crate::types::*;
}
