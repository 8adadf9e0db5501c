//! Downstream forwarding capability

use async_trait::async_trait;
use cuttlefish_core::{Request, Response};
use std::fmt::Debug;

/// Something that can carry a CoAP request to its Proxy-Uri target and
/// produce the final response.
///
/// Forwarders never fail: transport problems are reported as a CoAP
/// status such as 5.02 Bad Gateway or 5.04 Gateway Timeout.
#[async_trait]
pub trait Forwarder: Send + Sync + Debug {
    /// Forward the request and return the downstream response
    async fn forward(&self, request: Request) -> Response;

    /// Short name for logs
    fn name(&self) -> &str;
}
