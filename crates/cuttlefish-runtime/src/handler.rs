//! HTTP request handler

use crate::gateway::{Gateway, ProxyMount};
use bytes::Bytes;
use cuttlefish_core::{responses, Body, Result};
use http::{Request, Response};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Dispatches inbound requests to the proxy mounts or the base handler
#[derive(Debug, Clone)]
pub struct RequestHandler {
    gateway: Gateway,
    mounts: Arc<[ProxyMount]>,
    server_name: Arc<str>,
    max_body_size: usize,
    in_flight: Arc<AtomicUsize>,
}

/// Counts a request as in flight until dropped
struct InFlightGuard(Arc<AtomicUsize>);

impl InFlightGuard {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl RequestHandler {
    /// Create a new request handler
    pub fn new(
        gateway: Gateway,
        mounts: Vec<ProxyMount>,
        server_name: impl Into<String>,
        max_body_size: usize,
    ) -> Self {
        Self {
            gateway,
            mounts: mounts.into(),
            server_name: Arc::from(server_name.into()),
            max_body_size,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// The gateway behind the proxy mounts
    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Requests currently being served
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Handle an incoming HTTP request
    pub async fn handle<B>(&self, req: Request<B>) -> Result<Response<Body>>
    where
        B: hyper::body::Body<Data = Bytes>,
        B::Error: Into<BoxError>,
    {
        let _guard = InFlightGuard::enter(&self.in_flight);
        let start = Instant::now();

        let method = req.method().clone();
        let path = req.uri().path().to_string();

        debug!(method = %method, path = %path, "Handling request");

        let Some(mount) = self.mounts.iter().find(|m| m.matches(&path)) else {
            return responses::ok_text(self.server_name.as_ref());
        };

        let (parts, body) = req.into_parts();
        let body = match Limited::new(body, self.max_body_size).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
                warn!(path = %path, limit = self.max_body_size, "Request body too large");
                return Ok(responses::payload_too_large());
            }
            Err(e) => {
                warn!(path = %path, error = %e, "Failed to read request body");
                return Ok(responses::bad_request());
            }
        };

        let response = self
            .gateway
            .handle_inbound(Request::from_parts(parts, body), mount)
            .await;

        debug!(
            method = %method,
            path = %path,
            mount = mount.name(),
            status = response.status().as_u16(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Request completed"
        );

        Ok(response)
    }
}
