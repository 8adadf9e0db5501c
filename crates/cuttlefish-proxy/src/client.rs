//! HTTP client for requests to origin servers

use bytes::Bytes;
use cuttlefish_core::{Body, Error, Result};
use http::{Request, Response};
use http_body_util::BodyExt;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::time::Duration;

/// Default origin request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Pooled HTTP/1.1 client for origin requests
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client<HttpConnector, Body>,
    timeout: Duration,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a new HTTP client with custom timeout
    pub fn with_timeout(timeout: Duration) -> Self {
        let connector = HttpConnector::new();
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self { client, timeout }
    }

    /// Send a request and collect the whole response body.
    ///
    /// The timeout covers the response head and the body.
    pub async fn send(&self, req: Request<Body>) -> Result<Response<Bytes>> {
        let exchange = async {
            let response = self
                .client
                .request(req)
                .await
                .map_err(|e| Error::UpstreamConnection(e.to_string()))?;

            let (parts, body) = response.into_parts();
            let body = body
                .collect()
                .await
                .map_err(|e| Error::UpstreamConnection(e.to_string()))?
                .to_bytes();

            Ok::<_, Error>(Response::from_parts(parts, body))
        };

        match tokio::time::timeout(self.timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(Error::UpstreamTimeout),
        }
    }

    /// Get the configured timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}
