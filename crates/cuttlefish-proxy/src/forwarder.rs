//! CoAP -> HTTP forwarding

use crate::client::HttpClient;
use async_trait::async_trait;
use cuttlefish_core::{CoapStatus, Error, Request, Response};
use cuttlefish_router::Forwarder;
use cuttlefish_translate::Translator;
use tracing::{debug, warn};

/// Forwards CoAP requests with an `http`/`https` Proxy-Uri to the origin
/// server and translates the answer back
#[derive(Debug, Clone)]
pub struct HttpForwarder {
    client: HttpClient,
    translator: Translator,
}

impl HttpForwarder {
    /// Create a new HTTP forwarder
    pub fn new(client: HttpClient, translator: Translator) -> Self {
        Self { client, translator }
    }

    /// Forward and translate, surfacing failures as errors
    pub async fn try_forward(&self, request: &Request) -> cuttlefish_core::Result<Response> {
        let http_request = self.translator.build_http_request(request)?;
        debug!(
            method = %http_request.method(),
            uri = %http_request.uri(),
            "Forwarding to HTTP origin"
        );

        let http_response = self.client.send(http_request).await?;
        self.translator.build_coap_response(&http_response, request)
    }
}

#[async_trait]
impl Forwarder for HttpForwarder {
    async fn forward(&self, request: Request) -> Response {
        match self.try_forward(&request).await {
            Ok(response) => response,
            Err(e) => {
                let status = match e {
                    Error::UpstreamTimeout => CoapStatus::GatewayTimeout,
                    _ => CoapStatus::BadGateway,
                };
                warn!(error = %e, %status, "HTTP forwarding failed");
                Response::new(status)
            }
        }
    }

    fn name(&self) -> &str {
        "http"
    }
}
