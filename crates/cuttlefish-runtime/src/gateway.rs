//! Gateway stack: one HTTP request in, one correlated HTTP response out

use crate::worker::WorkerPool;
use async_trait::async_trait;
use bytes::Bytes;
use cuttlefish_core::{responses, Body, ExchangeId, Request, Response, Result, GATEWAY_TIMEOUT};
use cuttlefish_exchange::{ExchangeTable, WaitOutcome};
use cuttlefish_router::RootRouter;
use cuttlefish_translate::{Translator, UriTemplate};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, trace, warn};

/// A translated request travelling to the downstream layer
#[derive(Debug, Clone)]
pub struct Exchange {
    /// Correlation key
    pub id: ExchangeId,
    /// Translated CoAP request
    pub request: Request,
}

/// Handle through which the downstream layer returns responses
#[derive(Debug, Clone)]
pub struct Delivery {
    exchanges: Arc<ExchangeTable>,
}

impl Delivery {
    /// Deliver the final response for `id`. A missing entry (already
    /// answered, or swept) is silently ignored.
    pub fn deliver(&self, id: ExchangeId, response: Response) {
        if self.exchanges.try_fulfill_and_remove(id, response) {
            trace!(exchange_id = %id, "Response delivered");
        } else {
            debug!(exchange_id = %id, "No pending exchange for delivered response");
        }
    }
}

/// Downstream request handler installed on the gateway.
///
/// Called on a worker for every accepted exchange. It is expected to call
/// [`Delivery::deliver`] once with the final response; never calling it
/// makes the waiting HTTP caller time out.
#[async_trait]
pub trait ExchangeHandler: Send + Sync + std::fmt::Debug {
    /// Process an exchange
    async fn handle(&self, exchange: Exchange, delivery: Delivery);
}

/// Default handler: scheme-based routing through a [`RootRouter`]
#[derive(Debug, Clone)]
pub struct RoutingHandler {
    router: RootRouter,
}

impl RoutingHandler {
    /// Create a routing handler
    pub fn new(router: RootRouter) -> Self {
        Self { router }
    }
}

#[async_trait]
impl ExchangeHandler for RoutingHandler {
    async fn handle(&self, exchange: Exchange, delivery: Delivery) {
        let response = self.router.dispatch(exchange.request).await;
        delivery.deliver(exchange.id, response);
    }
}

/// A proxy resource mounted at `/<name>/`
#[derive(Debug, Clone)]
pub struct ProxyMount {
    name: String,
    template: UriTemplate,
    proxying: bool,
}

impl ProxyMount {
    /// Create a mount using the template `<name>/{+tu}`
    pub fn new(name: impl Into<String>, proxying: bool) -> Result<Self> {
        let name = name.into();
        let template = UriTemplate::for_resource(&name)?;
        Ok(Self {
            name,
            template,
            proxying,
        })
    }

    /// Mount name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Target template
    pub fn template(&self) -> &UriTemplate {
        &self.template
    }

    /// Proxying flag
    pub fn proxying(&self) -> bool {
        self.proxying
    }

    /// Whether a request path falls under this mount
    pub fn matches(&self, path: &str) -> bool {
        path.strip_prefix('/')
            .and_then(|rest| rest.strip_prefix(self.name.as_str()))
            .is_some_and(|rest| rest.starts_with('/'))
    }
}

/// Owns the exchange table and worker pool and runs each inbound request
/// through translate, dispatch, wait and translate back.
#[derive(Debug, Clone)]
pub struct Gateway {
    translator: Translator,
    exchanges: Arc<ExchangeTable>,
    workers: WorkerPool,
    handler: Arc<dyn ExchangeHandler>,
    deadline: Duration,
}

impl Gateway {
    /// Create a gateway builder
    pub fn builder() -> GatewayBuilder {
        GatewayBuilder::default()
    }

    /// The exchange table
    pub fn exchanges(&self) -> &Arc<ExchangeTable> {
        &self.exchanges
    }

    /// How long a caller waits for the correlated response
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// The dispatch pool
    pub fn workers(&self) -> &WorkerPool {
        &self.workers
    }

    /// A delivery handle bound to this gateway's exchange table
    pub fn delivery(&self) -> Delivery {
        Delivery {
            exchanges: Arc::clone(&self.exchanges),
        }
    }

    /// Serve one inbound HTTP request addressed to `mount`.
    ///
    /// Translation failures give 502, no response before the deadline
    /// gives 504. A timed-out exchange stays in the table; a late delivery
    /// removes it and is discarded.
    pub async fn handle_inbound(
        &self,
        http_request: http::Request<Bytes>,
        mount: &ProxyMount,
    ) -> http::Response<Body> {
        let method = http_request.method().clone();

        let request = match self.translator.build_coap_request(
            &http_request,
            mount.template(),
            mount.proxying(),
        ) {
            Ok(request) => request,
            Err(e) => {
                debug!(
                    mount = mount.name(),
                    uri = %http_request.uri(),
                    error = %e,
                    "Request translation failed"
                );
                return responses::bad_gateway();
            }
        };

        let id = self.exchanges.next_id();
        let slot = match self.exchanges.register(id) {
            Ok(slot) => slot,
            Err(e) => {
                error!(exchange_id = %id, error = %e, "Cannot register exchange");
                return responses::internal_error();
            }
        };

        debug!(
            exchange_id = %id,
            method = %request.method(),
            target = request.proxy_uri().unwrap_or_default(),
            "Dispatching exchange"
        );

        let handler = Arc::clone(&self.handler);
        let delivery = self.delivery();
        self.workers.submit(async move {
            handler.handle(Exchange { id, request }, delivery).await;
        });

        match slot.wait_until(Instant::now() + self.deadline).await {
            WaitOutcome::Fulfilled(response) => {
                match self.translator.build_http_response(&response, &method) {
                    Ok(http_response) => {
                        debug!(
                            exchange_id = %id,
                            coap_status = %response.status(),
                            status = http_response.status().as_u16(),
                            "Exchange completed"
                        );
                        http_response
                    }
                    Err(e) => {
                        warn!(exchange_id = %id, error = %e, "Response translation failed");
                        responses::bad_gateway()
                    }
                }
            }
            WaitOutcome::Elapsed => {
                warn!(
                    exchange_id = %id,
                    deadline_ms = self.deadline.as_millis() as u64,
                    "Gateway timeout"
                );
                responses::gateway_timeout()
            }
        }
    }

    /// Deliver the final response for a dispatched exchange. See
    /// [`Delivery::deliver`].
    pub fn deliver_response(&self, id: ExchangeId, response: Response) {
        self.delivery().deliver(id, response);
    }
}

/// Builder for [`Gateway`]
#[derive(Debug, Default)]
pub struct GatewayBuilder {
    translator: Option<Translator>,
    exchanges: Option<Arc<ExchangeTable>>,
    handler: Option<Arc<dyn ExchangeHandler>>,
    deadline: Option<Duration>,
}

impl GatewayBuilder {
    /// Set the translator
    pub fn translator(mut self, translator: Translator) -> Self {
        self.translator = Some(translator);
        self
    }

    /// Share an existing exchange table
    pub fn exchanges(mut self, exchanges: Arc<ExchangeTable>) -> Self {
        self.exchanges = Some(exchanges);
        self
    }

    /// Install the downstream handler
    pub fn handler(mut self, handler: Arc<dyn ExchangeHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Install a [`RoutingHandler`] over `router`
    pub fn router(self, router: RootRouter) -> Self {
        self.handler(Arc::new(RoutingHandler::new(router)))
    }

    /// Override the gateway deadline
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Build the gateway. Without a handler every exchange is routed by an
    /// empty [`RootRouter`].
    pub fn build(self) -> Gateway {
        Gateway {
            translator: self.translator.unwrap_or_default(),
            exchanges: self.exchanges.unwrap_or_default(),
            workers: WorkerPool::new(),
            handler: self
                .handler
                .unwrap_or_else(|| Arc::new(RoutingHandler::new(RootRouter::new()))),
            deadline: self.deadline.unwrap_or(GATEWAY_TIMEOUT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuttlefish_core::CoapStatus;
    use http::StatusCode;

    #[derive(Debug)]
    struct Silent;

    #[async_trait]
    impl ExchangeHandler for Silent {
        async fn handle(&self, _exchange: Exchange, _delivery: Delivery) {}
    }

    fn inbound(path: &str) -> http::Request<Bytes> {
        http::Request::builder()
            .method("GET")
            .uri(path)
            .body(Bytes::new())
            .unwrap()
    }

    #[test]
    fn test_mount_matches() {
        let mount = ProxyMount::new("proxy", true).unwrap();
        assert!(mount.matches("/proxy/coap://x/y"));
        assert!(mount.matches("/proxy/"));
        assert!(!mount.matches("/proxy"));
        assert!(!mount.matches("/proxyx/coap://x/y"));
        assert!(!mount.matches("/other/proxy/"));
    }

    #[tokio::test]
    async fn test_translation_failure_is_bad_gateway_without_slot() {
        let gateway = Gateway::builder().handler(Arc::new(Silent)).build();
        let mount = ProxyMount::new("proxy", true).unwrap();

        let response = gateway
            .handle_inbound(inbound("/proxy/node/a"), &mount)
            .await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(gateway.exchanges().is_empty());
    }

    #[tokio::test]
    async fn test_unconfigured_router_is_bad_gateway() {
        let gateway = Gateway::builder().build();
        let mount = ProxyMount::new("proxy", true).unwrap();

        let response = gateway
            .handle_inbound(inbound("/proxy/coap://node/a"), &mount)
            .await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(gateway.exchanges().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_handler_times_out_at_deadline() {
        let gateway = Gateway::builder().handler(Arc::new(Silent)).build();
        let mount = ProxyMount::new("proxy", true).unwrap();

        let started = Instant::now();
        let response = gateway
            .handle_inbound(inbound("/proxy/coap://node/a"), &mount)
            .await;

        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert!(started.elapsed() >= GATEWAY_TIMEOUT);
        assert_eq!(gateway.exchanges().len(), 1);
    }

    #[test]
    fn test_deliver_unknown_is_noop() {
        let gateway = Gateway::builder().build();
        gateway.deliver_response(
            ExchangeId::new(7),
            Response::new(CoapStatus::Content),
        );
        assert!(gateway.exchanges().is_empty());
    }
}
