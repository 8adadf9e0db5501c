//! HTTP server implementation

use crate::gateway::{ExchangeHandler, Gateway, ProxyMount};
use crate::handler::RequestHandler;
use crate::shutdown::ShutdownSignal;
use crate::RuntimeState;
use cuttlefish_config::Config;
use cuttlefish_core::{Error, Result};
use cuttlefish_exchange::ExchangeTable;
use cuttlefish_proxy::{HttpClient, HttpForwarder};
use cuttlefish_router::{LocalResources, RootRouter};
use cuttlefish_translate::Translator;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::RwLock;

/// HTTP server
#[derive(Debug)]
pub struct Server {
    config: Config,
    handler: RequestHandler,
    state: Arc<RwLock<RuntimeState>>,
    shutdown: ShutdownSignal,
}

impl Server {
    /// Create a new server builder
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Get the current state
    pub async fn state(&self) -> RuntimeState {
        *self.state.read().await
    }

    /// Get listen address
    pub fn listen_addr(&self) -> SocketAddr {
        self.config.gateway.listen
    }

    /// Get the gateway
    pub fn gateway(&self) -> &Gateway {
        self.handler.gateway()
    }

    /// Get the exchange table
    pub fn exchanges(&self) -> &Arc<ExchangeTable> {
        self.handler.gateway().exchanges()
    }

    /// Requests currently being served
    pub fn in_flight(&self) -> usize {
        self.handler.in_flight()
    }

    /// Get shutdown signal
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Bind the configured address and serve until shutdown
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.listen_addr()).await.map_err(|e| {
            Error::Runtime(format!("Failed to bind to {}: {}", self.listen_addr(), e))
        })?;

        self.serve(listener).await
    }

    /// Serve connections from an already bound listener until shutdown
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let mut shutdown_rx = self.shutdown.subscribe();

        {
            let mut state = self.state.write().await;
            *state = RuntimeState::Running;
        }

        let local_addr = listener.local_addr()?;
        tracing::info!(
            listen = %local_addr,
            mounts = self.config.mounts.len(),
            deadline_ms = self.gateway().deadline().as_millis() as u64,
            "Server starting"
        );

        let sweeper = self.config.exchange.sweep_interval.map(|every| {
            tracing::info!(
                interval_secs = every.as_secs(),
                max_age_secs = self.config.exchange.max_age.as_secs(),
                "Exchange sweeper enabled"
            );
            self.exchanges()
                .spawn_sweeper(every, self.config.exchange.max_age)
        });

        while !self.shutdown.is_triggered() {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            tracing::trace!("Accepted connection from {}", addr);

                            let handler = self.handler.clone();

                            tokio::spawn(async move {
                                let service = hyper::service::service_fn(move |req| {
                                    let handler = handler.clone();
                                    async move {
                                        handler.handle(req).await.or_else(|e| {
                                            tracing::error!("Request handler error: {}", e);
                                            http::Response::builder()
                                                .status(e.to_status_code())
                                                .body(http_body_util::Full::new(bytes::Bytes::new()))
                                        })
                                    }
                                });

                                let io = hyper_util::rt::TokioIo::new(stream);
                                if let Err(e) = hyper::server::conn::http1::Builder::new()
                                    .serve_connection(io, service)
                                    .await
                                {
                                    tracing::error!("HTTP connection error: {}", e);
                                }
                            });
                        }
                        Err(e) => {
                            tracing::error!("Failed to accept connection: {}", e);
                        }
                    }
                }

                _ = shutdown_rx.recv() => {
                    tracing::info!("Shutdown signal received");
                    break;
                }
            }
        }

        drop(listener);

        {
            let mut state = self.state.write().await;
            *state = RuntimeState::ShuttingDown;
        }

        let shutdown_timeout = self.config.gateway.shutdown_timeout;
        let start = tokio::time::Instant::now();

        tracing::info!(
            timeout_secs = shutdown_timeout.as_secs(),
            "Waiting for in-flight requests to complete"
        );

        loop {
            let active = self.in_flight();

            if active == 0 {
                tracing::info!("All requests completed, shutting down cleanly");
                break;
            }

            if start.elapsed() >= shutdown_timeout {
                tracing::warn!(
                    active_requests = active,
                    "Shutdown timeout reached, forcing shutdown"
                );
                break;
            }

            tracing::debug!(
                active_requests = active,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Waiting for active requests to complete"
            );

            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        if let Some(sweeper) = sweeper {
            sweeper.abort();
        }

        {
            let mut state = self.state.write().await;
            *state = RuntimeState::Stopped;
        }

        tracing::info!(
            shutdown_duration_ms = start.elapsed().as_millis() as u64,
            pending_exchanges = self.exchanges().len(),
            "Server stopped"
        );

        Ok(())
    }
}

/// Server builder
#[derive(Debug, Default)]
pub struct ServerBuilder {
    config: Option<Config>,
    handler: Option<Arc<dyn ExchangeHandler>>,
}

impl ServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set configuration
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Replace the configured downstream forwarders with a custom handler
    pub fn handler(mut self, handler: Arc<dyn ExchangeHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Build the server
    pub fn build(self) -> Result<Server> {
        let config = self
            .config
            .ok_or_else(|| Error::Config("config is required".to_string()))?;

        let translator = Translator::default();

        let mut gateway = Gateway::builder()
            .translator(translator.clone())
            .deadline(config.gateway.gateway_timeout);

        gateway = match self.handler {
            Some(handler) => gateway.handler(handler),
            None => gateway.router(Self::build_router(&config, translator)),
        };

        let mounts = config
            .mounts
            .iter()
            .map(|m| ProxyMount::new(&m.name, m.proxying))
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(
            mounts = ?config.mounts.iter().map(|m| m.name.as_str()).collect::<Vec<_>>(),
            "Proxy mounts registered"
        );

        let handler = RequestHandler::new(
            gateway.build(),
            mounts,
            config.gateway.server_name.clone(),
            config.gateway.max_body_size,
        );

        Ok(Server {
            config,
            handler,
            state: Arc::new(RwLock::new(RuntimeState::Initializing)),
            shutdown: ShutdownSignal::new(),
        })
    }

    fn build_router(config: &Config, translator: Translator) -> RootRouter {
        let mut router = RootRouter::builder();

        let local = &config.downstream.coap.local_resources;
        if !local.is_empty() {
            tracing::info!(resources = ?local, "Local CoAP resources registered");
            router = router.coap(Arc::new(LocalResources::with_counters(local.iter())));
        }

        let http = &config.downstream.http;
        if http.enabled {
            tracing::info!(timeout_secs = http.timeout.as_secs(), "HTTP forwarding enabled");
            let client = HttpClient::with_timeout(http.timeout);
            router = router.http(Arc::new(HttpForwarder::new(client, translator)));
        }

        router.build()
    }
}
