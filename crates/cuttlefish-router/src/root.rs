//! Root router: pick a downstream by Proxy-Uri scheme

use crate::forwarder::Forwarder;
use cuttlefish_core::{CoapStatus, Request, Response, Scheme};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Which downstream capability a request goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Downstream {
    /// `coap` / `coaps` targets
    Coap,
    /// `http` / `https` targets
    Http,
}

impl fmt::Display for Downstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Coap => f.write_str("coap"),
            Self::Http => f.write_str("http"),
        }
    }
}

/// Result of routing a request
#[derive(Debug, Clone)]
pub enum RouteDecision {
    /// Hand the request to a configured forwarder
    Forward {
        /// Selected downstream
        downstream: Downstream,
        /// Forwarder for that downstream
        forwarder: Arc<dyn Forwarder>,
    },
    /// Answer immediately with this status
    Reject(CoapStatus),
}

/// Scheme-based dispatch over two optional forwarders
#[derive(Debug, Clone, Default)]
pub struct RootRouter {
    coap: Option<Arc<dyn Forwarder>>,
    http: Option<Arc<dyn Forwarder>>,
}

impl RootRouter {
    /// Create a router with no downstreams configured
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a router builder
    pub fn builder() -> RootRouterBuilder {
        RootRouterBuilder::default()
    }

    /// Whether a downstream has a forwarder
    pub fn is_configured(&self, downstream: Downstream) -> bool {
        self.forwarder(downstream).is_some()
    }

    fn forwarder(&self, downstream: Downstream) -> Option<&Arc<dyn Forwarder>> {
        match downstream {
            Downstream::Coap => self.coap.as_ref(),
            Downstream::Http => self.http.as_ref(),
        }
    }

    /// Decide where a request goes.
    ///
    /// No Proxy-Uri or an unknown scheme is 4.02 Bad Option. A known scheme
    /// whose downstream is not configured is 5.02 Bad Gateway.
    pub fn route(&self, request: &Request) -> RouteDecision {
        let Some(proxy_uri) = request.proxy_uri() else {
            return RouteDecision::Reject(CoapStatus::BadOption);
        };

        let scheme = proxy_uri
            .split_once("://")
            .and_then(|(scheme, _)| scheme.parse::<Scheme>().ok());
        let downstream = match scheme {
            Some(s) if s.is_coap() => Downstream::Coap,
            Some(s) if s.is_http() => Downstream::Http,
            _ => return RouteDecision::Reject(CoapStatus::BadOption),
        };

        match self.forwarder(downstream) {
            Some(forwarder) => RouteDecision::Forward {
                downstream,
                forwarder: Arc::clone(forwarder),
            },
            None => RouteDecision::Reject(CoapStatus::BadGateway),
        }
    }

    /// Route the request and, if accepted, forward it
    pub async fn dispatch(&self, request: Request) -> Response {
        match self.route(&request) {
            RouteDecision::Forward {
                downstream,
                forwarder,
            } => {
                debug!(%downstream, forwarder = forwarder.name(), "Forwarding request");
                forwarder.forward(request).await
            }
            RouteDecision::Reject(status) => {
                debug!(%status, "Request rejected by root router");
                Response::new(status)
            }
        }
    }
}

/// Builder for [`RootRouter`]
#[derive(Debug, Default)]
pub struct RootRouterBuilder {
    coap: Option<Arc<dyn Forwarder>>,
    http: Option<Arc<dyn Forwarder>>,
}

impl RootRouterBuilder {
    /// Set the forwarder for `coap`/`coaps` targets
    pub fn coap(mut self, forwarder: Arc<dyn Forwarder>) -> Self {
        self.coap = Some(forwarder);
        self
    }

    /// Set the forwarder for `http`/`https` targets
    pub fn http(mut self, forwarder: Arc<dyn Forwarder>) -> Self {
        self.http = Some(forwarder);
        self
    }

    /// Build the router
    pub fn build(self) -> RootRouter {
        RootRouter {
            coap: self.coap,
            http: self.http,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cuttlefish_core::{CoapOption, Method};

    #[derive(Debug)]
    struct Echo(&'static str);

    #[async_trait]
    impl Forwarder for Echo {
        async fn forward(&self, _request: Request) -> Response {
            Response::new(CoapStatus::Content).with_payload(self.0)
        }

        fn name(&self) -> &str {
            self.0
        }
    }

    fn router() -> RootRouter {
        RootRouter::builder()
            .coap(Arc::new(Echo("coap")))
            .http(Arc::new(Echo("http")))
            .build()
    }

    fn request(uri: &str) -> Request {
        Request::new(Method::Get).with_proxy_uri(uri).unwrap()
    }

    fn rejected(decision: RouteDecision) -> Option<CoapStatus> {
        match decision {
            RouteDecision::Reject(status) => Some(status),
            RouteDecision::Forward { .. } => None,
        }
    }

    #[test]
    fn test_missing_proxy_uri_is_bad_option() {
        assert_eq!(
            rejected(router().route(&Request::new(Method::Get))),
            Some(CoapStatus::BadOption)
        );
        assert_eq!(
            rejected(RootRouter::new().route(&Request::new(Method::Post))),
            Some(CoapStatus::BadOption)
        );
    }

    #[test]
    fn test_scheme_selects_downstream() {
        for (uri, expected) in [
            ("coap://node/a", Downstream::Coap),
            ("coaps://node/a", Downstream::Coap),
            ("http://origin/a", Downstream::Http),
            ("https://origin/a", Downstream::Http),
        ] {
            match router().route(&request(uri)) {
                RouteDecision::Forward { downstream, .. } => assert_eq!(downstream, expected),
                RouteDecision::Reject(status) => panic!("{uri} rejected with {status}"),
            }
        }
    }

    #[test]
    fn test_unconfigured_downstream_is_bad_gateway() {
        let router = RootRouter::builder().coap(Arc::new(Echo("coap"))).build();
        assert!(!router.is_configured(Downstream::Http));
        assert_eq!(
            rejected(router.route(&request("http://origin/a"))),
            Some(CoapStatus::BadGateway)
        );
    }

    #[test]
    fn test_unknown_scheme_is_bad_option() {
        let mut req = Request::new(Method::Get);
        req.options_mut().add(CoapOption::proxy_uri("ftp://files/a"));
        assert_eq!(rejected(router().route(&req)), Some(CoapStatus::BadOption));

        let mut req = Request::new(Method::Get);
        req.options_mut().add(CoapOption::proxy_uri("no-scheme"));
        assert_eq!(rejected(router().route(&req)), Some(CoapStatus::BadOption));
    }

    #[tokio::test]
    async fn test_dispatch() {
        let response = router().dispatch(request("https://origin/a")).await;
        assert_eq!(response.payload().as_ref(), b"http");

        let response = router().dispatch(Request::new(Method::Get)).await;
        assert_eq!(response.status(), CoapStatus::BadOption);
    }
}
