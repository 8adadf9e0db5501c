//! In-process CoAP resources

use crate::forwarder::Forwarder;
use async_trait::async_trait;
use cuttlefish_core::{CoapStatus, MediaType, Method, Request, Response};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};
use url::Url;

/// A resource served by the gateway itself
pub trait LocalResource: Send + Sync + std::fmt::Debug {
    /// Resource name, also its path
    fn name(&self) -> &str;

    /// Handle a request addressed to this resource
    fn handle(&self, request: &Request) -> Response;
}

/// Counter resource. GET answers `Response <n> from resource <name>`.
#[derive(Debug)]
pub struct CounterResource {
    name: String,
    counter: AtomicU64,
}

impl CounterResource {
    /// Create a counter resource
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl LocalResource for CounterResource {
    fn name(&self) -> &str {
        &self.name
    }

    fn handle(&self, request: &Request) -> Response {
        if request.method() != Method::Get {
            return Response::new(CoapStatus::MethodNotAllowed);
        }

        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        let mut response = Response::new(CoapStatus::Content)
            .with_payload(format!("Response {n} from resource {}", self.name));
        response.set_content_type(MediaType::TEXT_PLAIN);
        response
    }
}

/// CoAP forwarder that serves targets from an in-process resource table,
/// keyed by the target URI's path.
///
/// The target's scheme, host, and port are ignored: every `coap://` or
/// `coaps://` authority resolves against this one table. When it is the
/// configured CoAP downstream, the gateway answers for any CoAP host.
#[derive(Debug, Clone, Default)]
pub struct LocalResources {
    resources: Arc<DashMap<String, Arc<dyn LocalResource>>>,
}

impl LocalResources {
    /// Create an empty resource table
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with one [`CounterResource`] per name
    pub fn with_counters<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let resources = Self::new();
        for name in names {
            resources.add(Arc::new(CounterResource::new(name)));
        }
        resources
    }

    /// Add or replace a resource
    pub fn add(&self, resource: Arc<dyn LocalResource>) {
        let path = resource.name().trim_matches('/').to_string();
        debug!(path = %path, "Local resource added");
        self.resources.insert(path, resource);
    }

    /// Number of resources
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether there are no resources
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    fn lookup(&self, request: &Request) -> Option<Arc<dyn LocalResource>> {
        let target = Url::parse(request.proxy_uri()?).ok()?;
        let path = target.path().trim_matches('/');
        trace!(path, "Local resource lookup");
        self.resources.get(path).map(|r| Arc::clone(r.value()))
    }
}

#[async_trait]
impl Forwarder for LocalResources {
    async fn forward(&self, request: Request) -> Response {
        match self.lookup(&request) {
            Some(resource) => resource.handle(&request),
            None => Response::new(CoapStatus::NotFound),
        }
    }

    fn name(&self) -> &str {
        "local"
    }
}
