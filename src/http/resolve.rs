//! Upstream name resolution.
//!
//! Hosts listed in `proxy.host_mappings` resolve to their configured
//! address; every other name goes through the system resolver. Mapped
//! addresses carry port 0, so the connector fills in the request's port.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::vec;

use hyper_util::client::legacy::connect::dns::{GaiResolver, Name};
use tower::Service;

/// Resolver used by the upstream connector.
#[derive(Clone)]
pub struct UpstreamResolver {
    mappings: Arc<HashMap<String, IpAddr>>,
    dns: GaiResolver,
}

impl UpstreamResolver {
    pub fn new(mappings: &BTreeMap<String, IpAddr>) -> Self {
        Self {
            mappings: Arc::new(
                mappings
                    .iter()
                    .map(|(host, ip)| (host.to_ascii_lowercase(), *ip))
                    .collect(),
            ),
            dns: GaiResolver::new(),
        }
    }

    /// Configured address for `host`, if any.
    pub fn mapped(&self, host: &str) -> Option<IpAddr> {
        self.mappings.get(&host.to_ascii_lowercase()).copied()
    }
}

impl Service<Name> for UpstreamResolver {
    type Response = vec::IntoIter<SocketAddr>;
    type Error = io::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.dns.poll_ready(cx)
    }

    fn call(&mut self, name: Name) -> Self::Future {
        if let Some(ip) = self.mapped(name.as_str()) {
            tracing::trace!(host = %name, ip = %ip, "Resolved via host mapping");
            return Box::pin(async move { Ok(vec![SocketAddr::new(ip, 0)].into_iter()) });
        }

        let lookup = self.dns.call(name);
        Box::pin(async move { Ok(lookup.await?.collect::<Vec<_>>().into_iter()) })
    }
}
