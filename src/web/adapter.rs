//! Request adapter for mapping HTTP requests to devgate types.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use crate::allowlist::Allowlist;
use crate::context::{RequestContext, RequestKind};

use super::{ExtractContext, HandlerMeta};

/// Adapter for converting framework-specific HTTP requests into devgate
/// types.
///
/// It holds plain owned data so it does not couple to any framework.
/// Framework integrations fill it from their own request type, then hand it
/// to [`DevGuard`](super::DevGuard).
///
/// # Examples
///
/// ```
/// use devgate::{Allowlist, web::{ExtractContext, RequestAdapter}};
///
/// let mut adapter = RequestAdapter::new("req-12345".to_string());
/// adapter.set_remote_addr("10.0.0.2");
/// adapter.add_header("X-Forwarded-For".to_string(), "203.0.113.7".to_string());
///
/// // Forwarding headers are ignored unless the peer is a trusted proxy.
/// let untrusted = Allowlist::default();
/// assert_eq!(adapter.extract_context(&untrusted).client_ip(), "10.0.0.2");
///
/// let trusted = Allowlist::new(["10.0.0.0/8"], Vec::<String>::new());
/// assert_eq!(adapter.extract_context(&trusted).client_ip(), "203.0.113.7");
/// ```
#[derive(Debug, Clone)]
pub struct RequestAdapter {
    /// Unique request identifier (required)
    request_id: String,
    /// Address of the TCP peer
    remote_addr: Option<String>,
    /// Request headers, keyed by lowercase name
    headers: HashMap<String, String>,
    /// Main or sub-request
    kind: RequestKind,
    /// Restriction tags of the routed handler, once routing has happened
    handler: Option<HandlerMeta>,
}

impl RequestAdapter {
    /// Creates a new adapter for a main request with the given request ID.
    pub fn new(request_id: String) -> Self {
        Self {
            request_id,
            remote_addr: None,
            headers: HashMap::new(),
            kind: RequestKind::Main,
            handler: None,
        }
    }

    /// Sets the peer address as a string.
    pub fn set_remote_addr(&mut self, addr: impl Into<String>) {
        self.remote_addr = Some(addr.into());
    }

    /// Sets the peer address from a socket address, dropping the port.
    pub fn set_peer(&mut self, peer: SocketAddr) {
        self.remote_addr = Some(peer.ip().to_string());
    }

    /// Adds a header. Names are case-insensitive.
    ///
    /// A header that appears on several lines is kept as one comma-joined
    /// list, in arrival order.
    pub fn add_header(&mut self, key: String, value: String) {
        self.headers
            .entry(key.to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }

    /// Marks the request as main or sub-request.
    pub fn set_kind(&mut self, kind: RequestKind) {
        self.kind = kind;
    }

    /// Records the restriction tags of the handler the router picked.
    pub fn set_handler(&mut self, handler: Option<HandlerMeta>) {
        self.handler = handler;
    }

    /// Returns a reference to the request ID.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Returns the header value, if present.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns the restriction tags of the routed handler.
    pub fn handler(&self) -> Option<HandlerMeta> {
        self.handler
    }

    /// Determines the client address.
    ///
    /// The peer address is used as-is unless it is a trusted proxy. For a
    /// trusted peer, `X-Forwarded-For` is walked from the right and the
    /// first hop that is not itself a trusted proxy wins; if every hop is
    /// trusted, the leftmost one is the client. A malformed hop makes the
    /// header untrustworthy and the peer address is used instead.
    pub fn client_ip(&self, trusted_proxies: &Allowlist) -> Option<String> {
        let remote = self.remote_addr.as_deref()?.trim();

        if !trusted_proxies.matches_ip(remote) {
            return Some(remote.to_string());
        }

        let Some(forwarded) = self.header("x-forwarded-for") else {
            return Some(remote.to_string());
        };

        let hops: Vec<&str> = forwarded.split(',').map(str::trim).collect();
        if hops.iter().any(|hop| hop.parse::<IpAddr>().is_err()) {
            tracing::debug!(
                target: "devgate",
                request_id = %self.request_id,
                header = %forwarded,
                "ignoring malformed X-Forwarded-For"
            );
            return Some(remote.to_string());
        }

        hops.iter()
            .rev()
            .find(|hop| !trusted_proxies.matches_ip(hop))
            .or_else(|| hops.first())
            .map(|hop| hop.to_string())
    }
}

impl ExtractContext for RequestAdapter {
    fn extract_context(&self, trusted_proxies: &Allowlist) -> RequestContext {
        let client_ip = self.client_ip(trusted_proxies);
        match self.kind {
            RequestKind::Main => RequestContext::new(self.request_id.clone(), client_ip),
            RequestKind::Sub => RequestContext::sub_request(self.request_id.clone(), client_ip),
        }
    }
}
