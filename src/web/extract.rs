//! Extraction boundary traits for web integration.
//!
//! Hosts describe two things to devgate: the request (who is calling, and
//! whether it is a main request) and the routed handler (is it restricted).
//! How the host learns either is its own business.

use crate::allowlist::Allowlist;
use crate::context::RequestContext;

/// Builds a [`RequestContext`] from a framework-specific request.
///
/// # Examples
///
/// ```
/// use devgate::{Allowlist, RequestContext};
/// use devgate::web::ExtractContext;
///
/// struct MyFrameworkRequest {
///     id: u64,
///     peer: String,
/// }
///
/// impl ExtractContext for MyFrameworkRequest {
///     fn extract_context(&self, _trusted_proxies: &Allowlist) -> RequestContext {
///         RequestContext::new(self.id.to_string(), Some(self.peer.clone()))
///     }
/// }
///
/// let req = MyFrameworkRequest { id: 7, peer: "10.0.0.1".to_string() };
/// assert_eq!(req.extract_context(&Allowlist::default()).client_ip(), "10.0.0.1");
/// ```
pub trait ExtractContext {
    /// Extracts the per-request context. `trusted_proxies` lists peers whose
    /// forwarding headers may be believed.
    fn extract_context(&self, trusted_proxies: &Allowlist) -> RequestContext;
}

/// Answers "does this route require allowlist enforcement?".
///
/// The answer usually comes from route metadata (attributes, annotations,
/// a route table flag) resolved once per request by the host.
pub trait RouteRestriction {
    /// Returns true if the route is restricted to the allowlist.
    fn is_restricted(&self) -> bool;
}

impl RouteRestriction for bool {
    fn is_restricted(&self) -> bool {
        *self
    }
}

impl<T: RouteRestriction> RouteRestriction for Option<T> {
    fn is_restricted(&self) -> bool {
        self.as_ref().is_some_and(|inner| inner.is_restricted())
    }
}

impl<T: RouteRestriction + ?Sized> RouteRestriction for &T {
    fn is_restricted(&self) -> bool {
        (**self).is_restricted()
    }
}

/// Restriction tags of a routed handler.
///
/// A handler can be tagged as a whole (every action it serves is
/// restricted) or per action. Either tag restricts the route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HandlerMeta {
    /// The handler type carries the restriction tag
    pub handler_restricted: bool,
    /// The invoked action carries the restriction tag
    pub action_restricted: bool,
}

impl HandlerMeta {
    /// A handler with no tags.
    pub fn untagged() -> Self {
        Self::default()
    }

    /// A handler tagged as a whole.
    pub fn restricted_handler() -> Self {
        Self {
            handler_restricted: true,
            action_restricted: false,
        }
    }

    /// A handler whose invoked action is tagged.
    pub fn restricted_action() -> Self {
        Self {
            handler_restricted: false,
            action_restricted: true,
        }
    }
}

impl RouteRestriction for HandlerMeta {
    fn is_restricted(&self) -> bool {
        self.handler_restricted || self.action_restricted
    }
}
