use std::collections::HashMap;
use std::fmt;

/// Client address used when the host cannot determine one.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Whether a request came from the outside or was issued internally while
/// handling another one (fragment rendering, forwards, error pages).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestKind {
    /// Top-level request received from a client
    #[default]
    Main,
    /// Nested request issued during handling of a main request
    Sub,
}

/// Diagnostic surfaces that the profiler gate can switch off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureFlag {
    /// The detailed request profiler
    Profiler,
    /// The inline debug toolbar
    DebugToolbar,
}

impl FeatureFlag {
    /// Both flags, in the order they are applied.
    pub const ALL: [FeatureFlag; 2] = [FeatureFlag::Profiler, FeatureFlag::DebugToolbar];

    /// Returns the request attribute name hosts conventionally use.
    pub fn attribute(&self) -> &'static str {
        match self {
            FeatureFlag::Profiler => "_profiler",
            FeatureFlag::DebugToolbar => "_wdt",
        }
    }
}

impl fmt::Display for FeatureFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.attribute())
    }
}

/// Per-request state seen by the gates.
///
/// A context belongs to exactly one request; the gates never reach outside
/// it. Flags that nobody set read as `None` so "explicitly disabled" and
/// "left to defaults" stay distinguishable.
///
/// # Examples
///
/// ```
/// use devgate::{FeatureFlag, RequestContext, RequestKind};
///
/// let mut ctx = RequestContext::new("req-1", Some("10.0.0.1".to_string()));
/// assert_eq!(ctx.kind(), RequestKind::Main);
/// assert_eq!(ctx.flag(FeatureFlag::Profiler), None);
///
/// ctx.set_flag(FeatureFlag::Profiler, false);
/// assert_eq!(ctx.flag(FeatureFlag::Profiler), Some(false));
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: String,
    client_ip: Option<String>,
    kind: RequestKind,
    flags: HashMap<FeatureFlag, bool>,
}

impl RequestContext {
    /// Creates a context for a main request.
    pub fn new(request_id: impl Into<String>, client_ip: Option<String>) -> Self {
        Self {
            request_id: request_id.into(),
            client_ip,
            kind: RequestKind::Main,
            flags: HashMap::new(),
        }
    }

    /// Creates a context for a nested request.
    pub fn sub_request(request_id: impl Into<String>, client_ip: Option<String>) -> Self {
        Self {
            kind: RequestKind::Sub,
            ..Self::new(request_id, client_ip)
        }
    }

    /// Returns the request ID.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Returns the client address, or [`UNKNOWN_CLIENT`] if unavailable.
    pub fn client_ip(&self) -> &str {
        self.client_ip.as_deref().unwrap_or(UNKNOWN_CLIENT)
    }

    /// Returns the request kind.
    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    /// Returns true for top-level requests.
    pub fn is_main_request(&self) -> bool {
        self.kind == RequestKind::Main
    }

    /// Returns the flag value, or `None` if it was never set.
    pub fn flag(&self, flag: FeatureFlag) -> Option<bool> {
        self.flags.get(&flag).copied()
    }

    /// Sets a flag explicitly.
    pub fn set_flag(&mut self, flag: FeatureFlag, enabled: bool) {
        self.flags.insert(flag, enabled);
    }

    /// Returns true if the flag is set to anything.
    pub fn has_flag(&self, flag: FeatureFlag) -> bool {
        self.flags.contains_key(&flag)
    }
}
