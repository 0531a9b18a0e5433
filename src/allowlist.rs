//! The allowlist decision engine.
//!
//! Authorization is two-tiered. A client is first matched against the IP
//! allowlist (addresses and CIDR networks). Only when that fails is its
//! address reverse-resolved and the hostname matched against the hostname
//! patterns. Both tiers walk their lists in order and stop at the first hit.
//!
//! Evaluation is total: malformed entries, malformed client addresses and
//! resolver failures all end in a plain denial, never in an error.

use std::net::IpAddr;
use std::sync::Arc;

use crate::network::IpRule;
use crate::pattern::HostPattern;
use crate::resolver::{ReverseResolver, SystemResolver};

/// Result of evaluating one client against the allowlists.
///
/// `resolved_hostname` is only present when a reverse lookup was attempted
/// (no IP entry matched) and returned a name. It is set on denials too so
/// the name can be logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationOutcome {
    /// Whether the client is on the allowlist
    pub authorized: bool,
    /// Hostname obtained from the reverse lookup, if one was performed and succeeded
    pub resolved_hostname: Option<String>,
}

impl AuthorizationOutcome {
    /// Outcome of a direct IP/CIDR match.
    pub fn allowed_by_ip() -> Self {
        Self {
            authorized: true,
            resolved_hostname: None,
        }
    }

    /// Outcome of a hostname pattern match.
    pub fn allowed_by_host(hostname: String) -> Self {
        Self {
            authorized: true,
            resolved_hostname: Some(hostname),
        }
    }

    /// Outcome of a failed evaluation.
    pub fn denied(resolved_hostname: Option<String>) -> Self {
        Self {
            authorized: false,
            resolved_hostname,
        }
    }

    /// Returns the resolved hostname, or `"unknown"` when there is none.
    pub fn reverse_or_unknown(&self) -> &str {
        self.resolved_hostname.as_deref().unwrap_or("unknown")
    }
}

/// Compiled allowlists.
///
/// Built once from configuration and shared read-only between requests.
///
/// # Examples
///
/// ```
/// use devgate::{Allowlist, StaticResolver};
///
/// let allowlist = Allowlist::new(["127.0.0.1", "10.0.0.0/8"], ["*.corp.example"]);
/// let outcome = allowlist.check("10.20.30.40", &StaticResolver::new());
/// assert!(outcome.authorized);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Allowlist {
    ip_rules: Vec<IpRule>,
    host_patterns: Vec<HostPattern>,
}

impl Allowlist {
    /// Compiles the IP and hostname allowlists, preserving their order.
    ///
    /// Entries that cannot be parsed are kept as never-matching rules and
    /// reported once through `tracing`.
    pub fn new<I, H>(ip_allowlist: I, host_allowlist: H) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        H: IntoIterator,
        H::Item: AsRef<str>,
    {
        let allowlist = Self::compile(ip_allowlist, host_allowlist);

        for rule in allowlist.ip_rules.iter().filter(|r| r.is_unparsed()) {
            tracing::warn!(
                target: "devgate",
                entry = %rule,
                "IP allowlist entry is neither an address nor a CIDR network and will never match"
            );
        }

        allowlist
    }

    /// Same as [`new`](Self::new) without reporting unparsed entries.
    fn compile<I, H>(ip_allowlist: I, host_allowlist: H) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        H: IntoIterator,
        H::Item: AsRef<str>,
    {
        let ip_rules = ip_allowlist
            .into_iter()
            .map(|entry| IpRule::parse(entry.as_ref()))
            .collect();

        let host_patterns = host_allowlist
            .into_iter()
            .map(|pattern| HostPattern::new(pattern.as_ref()))
            .collect();

        Self {
            ip_rules,
            host_patterns,
        }
    }

    /// Returns the compiled IP rules in list order.
    pub fn ip_rules(&self) -> &[IpRule] {
        &self.ip_rules
    }

    /// Returns the compiled hostname patterns in list order.
    pub fn host_patterns(&self) -> &[HostPattern] {
        &self.host_patterns
    }

    /// Returns true if `client_ip` is covered by an IP or CIDR entry.
    ///
    /// Never performs DNS.
    pub fn matches_ip(&self, client_ip: &str) -> bool {
        match client_ip.trim().parse::<IpAddr>() {
            Ok(addr) => self.ip_rules.iter().any(|rule| rule.matches(addr)),
            Err(_) => false,
        }
    }

    /// Returns true if `hostname` matches one of the hostname patterns.
    pub fn matches_host(&self, hostname: &str) -> bool {
        self.host_patterns.iter().any(|p| p.matches(hostname))
    }

    /// Evaluates a client address against both tiers.
    pub fn check<R>(&self, client_ip: &str, resolver: &R) -> AuthorizationOutcome
    where
        R: ReverseResolver + ?Sized,
    {
        let addr = match client_ip.trim().parse::<IpAddr>() {
            Ok(addr) => addr,
            // nothing to match or resolve
            Err(_) => return AuthorizationOutcome::denied(None),
        };

        if self.ip_rules.iter().any(|rule| rule.matches(addr)) {
            return AuthorizationOutcome::allowed_by_ip();
        }

        let Some(hostname) = resolver.reverse(addr) else {
            return AuthorizationOutcome::denied(None);
        };

        if self.matches_host(&hostname) {
            AuthorizationOutcome::allowed_by_host(hostname)
        } else {
            AuthorizationOutcome::denied(Some(hostname))
        }
    }
}

/// Evaluates `client_ip` against uncompiled allowlists.
///
/// Convenience form of [`Allowlist::check`] for one-off decisions; hot paths
/// should compile an [`Allowlist`] once and reuse it. Unparsed IP entries
/// are not reported here; [`Allowlist::new`] reports them.
///
/// # Examples
///
/// ```
/// use devgate::{evaluate, StaticResolver};
///
/// let resolver = StaticResolver::new().with_entry("10.0.0.1".parse().unwrap(), "host.example.com");
/// let outcome = evaluate("10.0.0.1", &[] as &[&str], &["*.example.com"], &resolver);
///
/// assert!(outcome.authorized);
/// assert_eq!(outcome.resolved_hostname.as_deref(), Some("host.example.com"));
/// ```
pub fn evaluate<I, H, R>(
    client_ip: &str,
    ip_allowlist: &[I],
    host_allowlist: &[H],
    resolver: &R,
) -> AuthorizationOutcome
where
    I: AsRef<str>,
    H: AsRef<str>,
    R: ReverseResolver + ?Sized,
{
    Allowlist::compile(ip_allowlist, host_allowlist).check(client_ip, resolver)
}

/// Anything that can decide whether a client is on the allowlist.
///
/// The gates depend on this trait rather than on [`AllowlistEvaluator`]
/// directly so hosts and tests can substitute their own decision source.
pub trait Evaluate: Send + Sync {
    /// Decides whether `client_ip` is authorized.
    fn evaluate(&self, client_ip: &str) -> AuthorizationOutcome;
}

impl<E: Evaluate + ?Sized> Evaluate for &E {
    fn evaluate(&self, client_ip: &str) -> AuthorizationOutcome {
        (**self).evaluate(client_ip)
    }
}

impl<E: Evaluate + ?Sized> Evaluate for Arc<E> {
    fn evaluate(&self, client_ip: &str) -> AuthorizationOutcome {
        (**self).evaluate(client_ip)
    }
}

/// The standard [`Evaluate`] implementation: a shared compiled allowlist
/// plus a reverse resolver.
#[derive(Debug, Clone)]
pub struct AllowlistEvaluator<R = SystemResolver> {
    allowlist: Arc<Allowlist>,
    resolver: R,
}

impl AllowlistEvaluator<SystemResolver> {
    /// Creates an evaluator that resolves through the operating system.
    pub fn new(allowlist: Arc<Allowlist>) -> Self {
        Self::with_resolver(allowlist, SystemResolver)
    }
}

impl<R: ReverseResolver> AllowlistEvaluator<R> {
    /// Creates an evaluator with a custom resolver.
    pub fn with_resolver(allowlist: Arc<Allowlist>, resolver: R) -> Self {
        Self {
            allowlist,
            resolver,
        }
    }

    /// Returns the compiled allowlist.
    pub fn allowlist(&self) -> &Allowlist {
        &self.allowlist
    }
}

impl<R: ReverseResolver> Evaluate for AllowlistEvaluator<R> {
    fn evaluate(&self, client_ip: &str) -> AuthorizationOutcome {
        self.allowlist.check(client_ip, &self.resolver)
    }
}
