//! Reverse DNS lookup.
//!
//! The evaluator performs at most one reverse lookup per call, and only when
//! no IP entry matched. Lookups are best-effort: every failure is reported
//! as "no hostname".

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;

/// Resolves an IP address to a hostname (PTR lookup).
///
/// Implementations must not panic and must fold every failure into `None`.
pub trait ReverseResolver: Send + Sync {
    /// Returns the hostname for `ip`, or `None` when none could be found.
    fn reverse(&self, ip: IpAddr) -> Option<String>;
}

impl<R: ReverseResolver + ?Sized> ReverseResolver for &R {
    fn reverse(&self, ip: IpAddr) -> Option<String> {
        (**self).reverse(ip)
    }
}

impl<R: ReverseResolver + ?Sized> ReverseResolver for Arc<R> {
    fn reverse(&self, ip: IpAddr) -> Option<String> {
        (**self).reverse(ip)
    }
}

impl<R: ReverseResolver + ?Sized> ReverseResolver for Box<R> {
    fn reverse(&self, ip: IpAddr) -> Option<String> {
        (**self).reverse(ip)
    }
}

/// Resolver backed by the operating system (`getnameinfo`).
///
/// The call blocks for as long as the platform resolver allows; its timeout
/// is configured outside this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl SystemResolver {
    /// Creates a system resolver.
    pub fn new() -> Self {
        Self
    }
}

impl ReverseResolver for SystemResolver {
    fn reverse(&self, ip: IpAddr) -> Option<String> {
        match dns_lookup::lookup_addr(&ip) {
            Ok(name) => normalize_answer(ip, &name),
            Err(err) => {
                tracing::debug!(target: "devgate", %ip, error = %err, "reverse lookup failed");
                None
            }
        }
    }
}

/// Cleans a resolver answer: strips the root dot and discards numeric echoes
/// of the queried address (returned when no PTR record exists).
fn normalize_answer(ip: IpAddr, name: &str) -> Option<String> {
    let name = name.trim().trim_end_matches('.');

    if name.is_empty() || name.parse::<IpAddr>().is_ok_and(|echo| echo == ip) {
        return None;
    }

    Some(name.to_string())
}

/// Resolver answering from a fixed table.
///
/// Addresses missing from the table resolve to nothing.
///
/// # Examples
///
/// ```
/// use devgate::{ReverseResolver, StaticResolver};
///
/// let resolver = StaticResolver::new().with_entry("10.1.2.3".parse().unwrap(), "ci.example.com");
/// assert_eq!(
///     resolver.reverse("10.1.2.3".parse().unwrap()).as_deref(),
///     Some("ci.example.com")
/// );
/// assert!(resolver.reverse("10.1.2.4".parse().unwrap()).is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    entries: HashMap<IpAddr, String>,
}

impl StaticResolver {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an answer, builder style.
    pub fn with_entry(mut self, ip: IpAddr, hostname: impl Into<String>) -> Self {
        self.insert(ip, hostname);
        self
    }

    /// Adds or replaces an answer.
    pub fn insert(&mut self, ip: IpAddr, hostname: impl Into<String>) {
        self.entries.insert(ip, hostname.into());
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ReverseResolver for StaticResolver {
    fn reverse(&self, ip: IpAddr) -> Option<String> {
        self.entries.get(&ip).cloned()
    }
}
