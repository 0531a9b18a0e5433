//! Wildcard patterns for reverse-DNS hostnames.

use std::fmt;

use glob::{MatchOptions, Pattern};

const HOST_MATCH: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// A hostname pattern from the `allowed_hosts` list.
///
/// Matching rules are fixed regardless of platform: `*` matches any
/// sequence (including the empty one and dots), `?` matches exactly one
/// character, everything else is literal and case-sensitive. Bracket
/// expressions are not supported; `[` and `]` match themselves.
///
/// # Examples
///
/// ```
/// use devgate::HostPattern;
///
/// let pattern = HostPattern::new("*.example.com");
/// assert!(pattern.matches("host.example.com"));
/// assert!(!pattern.matches("example.com"));
/// assert!(!pattern.matches("HOST.EXAMPLE.COM"));
/// ```
#[derive(Debug, Clone)]
pub struct HostPattern {
    raw: String,
    compiled: Option<Pattern>,
}

impl HostPattern {
    /// Compiles a pattern. Never fails; a pattern that cannot be compiled
    /// simply matches nothing.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let compiled = Pattern::new(&to_glob_syntax(&raw)).ok();

        if compiled.is_none() {
            tracing::warn!(
                target: "devgate",
                pattern = %raw,
                "ignoring host pattern that cannot be compiled"
            );
        }

        Self { raw, compiled }
    }

    /// Returns true if `hostname` matches this pattern.
    pub fn matches(&self, hostname: &str) -> bool {
        self.compiled
            .as_ref()
            .is_some_and(|p| p.matches_with(hostname, HOST_MATCH))
    }

    /// Returns the pattern as written in configuration.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns true if the pattern compiled.
    pub fn is_valid(&self) -> bool {
        self.compiled.is_some()
    }
}

impl fmt::Display for HostPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Rewrites a `*`/`?` wildcard into glob syntax: brackets become literal
/// and runs of `*` collapse into one (glob reserves `**` for paths).
fn to_glob_syntax(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 4);
    let mut prev_star = false;

    for c in raw.chars() {
        match c {
            '*' if prev_star => continue,
            '[' => out.push_str("[[]"),
            ']' => out.push_str("[]]"),
            _ => out.push(c),
        }
        prev_star = c == '*';
    }

    out
}
