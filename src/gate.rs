//! Enforcement points built on the allowlist decision.
//!
//! - [`ProfilerGate`]: soft gate. A denied client keeps being served, but the
//!   profiler and debug toolbar are switched off for its request.
//! - [`RouteGate`]: hard gate. A denied client gets [`AccessDenied`] on
//!   routes tagged as restricted.
//!
//! Both gates are configured once from [`GateOptions`] and shared across
//! requests.
//!
//! [`AccessDenied`]: crate::AccessDenied

mod profiler;
mod route;

pub use profiler::ProfilerGate;
pub use route::{RouteDecision, RouteGate};

use crate::allowlist::AuthorizationOutcome;
use crate::sink::{BlockedAttempt, Severity};

/// Options shared by both gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateOptions {
    /// Emit one log entry per blocked attempt
    pub log_blocked_attempts: bool,
}

impl Default for GateOptions {
    fn default() -> Self {
        Self {
            log_blocked_attempts: true,
        }
    }
}

/// Builds the entry a gate hands to its sink after a denial.
fn blocked_attempt(
    severity: Severity,
    client_ip: &str,
    outcome: &AuthorizationOutcome,
) -> BlockedAttempt {
    let reverse = outcome.reverse_or_unknown();
    let message = match severity {
        Severity::Info => format!(
            "Profiler disabled for unauthorized IP {} (reverse: {})",
            client_ip, reverse
        ),
        Severity::Warning => format!(
            "Restricted route access denied for {} (reverse: {})",
            client_ip, reverse
        ),
    };

    BlockedAttempt {
        severity,
        client_ip: client_ip.to_string(),
        reverse: outcome.resolved_hostname.clone(),
        message,
    }
}
