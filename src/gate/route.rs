use crate::allowlist::{AuthorizationOutcome, Evaluate};
use crate::error::AccessDenied;
use crate::sink::{LogSink, Severity, TracingSink};

use super::{blocked_attempt, GateOptions};

/// Terminal state of the route gate for one request.
///
/// ```text
/// NotEvaluated --unrestricted--> Unrestricted
/// NotEvaluated --restricted--> Evaluating --> Allowed | Denied
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// The route is not restricted; nothing was evaluated
    Unrestricted,
    /// The route is restricted and the client is on the allowlist
    Allowed(AuthorizationOutcome),
    /// The route is restricted and the client is not on the allowlist
    Denied(AuthorizationOutcome),
}

impl RouteDecision {
    /// Returns true if handling may continue.
    pub fn is_allowed(&self) -> bool {
        !matches!(self, RouteDecision::Denied(_))
    }
}

/// Hard gate for routes tagged as restricted.
///
/// Runs after routing, right before the handler. Untagged routes pass
/// without evaluation; tagged routes require an allowlisted client.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use devgate::{Allowlist, AllowlistEvaluator, GateOptions, RouteGate, StaticResolver};
///
/// let allowlist = Arc::new(Allowlist::new(["127.0.0.1"], Vec::<String>::new()));
/// let gate = RouteGate::new(
///     AllowlistEvaluator::with_resolver(allowlist, StaticResolver::new()),
///     GateOptions { log_blocked_attempts: false },
/// );
///
/// assert!(gate.enforce(false, "10.0.0.1").is_ok());
/// assert!(gate.enforce(true, "127.0.0.1").is_ok());
///
/// let err = gate.enforce(true, "10.0.0.1").unwrap_err();
/// assert_eq!(err.status(), 403);
/// ```
#[derive(Debug, Clone)]
pub struct RouteGate<E, S = TracingSink> {
    evaluator: E,
    options: GateOptions,
    sink: S,
}

impl<E: Evaluate> RouteGate<E, TracingSink> {
    /// Creates a gate that logs through `tracing`.
    pub fn new(evaluator: E, options: GateOptions) -> Self {
        Self::with_sink(evaluator, options, TracingSink)
    }
}

impl<E: Evaluate, S: LogSink> RouteGate<E, S> {
    /// Creates a gate with a custom log sink.
    pub fn with_sink(evaluator: E, options: GateOptions, sink: S) -> Self {
        Self {
            evaluator,
            options,
            sink,
        }
    }

    /// Decides whether the request may reach its handler.
    ///
    /// Logs denials when enabled but never fails; see [`enforce`](Self::enforce).
    pub fn decide(&self, route_restricted: bool, client_ip: &str) -> RouteDecision {
        if !route_restricted {
            return RouteDecision::Unrestricted;
        }

        let outcome = self.evaluator.evaluate(client_ip);
        if outcome.authorized {
            return RouteDecision::Allowed(outcome);
        }

        if self.options.log_blocked_attempts {
            self.sink
                .record(blocked_attempt(Severity::Warning, client_ip, &outcome));
        }

        RouteDecision::Denied(outcome)
    }

    /// Enforces the restriction.
    ///
    /// # Errors
    ///
    /// Returns [`AccessDenied`] when the route is restricted and the client
    /// is not on the allowlist.
    pub fn enforce(&self, route_restricted: bool, client_ip: &str) -> Result<(), AccessDenied> {
        match self.decide(route_restricted, client_ip) {
            RouteDecision::Unrestricted | RouteDecision::Allowed(_) => Ok(()),
            RouteDecision::Denied(outcome) => {
                Err(AccessDenied::new(client_ip, outcome.resolved_hostname))
            }
        }
    }

    /// Returns the options this gate was built with.
    pub fn options(&self) -> GateOptions {
        self.options
    }
}
