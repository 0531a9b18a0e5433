use crate::allowlist::{AuthorizationOutcome, Evaluate};
use crate::context::{FeatureFlag, RequestContext};
use crate::sink::{LogSink, Severity, TracingSink};

use super::{blocked_attempt, GateOptions};

/// Soft gate for the profiler and debug toolbar.
///
/// Runs once per main request. Clients outside the allowlist keep being
/// served; only the two diagnostic surfaces are forced off for them.
/// Authorized clients leave the context untouched, so whatever the host
/// would do by default still applies.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use devgate::{
///     Allowlist, AllowlistEvaluator, FeatureFlag, GateOptions, MemorySink, ProfilerGate,
///     RequestContext, StaticResolver,
/// };
///
/// let allowlist = Arc::new(Allowlist::new(["127.0.0.1"], Vec::<String>::new()));
/// let evaluator = AllowlistEvaluator::with_resolver(allowlist, StaticResolver::new());
/// let sink = Arc::new(MemorySink::new());
/// let gate = ProfilerGate::with_sink(evaluator, GateOptions::default(), Arc::clone(&sink));
///
/// let mut ctx = RequestContext::new("req-1", Some("10.0.0.5".to_string()));
/// gate.apply(&mut ctx);
///
/// assert_eq!(ctx.flag(FeatureFlag::Profiler), Some(false));
/// assert_eq!(ctx.flag(FeatureFlag::DebugToolbar), Some(false));
/// assert_eq!(sink.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ProfilerGate<E, S = TracingSink> {
    evaluator: E,
    options: GateOptions,
    sink: S,
}

impl<E: Evaluate> ProfilerGate<E, TracingSink> {
    /// Creates a gate that logs through `tracing`.
    pub fn new(evaluator: E, options: GateOptions) -> Self {
        Self::with_sink(evaluator, options, TracingSink)
    }
}

impl<E: Evaluate, S: LogSink> ProfilerGate<E, S> {
    /// Creates a gate with a custom log sink.
    pub fn with_sink(evaluator: E, options: GateOptions, sink: S) -> Self {
        Self {
            evaluator,
            options,
            sink,
        }
    }

    /// Applies the gate to one request.
    ///
    /// Returns the evaluation outcome, or `None` for sub-requests, which are
    /// skipped before any evaluation happens.
    pub fn apply(&self, ctx: &mut RequestContext) -> Option<AuthorizationOutcome> {
        if !ctx.is_main_request() {
            return None;
        }

        let client_ip = ctx.client_ip().to_string();
        let outcome = self.evaluator.evaluate(&client_ip);

        if !outcome.authorized {
            for flag in FeatureFlag::ALL {
                ctx.set_flag(flag, false);
            }

            if self.options.log_blocked_attempts {
                self.sink
                    .record(blocked_attempt(Severity::Info, &client_ip, &outcome));
            }
        }

        Some(outcome)
    }

    /// Returns the options this gate was built with.
    pub fn options(&self) -> GateOptions {
        self.options
    }
}
