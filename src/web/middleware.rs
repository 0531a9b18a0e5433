//! Wiring of both gates into a host request pipeline.
//!
//! # Integration Flow
//!
//! ```text
//! HTTP Request
//!   ↓
//! Framework-specific code builds RequestAdapter
//!   ↓
//! DevGuard::context()            → RequestContext (client IP, main/sub)
//!   ↓
//! DevGuard::on_request()         → profiler/toolbar forced off if denied
//!   ↓
//! Router picks a handler
//!   ↓
//! DevGuard::on_handler()         → AccessDenied (403) if restricted and denied
//!   ↓
//! Handler runs
//! ```

use std::sync::Arc;

use crate::allowlist::{Allowlist, AllowlistEvaluator, AuthorizationOutcome, Evaluate};
use crate::config::GuardConfig;
use crate::context::RequestContext;
use crate::error::AccessDenied;
use crate::gate::{ProfilerGate, RouteGate};
use crate::resolver::SystemResolver;
use crate::sink::{LogSink, TracingSink};

use super::{ExtractContext, RouteRestriction};

/// Both gates plus the configuration switches that sit around them.
///
/// One `DevGuard` is built at startup and shared by every request handler.
/// When the configuration disables the guard, every hook is a no-op.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use devgate::{AllowlistEvaluator, GuardConfig, MemorySink, StaticResolver};
/// use devgate::web::{DevGuard, HandlerMeta, RequestAdapter};
///
/// let config = GuardConfig::default();
/// let evaluator = AllowlistEvaluator::with_resolver(Arc::new(config.allowlist()), StaticResolver::new());
/// let guard = DevGuard::with_parts(&config, evaluator, MemorySink::new());
///
/// let mut adapter = RequestAdapter::new("req-1".to_string());
/// adapter.set_remote_addr("10.0.0.1");
///
/// let mut ctx = guard.context(&adapter);
/// guard.on_request(&mut ctx);
/// assert!(guard.on_handler(&ctx, &HandlerMeta::restricted_action()).is_err());
/// assert!(guard.on_handler(&ctx, &HandlerMeta::untagged()).is_ok());
/// ```
#[derive(Debug)]
pub struct DevGuard<E = AllowlistEvaluator<SystemResolver>, S = TracingSink> {
    enabled: bool,
    trusted_proxies: Allowlist,
    profiler: ProfilerGate<Arc<E>, Arc<S>>,
    route: RouteGate<Arc<E>, Arc<S>>,
}

impl DevGuard {
    /// Builds a guard that resolves through the operating system and logs
    /// through `tracing`.
    pub fn from_config(config: &GuardConfig) -> Self {
        let evaluator = AllowlistEvaluator::new(Arc::new(config.allowlist()));
        Self::with_parts(config, evaluator, TracingSink)
    }
}

impl<E: Evaluate, S: LogSink> DevGuard<E, S> {
    /// Builds a guard around a custom evaluator and sink.
    pub fn with_parts(config: &GuardConfig, evaluator: E, sink: S) -> Self {
        let evaluator = Arc::new(evaluator);
        let sink = Arc::new(sink);
        let options = config.gate_options();

        if !config.enabled {
            tracing::info!(target: "devgate", "developer allowlist disabled by configuration");
        }

        Self {
            enabled: config.enabled,
            trusted_proxies: config.trusted_proxy_list(),
            profiler: ProfilerGate::with_sink(Arc::clone(&evaluator), options, Arc::clone(&sink)),
            route: RouteGate::with_sink(evaluator, options, sink),
        }
    }

    /// Returns true unless the configuration switched the guard off.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Builds the per-request context, honouring trusted proxies.
    pub fn context<R: ExtractContext + ?Sized>(&self, request: &R) -> RequestContext {
        request.extract_context(&self.trusted_proxies)
    }

    /// Request phase hook: applies the profiler gate.
    ///
    /// Returns `None` when nothing was evaluated (guard disabled or
    /// sub-request).
    pub fn on_request(&self, ctx: &mut RequestContext) -> Option<AuthorizationOutcome> {
        if !self.enabled {
            return None;
        }
        self.profiler.apply(ctx)
    }

    /// Handler phase hook: applies the route gate.
    ///
    /// Runs for sub-requests too; a restricted handler stays restricted
    /// however it is reached.
    ///
    /// # Errors
    ///
    /// Returns [`AccessDenied`] when the route is restricted and the client
    /// is not on the allowlist.
    pub fn on_handler<T: RouteRestriction + ?Sized>(
        &self,
        ctx: &RequestContext,
        route: &T,
    ) -> Result<(), AccessDenied> {
        if !self.enabled {
            return Ok(());
        }
        self.route.enforce(route.is_restricted(), ctx.client_ip())
    }
}
