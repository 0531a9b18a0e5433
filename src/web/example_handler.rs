//! Example request pipeline demonstrating both gates end to end.
//!
//! **These examples are for documentation and testing only.**
//! They stand in for a host framework's kernel without requiring actual HTTP
//! infrastructure.

use crate::allowlist::Evaluate;
use crate::context::FeatureFlag;
use crate::sink::LogSink;

use super::{DevGuard, RequestAdapter};

/// What the simulated host sends back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevResponse {
    /// Request ID for tracing
    pub request_id: String,
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: String,
    /// Whether the profiler collected this request
    pub profiler_enabled: bool,
    /// Whether the debug toolbar was injected
    pub toolbar_enabled: bool,
}

/// Runs one request through a development-mode host.
///
/// The host enables the profiler and toolbar by default; the guard can
/// only switch them off. A restricted handler that rejects the client turns
/// into a 403 with the fixed denial message.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use devgate::{AllowlistEvaluator, GuardConfig, MemorySink, StaticResolver};
/// use devgate::web::{example_handler::handle_request, DevGuard, HandlerMeta, RequestAdapter};
///
/// let config = GuardConfig::default();
/// let evaluator = AllowlistEvaluator::with_resolver(Arc::new(config.allowlist()), StaticResolver::new());
/// let guard = DevGuard::with_parts(&config, evaluator, MemorySink::new());
///
/// let mut adapter = RequestAdapter::new("req-admin-001".to_string());
/// adapter.set_remote_addr("203.0.113.9");
/// adapter.set_handler(Some(HandlerMeta::restricted_handler()));
///
/// let response = handle_request(&guard, &adapter);
/// assert_eq!(response.status, 403);
/// assert!(!response.profiler_enabled);
/// ```
pub fn handle_request<E: Evaluate, S: LogSink>(
    guard: &DevGuard<E, S>,
    adapter: &RequestAdapter,
) -> DevResponse {
    let mut ctx = guard.context(adapter);
    guard.on_request(&mut ctx);

    let profiler_enabled = ctx.flag(FeatureFlag::Profiler).unwrap_or(true);
    let toolbar_enabled = ctx.flag(FeatureFlag::DebugToolbar).unwrap_or(true);

    let (status, body) = match guard.on_handler(&ctx, &adapter.handler()) {
        Ok(()) => (200, format!("handled {}", ctx.request_id())),
        Err(denied) => (denied.status(), denied.message().to_string()),
    };

    DevResponse {
        request_id: ctx.request_id().to_string(),
        status,
        body,
        profiler_enabled,
        toolbar_enabled,
    }
}
