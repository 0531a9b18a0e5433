//! Developer allowlist for diagnostic tooling and restricted routes.
//!
//! This crate decides whether a request comes from a developer, and acts on
//! that decision at two enforcement points:
//! - **Soft gate** ([`ProfilerGate`]): clients outside the allowlist are still
//!   served, but the profiler and debug toolbar are switched off for them.
//! - **Hard gate** ([`RouteGate`]): routes tagged as restricted answer
//!   [`AccessDenied`] (HTTP 403) to clients outside the allowlist.
//!
//! # Core Types
//!
//! - [`GuardConfig`]: YAML-loadable configuration with development defaults
//! - [`Allowlist`]: Compiled IP/CIDR entries and hostname patterns
//! - [`AllowlistEvaluator`]: Allowlist plus a [`ReverseResolver`]
//! - [`RequestContext`]: Per-request client address, kind and feature flags
//! - [`LogSink`]: Destination for blocked-attempt log entries
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use devgate::{
//!     AllowlistEvaluator, FeatureFlag, GuardConfig, ProfilerGate, RequestContext, RouteGate,
//!     StaticResolver,
//! };
//!
//! let config = GuardConfig::from_yaml_str("allowed_ips: ['127.0.0.1', '192.168.0.0/16']")
//!     .expect("valid configuration");
//!
//! let evaluator = Arc::new(AllowlistEvaluator::with_resolver(
//!     Arc::new(config.allowlist()),
//!     StaticResolver::new(),
//! ));
//! let profiler = ProfilerGate::new(Arc::clone(&evaluator), config.gate_options());
//! let routes = RouteGate::new(evaluator, config.gate_options());
//!
//! // A colleague on the office network keeps the toolbar.
//! let mut ctx = RequestContext::new("req-1", Some("192.168.45.100".to_string()));
//! profiler.apply(&mut ctx);
//! assert_eq!(ctx.flag(FeatureFlag::DebugToolbar), None);
//!
//! // Anyone else loses it and cannot reach restricted routes.
//! let mut ctx = RequestContext::new("req-2", Some("203.0.113.50".to_string()));
//! profiler.apply(&mut ctx);
//! assert_eq!(ctx.flag(FeatureFlag::DebugToolbar), Some(false));
//! assert!(routes.enforce(true, ctx.client_ip()).is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod allowlist;
mod config;
mod context;
mod error;
mod gate;
mod network;
mod pattern;
mod resolver;
mod sink;
pub mod web;

pub use allowlist::{evaluate, Allowlist, AllowlistEvaluator, AuthorizationOutcome, Evaluate};
pub use config::{GuardConfig, LOCALHOST, LOOPBACK_ADDRESSES};
pub use context::{FeatureFlag, RequestContext, RequestKind, UNKNOWN_CLIENT};
pub use error::{AccessDenied, ConfigError, Error, ACCESS_DENIED_MESSAGE};
pub use gate::{GateOptions, ProfilerGate, RouteDecision, RouteGate};
pub use network::IpRule;
pub use pattern::HostPattern;
pub use resolver::{ReverseResolver, StaticResolver, SystemResolver};
pub use sink::{BlockedAttempt, LogSink, MemorySink, Severity, TracingSink};
