//! Web framework integration surface.
//!
//! This module provides the boundary between HTTP frameworks and devgate's
//! two gates. It handles:
//! - Mapping HTTP requests to a [`RequestContext`](crate::RequestContext)
//! - Determining the client address behind trusted proxies
//! - Describing whether the routed handler is restricted
//!
//! # Design Principles
//!
//! 1. **No Framework Dependencies**: This module contains no framework-specific code.
//!    It defines interfaces that framework-specific code can implement.
//!
//! 2. **Two Hooks**: The host calls [`DevGuard::on_request`] before routing and
//!    [`DevGuard::on_handler`] right before invoking the handler.
//!
//! 3. **Explicit Context**: No global state. All context flows through values.
//!
//! # Example Flow
//!
//! ```ignore
//! // In a framework-specific integration (e.g., axum, actix):
//!
//! let guard = DevGuard::from_config(&GuardConfig::from_yaml_file("devgate.yaml")?);
//!
//! // 1. Extract from HTTP request
//! let adapter = RequestAdapter::from_http_request(&http_req);
//! let mut ctx = guard.context(&adapter);
//!
//! // 2. Request phase: maybe switch diagnostics off
//! guard.on_request(&mut ctx);
//!
//! // 3. Handler phase: reject restricted routes
//! guard.on_handler(&ctx, &route.meta())?;
//! ```

mod adapter;
pub mod example_handler;
mod extract;
mod middleware;

pub use adapter::RequestAdapter;
pub use extract::{ExtractContext, HandlerMeta, RouteRestriction};
pub use middleware::DevGuard;
