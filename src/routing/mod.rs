//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route registration (at startup):
//!     method list + pattern DSL + handler + extra params
//!     → router.rs (RouterBuilder: compile, expand methods, log errors)
//!     → build() seals an immutable Router
//!     → shared.rs (optional hot-swappable handle)
//!
//! Incoming request:
//!     RequestContext (method, normalized path, params, async flag)
//!     → method.rs (method / XHR acceptance)
//!     → pattern matcher (structural match)
//!     → dispatch.rs (DispatchResult: match, params, errors)
//!     → handler.rs (invoke now with force-run, or later via run())
//! ```
//!
//! # Design Decisions
//! - Routes compiled at registration, immutable at runtime
//! - First match wins, in registration order
//! - Deterministic: same input always resolves to the same result
//! - Explicit no-match rather than a silent default

pub mod dispatch;
pub mod handler;
pub mod method;
pub mod router;
pub mod shared;

pub use dispatch::{DispatchResult, RouteMatch};
pub use handler::{Handler, HandlerRef, HandlerRegistry, Invocation};
pub use method::RouteMethod;
pub use router::{RouteEntry, Router, RouterBuilder};
pub use shared::SharedRouter;
