//! Pattern-based request routing engine.
//!
//! Routes are written in a compact DSL (`users/(<id>:n!)`, `page/(:*!)`),
//! compiled once, and matched first-match-wins against a normalized request.

pub mod config;
pub mod error;
pub mod links;
pub mod observability;
pub mod pattern;
pub mod request;
pub mod routing;

pub use config::schema::RouterConfig;
pub use error::RouterError;
pub use pattern::{compile, CompileError, Matcher, RoutePattern};
pub use request::{RawRequest, RequestContext, RequestOptions};
pub use routing::{DispatchResult, HandlerRef, Invocation, Router, RouterBuilder, SharedRouter};
