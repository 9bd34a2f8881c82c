//! Request normalization subsystem.
//!
//! # Data Flow
//! ```text
//! Host / transport layer
//!     → raw method, URI, query string, body, headers
//!     → context.rs (decode, strip base path + script name, parse params,
//!                   detect async requests)
//!     → RequestContext (immutable, one per request)
//!     → routing::Router::resolve
//!
//! axum / http request parts
//!     → http.rs (adapter)
//!     → context.rs
//! ```
//!
//! # Design Decisions
//! - The router never sees raw transport data, only a RequestContext
//! - Base path and script name are removed as case-insensitive substrings,
//!   not as a strict prefix
//! - Non-GET bodies are always parsed as URL-encoded forms

pub mod context;
pub mod http;

pub use context::{RawRequest, RequestContext, RequestOptions};
