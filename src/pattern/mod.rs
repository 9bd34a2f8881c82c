//! Route pattern subsystem.
//!
//! # Data Flow
//! ```text
//! Route registration:
//!     "users/(<id>:n!)"
//!     → compiler.rs (parse segments, validate captures, build regex)
//!     → RoutePattern (immutable, owned by one route entry)
//!
//! Request resolution:
//!     normalized path "users/42"
//!     → matcher.rs (anchored match against the whole path)
//!     → Captures { positional, named } or no match
//! ```
//!
//! # Design Decisions
//! - Patterns compiled once at registration, never at request time
//! - One anchored, case-insensitive regex per pattern
//! - Capture metadata kept alongside the regex so output order is fixed
//! - At most one wildcard per pattern, rejected at compile time otherwise

pub mod compiler;
pub mod matcher;

pub use compiler::{compile, Capture, CharClass, CompileError, Piece, RoutePattern, Segment};
pub use matcher::{Captures, Matcher};
