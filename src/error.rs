//! Router-level error types.
//!
//! None of these abort route-table construction or request handling: they
//! are appended to an error log (the builder's, then each
//! [`DispatchResult`](crate::routing::DispatchResult)'s) and processing
//! continues. Callers that need hard failures inspect the log.

use thiserror::Error;

use crate::pattern::CompileError;

/// A non-fatal configuration or dispatch problem.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    #[error("route `{pattern}` rejected: {source}")]
    Compile {
        pattern: String,
        #[source]
        source: CompileError,
    },

    #[error("unknown request method `{token}`")]
    UnknownMethod { token: String },

    #[error("handler `{handler}` is not callable")]
    NoCallableHandler { handler: String },
}

impl RouterError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RouterError::Compile { .. } => "compile",
            RouterError::UnknownMethod { .. } => "unknown_method",
            RouterError::NoCallableHandler { .. } => "no_callable_handler",
        }
    }
}
