//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Registration / resolution / dispatch:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → stdout (fmt subscriber)
//!     → Prometheus scrape (CLI watch mode)
//! ```

pub mod logging;
pub mod metrics;
