//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher and store produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (tracing-subscriber fmt layer)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows from the middleware into dispatcher log events
//! - Metric calls are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
