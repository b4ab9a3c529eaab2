//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Open store (awaited) → Bind listener → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain connections → Flush store → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The store is fully loaded before the first request is accepted
//! - Pending writes are flushed after the last request completes

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
