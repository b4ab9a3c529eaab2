//! Record store subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     db.json → database.rs (load whole document, or start empty + persist)
//!
//! Mutation (insert / update / partial_update / delete):
//!     handler → database.rs (mutate under write lock)
//!     → serialize full snapshot
//!     → persist.rs (queue, coalesce, temp file + rename)
//!
//! Query (select / find):
//!     handler → database.rs (read lock, clone matching records)
//! ```
//!
//! # Design Decisions
//! - The whole document is the unit of persistence; no incremental writes
//! - Writes are fire-and-forget for callers but ordered by a single writer task
//! - Collections are created on first insert; no schema
//! - Ids are supplied by callers; uniqueness is not enforced

pub mod database;
pub mod error;
pub mod persist;
pub mod record;

pub use database::{Database, Document};
pub use error::{StoreError, StoreResult};
pub use record::{Fields, Filter, Record};
