//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path?query)
//!     → router.rs (scan route table)
//!     → matcher.rs (anchored pattern, named params, query capture)
//!     → Return: matched Route + params, or NoMatch
//!
//! Route Compilation (at startup):
//!     "/tasks/:id" templates
//!     → compile into anchored regexes
//!     → freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same route
//! - First match wins (declaration order)

pub mod matcher;
pub mod router;

pub use matcher::{PathMatch, PathPattern};
pub use router::{Handler, Route, RouteMatch, RouteTable};
