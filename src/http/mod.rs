//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware: request ID, trace, timeout, body limit)
//!     → server.rs dispatch (route table lookup, body buffering)
//!     → request.rs (params, query, JSON body for the handler)
//!     → handler (resources/)
//!     → response.rs (status + JSON body or empty body)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::RouteRequest;
pub use response::{ApiError, ApiResponse, ApiResult};
pub use server::{ApiServer, AppState};
