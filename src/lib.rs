//! Task API library: a small JSON-over-HTTP CRUD service for users and tasks,
//! backed by a single JSON document on disk.

pub mod config;
pub mod http;
pub mod import;
pub mod lifecycle;
pub mod observability;
pub mod resources;
pub mod routing;
pub mod store;

pub use config::ApiConfig;
pub use http::ApiServer;
pub use lifecycle::Shutdown;
pub use store::Database;
