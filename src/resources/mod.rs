//! HTTP resources and the route table that serves them.
//!
//! # Routes
//! ```text
//! GET    /users?search=   → users::list
//! POST   /users           → users::create
//! PUT    /users/:id       → users::update
//! DELETE /users/:id       → users::delete
//! GET    /tasks?search=   → tasks::list
//! POST   /tasks           → tasks::create
//! PUT    /tasks/:id       → tasks::update
//! DELETE /tasks/:id       → tasks::delete
//! PATCH  /tasks/:id/completed → tasks::toggle_completed
//! ```

pub mod tasks;
pub mod users;
pub mod validation;

use crate::routing::RouteTable;
use crate::store::Database;

/// Build the full route table. Every handler holds its own clone of `database`.
pub fn routes(database: &Database) -> RouteTable {
    let table = users::routes(RouteTable::new(), database);
    tasks::routes(table, database)
}

/// The search term, if the client sent a non-empty one.
fn search_term(request: &crate::http::RouteRequest) -> Option<&str> {
    request.query("search").filter(|term| !term.is_empty())
}
