//! Request context handed to route handlers.
//!
//! # Responsibilities
//! - Carry path parameters extracted by the matcher
//! - Parse the captured query string
//! - Decode the buffered JSON body on demand
//!
//! # Design Decisions
//! - Body is buffered by the dispatcher before the handler runs
//! - An empty body decodes as the payload's default (all fields absent)
//! - Undecodable bodies are a 400, never a 422

use std::collections::HashMap;

use axum::body::Bytes;
use axum::http::Method;
use serde::de::DeserializeOwned;

use crate::http::response::ApiError;
use crate::routing::PathMatch;

/// Everything a handler needs from the incoming request.
#[derive(Debug, Clone)]
pub struct RouteRequest {
    method: Method,
    path: String,
    params: HashMap<String, String>,
    query: HashMap<String, String>,
    body: Bytes,
}

impl RouteRequest {
    pub fn new(method: Method, path: impl Into<String>, path_match: PathMatch, body: Bytes) -> Self {
        let query = path_match
            .query
            .as_deref()
            .map(parse_query)
            .unwrap_or_default();

        Self {
            method,
            path: path.into(),
            params: path_match.params,
            query,
            body,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// A named path parameter. Empty if the route template does not declare it.
    pub fn param(&self, name: &str) -> &str {
        self.params.get(name).map(String::as_str).unwrap_or_default()
    }

    /// A query parameter, percent-decoded.
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Decode the body as JSON.
    pub fn json<T>(&self) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Default,
    {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(T::default());
        }
        serde_json::from_slice(&self.body).map_err(|e| {
            tracing::debug!(path = %self.path, error = %e, "Rejected request body");
            ApiError::BadRequest("Corpo da requisição inválido".to_string())
        })
    }
}

/// Parse `a=1&b=two%20words`. Later duplicates win.
fn parse_query(query: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}
