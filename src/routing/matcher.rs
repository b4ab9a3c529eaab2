//! Path pattern matching.
//!
//! # Responsibilities
//! - Compile a route template (`/tasks/:id`) into an anchored regex
//! - Capture each `:name` segment as a named group
//! - Capture an optional trailing query string separately
//!
//! # Design Decisions
//! - Anchored at both ends: `/tasks` never matches `/tasksxyz`
//! - Parameters match word characters and hyphens only (`[\w\-]+`)
//! - Literal template text is escaped, so `.` or `+` in a template are literal
//! - Malformed templates are a programmer error and panic at startup

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// Name of the capture group holding the raw query string.
const QUERY_GROUP: &str = "query";

static PARAM_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":([a-zA-Z]+)").expect("valid parameter token regex"));

/// A compiled route template.
#[derive(Debug, Clone)]
pub struct PathPattern {
    template: String,
    regex: Regex,
    params: Vec<String>,
}

/// Result of a successful match against a request target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathMatch {
    /// Named path parameters, e.g. `id` for `/tasks/:id`.
    pub params: HashMap<String, String>,
    /// Raw query string without the leading `?`, if the target had one.
    pub query: Option<String>,
}

impl PathPattern {
    /// Compile a route template.
    ///
    /// # Panics
    /// Panics if the template produces an invalid regex (e.g. the same
    /// parameter name used twice, or a parameter named `query`).
    pub fn new(template: &str) -> Self {
        let mut source = String::from("^");
        let mut params = Vec::new();
        let mut last = 0;

        for caps in PARAM_TOKEN.captures_iter(template) {
            let (Some(token), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            source.push_str(&regex::escape(&template[last..token.start()]));
            source.push_str(&format!(r"(?P<{}>[\w\-]+)", name.as_str()));
            params.push(name.as_str().to_string());
            last = token.end();
        }
        source.push_str(&regex::escape(&template[last..]));
        source.push_str(&format!(r"(?P<{QUERY_GROUP}>\?.*)?$"));

        let regex = Regex::new(&source)
            .unwrap_or_else(|e| panic!("invalid route template {template:?}: {e}"));

        Self {
            template: template.to_string(),
            regex,
            params,
        }
    }

    /// The template this pattern was built from.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Match a request target (path plus optional query string).
    pub fn matches(&self, target: &str) -> Option<PathMatch> {
        let caps = self.regex.captures(target)?;

        let params = self
            .params
            .iter()
            .filter_map(|name| {
                caps.name(name)
                    .map(|m| (name.clone(), m.as_str().to_string()))
            })
            .collect();

        let query = caps
            .name(QUERY_GROUP)
            .map(|m| m.as_str().trim_start_matches('?').to_string());

        Some(PathMatch { params, query })
    }
}
