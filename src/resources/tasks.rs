//! `/tasks` resource.
//!
//! Timestamps are stored as RFC 3339 UTC strings with millisecond precision,
//! e.g. `2024-05-01T12:30:00.000Z`.

use axum::http::Method;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::http::{ApiError, ApiResponse, ApiResult, RouteRequest};
use crate::resources::{search_term, validation};
use crate::routing::RouteTable;
use crate::store::{Database, Filter, Record, StoreError, StoreResult};

pub const COLLECTION: &str = "tasks";

const SEARCH_FIELDS: [&str; 2] = ["title", "description"];
const NOT_FOUND: &str = "Tarefa não encontrada";

/// A stored task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// A fresh, uncompleted task with a generated id.
    pub fn new(title: String, description: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            description,
            created_at: now,
            updated_at: None,
            completed_at: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    pub fn from_record(record: &Record) -> StoreResult<Self> {
        Ok(Self {
            id: record.id.clone(),
            title: record.required("title")?.to_string(),
            description: record.required("description")?.to_string(),
            created_at: parse_rfc3339("created_at", record.required("created_at")?)?,
            updated_at: parse_timestamp("updated_at", record.field("updated_at")?)?,
            completed_at: parse_timestamp("completed_at", record.field("completed_at")?)?,
        })
    }

    pub fn into_record(self) -> Record {
        Record::new(self.id)
            .with("title", Some(self.title))
            .with("description", Some(self.description))
            .with("created_at", Some(format_timestamp(self.created_at)))
            .with("updated_at", self.updated_at.map(format_timestamp))
            .with("completed_at", self.completed_at.map(format_timestamp))
    }
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_rfc3339(field: &str, value: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| StoreError::InvalidField {
            field: field.to_string(),
            reason: e.to_string(),
        })
}

fn parse_timestamp(field: &str, value: Option<&str>) -> StoreResult<Option<DateTime<Utc>>> {
    value.map(|v| parse_rfc3339(field, v)).transpose()
}

/// Body of `POST /tasks` and `PUT /tasks/:id`.
#[derive(Debug, Default, Deserialize)]
pub struct TaskPayload {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl TaskPayload {
    fn validate(self) -> Result<(String, String), ApiError> {
        validation::require(&[
            ("title", self.title.as_deref()),
            ("description", self.description.as_deref()),
        ])?;
        Ok((
            self.title.unwrap_or_default(),
            self.description.unwrap_or_default(),
        ))
    }
}

pub fn routes(table: RouteTable, database: &Database) -> RouteTable {
    let (db_list, db_create, db_update, db_delete, db_toggle) = (
        database.clone(),
        database.clone(),
        database.clone(),
        database.clone(),
        database.clone(),
    );

    table
        .route(Method::GET, "/tasks", move |req| list(&db_list, &req))
        .route(Method::POST, "/tasks", move |req| create(&db_create, &req))
        .route(Method::PUT, "/tasks/:id", move |req| update(&db_update, &req))
        .route(Method::DELETE, "/tasks/:id", move |req| delete(&db_delete, &req))
        .route(Method::PATCH, "/tasks/:id/completed", move |req| {
            toggle_completed(&db_toggle, &req)
        })
}

/// `GET /tasks[?search=TERM]`: all tasks, or those whose title or description contains TERM.
pub fn list(database: &Database, req: &RouteRequest) -> ApiResult {
    let filter = search_term(req).map(|term| Filter::search(&SEARCH_FIELDS, term));
    let tasks = database.select(COLLECTION, filter.as_ref())?;
    ApiResponse::json(&tasks)
}

pub fn create(database: &Database, req: &RouteRequest) -> ApiResult {
    let (title, description) = req.json::<TaskPayload>()?.validate()?;

    let task = Task::new(title, description, Utc::now());
    tracing::info!(task_id = %task.id, "Task created");
    database.insert(COLLECTION, task.into_record());

    Ok(ApiResponse::created())
}

/// Replace title and description; keeps `created_at` and `completed_at`.
pub fn update(database: &Database, req: &RouteRequest) -> ApiResult {
    let (title, description) = req.json::<TaskPayload>()?.validate()?;
    let id = req.param("id");

    database
        .modify(COLLECTION, id, |record| {
            let task = Task {
                title,
                description,
                updated_at: Some(Utc::now()),
                ..Task::from_record(record)?
            };
            *record = task.into_record();
            Ok(())
        })?
        .ok_or_else(not_found)?;

    Ok(ApiResponse::no_content())
}

pub fn delete(database: &Database, req: &RouteRequest) -> ApiResult {
    let id = req.param("id");
    if !database.delete(COLLECTION, id) {
        return Err(not_found());
    }
    tracing::info!(task_id = %id, "Task deleted");

    Ok(ApiResponse::no_content())
}

/// `PATCH /tasks/:id/completed`: set `completed_at` to now, or clear it if already set.
pub fn toggle_completed(database: &Database, req: &RouteRequest) -> ApiResult {
    let id = req.param("id");

    let completed = database
        .modify(COLLECTION, id, |record| {
            let completed_at = if Task::from_record(record)?.is_completed() {
                None
            } else {
                Some(format_timestamp(Utc::now()))
            };
            let completed = completed_at.is_some();
            record.set("completed_at", completed_at);
            Ok(completed)
        })?
        .ok_or_else(not_found)?;
    tracing::info!(task_id = %id, completed, "Task completion toggled");

    Ok(ApiResponse::no_content())
}

fn not_found() -> ApiError {
    ApiError::NotFound(NOT_FOUND.to_string())
}
