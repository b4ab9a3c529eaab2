//! `/users` resource.

use axum::http::Method;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::http::{ApiError, ApiResponse, ApiResult, RouteRequest};
use crate::resources::{search_term, validation};
use crate::routing::RouteTable;
use crate::store::{Database, Filter, Record, StoreResult};

pub const COLLECTION: &str = "users";

const SEARCH_FIELDS: [&str; 2] = ["name", "email"];
const NOT_FOUND: &str = "Usuário não encontrado";

/// A stored user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl User {
    pub fn from_record(record: &Record) -> StoreResult<Self> {
        Ok(Self {
            id: record.id.clone(),
            name: record.required("name")?.to_string(),
            email: record.required("email")?.to_string(),
        })
    }

    pub fn into_record(self) -> Record {
        Record::new(self.id)
            .with("name", Some(self.name))
            .with("email", Some(self.email))
    }
}

/// Body of `POST /users` and `PUT /users/:id`.
#[derive(Debug, Default, Deserialize)]
pub struct UserPayload {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UserPayload {
    fn validate(self) -> Result<(String, String), ApiError> {
        validation::require(&[
            ("name", self.name.as_deref()),
            ("email", self.email.as_deref()),
        ])?;
        Ok((self.name.unwrap_or_default(), self.email.unwrap_or_default()))
    }
}

pub fn routes(table: RouteTable, database: &Database) -> RouteTable {
    let (db_list, db_create, db_update, db_delete) = (
        database.clone(),
        database.clone(),
        database.clone(),
        database.clone(),
    );

    table
        .route(Method::GET, "/users", move |req| list(&db_list, &req))
        .route(Method::POST, "/users", move |req| create(&db_create, &req))
        .route(Method::PUT, "/users/:id", move |req| update(&db_update, &req))
        .route(Method::DELETE, "/users/:id", move |req| delete(&db_delete, &req))
}

/// `GET /users[?search=TERM]`: all users, or those whose name or email contains TERM.
pub fn list(database: &Database, req: &RouteRequest) -> ApiResult {
    let filter = search_term(req).map(|term| Filter::search(&SEARCH_FIELDS, term));
    let users = database.select(COLLECTION, filter.as_ref())?;
    ApiResponse::json(&users)
}

pub fn create(database: &Database, req: &RouteRequest) -> ApiResult {
    let (name, email) = req.json::<UserPayload>()?.validate()?;

    let user = User {
        id: Uuid::new_v4().to_string(),
        name,
        email,
    };
    tracing::info!(user_id = %user.id, "User created");
    database.insert(COLLECTION, user.into_record());

    Ok(ApiResponse::created())
}

pub fn update(database: &Database, req: &RouteRequest) -> ApiResult {
    let (name, email) = req.json::<UserPayload>()?.validate()?;
    let id = req.param("id");

    let user = User {
        id: id.to_string(),
        name,
        email,
    };
    if !database.update(COLLECTION, id, user.into_record().into_fields()) {
        return Err(ApiError::NotFound(NOT_FOUND.to_string()));
    }

    Ok(ApiResponse::no_content())
}

pub fn delete(database: &Database, req: &RouteRequest) -> ApiResult {
    let id = req.param("id");
    if !database.delete(COLLECTION, id) {
        return Err(ApiError::NotFound(NOT_FOUND.to_string()));
    }
    tracing::info!(user_id = %id, "User deleted");

    Ok(ApiResponse::no_content())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::PathMatch;
    use axum::body::Bytes;
    use axum::http::StatusCode;

    fn request(id: Option<&str>, query: Option<&str>, body: &str) -> RouteRequest {
        let mut path_match = PathMatch::default();
        if let Some(id) = id {
            path_match.params.insert("id".into(), id.into());
        }
        path_match.query = query.map(str::to_string);
        RouteRequest::new(Method::POST, "/users", path_match, Bytes::from(body.to_string()))
    }

    fn only_user(database: &Database) -> User {
        let records = database.select(COLLECTION, None).unwrap();
        assert_eq!(records.len(), 1);
        User::from_record(&records[0]).unwrap()
    }

    #[test]
    fn test_create_validates() {
        let db = Database::in_memory();

        let err = create(&db, &request(None, None, r#"{"name":"Al","email":"a@x.com"}"#))
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.message(), "name e email devem ter pelo menos 3 caracteres");

        let err = create(&db, &request(None, None, "")).unwrap_err();
        assert_eq!(err.message(), "name e email são obrigatórios");

        assert!(db.select(COLLECTION, None).unwrap().is_empty());
    }

    #[test]
    fn test_create_then_search() {
        let db = Database::in_memory();
        let res = create(&db, &request(None, None, r#"{"name":"Alice","email":"a@x.com"}"#))
            .unwrap();
        assert_eq!(res, ApiResponse::created());

        let user = only_user(&db);
        assert_eq!(user.name, "Alice");
        assert!(Uuid::parse_str(&user.id).is_ok());

        let found = list(&db, &request(None, Some("search=alice"), "")).unwrap();
        match found {
            ApiResponse::Json(StatusCode::OK, value) => {
                assert_eq!(value[0]["email"], "a@x.com");
            }
            other => panic!("unexpected response {other:?}"),
        }

        let none = list(&db, &request(None, Some("search=bob"), "")).unwrap();
        assert_eq!(none, ApiResponse::Json(StatusCode::OK, serde_json::json!([])));
    }

    #[test]
    fn test_update_and_delete() {
        let db = Database::in_memory();
        create(&db, &request(None, None, r#"{"name":"Alice","email":"a@x.com"}"#)).unwrap();
        let id = only_user(&db).id;

        update(
            &db,
            &request(Some(&id), None, r#"{"name":"Alicia","email":"alicia@x.com"}"#),
        )
        .unwrap();
        let user = only_user(&db);
        assert_eq!(user.id, id);
        assert_eq!(user.name, "Alicia");

        delete(&db, &request(Some(&id), None, "")).unwrap();
        assert!(db.select(COLLECTION, None).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_id_is_404() {
        let db = Database::in_memory();

        let err = delete(&db, &request(Some("nope"), None, "")).unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "Usuário não encontrado");

        let err = update(
            &db,
            &request(Some("nope"), None, r#"{"name":"Alice","email":"a@x.com"}"#),
        )
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
