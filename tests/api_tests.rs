//! End-to-end tests against a live server.

use reqwest::StatusCode;
use serde_json::{json, Value};

mod common;

#[tokio::test]
async fn test_user_lifecycle() {
    let server = common::start_server().await;
    let client = common::client();

    let res = client
        .post(server.url("/users"))
        .json(&json!({ "name": "Al", "email": "a@x.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "name e email devem ter pelo menos 3 caracteres");

    let res = client
        .post(server.url("/users"))
        .json(&json!({ "name": "Alice", "email": "a@x.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    assert!(res.text().await.unwrap().is_empty());

    let users: Vec<Value> = client
        .get(server.url("/users?search=alice"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["name"], "Alice");
    let id = users[0]["id"].as_str().unwrap().to_string();

    let res = client
        .put(server.url(&format!("/users/{id}")))
        .json(&json!({ "name": "Alicia", "email": "alicia@x.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let users: Vec<Value> = client
        .get(server.url("/users?search=ALICIA@"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(users, vec![json!({ "id": id, "name": "Alicia", "email": "alicia@x.com" })]);

    let res = client
        .delete(server.url(&format!("/users/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .delete(server.url(&format!("/users/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Usuário não encontrado");

    server.stop().await;
}

#[tokio::test]
async fn test_task_lifecycle() {
    let server = common::start_server().await;
    let client = common::client();

    let res = client
        .post(server.url("/tasks"))
        .json(&json!({ "title": "Buy milk", "description": "2%" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let res = client
        .post(server.url("/tasks"))
        .json(&json!({ "title": "Buy milk", "description": "whole milk" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let tasks: Vec<Value> = client
        .get(server.url("/tasks"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(tasks.len(), 1);
    assert!(tasks[0]["created_at"].is_string());
    assert!(tasks[0]["updated_at"].is_null());
    assert!(tasks[0]["completed_at"].is_null());
    let id = tasks[0]["id"].as_str().unwrap().to_string();
    let completed_url = server.url(&format!("/tasks/{id}/completed"));

    let res = client.patch(&completed_url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let task = &server.database.select("tasks", None).unwrap()[0];
    assert!(task.field("completed_at").unwrap().is_some());

    let res = client.patch(&completed_url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let task = &server.database.select("tasks", None).unwrap()[0];
    assert!(task.field("completed_at").unwrap().is_none());

    let res = client
        .put(server.url(&format!("/tasks/{id}")))
        .json(&json!({ "title": "Buy oat milk", "description": "barista edition" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let tasks: Vec<Value> = client
        .get(server.url("/tasks?search=barista"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "Buy oat milk");
    assert!(tasks[0]["updated_at"].is_string());

    let res = client
        .delete(server.url(&format!("/tasks/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    server.stop().await;
}

#[tokio::test]
async fn test_delete_unknown_task() {
    let server = common::start_server().await;

    let res = common::client()
        .delete(server.url("/tasks/does-not-exist"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "message": "Tarefa não encontrada" }));

    server.stop().await;
}

#[tokio::test]
async fn test_unmatched_routes() {
    let server = common::start_server().await;
    let client = common::client();

    for (method, path) in [
        (reqwest::Method::GET, "/tasksxyz"),
        (reqwest::Method::GET, "/"),
        (reqwest::Method::POST, "/tasks/abc"),
        (reqwest::Method::PATCH, "/tasks/abc"),
    ] {
        let res = client
            .request(method.clone(), server.url(path))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{method} {path}");
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["message"], "Rota não encontrada");
    }

    server.stop().await;
}

#[tokio::test]
async fn test_invalid_body_is_bad_request() {
    let server = common::start_server().await;

    let res = common::client()
        .post(server.url("/tasks"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    server.stop().await;
}

#[tokio::test]
async fn test_request_id_header() {
    let server = common::start_server().await;
    let client = common::client();

    let res = client.get(server.url("/users")).send().await.unwrap();
    let generated = res.headers().get("x-request-id").unwrap().to_str().unwrap();
    assert!(uuid::Uuid::parse_str(generated).is_ok());

    let res = client
        .get(server.url("/users"))
        .header("x-request-id", "trace-me")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "trace-me");

    server.stop().await;
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let mut config = task_api::ApiConfig::default();
    config.limits.max_body_bytes = 64;
    let server = common::start_server_with(config).await;

    let res = common::client()
        .post(server.url("/tasks"))
        .json(&json!({ "title": "x".repeat(100), "description": "long" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(server.database.select("tasks", None).unwrap().is_empty());

    server.stop().await;
}

#[tokio::test]
async fn test_oversized_chunked_body_rejected() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let mut config = task_api::ApiConfig::default();
    config.limits.max_body_bytes = 64;
    let server = common::start_server_with(config).await;

    let body = json!({ "title": "x".repeat(200), "description": "long" }).to_string();
    let request = format!(
        "POST /tasks HTTP/1.1\r\n\
         Host: {}\r\n\
         Content-Type: application/json\r\n\
         Transfer-Encoding: chunked\r\n\
         Connection: close\r\n\r\n\
         {:x}\r\n{}\r\n0\r\n\r\n",
        server.addr,
        body.len(),
        body
    );

    let mut stream = tokio::net::TcpStream::connect(server.addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();
    // The server may reset the socket once it stops reading the body.
    let mut raw = Vec::new();
    let mut buf = [0u8; 1024];
    while let Ok(n) = stream.read(&mut buf).await {
        if n == 0 {
            break;
        }
        raw.extend_from_slice(&buf[..n]);
    }
    let response = String::from_utf8_lossy(&raw);

    assert!(response.starts_with("HTTP/1.1 413"), "{response}");
    assert!(response.contains(r#"{"message":"Corpo da requisição excede o limite"}"#));
    assert!(server.database.select("tasks", None).unwrap().is_empty());

    server.stop().await;
}

#[tokio::test]
async fn test_data_persisted_on_shutdown() {
    let server = common::start_server().await;
    let client = common::client();
    let data_file = server.data_file.clone();

    for title in ["First task", "Second task"] {
        let res = client
            .post(server.url("/tasks"))
            .json(&json!({ "title": title, "description": "persist me" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let _dir = server.stop().await;

    let document: Value =
        serde_json::from_str(&std::fs::read_to_string(&data_file).unwrap()).unwrap();
    let tasks = document["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0]["title"], "First task");
    assert_eq!(tasks[1]["title"], "Second task");

    let reopened = task_api::Database::open(&data_file).await.unwrap();
    assert_eq!(reopened.select("tasks", None).unwrap().len(), 2);
}
