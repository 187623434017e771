use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tabula::db::{Database, Ident, Schema, TableProvisioner};
use tabula::router::{TabulaState, tabula_router};
use tower::ServiceExt;

async fn app() -> Router {
    app_with_db().await.0
}

async fn app_with_db() -> (Router, Database) {
    let schema = Arc::new(
        Schema::from_json_str(r#"{"users": {"name": "TEXT", "age": "INTEGER"}}"#)
            .expect("schema should parse"),
    );
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("in-memory database should open");
    let collections = tabula::start(&db, schema).await.expect("startup reset");
    (tabula_router(TabulaState::new(collections)), db)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, String) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let resp = app
        .clone()
        .oneshot(builder.body(body).expect("failed to build request"))
        .await
        .expect("request failed");

    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let text = String::from_utf8(bytes.to_vec()).expect("response body was not utf-8");
    (status, text)
}

fn parse(text: &str) -> Value {
    serde_json::from_str(text).expect("response body was not json")
}

#[tokio::test]
async fn crud_round_trip_over_http() {
    let app = app().await;

    let (status, body) = send(&app, "POST", "/users", Some(json!({"name": "Ann", "age": 30}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(parse(&body), json!({"id": 1}));

    let (status, body) = send(&app, "GET", "/users/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body), json!({"id": 1, "name": "Ann", "age": 30}));

    let (status, body) = send(&app, "POST", "/users/1", Some(json!({"name": "Ann", "age": 31}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body), json!({"id": 1, "name": "Ann", "age": 31}));

    let (status, body) = send(&app, "PUT", "/users/1", Some(json!({"age": 32}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body), json!({"id": 1, "name": null, "age": 32}));

    let (status, body) = send(&app, "DELETE", "/users/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());

    let (status, _) = send(&app, "DELETE", "/users/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = send(&app, "GET", "/users/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(parse(&body)["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn missing_records_are_not_found() {
    let app = app().await;

    let (status, _) = send(&app, "GET", "/users/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "POST", "/users/99", Some(json!({"name": "x"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "GET", "/users/abc", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn undeclared_collection_create_is_an_opaque_failure() {
    let app = app().await;

    let (status, body) = send(&app, "POST", "/ghost", Some(json!({"x": 1}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body = parse(&body);
    assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
    assert!(!body.to_string().contains("ghost"));
    assert!(!body.to_string().contains("schema"));

    // the table exists now, so reads and deletes work normally
    let (status, _) = send(&app, "GET", "/ghost/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "DELETE", "/ghost/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_input_is_rejected_before_storage() {
    let app = app().await;

    let (status, body) = send(&app, "POST", "/users%3B%20DROP%20TABLE%20users", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(parse(&body)["error"]["code"], "INVALID_COLLECTION");

    let (status, _) = send(&app, "GET", "/users--/1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "POST", "/users", Some(json!(["Ann", 30]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(parse(&body)["error"]["code"], "INVALID_BODY");

    // users table survived
    let (status, _) = send(&app, "POST", "/users", Some(json!({"name": "Bo"}))).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn reads_and_deletes_do_not_create_tables() {
    let (app, db) = app_with_db().await;
    let provisioner = TableProvisioner::new(db.pool().clone());
    let nosuch = Ident::parse("nosuch").unwrap();

    let (status, _) = send(&app, "GET", "/nosuch/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "DELETE", "/nosuch/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(!provisioner.exists(&nosuch).await.unwrap());

    // a write is what provisions an ad hoc collection
    let (status, _) = send(&app, "POST", "/nosuch/1", Some(json!({}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(provisioner.exists(&nosuch).await.unwrap());
}
