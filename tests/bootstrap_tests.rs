use serde_json::{Map, json};
use std::{
    fs,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};
use tabula::TabulaError;
use tabula::config::Config;
use tabula::db::SchemaError;

fn temp_schema_path(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!(
        "tabula-schema-{tag}-{}-{}.json",
        std::process::id(),
        nanos
    ));
    path
}

fn config_for(schema_path: PathBuf) -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        schema_path,
        ..Config::default()
    }
}

#[tokio::test]
async fn bootstrap_serves_collections_from_schema_file() {
    let path = temp_schema_path("valid");
    fs::write(&path, r#"{"users": {"name": "TEXT", "age": "INTEGER"}}"#)
        .expect("failed to write schema file");

    let collections = tabula::bootstrap(&config_for(path.clone()))
        .await
        .expect("bootstrap should succeed");

    let mut fields = Map::new();
    fields.insert("name".into(), json!("Ann"));
    let id = collections.create("users", &fields).await.unwrap();
    let record = collections.read("users", id).await.unwrap().unwrap();
    assert_eq!(
        serde_json::to_value(&record).unwrap(),
        json!({"id": id, "name": "Ann", "age": null})
    );

    let _ = fs::remove_file(&path);
}

#[tokio::test]
async fn bootstrap_fails_on_malformed_schema_file() {
    let path = temp_schema_path("malformed");
    fs::write(&path, r#"{"users": {"name": "VARCHAR"}}"#).expect("failed to write schema file");

    let err = tabula::bootstrap(&config_for(path.clone()))
        .await
        .err()
        .expect("bootstrap should fail");
    assert!(matches!(
        err,
        TabulaError::Schema(SchemaError::UnsupportedType { .. })
    ));

    let _ = fs::remove_file(&path);
}

#[tokio::test]
async fn bootstrap_fails_on_invalid_json() {
    let path = temp_schema_path("not-json");
    fs::write(&path, "users: name TEXT").expect("failed to write schema file");

    let err = tabula::bootstrap(&config_for(path.clone()))
        .await
        .err()
        .expect("bootstrap should fail");
    assert!(matches!(err, TabulaError::Schema(SchemaError::Json(_))));

    let _ = fs::remove_file(&path);
}

#[tokio::test]
async fn bootstrap_fails_on_missing_schema_file() {
    let path = temp_schema_path("missing");

    let err = tabula::bootstrap(&config_for(path))
        .await
        .err()
        .expect("bootstrap should fail");
    assert!(matches!(err, TabulaError::Schema(SchemaError::Io(_))));
}
