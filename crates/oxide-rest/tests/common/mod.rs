#![allow(dead_code)]

use std::sync::Arc;

use oxide_rest::{Request, Response, RestApi};
use serde_json::Value as JsonValue;
use sqlx::sqlite::SqlitePoolOptions;
use tempfile::TempDir;

pub const GIF: &[u8] = b"GIF89a\x01\x00\x01\x00\x80\x00\x00\xff\xff\xff\x00\x00\x00!\xf9\x04";

/// A file-backed database in a temporary directory, served by a `RestApi`.
pub struct TestApi {
    pub api: Arc<RestApi>,
    _dir: TempDir,
}

impl TestApi {
    pub async fn send(&self, request: Request) -> Response {
        self.api.handle(request).await
    }
}

pub async fn setup() -> TestApi {
    let dir = TempDir::new().unwrap_or_else(|e| panic!("Failed to create temp dir: {e}"));
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("countries.db").display());

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&url)
        .await
        .unwrap_or_else(|e| panic!("Failed to open {url}: {e}"));
    sqlx::query(
        "CREATE TABLE countries (
            id INTEGER PRIMARY KEY,
            iso3166alpha3 VARCHAR(3) NOT NULL UNIQUE,
            name TEXT NOT NULL,
            landlocked INTEGER,
            flag_gif BLOB
        )",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query("CREATE TABLE tags (label TEXT)")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query(
        "INSERT INTO countries (iso3166alpha3, name, landlocked, flag_gif) \
         VALUES ('CAN', 'Canada', 0, ?), ('AFG', 'Afghanistan', 1, NULL)",
    )
    .bind(GIF)
    .execute(&pool)
    .await
    .unwrap();
    pool.close().await;

    let api = oxide_rest::connect(&url, 2)
        .await
        .unwrap_or_else(|e| panic!("Failed to build API: {e}"));
    TestApi {
        api: Arc::new(api),
        _dir: dir,
    }
}

pub fn json(response: &Response) -> JsonValue {
    response
        .json_body()
        .unwrap_or_else(|e| panic!("Expected JSON body ({e}), got {response:?}"))
}

pub fn error_message(response: &Response) -> String {
    assert_eq!(response.status, 400, "Expected 400, got {response:?}");
    json(response)["error"]
        .as_str()
        .unwrap_or_else(|| panic!("Expected error message in {response:?}"))
        .to_string()
}

pub async fn names(test: &TestApi, target: &str) -> Vec<String> {
    let response = test.send(Request::get(target)).await;
    assert_eq!(response.status, 200, "{response:?}");
    json(&response)
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["name"].as_str().unwrap().to_string())
        .collect()
}
