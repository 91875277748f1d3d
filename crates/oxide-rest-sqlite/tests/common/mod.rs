#![allow(dead_code)]

use oxide_rest_core::{QueryParams, ResponseBody, ResponseDescriptor};
use oxide_rest_sqlite::Executor;
use serde_json::Value as JsonValue;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

pub const GIF: &[u8] = b"GIF89a\x01\x00\x01\x00\x80\x00\x00\xff\xff\xff\x00\x00\x00!\xf9\x04";

pub async fn create_test_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory SQLite pool")
}

/// A `countries` table with three rows, plus an executor over it.
pub async fn setup() -> Executor {
    let pool = create_test_pool().await;
    sqlx::query(
        "CREATE TABLE countries (
            id INTEGER PRIMARY KEY,
            iso3166alpha3 VARCHAR(3) NOT NULL UNIQUE,
            name TEXT NOT NULL,
            tld TEXT,
            landlocked INTEGER,
            flag_gif BLOB
        )",
    )
    .execute(&pool)
    .await
    .unwrap();

    let rows: [(&str, &str, &str, Option<i64>, Option<&[u8]>); 3] = [
        ("CAN", "Canada", ".ca", Some(0), Some(GIF)),
        ("USA", "United States of America", ".us", Some(0), Some(b"\x01\x02\x03".as_slice())),
        ("AFG", "Afghanistan", ".af", Some(1), None),
    ];
    for (iso, name, tld, landlocked, flag) in rows {
        sqlx::query(
            "INSERT INTO countries (iso3166alpha3, name, tld, landlocked, flag_gif) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(iso)
        .bind(name)
        .bind(tld)
        .bind(landlocked)
        .bind(flag)
        .execute(&pool)
        .await
        .unwrap();
    }

    Executor::connect(pool).await.unwrap()
}

pub fn query(raw: &str) -> QueryParams {
    QueryParams::parse(raw)
}

pub fn json_body(response: &ResponseDescriptor) -> &JsonValue {
    match &response.body {
        ResponseBody::Json(value) => value,
        ResponseBody::Bytes(bytes) => panic!("Expected JSON body, got {} bytes", bytes.len()),
    }
}

pub fn error_message(response: &ResponseDescriptor) -> String {
    assert_eq!(response.status(), 400, "Expected 400, got {response:?}");
    json_body(response)["error"]
        .as_str()
        .unwrap_or_else(|| panic!("Expected error message in {response:?}"))
        .to_string()
}

pub async fn count(executor: &Executor) -> i64 {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM countries")
        .fetch_one(executor.pool())
        .await
        .unwrap();
    n
}

pub async fn names(executor: &Executor, raw_query: &str) -> Vec<String> {
    let response = executor.read("countries", &query(raw_query)).await;
    assert_eq!(response.status(), 200, "{response:?}");
    json_body(&response)
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["name"].as_str().unwrap().to_string())
        .collect()
}
