//! GET strategy against a live in-memory database.

mod common;
use common::*;

use oxide_rest_core::ResponseBody;
use serde_json::json;

// ===================================================================
// Filters
// ===================================================================

#[tokio::test]
async fn bare_value_is_strict_equality() {
    let executor = setup().await;
    assert_eq!(names(&executor, "iso3166alpha3=CAN").await, ["Canada"]);
    assert!(names(&executor, "iso3166alpha3=CA").await.is_empty());
}

#[tokio::test]
async fn integer_comparison_uses_column_affinity() {
    let executor = setup().await;
    assert_eq!(names(&executor, "id=gt.2").await, ["Afghanistan"]);
    assert_eq!(names(&executor, "id=neq.1&order=id").await.len(), 2);
}

#[tokio::test]
async fn like_with_encoded_quotes_and_wildcard() {
    let executor = setup().await;
    assert_eq!(
        names(&executor, "name=like.%2522united*%2522").await,
        ["United States of America"]
    );
}

#[tokio::test]
async fn in_list_membership() {
    let executor = setup().await;
    let raw = "tld=in.(%22.ca!%40%2C%2C%2C%2C%2C%5E%22%2C%22.us%22%2C%22.uk%22%2C%22.au%22)";
    assert_eq!(names(&executor, raw).await, ["United States of America"]);
    assert_eq!(
        names(&executor, "tld=in.(%22.ca%22,%22.af%22)&order=name").await,
        ["Afghanistan", "Canada"]
    );
}

#[tokio::test]
async fn is_booleans_and_null() {
    let executor = setup().await;
    assert_eq!(names(&executor, "landlocked=is.true").await, ["Afghanistan"]);
    assert_eq!(names(&executor, "landlocked=is.false").await.len(), 2);
    assert!(names(&executor, "landlocked=eq.true").await.is_empty());
    assert!(names(&executor, "tld=is.null").await.is_empty());
    assert_eq!(names(&executor, "iso3166alpha3=is.AFG").await, ["Afghanistan"]);
}

#[tokio::test]
async fn blob_filter_is_ignored_on_read() {
    let executor = setup().await;
    assert_eq!(names(&executor, "flag_gif=is.null").await.len(), 3);
}

// ===================================================================
// Modifiers
// ===================================================================

#[tokio::test]
async fn projection_keeps_requested_order() {
    let executor = setup().await;
    let response = executor
        .read("countries", &query("select=name,id&iso3166alpha3=AFG"))
        .await;
    assert_eq!(
        serde_json::to_string(json_body(&response)).unwrap(),
        r#"[{"name":"Afghanistan","id":3}]"#
    );
}

#[tokio::test]
async fn order_limit_offset() {
    let executor = setup().await;
    assert_eq!(
        names(&executor, "order=name.desc&limit=2").await,
        ["United States of America", "Canada"]
    );
    assert_eq!(
        names(&executor, "order=name&limit=1&offset=1").await,
        ["Canada"]
    );
}

#[tokio::test]
async fn default_page_is_ten_rows() {
    let executor = setup().await;
    for i in 0..12 {
        let response = executor
            .create(
                "countries",
                &query(""),
                &json!({"iso3166alpha3": format!("X{i:02}"), "name": format!("X{i}")}),
                false,
            )
            .await;
        assert_eq!(response.status(), 200, "{response:?}");
    }
    assert_eq!(names(&executor, "").await.len(), 10);
    assert_eq!(names(&executor, "offset=10").await.len(), 5);
}

// ===================================================================
// Binary negotiation
// ===================================================================

#[tokio::test]
async fn single_gif_cell_is_served_as_image() {
    let executor = setup().await;
    let response = executor
        .read("countries", &query("select=flag_gif&iso3166alpha3=CAN"))
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.content_type, "image/gif");
    assert_eq!(response.body, ResponseBody::Bytes(GIF.to_vec()));
}

#[tokio::test]
async fn unknown_bytes_are_octet_stream() {
    let executor = setup().await;
    let response = executor
        .read("countries", &query("select=flag_gif&iso3166alpha3=USA"))
        .await;
    assert_eq!(response.content_type, "application/octet-stream");
}

#[tokio::test]
async fn blob_inside_json_rows_is_a_byte_array() {
    let executor = setup().await;
    let response = executor
        .read("countries", &query("select=iso3166alpha3,flag_gif&iso3166alpha3=USA"))
        .await;
    assert_eq!(
        json_body(&response),
        &json!([{"iso3166alpha3": "USA", "flag_gif": [1, 2, 3]}])
    );
}

// ===================================================================
// Errors
// ===================================================================

#[tokio::test]
async fn unknown_column_is_a_400_naming_it() {
    let executor = setup().await;
    let response = executor.read("countries", &query("area51=1")).await;
    let message = error_message(&response);
    assert!(message.contains("area51"), "{message}");
}

#[tokio::test]
async fn empty_in_list_still_checks_the_column() {
    let executor = setup().await;
    let response = executor.read("countries", &query("nosuchcol=in.()")).await;
    assert_eq!(error_message(&response), "no such column: nosuchcol");

    let response = executor.delete("countries", &query("nosuchcol=in.()")).await;
    assert_eq!(error_message(&response), "no such column: nosuchcol");
    assert_eq!(count(&executor).await, 3);
}

#[tokio::test]
async fn empty_in_list_matches_nothing() {
    let executor = setup().await;
    assert!(names(&executor, "name=in.()").await.is_empty());
}

#[tokio::test]
async fn grammar_errors_are_400() {
    let executor = setup().await;
    let response = executor.read("countries", &query("name=or.(a,b)")).await;
    assert_eq!(error_message(&response), "logical OR filters are not supported");

    let response = executor.read("countries", &query("limit=all")).await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn unknown_table_is_a_400() {
    let executor = setup().await;
    let response = executor.read("planets", &query("")).await;
    assert_eq!(error_message(&response), "no such table: planets");
}
