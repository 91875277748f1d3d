//! POST, PUT and DELETE strategies against a live in-memory database.

mod common;
use common::*;

use oxide_rest_core::{ResponseBody, RestRequest, Verb};
use serde_json::json;

// ===================================================================
// Create
// ===================================================================

#[tokio::test]
async fn create_single_row_returns_its_id() {
    let executor = setup().await;
    let response = executor
        .create(
            "countries",
            &query(""),
            &json!({"iso3166alpha3": "MEX", "name": "Mexico"}),
            false,
        )
        .await;
    assert_eq!(json_body(&response), &json!([4]));
}

#[tokio::test]
async fn create_batch_returns_ids_in_order() {
    let executor = setup().await;
    let response = executor
        .create(
            "countries",
            &query(""),
            &json!([
                {"iso3166alpha3": "MEX", "name": "Mexico"},
                {"iso3166alpha3": "BRA", "name": "Brazil"},
                {"iso3166alpha3": "ARG", "name": "Argentina"},
            ]),
            false,
        )
        .await;
    assert_eq!(json_body(&response), &json!([4, 5, 6]));
    assert_eq!(count(&executor).await, 6);
}

#[tokio::test]
async fn create_batch_is_atomic() {
    let executor = setup().await;
    let response = executor
        .create(
            "countries",
            &query(""),
            &json!([
                {"iso3166alpha3": "MEX", "name": "Mexico"},
                {"iso3166alpha3": "CAN", "name": "Canada again"},
            ]),
            false,
        )
        .await;
    let message = error_message(&response);
    assert!(message.contains("UNIQUE constraint failed"), "{message}");
    assert_eq!(count(&executor).await, 3);
}

#[tokio::test]
async fn create_columns_projection() {
    let executor = setup().await;
    let response = executor
        .create(
            "countries",
            &query("columns=iso3166alpha3,name"),
            &json!({"iso3166alpha3": "MEX", "name": "Mexico", "tld": ".mx"}),
            false,
        )
        .await;
    assert_eq!(response.status(), 200, "{response:?}");

    let row = executor
        .read("countries", &query("select=tld&iso3166alpha3=MEX"))
        .await;
    assert_eq!(json_body(&row), &json!([{"tld": null}]));
}

#[tokio::test]
async fn create_with_merge_updates_existing_row() {
    let executor = setup().await;
    let response = executor
        .create(
            "countries",
            &query(""),
            &json!({"iso3166alpha3": "CAN", "name": "Dominion of Canada", "tld": ".ca"}),
            true,
        )
        .await;
    assert_eq!(json_body(&response), &json!([1]));
    assert_eq!(count(&executor).await, 3);
    assert_eq!(
        names(&executor, "iso3166alpha3=CAN").await,
        ["Dominion of Canada"]
    );
}

#[tokio::test]
async fn create_with_merge_keeps_unsent_columns() {
    let executor = setup().await;
    let response = executor
        .create(
            "countries",
            &query(""),
            &json!({"iso3166alpha3": "CAN", "name": "Dominion of Canada"}),
            true,
        )
        .await;
    assert_eq!(json_body(&response), &json!([1]));

    let row = executor
        .read(
            "countries",
            &query("select=name,tld,landlocked&iso3166alpha3=eq.CAN"),
        )
        .await;
    assert_eq!(
        json_body(&row),
        &json!([{"name": "Dominion of Canada", "tld": ".ca", "landlocked": 0}])
    );
    let flag = executor
        .read("countries", &query("select=flag_gif&iso3166alpha3=eq.CAN"))
        .await;
    assert_eq!(flag.body, ResponseBody::Bytes(GIF.to_vec()));
}

#[tokio::test]
async fn put_fallback_merge_keeps_unsent_columns() {
    let executor = setup().await;
    let response = executor
        .replace(
            "countries",
            &query("id=eq.999"),
            &json!({"iso3166alpha3": "USA", "name": "USA renamed"}),
        )
        .await;
    assert_eq!(json_body(&response), &json!(2));

    let row = executor
        .read("countries", &query("select=name,tld,landlocked&id=eq.2"))
        .await;
    assert_eq!(
        json_body(&row),
        &json!([{"name": "USA renamed", "tld": ".us", "landlocked": 0}])
    );
}

#[tokio::test]
async fn create_rejects_non_object_bodies() {
    let executor = setup().await;
    for body in [json!([]), json!("Canada"), json!([1, 2])] {
        let response = executor.create("countries", &query(""), &body, false).await;
        assert_eq!(response.status(), 400, "{body}");
    }
}

// ===================================================================
// Replace
// ===================================================================

#[tokio::test]
async fn put_inserts_then_updates_same_key() {
    let executor = setup().await;
    let body = json!({"id": 100, "iso3166alpha3": "NZL", "name": "New Zealand"});

    let response = executor
        .replace("countries", &query("id=eq.100"), &body)
        .await;
    assert_eq!(json_body(&response), &json!(100));

    let body = json!({"name": "Aotearoa"});
    let response = executor
        .replace("countries", &query("id=eq.100"), &body)
        .await;
    assert_eq!(json_body(&response), &json!(1));
    assert_eq!(names(&executor, "id=100").await, ["Aotearoa"]);
}

#[tokio::test]
async fn put_with_bare_key_value() {
    let executor = setup().await;
    let response = executor
        .replace("countries", &query("id=2"), &json!({"tld": ".usa"}))
        .await;
    assert_eq!(json_body(&response), &json!(1));
}

#[tokio::test]
async fn put_guards() {
    let executor = setup().await;

    let response = executor
        .replace("countries", &query("id=eq.1"), &json!([{"name": "x"}]))
        .await;
    assert_eq!(
        error_message(&response),
        "PUT is only available for singular upserts!"
    );

    let response = executor
        .replace("countries", &query(""), &json!({"name": "x"}))
        .await;
    assert_eq!(
        error_message(&response),
        "Cannot update \"countries\" item without specifying primary key!"
    );

    let response = executor
        .replace("countries", &query("name=eq.Canada"), &json!({"name": "x"}))
        .await;
    assert_eq!(
        error_message(&response),
        "PUT requires the primary key value to use for upsert operation"
    );

    let response = executor
        .replace("countries", &query("id=eq.1"), &json!({}))
        .await;
    assert_eq!(
        error_message(&response),
        "PUT requires at least one column value"
    );
}

// ===================================================================
// Delete
// ===================================================================

#[tokio::test]
async fn delete_without_parameters_is_refused() {
    let executor = setup().await;
    let response = executor.delete("countries", &query("")).await;
    assert_eq!(
        error_message(&response),
        "No deletion parameters provided; total table deletion will not occur"
    );
    assert_eq!(count(&executor).await, 3);
}

#[tokio::test]
async fn delete_by_filter() {
    let executor = setup().await;
    let response = executor.delete("countries", &query("iso3166alpha3=eq.AFG")).await;
    assert_eq!(response.status(), 200);
    assert_eq!(json_body(&response), &json!({}));
    assert_eq!(count(&executor).await, 2);
}

#[tokio::test]
async fn delete_applies_blob_filter() {
    let executor = setup().await;
    let response = executor.delete("countries", &query("flag_gif=is.null")).await;
    assert_eq!(response.status(), 200);
    assert_eq!(count(&executor).await, 2);
}

#[tokio::test]
async fn delete_unknown_column_is_a_400() {
    let executor = setup().await;
    let response = executor.delete("countries", &query("order=name")).await;
    let message = error_message(&response);
    assert!(message.contains("order"), "{message}");
    assert_eq!(count(&executor).await, 3);
}

// ===================================================================
// Dispatch
// ===================================================================

#[tokio::test]
async fn execute_dispatches_by_verb() {
    let executor = setup().await;
    let request = RestRequest::new(Verb::Create, "countries")
        .body(json!({"iso3166alpha3": "CHL", "name": "Chile"}));
    assert_eq!(json_body(&executor.execute(&request).await), &json!([4]));

    let request = RestRequest::new(Verb::Delete, "countries").query(query("id=4"));
    assert_eq!(executor.execute(&request).await.status(), 200);
    assert_eq!(count(&executor).await, 3);
}
