mod common;

use chrono::{DateTime, Utc};
use common::TestApp;
use reqwest::Client;
use serde_json::json;

fn assert_recent(timestamp: &serde_json::Value) {
    let parsed = DateTime::parse_from_rfc3339(timestamp.as_str().expect("timestamp is a string"))
        .expect("timestamp is RFC 3339");
    let age = Utc::now().signed_duration_since(parsed.with_timezone(&Utc));
    assert!(age.num_seconds().abs() < 5, "timestamp not recent: {}", parsed);
}

#[tokio::test]
async fn create_soldier_derives_rank_name_from_value() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let response = app
        .create_soldier(
            &client,
            &json!({
                "_id": "1111111",
                "name": "test a",
                "rank": { "value": 5 },
                "limitations": ["night miSsions", "high altitude"]
            }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");

    assert_eq!(body["_id"], "1111111");
    assert_eq!(body["name"], "test a");
    assert_eq!(body["rank"], json!({ "name": "major", "value": 5 }));
    assert_eq!(body["limitations"], json!(["night missions", "high altitude"]));
    assert_recent(&body["createdAt"]);
    assert_recent(&body["updatedAt"]);

    app.cleanup().await;
}

#[tokio::test]
async fn create_soldier_derives_rank_value_from_name() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let response = app
        .create_soldier(
            &client,
            &json!({
                "_id": "2222222",
                "name": "test b",
                "rank": { "name": "Captain" }
            }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");

    assert_eq!(body["rank"], json!({ "name": "captain", "value": 4 }));
    assert_eq!(body["limitations"], json!([]));

    app.cleanup().await;
}

#[tokio::test]
async fn create_soldier_drops_unknown_fields() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let response = app
        .create_soldier(
            &client,
            &json!({
                "_id": "3333333",
                "name": "test c",
                "rank": { "name": "major" },
                "limitations": ["night missions"],
                "somethingElse": "not supposed to be here"
            }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert!(body.get("somethingElse").is_none());

    // The stored record carries only the schema fields
    let stored = app
        .db
        .find_soldier("3333333")
        .await
        .expect("Failed to read soldier")
        .expect("Soldier not found in DB");
    assert_eq!(stored.name, "test c");

    app.cleanup().await;
}

#[tokio::test]
async fn create_soldier_with_both_rank_fields_is_rejected() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let response = app
        .create_soldier(
            &client,
            &json!({
                "_id": "4444444",
                "name": "test d",
                "rank": { "name": "major", "value": 5 }
            }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["statusCode"], 400);
    assert_eq!(body["error"], "Bad Request");
    assert!(body["message"]
        .as_str()
        .expect("message is a string")
        .contains("rank"));

    app.cleanup().await;
}

#[tokio::test]
async fn create_soldier_with_missing_name_is_rejected() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let response = app
        .create_soldier(
            &client,
            &json!({
                "_id": "4444444",
                "rank": { "name": "major" }
            }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 400);

    app.cleanup().await;
}

#[tokio::test]
async fn create_soldier_with_unknown_rank_name_is_rejected() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let response = app
        .create_soldier(
            &client,
            &json!({
                "_id": "4444444",
                "name": "test d",
                "rank": { "name": "generalissimo" }
            }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert!(body["message"]
        .as_str()
        .expect("message is a string")
        .contains("rank"));

    app.cleanup().await;
}

#[tokio::test]
async fn create_duplicate_soldier_is_a_conflict() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let first = json!({
        "_id": "1234567",
        "name": "John Doe",
        "rank": { "name": "captain" }
    });
    let response = app.create_soldier(&client, &first).await;
    assert_eq!(response.status().as_u16(), 201);

    let duplicate = json!({
        "_id": "1234567",
        "name": "Somebody Else",
        "rank": { "value": 0 }
    });
    let response = app.create_soldier(&client, &duplicate).await;
    assert_eq!(response.status().as_u16(), 409);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body, json!({ "error": "Soldier already exists" }));

    // The existing record is untouched
    let stored = app
        .db
        .find_soldier("1234567")
        .await
        .expect("Failed to read soldier")
        .expect("Soldier not found in DB");
    assert_eq!(stored.name, "John Doe");
    assert_eq!(stored.rank.value, 4);

    app.cleanup().await;
}

#[tokio::test]
async fn create_soldier_keeps_a_valid_supplied_created_at() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let response = app
        .create_soldier(
            &client,
            &json!({
                "_id": "5555555",
                "name": "test e",
                "rank": { "value": 0 },
                "createdAt": "2024-03-01T12:00:00Z",
                "updatedAt": "not a date"
            }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");

    let created_at = DateTime::parse_from_rfc3339(body["createdAt"].as_str().unwrap()).unwrap();
    assert_eq!(
        created_at,
        DateTime::parse_from_rfc3339("2024-03-01T12:00:00Z").unwrap()
    );
    assert_recent(&body["updatedAt"]);

    app.cleanup().await;
}
