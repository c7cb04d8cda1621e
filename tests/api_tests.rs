//! Integration tests for the cobrando HTTP API
//!
//! Tests cover:
//! - Health endpoint
//! - Validate-only endpoint (200 normalized / 422 field errors)
//! - Owner registration and duplicate contacts
//! - Identifier create / list / update / delete, including the
//!   one-identifier-per-kind rule (409)
//! - Public profile page

#![cfg(feature = "server")]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use cobrando::api::{build_router, AppState};
use cobrando::{setup_database, BankCodeTable};
use rusqlite::Connection;
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot` method

const CLABE: &str = "002180000118359710";
const OTHER_CLABE: &str = "646180157000000004";

/// Test helper: fresh app over an in-memory database
fn setup_app() -> Router {
    let conn = Connection::open_in_memory().unwrap();
    setup_database(&conn).unwrap();
    build_router(AppState::new(conn, BankCodeTable::builtin().clone()))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: send one request, return status + JSON body
async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    let body = serde_json::from_slice(&bytes).expect("Should parse JSON");
    (status, body)
}

async fn register(app: &Router, email: &str, name: &str) -> Value {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/owners",
            json!({ "email": email, "display_name": name }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"].clone()
}

// =============================================================================
// Health / validate
// =============================================================================

#[tokio::test]
async fn test_health() {
    let app = setup_app();
    let (status, body) = send(&app, empty_request("GET", "/api/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], "OK");
}

#[tokio::test]
async fn test_validate_clabe_resolves_bank() {
    let app = setup_app();
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/validate",
            json!({ "kind": "CLABE", "value": "002 180 000118359710", "phone": "55-1234-5678" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["kind"], "CLABE");
    assert_eq!(data["value"], CLABE);
    assert_eq!(data["bank_code"], "002");
    assert_eq!(data["bank_name"], "Banamex");
    assert_eq!(data["bank_name_source"], "AUTO");
    assert_eq!(data["whatsapp_phone"], "+525512345678");
    assert_eq!(data["masked_value"], "002************710");
}

#[tokio::test]
async fn test_validate_reports_every_field() {
    let app = setup_app();
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/validate",
            json!({ "kind": "CARD", "value": "4111111111111112", "phone": "123" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);

    let errors = body["field_errors"].as_array().unwrap();
    let kinds: Vec<(&str, &str)> = errors
        .iter()
        .map(|e| (e["field"].as_str().unwrap(), e["kind"].as_str().unwrap()))
        .collect();
    assert!(kinds.contains(&("value", "InvalidChecksum")));
    assert!(kinds.contains(&("phone", "InvalidPhone")));
}

#[tokio::test]
async fn test_validate_unknown_kind() {
    let app = setup_app();
    let (status, body) = send(
        &app,
        json_request("POST", "/api/validate", json!({ "kind": "PAYPAL", "value": "x" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["field_errors"][0]["field"], "kind");
    assert_eq!(body["field_errors"][0]["kind"], "UnsupportedKind");
}

// =============================================================================
// Owners
// =============================================================================

#[tokio::test]
async fn test_register_owner() {
    let app = setup_app();
    let owner = register(&app, "Ana@Example.com", "Tacos Ana").await;

    assert_eq!(owner["email"], "ana@example.com");
    assert_eq!(owner["public_slug"], "tacos-ana");
    assert_eq!(owner["profile_path"], "/u/tacos-ana/");
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = setup_app();
    register(&app, "ana@example.com", "Ana").await;

    let (status, body) = send(
        &app,
        json_request("POST", "/api/owners", json!({ "email": "ANA@example.com" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["field_errors"][0]["kind"], "AlreadyRegistered");
}

#[tokio::test]
async fn test_register_requires_contact() {
    let app = setup_app();
    let (status, body) = send(
        &app,
        json_request("POST", "/api/owners", json!({ "display_name": "Nadie" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["field_errors"][0]["field"], "contact");
}

// =============================================================================
// Identifiers
// =============================================================================

#[tokio::test]
async fn test_identifier_lifecycle() {
    let app = setup_app();
    let owner = register(&app, "ana@example.com", "Ana").await;
    let owner_id = owner["id"].as_str().unwrap();
    let base = format!("/api/owners/{}/identifiers", owner_id);

    // Create
    let (status, body) = send(
        &app,
        json_request("POST", &base, json!({ "kind": "CLABE", "value": CLABE, "alias": "Negocio" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["masked_value"], "002************710");
    assert!(body["data"].get("value").is_none());

    // Second CLABE for the same owner is a conflict
    let (status, body) = send(
        &app,
        json_request("POST", &base, json!({ "kind": "CLABE", "value": OTHER_CLABE })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    // A different kind is fine
    let (status, _) = send(
        &app,
        json_request("POST", &base, json!({ "kind": "PHONE", "value": "5512345678" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // List
    let (status, body) = send(&app, empty_request("GET", &base)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    // Update with a manual bank name
    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/identifiers/{}", id),
            json!({ "kind": "CLABE", "value": CLABE, "bank_name": "Mi Banco" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["bank_name"], "Mi Banco");
    assert_eq!(body["data"]["bank_name_source"], "MANUAL");

    // Delete
    let (status, _) = send(&app, empty_request("DELETE", &format!("/api/identifiers/{}", id))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, empty_request("DELETE", &format!("/api/identifiers/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_for_unknown_owner() {
    let app = setup_app();
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/owners/nope/identifiers",
            json!({ "kind": "CLABE", "value": CLABE }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, empty_request("GET", "/api/owners/nope/identifiers")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_identifier_not_saved() {
    let app = setup_app();
    let owner = register(&app, "ana@example.com", "Ana").await;
    let base = format!("/api/owners/{}/identifiers", owner["id"].as_str().unwrap());

    let (status, body) = send(
        &app,
        json_request("POST", &base, json!({ "kind": "CLABE", "value": "002180000118359719" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["field_errors"][0]["kind"], "InvalidChecksum");

    let (_, body) = send(&app, empty_request("GET", &base)).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

// =============================================================================
// Public profile
// =============================================================================

#[tokio::test]
async fn test_public_profile_shows_only_public_identifiers() {
    let app = setup_app();
    let owner = register(&app, "ana@example.com", "Tacos Ana").await;
    let base = format!("/api/owners/{}/identifiers", owner["id"].as_str().unwrap());

    send(&app, json_request("POST", &base, json!({ "kind": "CLABE", "value": CLABE }))).await;
    send(
        &app,
        json_request(
            "POST",
            &base,
            json!({ "kind": "ACCOUNT", "value": "0123456789", "is_public": false }),
        ),
    )
    .await;

    let (status, body) = send(&app, empty_request("GET", "/u/tacos-ana/")).await;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert_eq!(data["name"], "Tacos Ana");
    let identifiers = data["identifiers"].as_array().unwrap();
    assert_eq!(identifiers.len(), 1);
    assert_eq!(identifiers[0]["kind"], "CLABE");
    assert_eq!(identifiers[0]["value"], CLABE);
    assert_eq!(identifiers[0]["bank_name"], "Banamex");

    println!("✅ Public profile test PASSED");
}

#[tokio::test]
async fn test_public_profile_unknown_slug() {
    let app = setup_app();
    let (status, body) = send(&app, empty_request("GET", "/u/nadie")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}
