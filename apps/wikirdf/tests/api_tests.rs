//! Integration tests for the wikirdf HTTP API.
//!
//! Uses axum-test to test the API handlers without starting a real server.

// Tests hold the env mutex across awaits so auth settings never interleave.
#![allow(clippy::unwrap_used, clippy::panic, clippy::await_holding_lock)]

use axum::http::{HeaderValue, StatusCode, header};
use axum_test::TestServer;
use serde_json::{Value, json};
use std::sync::Mutex;
use wikirdf::api::{
    AppState, ErrorResponse, ExpandRequest, ExpandResponse, HealthResponse, NamespacesResponse,
    RDF_XML_CONTENT_TYPE, create_router,
};
use wikirdf_core::{ExportConfig, NamespaceConfig};

/// Mutex to serialize tests since some of them modify env vars.
static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Guard wrapper that holds the mutex and clears the API key on drop.
struct TestGuard {
    _guard: std::sync::MutexGuard<'static, ()>,
}

impl Drop for TestGuard {
    fn drop(&mut self) {
        // SAFETY: Tests run sequentially under ENV_TEST_MUTEX, so no concurrent env access.
        unsafe { std::env::remove_var("WIKIRDF_API_KEY") };
    }
}

fn test_config() -> ExportConfig {
    ExportConfig {
        namespaces: NamespaceConfig {
            wiki: "http://example.org/id/".to_string(),
            wikiurl: "http://example.org/wiki/".to_string(),
            ..NamespaceConfig::default()
        },
        ..ExportConfig::default()
    }
}

/// Create a test server, optionally protected by `api_key`.
fn create_server(api_key: Option<&str>) -> (TestServer, TestGuard) {
    let guard = ENV_TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    // SAFETY: Tests run sequentially under ENV_TEST_MUTEX, so no concurrent env access.
    unsafe {
        match api_key {
            Some(key) => std::env::set_var("WIKIRDF_API_KEY", key),
            None => std::env::remove_var("WIKIRDF_API_KEY"),
        }
    }
    let router = create_router(AppState::new(test_config()));
    (
        TestServer::new(router).unwrap(),
        TestGuard { _guard: guard },
    )
}

fn create_test_server() -> (TestServer, TestGuard) {
    create_server(None)
}

fn resource(prefix: &str, namespace: &str, local: &str) -> Value {
    json!({
        "kind": "resource",
        "qname": { "prefix": prefix, "namespace": namespace, "local_name": local }
    })
}

fn property(local: &str) -> Value {
    json!({ "prefix": "property", "namespace": "&property;", "local_name": local })
}

/// `wiki:Berlin` with a population literal and a link to `wiki:Germany`.
fn town_node() -> Value {
    json!({
        "subject": resource("wiki", "&wiki;", "Berlin"),
        "properties": [
            {
                "property": property("Population"),
                "values": [ { "subject": { "kind": "literal", "value": "3500000" } } ]
            },
            {
                "property": property("Country"),
                "values": [ { "subject": resource("wiki", "&wiki;", "Germany") } ]
            }
        ]
    })
}

// =============================================================================
// HEALTH ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (server, _guard) = create_test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let health: HealthResponse = response.json();
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
}

// =============================================================================
// NAMESPACES ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_namespaces_lists_prolog_entities() {
    let (server, _guard) = create_test_server();

    let response = server.get("/namespaces").await;

    response.assert_status_ok();
    let body: NamespacesResponse = response.json();
    let names: Vec<&str> = body.entities.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(
        names,
        ["rdf", "rdfs", "owl", "swivt", "wiki", "property", "wikiurl"]
    );
    let wiki = body.entities.iter().find(|e| e.name == "wiki").unwrap();
    assert_eq!(wiki.uri, "http://example.org/id/");
}

// =============================================================================
// EXPAND ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_expand_known_entity() {
    let (server, _guard) = create_test_server();

    let request = ExpandRequest {
        text: "&property;Population".to_string(),
    };
    let response = server.post("/expand").json(&request).await;

    response.assert_status_ok();
    let result: ExpandResponse = response.json();
    assert!(result.success);
    assert_eq!(
        result.uri.as_deref(),
        Some("http://example.org/id/Property-3APopulation")
    );
}

#[tokio::test]
async fn test_expand_unknown_entity_is_bad_request() {
    let (server, _guard) = create_test_server();

    let response = server
        .post("/expand")
        .json(&json!({ "text": "&nope;Foo" }))
        .await;

    response.assert_status_bad_request();
    let result: ExpandResponse = response.json();
    assert!(!result.success);
    assert!(result.error.unwrap().contains("nope"));
}

#[tokio::test]
async fn test_expand_rejects_oversized_text() {
    let (server, _guard) = create_test_server();

    let request = ExpandRequest {
        text: "a".repeat(wikirdf::api::MAX_EXPAND_LENGTH + 1),
    };
    let response = server.post("/expand").json(&request).await;

    response.assert_status_bad_request();
}

// =============================================================================
// EXPORT ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_export_returns_rdfxml() {
    let (server, _guard) = create_test_server();

    let response = server
        .post("/export")
        .json(&json!({ "nodes": [town_node()] }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.header(header::CONTENT_TYPE), RDF_XML_CONTENT_TYPE);

    let text = response.text();
    assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
    assert!(text.contains("\t<!ENTITY wiki 'http://example.org/id/'>\n"));
    assert!(text.contains("\t<rdf:Description rdf:about=\"&wiki;Berlin\">\n"));
    assert!(text.contains("\t\t<property:Population>3500000</property:Population>\n"));
    assert!(text.contains("\t\t<property:Country rdf:resource=\"&wiki;Germany\"/>\n"));
    assert!(text.contains("\t<owl:DatatypeProperty rdf:about=\"&property;Population\" />\n"));
    assert!(text.contains("\t<owl:ObjectProperty rdf:about=\"&property;Country\" />\n"));
    assert!(text.ends_with("</rdf:RDF>"));
}

#[tokio::test]
async fn test_export_empty_batch_is_valid_document() {
    let (server, _guard) = create_test_server();

    let response = server.post("/export").json(&json!({ "nodes": [] })).await;

    response.assert_status_ok();
    let text = response.text();
    assert!(text.contains("<rdf:RDF"));
    assert!(text.ends_with("\t<!-- Created by wikirdf -->\n</rdf:RDF>"));
}

#[tokio::test]
async fn test_export_flush_interval_does_not_change_body_order() {
    let (server, _guard) = create_test_server();
    let nodes = json!([town_node(), town_node(), town_node()]);

    let single = server
        .post("/export")
        .json(&json!({ "nodes": nodes.clone() }))
        .await
        .text();
    let chunked = server
        .post("/export")
        .json(&json!({ "nodes": nodes, "flush_every": 1 }))
        .await
        .text();

    assert_eq!(single.matches("rdf:about=\"&wiki;Berlin\"").count(), 3);
    assert_eq!(chunked.matches("rdf:about=\"&wiki;Berlin\"").count(), 3);
    // Declarations are written once per document.
    assert_eq!(chunked.matches("&property;Population\" />").count(), 1);
}

#[tokio::test]
async fn test_export_zero_flush_interval_rejected() {
    let (server, _guard) = create_test_server();

    let response = server
        .post("/export")
        .json(&json!({ "nodes": [town_node()], "flush_every": 0 }))
        .await;

    response.assert_status_bad_request();
    let error: ErrorResponse = response.json();
    assert!(!error.success);
    assert!(error.error.contains("flush_every"));
}

#[tokio::test]
async fn test_export_invalid_element_name_rejected() {
    let (server, _guard) = create_test_server();

    let node = json!({
        "subject": resource("wiki", "&wiki;", "Foo"),
        "main_type": { "prefix": "wiki", "namespace": "&wiki;", "local_name": "9 bad" }
    });
    let response = server.post("/export").json(&json!({ "nodes": [node] })).await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_export_undeclared_entity_rejected() {
    let (server, _guard) = create_test_server();

    for subject in [
        json!({ "kind": "resource", "uri": "&foo;Bar" }),
        resource("category", "&category;", "City"),
    ] {
        let node = json!({ "subject": subject });
        let response = server.post("/export").json(&json!({ "nodes": [node] })).await;

        response.assert_status_bad_request();
        let error: ErrorResponse = response.json();
        assert!(error.error.contains("Unknown entity"), "{}", error.error);
    }
}

#[tokio::test]
async fn test_export_control_character_rejected() {
    let (server, _guard) = create_test_server();

    let node = json!({
        "subject": resource("wiki", "&wiki;", "Foo"),
        "properties": [
            {
                "property": property("Note"),
                "values": [ { "subject": { "kind": "literal", "value": "ring\u{7}" } } ]
            }
        ]
    });
    let response = server.post("/export").json(&json!({ "nodes": [node] })).await;

    response.assert_status_bad_request();
    let error: ErrorResponse = response.json();
    assert!(error.error.contains("not allowed in XML"), "{}", error.error);
}

#[tokio::test]
async fn test_export_malformed_json() {
    let (server, _guard) = create_test_server();

    let response = server
        .post("/export")
        .bytes(bytes::Bytes::from("{\"nodes\": [ {"))
        .content_type("application/json")
        .await;

    assert!(response.status_code().is_client_error());
}

// =============================================================================
// AUTHENTICATION TESTS
// =============================================================================

#[tokio::test]
async fn test_auth_required_when_key_set() {
    let (server, _guard) = create_server(Some("test-key"));

    let response = server.get("/namespaces").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = server
        .get("/namespaces")
        .add_header(
            header::AUTHORIZATION,
            "Bearer test-key".parse::<HeaderValue>().unwrap(),
        )
        .await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_auth_rejects_wrong_key() {
    let (server, _guard) = create_server(Some("test-key"));

    let response = server
        .post("/export")
        .add_header(
            header::AUTHORIZATION,
            "Bearer wrong-key".parse::<HeaderValue>().unwrap(),
        )
        .json(&json!({ "nodes": [] }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_exempt_from_auth() {
    let (server, _guard) = create_server(Some("test-key"));

    let response = server.get("/health").await;
    response.assert_status_ok();
}
