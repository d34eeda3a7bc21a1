//! Unit tests for API types serialization/deserialization.

#![allow(clippy::unwrap_used, clippy::panic)]

use wikirdf::api::{
    EntityJson, ErrorResponse, ExpandRequest, ExpandResponse, ExportRequest, HealthResponse,
    MAX_EXPAND_LENGTH, NamespacesResponse,
};
use wikirdf_core::{ExportError, UriExpander, primitives::MAX_EXPORT_NODES};

// =============================================================================
// HEALTH RESPONSE TESTS
// =============================================================================

#[test]
fn test_health_response_default() {
    let health = HealthResponse::default();
    assert_eq!(health.status, "ok");
    assert!(!health.version.is_empty());
}

#[test]
fn test_health_response_serialization() {
    let health = HealthResponse {
        status: "ok".to_string(),
        version: "0.1.0".to_string(),
    };

    let json = serde_json::to_string(&health).unwrap();
    assert!(json.contains("\"status\":\"ok\""));
    assert!(json.contains("\"version\":\"0.1.0\""));
}

// =============================================================================
// NAMESPACES RESPONSE TESTS
// =============================================================================

#[test]
fn test_namespaces_from_default_expander() {
    let response = NamespacesResponse::from_expander(&UriExpander::default());
    assert_eq!(response.entities.len(), 7);
    assert_eq!(
        response.entities[0],
        EntityJson {
            name: "rdf".to_string(),
            uri: "http://www.w3.org/1999/02/22-rdf-syntax-ns#".to_string(),
        }
    );
    assert!(response.entities.iter().all(|e| e.name != "category"));
}

// =============================================================================
// EXPAND TESTS
// =============================================================================

#[test]
fn test_expand_request_validation() {
    let ok = ExpandRequest {
        text: "&wiki;Foo".to_string(),
    };
    assert!(ok.validate().is_ok());

    let too_long = ExpandRequest {
        text: "x".repeat(MAX_EXPAND_LENGTH + 1),
    };
    assert!(matches!(
        too_long.validate(),
        Err(ExportError::DeserializationError(_))
    ));
}

#[test]
fn test_expand_response_constructors() {
    let ok = ExpandResponse::success("http://example.org/x".to_string());
    assert!(ok.success);
    assert!(ok.error.is_none());

    let err = ExpandResponse::error("bad");
    assert!(!err.success);
    assert!(err.uri.is_none());
    assert_eq!(err.error.as_deref(), Some("bad"));
}

// =============================================================================
// EXPORT REQUEST TESTS
// =============================================================================

#[test]
fn test_export_request_flush_interval() {
    let request: ExportRequest = serde_json::from_str(r#"{"nodes": []}"#).unwrap();
    assert!(request.flush_every.is_none());
    assert_eq!(request.validate(50).unwrap(), 50);

    let request: ExportRequest =
        serde_json::from_str(r#"{"nodes": [], "flush_every": 3}"#).unwrap();
    assert_eq!(request.validate(50).unwrap(), 3);

    let request: ExportRequest =
        serde_json::from_str(r#"{"nodes": [], "flush_every": 0}"#).unwrap();
    assert!(matches!(
        request.validate(50),
        Err(ExportError::ConfigError(_))
    ));
}

#[test]
fn test_export_request_node_limit() {
    let node = serde_json::json!({
        "subject": { "kind": "resource", "uri": "http://example.org/x" }
    });
    let nodes = vec![node; MAX_EXPORT_NODES + 1];
    let request: ExportRequest =
        serde_json::from_value(serde_json::json!({ "nodes": nodes })).unwrap();
    assert!(matches!(
        request.validate(50),
        Err(ExportError::DeserializationError(_))
    ));
}

#[test]
fn test_export_request_omits_default_flush_interval() {
    let request = ExportRequest {
        nodes: Vec::new(),
        flush_every: None,
    };
    let json = serde_json::to_string(&request).unwrap();
    assert_eq!(json, r#"{"nodes":[]}"#);
}

#[test]
fn test_error_response_serialization() {
    let error = ErrorResponse::new("Export failed");
    let json = serde_json::to_string(&error).unwrap();
    assert_eq!(json, r#"{"success":false,"error":"Export failed"}"#);
}
