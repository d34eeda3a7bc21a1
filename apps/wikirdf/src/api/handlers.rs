//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.

use super::{
    AppState,
    types::{
        ErrorResponse, ExpandRequest, ExpandResponse, ExportRequest, HealthResponse,
        NamespacesResponse,
    },
};
use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use wikirdf_core::{ExportError, ExportStream, RdfXmlSerializer};

/// Media type of export responses.
pub const RDF_XML_CONTENT_TYPE: &str = "application/rdf+xml; charset=utf-8";

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// NAMESPACES HANDLER
// =============================================================================

/// List the prolog entities.
pub async fn namespaces_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(NamespacesResponse::from_expander(&state.expander)),
    )
}

// =============================================================================
// EXPAND HANDLER
// =============================================================================

/// Expand `&name;` references to full URIs.
pub async fn expand_handler(
    State(state): State<AppState>,
    Json(request): Json<ExpandRequest>,
) -> impl IntoResponse {
    if let Err(e) = request.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ExpandResponse::error(e.to_string())),
        );
    }
    match state.expander.expand(&request.text) {
        Ok(uri) => (StatusCode::OK, Json(ExpandResponse::success(uri))),
        Err(e) => (
            error_status(&e),
            Json(ExpandResponse::error(e.to_string())),
        ),
    }
}

// =============================================================================
// EXPORT HANDLER
// =============================================================================

/// Serialize the posted nodes as one RDF/XML document.
pub async fn export_handler(
    State(state): State<AppState>,
    Json(request): Json<ExportRequest>,
) -> Response {
    match export_document(&state, &request) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, RDF_XML_CONTENT_TYPE)],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(event = "export_failed", error = %e, "Export failed");
            (
                error_status(&e),
                Json(ErrorResponse::new(format!("Export failed: {}", e))),
            )
                .into_response()
        }
    }
}

/// Run one export with a fresh serializer.
fn export_document(state: &AppState, request: &ExportRequest) -> Result<String, ExportError> {
    let flush_every = request.validate(state.config.flush_every)?;
    let serializer =
        RdfXmlSerializer::new((*state.expander).clone(), state.config.generator.clone())?;
    let mut stream = ExportStream::new(Vec::new(), serializer, flush_every);
    stream.start()?;
    for node in &request.nodes {
        stream.write(node)?;
    }
    let (bytes, stats) = stream.finish()?;
    tracing::info!(
        event = "export_served",
        nodes = stats.nodes,
        bytes = stats.bytes
    );
    String::from_utf8(bytes).map_err(|e| ExportError::SerializationError(e.to_string()))
}

/// Map an error to a status code: bad input is the client's fault.
pub fn error_status(error: &ExportError) -> StatusCode {
    match error {
        ExportError::UnknownEntity(_)
        | ExportError::InvalidName(_)
        | ExportError::InvalidCharacter(_)
        | ExportError::DepthExceeded(_, _)
        | ExportError::ConfigError(_)
        | ExportError::DeserializationError(_) => StatusCode::BAD_REQUEST,
        ExportError::InvalidState(_)
        | ExportError::SerializationError(_)
        | ExportError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
