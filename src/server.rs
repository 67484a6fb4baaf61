//! HTTP front end.
//!
//! | Method | Path                | Body                                  |
//! |--------|---------------------|---------------------------------------|
//! | POST   | `/process-invoice/` | multipart, field `file`               |
//! | GET    | `/health`           | `{"status", "processor_initialized"}` |
//! | GET    | `/`                 | `{"message"}`                         |
//!
//! A successful upload answers 200 with the invoice record verbatim. Every
//! failure answers `{"detail": message}`: 400 for anticipated pipeline
//! failures and malformed uploads, 500 for anything unexpected or when the
//! processor was never initialised.

use crate::envelope::ProcessingResult;
use crate::error::ErrorKind;
use crate::processor::InvoiceProcessor;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Uploads larger than this are rejected before reaching the pipeline.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

const NOT_INITIALIZED: &str = "Invoice processor not initialized. Check API keys configuration.";

/// Shared router state. `processor` is `None` when startup configuration
/// failed; the service still answers health checks in that case.
#[derive(Clone, Default)]
pub struct AppState {
    processor: Option<Arc<InvoiceProcessor>>,
}

impl AppState {
    pub fn new(processor: Arc<InvoiceProcessor>) -> Self {
        Self {
            processor: Some(processor),
        }
    }

    /// State for a service whose processor could not be built.
    pub fn uninitialized() -> Self {
        Self::default()
    }

    pub fn processor_initialized(&self) -> bool {
        self.processor.is_some()
    }
}

#[derive(Debug, Serialize)]
struct Detail {
    detail: String,
}

type ApiError = (StatusCode, Json<Detail>);

fn bad_request(msg: impl Into<String>) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(Detail { detail: msg.into() }))
}

fn internal_error(msg: impl Into<String>) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(Detail { detail: msg.into() }),
    )
}

/// Status code for a failed envelope of category `kind`.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    if kind.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/process-invoice/",
            post(process_invoice).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/health", get(health))
        .route("/", get(root))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("invoice2json listening on {}", listener.local_addr()?);
    if !state.processor_initialized() {
        warn!("{}", NOT_INITIALIZED);
    }

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    processor_initialized: bool,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        processor_initialized: state.processor_initialized(),
    })
}

#[derive(Serialize)]
struct RootResponse {
    message: &'static str,
}

async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Invoice Processing API is running",
    })
}

/// POST /process-invoice/: run one uploaded document through the pipeline.
async fn process_invoice(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let processor = state
        .processor
        .clone()
        .ok_or_else(|| internal_error(NOT_INITIALIZED))?;

    let (file_name, bytes) = loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| bad_request(format!("Multipart error: {e}")))?
            .ok_or_else(|| bad_request("No file provided"))?;

        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| bad_request(format!("Failed to read upload: {e}")))?;
        break (file_name, bytes);
    };

    info!("Received upload {} ({} bytes)", file_name, bytes.len());
    let result = processor.process_bytes(&file_name, &bytes).await;
    envelope_response(result)
}

fn envelope_response(result: ProcessingResult) -> Result<Json<Value>, ApiError> {
    match result.into_result() {
        Ok(data) => Ok(Json(data)),
        Err((kind, detail)) => Err((status_for(kind), Json(Detail { detail }))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_mapping() {
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::ModelTransport), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(ErrorKind::Unexpected),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn envelope_maps_to_detail() {
        let ok = envelope_response(ProcessingResult::succeeded(json!({"a": 1}), "f", 0));
        assert_eq!(ok.unwrap().0, json!({"a": 1}));

        let (status, Json(body)) = envelope_response(ProcessingResult::failed_with(
            ErrorKind::InvalidJson,
            "Invalid JSON format: eof",
            "f",
        ))
        .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.detail, "Invalid JSON format: eof");
    }

    #[test]
    fn uninitialized_state_reports_false() {
        assert!(!AppState::uninitialized().processor_initialized());
    }
}
