//! HTTP surface — thin transport over the pipeline.
//!
//! One processing endpoint plus a health check. Input arrives as
//! multipart form data: a `text` field, a `file` part (.txt/.pdf), or
//! both (the file wins). Malformed input is the only error visible
//! here; the pipeline itself is total.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tracing::{debug, info};

use crate::extract::{DocumentKind, extract_text};
use crate::pipeline::TriagePipeline;

/// Maximum accepted upload size (16 MiB).
const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<TriagePipeline>,
}

/// Build the Axum router with the processing and health routes.
pub fn api_routes(pipeline: Arc<TriagePipeline>) -> Router {
    let state = AppState { pipeline };

    Router::new()
        .route("/api/process_email", post(process_email))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

// ── Health ──────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "mail-triage"
    }))
}

// ── Processing ──────────────────────────────────────────────────────

fn bad_request(message: String) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}

async fn process_email(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> axum::response::Response {
    let mut text: Option<String> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return bad_request(format!("Malformed multipart body: {e}")),
        };

        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "text" => match field.text().await {
                Ok(value) => text = Some(value),
                Err(e) => return bad_request(format!("Unreadable text field: {e}")),
            },
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                match field.bytes().await {
                    Ok(bytes) => file = Some((filename, bytes.to_vec())),
                    Err(e) => return bad_request(format!("Unreadable file upload: {e}")),
                }
            }
            other => {
                debug!(field = other, "Ignoring unknown multipart field");
            }
        }
    }

    // Input validation happens here, before the orchestrator runs.
    let content = match file {
        Some((filename, bytes)) => {
            let kind = match DocumentKind::from_filename(&filename) {
                Ok(kind) => kind,
                Err(e) => return bad_request(e.to_string()),
            };
            match extract_text(&bytes, kind) {
                Ok(content) => {
                    info!(
                        filename = %filename,
                        kind = kind.as_str(),
                        chars = content.len(),
                        "Extracted text from upload"
                    );
                    content
                }
                Err(e) => return bad_request(e.to_string()),
            }
        }
        None => match text.filter(|t| !t.is_empty()) {
            Some(text) => text,
            None => {
                return bad_request(
                    "Envie 'text' ou 'file' (.txt/.pdf).".to_string(),
                );
            }
        },
    };

    let outcome = state.pipeline.execute(&content).await;
    info!(
        category = %outcome.category,
        confidence = outcome.confidence,
        classify_source = %outcome.classify_source,
        reply_source = %outcome.reply_source,
        "Request processed"
    );
    (StatusCode::OK, Json(outcome)).into_response()
}
