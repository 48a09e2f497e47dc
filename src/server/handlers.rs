//! HTTP request handlers.

use super::view::render_page;
use super::AppState;
use crate::convert::generate_from_upload;
use crate::error::DiagramifyError;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Name of the multipart field carrying the document.
const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Empty upload form.
pub async fn index() -> Html<String> {
    Html(render_page(&[]))
}

/// Accept an upload and answer with the list of generated diagrams.
///
/// A request without a `file` part (or with an empty filename) gets the
/// plain form back.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Html<String>, AppError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        if !filename.is_empty() {
            upload = Some((filename, bytes.to_vec()));
        }
        break;
    }

    let Some((filename, bytes)) = upload else {
        return Ok(Html(render_page(&[])));
    };

    info!("Upload received: {} ({} bytes)", filename, bytes.len());
    let output = generate_from_upload(&state.ctx, &filename, &bytes).await?;
    Ok(Html(render_page(&output.diagrams)))
}

/// Error returned by handlers, rendered as a plain-text response.
#[derive(Debug)]
pub enum AppError {
    Pipeline(DiagramifyError),
    Multipart(MultipartError),
}

impl From<DiagramifyError> for AppError {
    fn from(e: DiagramifyError) -> Self {
        AppError::Pipeline(e)
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        AppError::Multipart(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Pipeline(e) => {
                let status = match &e {
                    DiagramifyError::UnsupportedFileType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    DiagramifyError::InvalidFilename { .. } => StatusCode::BAD_REQUEST,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if status.is_server_error() {
                    error!("Request failed: {}", e);
                } else {
                    info!("Request rejected: {}", e);
                }
                (status, e.to_string()).into_response()
            }
            AppError::Multipart(e) => {
                info!("Malformed upload: {}", e);
                (e.status(), e.body_text()).into_response()
            }
        }
    }
}
