//! HTTP front end.
//!
//! | Route            | Method     | Purpose                                  |
//! |------------------|------------|------------------------------------------|
//! | `/`              | GET        | upload form                              |
//! | `/`              | POST       | multipart upload (`file`) → diagram list |
//! | `/static/*`      | GET        | generated images                         |
//! | `/health`        | GET        | `{status, version}`                      |

mod handlers;
mod view;

pub use handlers::{health_check, index, upload, AppError, HealthResponse};
pub use view::render_page;

use crate::convert::PipelineContext;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// State shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<PipelineContext>,
}

impl AppState {
    #[must_use]
    pub fn new(ctx: PipelineContext) -> Self {
        Self { ctx: Arc::new(ctx) }
    }
}

/// Build the router with all endpoints.
pub fn build_router(state: AppState) -> Router {
    let static_dir = state.ctx.config.static_dir.clone();
    let body_limit = state.ctx.config.max_upload_bytes;

    Router::new()
        .route("/", get(index).post(upload))
        .route("/health", get(health_check))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn start_server(addr: &str, state: AppState) -> Result<(), std::io::Error> {
    tracing::info!("Starting diagramify server on {}", addr);

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await
}
