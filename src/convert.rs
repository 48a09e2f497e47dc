//! Pipeline entry points.
//!
//! [`generate_diagrams`] runs the linear pipeline on a file already on disk;
//! [`generate_from_upload`] stages uploaded bytes first and writes into a
//! fresh per-request directory under the static root. Both share one
//! [`PipelineContext`], built once at startup.

use crate::config::PipelineConfig;
use crate::error::DiagramifyError;
use crate::model::{build_model, DiagramModel};
use crate::output::{ConversionStats, DiagramOutput};
use crate::pipeline::describe::describe_all;
use crate::pipeline::extract::ExtractorRegistry;
use crate::pipeline::render::DiagramRenderer;
use crate::pipeline::upload::stage_upload;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

/// Long-lived state shared by every request.
pub struct PipelineContext {
    pub model: Arc<dyn DiagramModel>,
    pub renderer: DiagramRenderer,
    pub extractors: ExtractorRegistry,
    pub config: PipelineConfig,
}

impl std::fmt::Debug for PipelineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineContext")
            .field("model", &self.model.describe_backend())
            .field("extractors", &self.extractors)
            .field("config", &self.config)
            .finish()
    }
}

impl PipelineContext {
    /// Build the model, renderer and extractor registry from `config`.
    pub fn from_config(config: PipelineConfig) -> Result<Self, DiagramifyError> {
        let model = build_model(&config)?;
        Self::with_model(config, model)
    }

    /// Use a caller-supplied model backend.
    pub fn with_model(
        config: PipelineConfig,
        model: Arc<dyn DiagramModel>,
    ) -> Result<Self, DiagramifyError> {
        Ok(Self {
            model,
            renderer: DiagramRenderer::new(&config)?,
            extractors: ExtractorRegistry::with_defaults(config.pdfium_lib_path.clone()),
            config,
        })
    }
}

/// Run extract → describe → render on `path`, saving images in `output_dir`.
///
/// `name_prefix` is prepended to every returned file name.
///
/// # Errors
/// Only fatal errors are returned: unsupported type, unreadable document,
/// I/O. Model and render failures degrade per page and show up in
/// [`ConversionStats`].
pub async fn generate_diagrams(
    ctx: &PipelineContext,
    path: &Path,
    output_dir: &Path,
    name_prefix: &str,
) -> Result<DiagramOutput, DiagramifyError> {
    let start = Instant::now();
    info!("Generating diagrams for {}", path.display());

    // ── Step 1: Extract pages ────────────────────────────────────────────
    let pages = ctx.extractors.extract(path).await?;

    // ── Step 2: Describe each page ───────────────────────────────────────
    let descriptions = describe_all(ctx.model.as_ref(), &pages).await;
    let fallback_pages = descriptions.iter().filter(|d| d.fallback).count();
    debug!(
        "Described {} pages ({} fallbacks)",
        descriptions.len(),
        fallback_pages
    );

    // ── Step 3: Render and save ──────────────────────────────────────────
    let created_dir = !tokio::fs::try_exists(output_dir).await.unwrap_or(true);
    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| DiagramifyError::io(output_dir, e))?;
    let diagrams = ctx
        .renderer
        .render_all(&descriptions, output_dir, name_prefix)
        .await;

    // Nothing was saved: drop the directory made for this run.
    if diagrams.is_empty() && created_dir {
        if let Err(e) = tokio::fs::remove_dir(output_dir).await {
            debug!("Could not remove empty {}: {}", output_dir.display(), e);
        }
    }

    let stats = ConversionStats {
        total_pages: pages.len(),
        described_pages: descriptions.len() - fallback_pages,
        fallback_pages,
        rendered_pages: diagrams.len(),
        failed_renders: descriptions.len() - diagrams.len(),
        duration_ms: start.elapsed().as_millis() as u64,
    };

    info!(
        "Done: {}/{} diagrams saved, {}ms",
        stats.rendered_pages, stats.total_pages, stats.duration_ms
    );

    Ok(DiagramOutput { diagrams, stats })
}

/// Stage an upload and run the pipeline on it.
///
/// Images go to `<static_dir>/<uuid>/`, and returned file names are relative
/// to `static_dir`. The staged copy is deleted before returning.
pub async fn generate_from_upload(
    ctx: &PipelineContext,
    filename: &str,
    bytes: &[u8],
) -> Result<DiagramOutput, DiagramifyError> {
    let staged = stage_upload(&ctx.config.upload_dir, filename, bytes).await?;

    let request_id = Uuid::new_v4().to_string();
    let output_dir = ctx.config.static_dir.join(&request_id);
    let prefix = format!("{request_id}/");

    generate_diagrams(ctx, staged.path(), &output_dir, &prefix).await
}
