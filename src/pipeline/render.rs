//! Diagram rendering via the mermaid.ink image endpoint.
//!
//! Each description is cleaned for rendering, base64-encoded into the URL
//! path (`{base}/img/{encoded}`) and fetched with a single GET. The response
//! body is saved verbatim as `diagram_<page_index>.png`.
//!
//! A page whose render fails is logged and omitted; the rest continue.

use super::encode::encode_diagram;
use super::postprocess::clean_for_render;
use crate::config::PipelineConfig;
use crate::error::{DiagramifyError, PageError};
use crate::output::{diagram_file_name, DiagramDescription, RenderedDiagram};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP client for the rendering service.
#[derive(Debug, Clone)]
pub struct DiagramRenderer {
    client: reqwest::Client,
    base_url: String,
}

impl DiagramRenderer {
    pub fn new(config: &PipelineConfig) -> Result<Self, DiagramifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.render_timeout_secs))
            .build()
            .map_err(|e| DiagramifyError::Internal(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.render_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// URL that renders `code` as a PNG.
    pub fn image_url(&self, code: &str) -> String {
        format!("{}/img/{}", self.base_url, encode_diagram(code))
    }

    /// Render one description and save it into `output_dir`.
    ///
    /// `name_prefix` is prepended to the returned `file_name` so callers can
    /// express it relative to the directory they serve (e.g. `"<id>/"`).
    pub async fn render(
        &self,
        description: &DiagramDescription,
        output_dir: &Path,
        name_prefix: &str,
    ) -> Result<RenderedDiagram, PageError> {
        let page = description.page_number();
        let code = clean_for_render(&description.code);
        let url = self.image_url(&code);
        debug!("Page {}: GET {}", page, url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PageError::RenderFailed {
                page,
                detail: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PageError::RenderStatus {
                page,
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| PageError::RenderFailed {
            page,
            detail: e.to_string(),
        })?;

        let file_name = diagram_file_name(description.page_index);
        tokio::fs::write(output_dir.join(&file_name), &bytes)
            .await
            .map_err(|e| PageError::SaveFailed {
                page,
                detail: e.to_string(),
            })?;

        debug!("Page {}: saved {} ({} bytes)", page, file_name, bytes.len());
        Ok(RenderedDiagram {
            page_index: description.page_index,
            file_name: format!("{name_prefix}{file_name}"),
        })
    }

    /// Render every description in order, omitting the ones that fail.
    pub async fn render_all(
        &self,
        descriptions: &[DiagramDescription],
        output_dir: &Path,
        name_prefix: &str,
    ) -> Vec<RenderedDiagram> {
        let mut rendered = Vec::with_capacity(descriptions.len());
        for description in descriptions {
            match self.render(description, output_dir, name_prefix).await {
                Ok(diagram) => rendered.push(diagram),
                Err(e) => warn!("{}", e),
            }
        }
        rendered
    }
}
