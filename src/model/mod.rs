//! Generative-model backends.
//!
//! The describe stage only sees [`DiagramModel`]: one prompt (plus an
//! optional image) in, generated text out. Two backends exist:
//!
//! * [`GeminiModel`] talks to the Gemini REST API directly so the sampling
//!   parameters (top-k, top-p) and the safety policy are honoured.
//! * [`ProviderModel`] wraps any `edgequake-llm` provider (OpenAI,
//!   Anthropic, Ollama, ...). Only temperature and max tokens apply.
//!
//! A model is built once at startup by [`build_model`] and shared by
//! reference with every request.

mod gemini;
mod provider;

pub use gemini::GeminiModel;
pub use provider::ProviderModel;

use crate::config::PipelineConfig;
use crate::error::{DiagramifyError, ModelError};
use crate::pipeline::encode::InlineImage;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// One generation request.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub prompt: String,
    /// Page image for vision requests.
    pub image: Option<InlineImage>,
}

impl ModelRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image: None,
        }
    }

    pub fn with_image(prompt: impl Into<String>, image: InlineImage) -> Self {
        Self {
            prompt: prompt.into(),
            image: Some(image),
        }
    }
}

/// A text (or vision) completion backend.
#[async_trait]
pub trait DiagramModel: Send + Sync {
    /// Generate text for `request`. Blocked or empty answers are errors.
    async fn generate(&self, request: &ModelRequest) -> Result<String, ModelError>;

    /// Backend and model name for logs.
    fn describe_backend(&self) -> String;
}

/// Build the configured model backend.
///
/// Gemini is used unless `config.provider_name` names another provider.
/// A missing Gemini key is only warned about: calls fail at first use and
/// every page falls back.
pub fn build_model(config: &PipelineConfig) -> Result<Arc<dyn DiagramModel>, DiagramifyError> {
    let model: Arc<dyn DiagramModel> = if config.uses_gemini() {
        if config.api_key.as_deref().map_or(true, str::is_empty) {
            warn!("No Gemini API key configured (API_KEY); every page will use the fallback diagram");
        }
        Arc::new(GeminiModel::new(config)?)
    } else {
        Arc::new(ProviderModel::from_config(config)?)
    };

    info!("Using model backend {}", model.describe_backend());
    Ok(model)
}
