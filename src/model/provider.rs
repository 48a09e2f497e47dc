//! Adapter from an `edgequake-llm` provider to [`DiagramModel`].
//!
//! Lets the pipeline run against OpenAI, Anthropic, Ollama and the other
//! providers the LLM crate knows about. Only temperature and max tokens are
//! forwarded; top-k, top-p and the safety policy are Gemini settings.

use super::{DiagramModel, ModelRequest};
use crate::config::{GenerationSettings, PipelineConfig};
use crate::error::{DiagramifyError, ModelError};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Duration;

pub struct ProviderModel {
    provider: Arc<dyn LLMProvider>,
    label: String,
    settings: GenerationSettings,
    timeout: Duration,
}

impl ProviderModel {
    /// Wrap an already constructed provider.
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        label: impl Into<String>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            provider,
            label: label.into(),
            settings: config.generation.clone(),
            timeout: Duration::from_secs(config.model_timeout_secs),
        }
    }

    /// Create the provider named by `config.provider_name`.
    ///
    /// The provider reads its own API key from the environment
    /// (`OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, ...).
    pub fn from_config(config: &PipelineConfig) -> Result<Self, DiagramifyError> {
        let name = config.provider_name.as_deref().unwrap_or("openai");
        let model = config.model.as_deref().unwrap_or("gpt-4.1-nano");

        let provider = ProviderFactory::create_llm_provider(name, model).map_err(|e| {
            DiagramifyError::ProviderNotConfigured {
                provider: name.to_string(),
                hint: format!("{e}"),
            }
        })?;

        Ok(Self::new(provider, format!("{name}/{model}"), config))
    }

    fn options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: Some(self.settings.temperature),
            max_tokens: Some(self.settings.max_output_tokens as usize),
            ..Default::default()
        }
    }
}

#[async_trait]
impl DiagramModel for ProviderModel {
    async fn generate(&self, request: &ModelRequest) -> Result<String, ModelError> {
        let images: Vec<ImageData> = request
            .image
            .iter()
            .map(|img| ImageData::new(img.data.clone(), img.mime_type.as_str()))
            .collect();

        let messages = vec![ChatMessage::user_with_images(request.prompt.as_str(), images)];
        let options = self.options();

        let response = tokio::time::timeout(self.timeout, self.provider.chat(&messages, Some(&options)))
            .await
            .map_err(|_| ModelError::Transport(format!("timed out after {:?}", self.timeout)))?
            .map_err(|e| ModelError::Provider(format!("{e}")))?;

        if response.content.trim().is_empty() {
            return Err(ModelError::EmptyResponse);
        }
        Ok(response.content)
    }

    fn describe_backend(&self) -> String {
        self.label.clone()
    }
}
