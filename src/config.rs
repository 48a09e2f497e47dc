//! Configuration types for the diagram pipeline.
//!
//! All pipeline behaviour is controlled through [`PipelineConfig`], built via
//! its [`PipelineConfigBuilder`]. The model sampling knobs and the safety
//! policy live in [`GenerationSettings`], which is what the model backends
//! actually read.

use crate::error::DiagramifyError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Default Gemini model. Vision capable, so image pages get a real answer.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Default base URL of the Generative Language REST API.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default base URL of the Mermaid rendering service.
pub const DEFAULT_RENDER_BASE_URL: &str = "https://mermaid.ink";

/// Configuration for the upload → describe → render pipeline.
///
/// # Example
/// ```rust
/// use diagramify::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .model("gemini-1.5-pro")
///     .static_dir("public")
///     .build()
///     .unwrap();
/// assert_eq!(config.generation.top_k, 20);
/// ```
#[derive(Clone)]
pub struct PipelineConfig {
    /// LLM provider name. `None` or `"gemini"` uses the built-in Gemini
    /// REST client; any other name goes through `edgequake-llm`.
    pub provider_name: Option<String>,

    /// Model identifier. If None, uses [`DEFAULT_GEMINI_MODEL`] for Gemini or
    /// the provider default otherwise.
    pub model: Option<String>,

    /// Gemini API key. Not validated: a missing key makes every page fall back.
    pub api_key: Option<String>,

    /// Base URL of the Gemini REST API. Default: [`DEFAULT_GEMINI_BASE_URL`].
    pub gemini_base_url: String,

    /// Base URL of the rendering service. Images are fetched from
    /// `{render_base_url}/img/{base64}`. Default: [`DEFAULT_RENDER_BASE_URL`].
    pub render_base_url: String,

    /// Sampling parameters and safety policy sent with every model call.
    pub generation: GenerationSettings,

    /// Per-model-call timeout in seconds. Default: 60.
    pub model_timeout_secs: u64,

    /// Per-render-call timeout in seconds. Default: 30.
    pub render_timeout_secs: u64,

    /// Parent of the per-request upload temp directories. Default: `uploads`.
    pub upload_dir: PathBuf,

    /// Public directory rendered images are written to and served from.
    /// Default: `static`.
    pub static_dir: PathBuf,

    /// Maximum accepted multipart body size in bytes. Default: 50 MiB.
    pub max_upload_bytes: usize,

    /// Directory containing the pdfium shared library. If None, pdfium is
    /// bound from the system library path.
    pub pdfium_lib_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            provider_name: None,
            model: None,
            api_key: None,
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            render_base_url: DEFAULT_RENDER_BASE_URL.to_string(),
            generation: GenerationSettings::default(),
            model_timeout_secs: 60,
            render_timeout_secs: 30,
            upload_dir: PathBuf::from("uploads"),
            static_dir: PathBuf::from("static"),
            max_upload_bytes: 50 * 1024 * 1024,
            pdfium_lib_path: None,
        }
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("provider_name", &self.provider_name)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("gemini_base_url", &self.gemini_base_url)
            .field("render_base_url", &self.render_base_url)
            .field("generation", &self.generation)
            .field("model_timeout_secs", &self.model_timeout_secs)
            .field("render_timeout_secs", &self.render_timeout_secs)
            .field("upload_dir", &self.upload_dir)
            .field("static_dir", &self.static_dir)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .finish()
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }

    /// True when the built-in Gemini client should be used.
    pub fn uses_gemini(&self) -> bool {
        match self.provider_name.as_deref() {
            None => true,
            Some(name) => name.eq_ignore_ascii_case("gemini"),
        }
    }

    /// Resolved model name for the Gemini client.
    pub fn gemini_model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_GEMINI_MODEL)
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn gemini_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.gemini_base_url = url.into();
        self
    }

    pub fn render_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.render_base_url = url.into();
        self
    }

    pub fn generation(mut self, settings: GenerationSettings) -> Self {
        self.config.generation = settings;
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.generation.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn top_k(mut self, k: u32) -> Self {
        self.config.generation.top_k = k;
        self
    }

    pub fn top_p(mut self, p: f32) -> Self {
        self.config.generation.top_p = p;
        self
    }

    pub fn max_output_tokens(mut self, n: u32) -> Self {
        self.config.generation.max_output_tokens = n;
        self
    }

    pub fn model_timeout_secs(mut self, secs: u64) -> Self {
        self.config.model_timeout_secs = secs;
        self
    }

    pub fn render_timeout_secs(mut self, secs: u64) -> Self {
        self.config.render_timeout_secs = secs;
        self
    }

    pub fn upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.upload_dir = dir.into();
        self
    }

    pub fn static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.static_dir = dir.into();
        self
    }

    pub fn max_upload_bytes(mut self, n: usize) -> Self {
        self.config.max_upload_bytes = n;
        self
    }

    pub fn pdfium_lib_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(dir.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, DiagramifyError> {
        let c = &self.config;
        let g = &c.generation;
        if !(g.top_p > 0.0 && g.top_p <= 1.0) {
            return Err(DiagramifyError::InvalidConfig(format!(
                "top_p must be in (0, 1], got {}",
                g.top_p
            )));
        }
        if g.top_k == 0 {
            return Err(DiagramifyError::InvalidConfig("top_k must be ≥ 1".into()));
        }
        if g.max_output_tokens == 0 {
            return Err(DiagramifyError::InvalidConfig(
                "max_output_tokens must be ≥ 1".into(),
            ));
        }
        if c.render_base_url.trim().is_empty() {
            return Err(DiagramifyError::InvalidConfig(
                "render base URL must not be empty".into(),
            ));
        }
        if c.max_upload_bytes == 0 {
            return Err(DiagramifyError::InvalidConfig(
                "max_upload_bytes must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Generation settings ──────────────────────────────────────────────────

/// Sampling configuration and safety policy for the diagram model.
///
/// Defaults lean deterministic: the same page should produce the same
/// diagram on a re-run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Default: 0.0.
    pub temperature: f32,
    /// Candidate pool size. Default: 20.
    pub top_k: u32,
    /// Nucleus sampling mass. Default: 0.9.
    pub top_p: f32,
    /// Output length cap. Default: 500.
    pub max_output_tokens: u32,
    /// Default: medium-and-above blocked for all four categories.
    pub safety: Vec<SafetySetting>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            top_k: 20,
            top_p: 0.9,
            max_output_tokens: 500,
            safety: SafetySetting::default_policy(),
        }
    }
}

/// One category/threshold pair of the content-safety policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: BlockThreshold,
}

impl SafetySetting {
    /// Medium-and-above blocked for harassment, hate speech, sexually
    /// explicit and dangerous content.
    pub fn default_policy() -> Vec<SafetySetting> {
        [
            HarmCategory::Harassment,
            HarmCategory::HateSpeech,
            HarmCategory::SexuallyExplicit,
            HarmCategory::DangerousContent,
        ]
        .into_iter()
        .map(|category| SafetySetting {
            category,
            threshold: BlockThreshold::BlockMediumAndAbove,
        })
        .collect()
    }
}

/// Harm categories understood by the Gemini API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HarmCategory {
    #[serde(rename = "HARM_CATEGORY_HARASSMENT")]
    Harassment,
    #[serde(rename = "HARM_CATEGORY_HATE_SPEECH")]
    HateSpeech,
    #[serde(rename = "HARM_CATEGORY_SEXUALLY_EXPLICIT")]
    SexuallyExplicit,
    #[serde(rename = "HARM_CATEGORY_DANGEROUS_CONTENT")]
    DangerousContent,
}

/// Blocking thresholds, from most to least permissive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockThreshold {
    BlockNone,
    BlockOnlyHigh,
    BlockMediumAndAbove,
    BlockLowAndAbove,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_generation_policy() {
        let c = PipelineConfig::default();
        assert_eq!(c.generation.temperature, 0.0);
        assert_eq!(c.generation.top_k, 20);
        assert_eq!(c.generation.top_p, 0.9);
        assert_eq!(c.generation.max_output_tokens, 500);
        assert_eq!(c.generation.safety.len(), 4);
        assert!(c
            .generation
            .safety
            .iter()
            .all(|s| s.threshold == BlockThreshold::BlockMediumAndAbove));
        assert!(c.uses_gemini());
        assert_eq!(c.gemini_model(), "gemini-2.5-flash");
    }

    #[test]
    fn explicit_model_overrides_default() {
        let c = PipelineConfig::builder().model("gemini-2.5-pro").build().unwrap();
        assert_eq!(c.gemini_model(), "gemini-2.5-pro");
    }

    #[test]
    fn safety_serialises_to_api_names() {
        let json = serde_json::to_string(&SafetySetting::default_policy()[1]).unwrap();
        assert_eq!(
            json,
            r#"{"category":"HARM_CATEGORY_HATE_SPEECH","threshold":"BLOCK_MEDIUM_AND_ABOVE"}"#
        );
    }

    #[test]
    fn builder_rejects_bad_top_p() {
        let err = PipelineConfig::builder().top_p(1.5).build().unwrap_err();
        assert!(err.to_string().contains("top_p"));
        assert!(PipelineConfig::builder().top_p(0.0).build().is_err());
    }

    #[test]
    fn builder_rejects_zero_top_k() {
        assert!(PipelineConfig::builder().top_k(0).build().is_err());
    }

    #[test]
    fn builder_clamps_temperature() {
        let c = PipelineConfig::builder().temperature(9.0).build().unwrap();
        assert_eq!(c.generation.temperature, 2.0);
    }

    #[test]
    fn other_provider_disables_gemini() {
        let c = PipelineConfig::builder()
            .provider_name("openai")
            .build()
            .unwrap();
        assert!(!c.uses_gemini());
        let c = PipelineConfig::builder()
            .provider_name("Gemini")
            .build()
            .unwrap();
        assert!(c.uses_gemini());
    }

    #[test]
    fn debug_redacts_api_key() {
        let c = PipelineConfig::builder()
            .api_key("secret-key")
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("secret-key"));
        assert!(dbg.contains("<redacted>"));
    }
}
