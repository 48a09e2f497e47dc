//! Gemini `generateContent` REST client.
//!
//! One request per page, no streaming. Blocked prompts
//! (`promptFeedback.blockReason`) and candidates that stop for a safety
//! reason are errors; partially generated text is never returned.

use super::{DiagramModel, ModelRequest};
use crate::config::{GenerationSettings, PipelineConfig, SafetySetting};
use crate::error::{DiagramifyError, ModelError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Finish reasons that mean the candidate was withheld by policy.
const BLOCKING_FINISH_REASONS: &[&str] = &["SAFETY", "PROHIBITED_CONTENT", "BLOCKLIST", "SPII"];

pub struct GeminiModel {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    settings: GenerationSettings,
}

impl GeminiModel {
    pub fn new(config: &PipelineConfig) -> Result<Self, DiagramifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.model_timeout_secs))
            .build()
            .map_err(|e| DiagramifyError::Internal(format!("HTTP client: {}", e)))?;

        let model = config.gemini_model().to_string();
        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent",
            config.gemini_base_url.trim_end_matches('/'),
            model
        );

        Ok(Self {
            client,
            endpoint,
            model,
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            settings: config.generation.clone(),
        })
    }
}

#[async_trait]
impl DiagramModel for GeminiModel {
    async fn generate(&self, request: &ModelRequest) -> Result<String, ModelError> {
        let api_key = self.api_key.as_deref().ok_or(ModelError::MissingApiKey)?;
        let body = build_request(request, &self.settings);

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Malformed(e.to_string()))?;

        let text = extract_text(parsed)?;
        debug!("Gemini returned {} chars", text.len());
        Ok(text)
    }

    fn describe_backend(&self) -> String {
        format!("gemini/{}", self.model)
    }
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
    safety_settings: &'a [SafetySetting],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

fn build_request<'a>(
    request: &'a ModelRequest,
    settings: &'a GenerationSettings,
) -> GenerateContentRequest<'a> {
    let mut parts = vec![Part::Text {
        text: &request.prompt,
    }];
    if let Some(image) = &request.image {
        parts.push(Part::Inline {
            inline_data: InlineData {
                mime_type: &image.mime_type,
                data: &image.data,
            },
        });
    }

    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts,
        }],
        generation_config: GenerationConfig {
            temperature: settings.temperature,
            top_k: settings.top_k,
            top_p: settings.top_p,
            max_output_tokens: settings.max_output_tokens,
        },
        safety_settings: &settings.safety,
    }
}

fn extract_text(response: GenerateContentResponse) -> Result<String, ModelError> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(ModelError::Blocked { reason });
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(ModelError::EmptyResponse)?;

    if let Some(reason) = candidate.finish_reason.as_deref() {
        if BLOCKING_FINISH_REASONS.contains(&reason) {
            return Err(ModelError::Blocked {
                reason: reason.to_string(),
            });
        }
    }

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ModelError::EmptyResponse);
    }
    Ok(text)
}
