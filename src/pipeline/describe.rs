//! Model interaction: turn one page into one cleaned Mermaid description.
//!
//! All prompt text lives in [`crate::prompts`]; this module picks the prompt
//! for the page kind, calls the model and cleans the answer.
//!
//! ## Failure policy
//!
//! A failed call (network error, policy block, empty or malformed answer)
//! never aborts the request. It is logged with the page number and replaced
//! by [`FALLBACK_DIAGRAM`]. There is no retry.

use super::encode::encode_page_image;
use super::extract::PageContent;
use super::postprocess::clean_description;
use crate::error::ModelError;
use crate::model::{DiagramModel, ModelRequest};
use crate::output::DiagramDescription;
use crate::prompts::{image_prompt, text_prompt, FALLBACK_DIAGRAM};
use std::time::Instant;
use tracing::{debug, warn};

/// Describe a single page.
///
/// Always returns a description; `fallback` tells whether the model call
/// succeeded.
pub async fn describe(
    model: &dyn DiagramModel,
    content: &PageContent,
    page_index: usize,
) -> DiagramDescription {
    let page_num = page_index + 1;
    let start = Instant::now();

    match generate(model, content, page_num).await {
        Ok(raw) => {
            debug!(
                "Page {}: {} chars from model in {:?}",
                page_num,
                raw.len(),
                start.elapsed()
            );
            DiagramDescription {
                page_index,
                kind: content.kind(),
                code: clean_description(&raw),
                fallback: false,
            }
        }
        Err(e) => {
            warn!("Page {}: diagram generation failed: {}", page_num, e);
            DiagramDescription {
                page_index,
                kind: content.kind(),
                code: FALLBACK_DIAGRAM.to_string(),
                fallback: true,
            }
        }
    }
}

/// Describe pages one after another, in order.
pub async fn describe_all(
    model: &dyn DiagramModel,
    pages: &[PageContent],
) -> Vec<DiagramDescription> {
    let mut results = Vec::with_capacity(pages.len());
    for (idx, content) in pages.iter().enumerate() {
        results.push(describe(model, content, idx).await);
    }
    results
}

async fn generate(
    model: &dyn DiagramModel,
    content: &PageContent,
    page_num: usize,
) -> Result<String, ModelError> {
    let request = match content {
        PageContent::Text(text) => ModelRequest::text(text_prompt(page_num, text)),
        PageContent::Image(img) => {
            let image = encode_page_image(img)
                .map_err(|e| ModelError::Malformed(format!("image encoding failed: {}", e)))?;
            ModelRequest::with_image(image_prompt(page_num), image)
        }
    };
    model.generate(&request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::PageKind;
    use async_trait::async_trait;
    use image::DynamicImage;
    use std::sync::Mutex;

    /// Returns canned answers in order and records every request.
    struct ScriptedModel {
        answers: Mutex<Vec<Result<String, ModelError>>>,
        seen: Mutex<Vec<ModelRequest>>,
    }

    impl ScriptedModel {
        fn new(answers: Vec<Result<String, ModelError>>) -> Self {
            Self {
                answers: Mutex::new(answers.into_iter().rev().collect()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl DiagramModel for ScriptedModel {
        async fn generate(&self, request: &ModelRequest) -> Result<String, ModelError> {
            self.seen.lock().unwrap().push(request.clone());
            self.answers
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(ModelError::EmptyResponse))
        }

        fn describe_backend(&self) -> String {
            "scripted".into()
        }
    }

    #[tokio::test]
    async fn text_page_is_cleaned() {
        let model = ScriptedModel::new(vec![Ok("```mermaid\ngraph TD; A --> B;\n```".into())]);
        let d = describe(&model, &PageContent::Text("cells".into()), 2).await;
        assert_eq!(d.page_index, 2);
        assert_eq!(d.kind, PageKind::Text);
        assert_eq!(d.code, "mermaid\ngraph TD; A-->B;");
        assert!(!d.fallback);

        let seen = model.seen.lock().unwrap();
        assert!(seen[0].prompt.contains("from page 3"));
        assert!(seen[0].prompt.contains("cells"));
        assert!(seen[0].image.is_none());
    }

    #[tokio::test]
    async fn failure_yields_exact_fallback() {
        let model = ScriptedModel::new(vec![Err(ModelError::Transport("connection refused".into()))]);
        let d = describe(&model, &PageContent::Text("x".into()), 0).await;
        assert_eq!(d.code, FALLBACK_DIAGRAM);
        assert!(d.fallback);
    }

    #[tokio::test]
    async fn blocked_answer_yields_fallback() {
        let model = ScriptedModel::new(vec![Err(ModelError::Blocked {
            reason: "SAFETY".into(),
        })]);
        let d = describe(&model, &PageContent::Text("x".into()), 0).await;
        assert_eq!(d.code, FALLBACK_DIAGRAM);
    }

    #[tokio::test]
    async fn image_page_sends_png_with_image_prompt() {
        let model = ScriptedModel::new(vec![Ok("graph LR; X-->Y".into())]);
        let page = PageContent::Image(DynamicImage::new_rgb8(4, 4));
        let d = describe(&model, &page, 0).await;
        assert_eq!(d.kind, PageKind::Image);
        assert!(!d.fallback);

        let seen = model.seen.lock().unwrap();
        let image = seen[0].image.as_ref().expect("image attached");
        assert_eq!(image.mime_type, "image/png");
        assert!(seen[0].prompt.starts_with("Process the image from page 1"));
    }

    #[tokio::test]
    async fn describe_all_keeps_order_and_degrades_per_page() {
        let model = ScriptedModel::new(vec![
            Ok("graph TD; P1".into()),
            Err(ModelError::EmptyResponse),
            Ok("graph TD; P3".into()),
        ]);
        let pages = vec![
            PageContent::Text("one".into()),
            PageContent::Text("two".into()),
            PageContent::Text("three".into()),
        ];
        let out = describe_all(&model, &pages).await;
        assert_eq!(out.len(), 3);
        assert_eq!(
            out.iter().map(|d| d.page_index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_eq!(out[0].code, "graph TD; P1");
        assert!(out[1].fallback);
        assert_eq!(out[2].code, "graph TD; P3");
    }
}
