//! Shared fixtures for the integration tests.
//!
//! * [`KeywordModel`]: a `DiagramModel` that answers from the page text.
//! * [`spawn_renderer`]: a local stand-in for mermaid.ink.
//! * [`write_pptx`]: builds a minimal slide deck in memory.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use diagramify::{DiagramModel, ModelError, ModelRequest, PipelineConfig, PipelineContext};
use std::io::Write;
use std::sync::{Arc, Mutex};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Body returned by the fake renderer.
pub const FAKE_PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake";

/// Marker that makes the fake renderer answer with HTTP 400.
pub const RENDER_FAIL: &str = "RENDERFAIL";

/// Marker that makes [`KeywordModel`] fail the call.
pub const MODEL_FAIL: &str = "MODELFAIL";

/// Answers a fenced mindmap for text pages and a graph for image pages.
/// Fails when the prompt mentions [`MODEL_FAIL`] and returns markup the
/// renderer rejects when it mentions [`RENDER_FAIL`]. Records every prompt.
#[derive(Default)]
pub struct KeywordModel {
    pub prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl DiagramModel for KeywordModel {
    async fn generate(&self, request: &ModelRequest) -> Result<String, ModelError> {
        self.prompts.lock().unwrap().push(request.prompt.clone());
        if request.prompt.contains(MODEL_FAIL) {
            return Err(ModelError::Transport("simulated outage".into()));
        }
        if request.prompt.contains(RENDER_FAIL) {
            return Ok(format!("```mermaid\ngraph TD; {RENDER_FAIL} --> x;\n```"));
        }
        if request.image.is_some() {
            return Ok("graph LR; picture --> diagram".into());
        }
        Ok("```mermaid\nmindmap\n  root((page))\n```".into())
    }

    fn describe_backend(&self) -> String {
        "keyword".into()
    }
}

/// Start a renderer on an ephemeral port and return its base URL.
///
/// `GET /img/{code}` answers [`FAKE_PNG`], or 400 when the decoded markup
/// contains [`RENDER_FAIL`]. Every decoded request is recorded.
pub async fn spawn_renderer() -> (String, Arc<Mutex<Vec<String>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);

    let app = Router::new().route(
        "/img/{code}",
        get(move |Path(code): Path<String>| {
            let recorder = Arc::clone(&recorder);
            async move {
                let Ok(bytes) = URL_SAFE.decode(code.as_bytes()) else {
                    return (StatusCode::BAD_REQUEST, Vec::new());
                };
                let markup = String::from_utf8_lossy(&bytes).to_string();
                recorder.lock().unwrap().push(markup.clone());
                if markup.contains(RENDER_FAIL) {
                    (StatusCode::BAD_REQUEST, Vec::new())
                } else {
                    (StatusCode::OK, FAKE_PNG.to_vec())
                }
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), seen)
}

/// Config rooted in `root` that renders through `render_url`.
pub fn test_config(root: &std::path::Path, render_url: &str) -> PipelineConfig {
    PipelineConfig::builder()
        .upload_dir(root.join("uploads"))
        .static_dir(root.join("static"))
        .render_base_url(render_url)
        .render_timeout_secs(5)
        .build()
        .unwrap()
}

pub fn test_context(
    root: &std::path::Path,
    render_url: &str,
    model: Arc<KeywordModel>,
) -> PipelineContext {
    PipelineContext::with_model(test_config(root, render_url), model).unwrap()
}

/// Build a deck whose slides contain `texts`, in order.
///
/// Slide files are numbered in reverse so that only `presentation.xml`
/// gives the right order.
pub fn write_pptx(texts: &[&str]) -> Vec<u8> {
    let n = texts.len();
    let mut buffer = std::io::Cursor::new(Vec::new());
    {
        let mut zip = ZipWriter::new(&mut buffer);
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        let ids: String = (0..n)
            .map(|i| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, i + 1))
            .collect();
        zip.start_file("ppt/presentation.xml", options).unwrap();
        zip.write_all(
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><p:sldIdLst>{ids}</p:sldIdLst></p:presentation>"#
            )
            .as_bytes(),
        )
        .unwrap();

        let rels: String = (0..n)
            .map(|i| {
                format!(
                    r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide{}.xml"/>"#,
                    i + 1,
                    n - i
                )
            })
            .collect();
        zip.start_file("ppt/_rels/presentation.xml.rels", options).unwrap();
        zip.write_all(
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{rels}</Relationships>"#
            )
            .as_bytes(),
        )
        .unwrap();

        for (i, text) in texts.iter().enumerate() {
            zip.start_file(format!("ppt/slides/slide{}.xml", n - i), options)
                .unwrap();
            zip.write_all(
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?><p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:sp><p:txBody><a:bodyPr/><a:p><a:r><a:t>{text}</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#
                )
                .as_bytes(),
            )
            .unwrap();
        }

        zip.finish().unwrap();
    }
    buffer.into_inner()
}
