//! # diagramify
//!
//! Turn documents into diagrams: every page of a PDF, slide of a deck, image
//! or text file becomes one Mermaid diagram, generated by an LLM and
//! rendered to PNG by mermaid.ink.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload
//!  │
//!  ├─ 1. Stage     write bytes into a per-request temp dir
//!  ├─ 2. Extract   pdf / pptx / image / txt → ordered pages
//!  ├─ 3. Describe  one model call per page (fallback on failure)
//!  ├─ 4. Clean     strip fences, normalise arrows
//!  ├─ 5. Render    base64 → GET mermaid.ink/img/… → diagram_<n>.png
//!  └─ 6. Respond   HTML list of saved images
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use diagramify::{generate_diagrams, PipelineConfig, PipelineContext};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::builder()
//!         .api_key(std::env::var("API_KEY")?)
//!         .build()?;
//!     let ctx = PipelineContext::from_config(config)?;
//!     let output = generate_diagrams(&ctx, Path::new("slides.pptx"), Path::new("out"), "").await?;
//!     for d in &output.diagrams {
//!         println!("page {} → {}", d.page_number(), d.file_name);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `diagramify` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{GenerationSettings, PipelineConfig, PipelineConfigBuilder, SafetySetting};
pub use convert::{generate_diagrams, generate_from_upload, PipelineContext};
pub use error::{DiagramifyError, ModelError, PageError};
pub use model::{DiagramModel, ModelRequest};
pub use output::{ConversionStats, DiagramDescription, DiagramOutput, PageKind, RenderedDiagram};
pub use pipeline::extract::{ExtractorRegistry, PageContent, PageExtractor};
pub use server::{build_router, start_server, AppState};
