//! Pipeline stages for document-to-diagram conversion.
//!
//! Each submodule implements one transformation step.
//!
//! ## Data Flow
//!
//! ```text
//! upload ──▶ extract ──▶ describe ──▶ postprocess ──▶ encode ──▶ render
//! (temp dir)  (pages)     (model)      (cleanup)      (base64)   (mermaid.ink)
//! ```
//!
//! 1. [`upload`]: stage an uploaded file in a per-request temp directory
//! 2. [`extract`]: split a document into text or image pages; runs in
//!    `spawn_blocking` because pdfium and zip parsing are synchronous
//! 3. [`describe`]: one model call per page, with a fixed fallback diagram
//! 4. [`postprocess`]: strip code fences and normalise arrows
//! 5. [`encode`]: base64 for page images and diagram URLs
//! 6. [`render`]: fetch the PNG for each diagram and save it

pub mod describe;
pub mod encode;
pub mod extract;
pub mod postprocess;
pub mod render;
pub mod upload;
