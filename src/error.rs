//! Error types for the diagramify library.
//!
//! Three error types reflect three failure modes:
//!
//! * [`DiagramifyError`] is **fatal**: the request cannot proceed at all
//!   (unsupported extension, corrupt document, I/O failure). Returned as
//!   `Err(DiagramifyError)` from the pipeline entry points.
//!
//! * [`PageError`] is **non-fatal**: a single page failed to render. The page
//!   is dropped from the output and the remaining pages continue.
//!
//! * [`ModelError`] is returned by [`crate::model::DiagramModel`] backends.
//!   The describe stage never propagates it: a failed call is replaced by the
//!   fallback diagram.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the diagramify library.
#[derive(Debug, Error)]
pub enum DiagramifyError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// No extractor is registered for the file's extension.
    #[error("Unsupported file type: '{extension}'\nSupported: .pdf, .pptx, .jpg, .jpeg, .png, .txt")]
    UnsupportedFileType { extension: String },

    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// The upload carried a filename with no usable final component.
    #[error("Invalid upload filename: '{name}'")]
    InvalidFilename { name: String },

    // ── Document errors ───────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// The slideshow archive or one of its XML parts could not be read.
    #[error("Slideshow '{path}' is unreadable: {detail}")]
    CorruptSlideshow { path: PathBuf, detail: String },

    /// The image could not be decoded.
    #[error("Image '{path}' could not be decoded: {detail}")]
    ImageDecode { path: PathBuf, detail: String },

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH to the directory containing libpdfium, or install it system-wide."
    )]
    PdfiumBindingFailed(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The LLM provider could not be constructed.
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Reading or writing a working file failed.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DiagramifyError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DiagramifyError::Io {
            path: path.into(),
            source,
        }
    }
}

/// A non-fatal error for a single page.
///
/// Page numbers are 1-indexed, matching log output and prompts.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// The rendering endpoint could not be reached or returned garbage.
    #[error("Page {page}: render request failed: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// The rendering endpoint answered with a non-success status.
    #[error("Page {page}: render endpoint returned HTTP {status}")]
    RenderStatus { page: usize, status: u16 },

    /// The rendered image could not be written to the output directory.
    #[error("Page {page}: failed to save image: {detail}")]
    SaveFailed { page: usize, detail: String },
}

/// Errors raised by a [`crate::model::DiagramModel`] backend.
#[derive(Debug, Error)]
pub enum ModelError {
    /// No API key was configured for a backend that needs one.
    #[error("No API key configured\nSet API_KEY (or GEMINI_API_KEY) or pass --api-key.")]
    MissingApiKey,

    /// The HTTP request could not be sent or the body could not be read.
    #[error("Model request failed: {0}")]
    Transport(String),

    /// The API answered with a non-success status.
    #[error("Model API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// The prompt or the candidate was blocked by the safety policy.
    #[error("Response blocked by safety policy: {reason}")]
    Blocked { reason: String },

    /// The response carried no usable text.
    #[error("Model returned no text")]
    EmptyResponse,

    /// The response body did not match the expected schema.
    #[error("Malformed model response: {0}")]
    Malformed(String),

    /// Error surfaced by an `edgequake-llm` provider.
    #[error("LLM provider error: {0}")]
    Provider(String),
}
