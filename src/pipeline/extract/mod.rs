//! Content extraction: turn an uploaded file into per-page content.
//!
//! Each supported format is a [`PageExtractor`]; an [`ExtractorRegistry`]
//! maps lower-cased file extensions to extractors. Every extractor returns
//! the same [`PageContent`] sequence, in natural reading order, so the rest
//! of the pipeline never looks at the file format again.
//!
//! Extractors are synchronous (pdfium, zip and image decoding all block);
//! [`ExtractorRegistry::extract`] moves the work onto `spawn_blocking`.

mod image;
mod pdf;
mod pptx;
mod text;

pub use self::image::ImageExtractor;
pub use self::pdf::PdfExtractor;
pub use self::pptx::PptxExtractor;
pub use self::text::TextExtractor;

use crate::error::DiagramifyError;
use crate::output::PageKind;
use ::image::DynamicImage;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Content of one logical page, slide or file.
#[derive(Debug, Clone)]
pub enum PageContent {
    Text(String),
    Image(DynamicImage),
}

impl PageContent {
    pub fn kind(&self) -> PageKind {
        match self {
            PageContent::Text(_) => PageKind::Text,
            PageContent::Image(_) => PageKind::Image,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PageContent::Text(t) => Some(t),
            PageContent::Image(_) => None,
        }
    }
}

/// A format-specific page extractor.
pub trait PageExtractor: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Lower-cased extensions (without the dot) handled by this extractor.
    fn extensions(&self) -> &'static [&'static str];

    /// Extract pages in reading order. Blocking.
    fn extract(&self, path: &Path) -> Result<Vec<PageContent>, DiagramifyError>;
}

/// Extension → extractor lookup.
#[derive(Clone, Default)]
pub struct ExtractorRegistry {
    extractors: HashMap<String, Arc<dyn PageExtractor>>,
}

impl fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractorRegistry")
            .field("extensions", &self.supported_extensions())
            .finish()
    }
}

impl ExtractorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the PDF, PPTX, image and text extractors.
    ///
    /// `pdfium_lib_path` is the directory holding the pdfium library, or
    /// `None` to bind from the system library path.
    pub fn with_defaults(pdfium_lib_path: Option<PathBuf>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PdfExtractor::new(pdfium_lib_path)));
        registry.register(Arc::new(PptxExtractor));
        registry.register(Arc::new(ImageExtractor));
        registry.register(Arc::new(TextExtractor));
        registry
    }

    /// Register an extractor for every extension it declares. Later
    /// registrations replace earlier ones.
    pub fn register(&mut self, extractor: Arc<dyn PageExtractor>) {
        for ext in extractor.extensions() {
            self.extractors
                .insert(ext.to_ascii_lowercase(), Arc::clone(&extractor));
        }
    }

    /// Sorted list of registered extensions.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.extractors.keys().map(String::as_str).collect();
        exts.sort_unstable();
        exts
    }

    /// Pick the extractor for `path` by its (case-insensitive) extension.
    pub fn for_path(&self, path: &Path) -> Result<Arc<dyn PageExtractor>, DiagramifyError> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        self.extractors
            .get(&extension)
            .cloned()
            .ok_or(DiagramifyError::UnsupportedFileType { extension })
    }

    /// Extract the pages of `path`.
    ///
    /// Fails with [`DiagramifyError::UnsupportedFileType`] before touching
    /// the file when no extractor matches.
    pub async fn extract(&self, path: &Path) -> Result<Vec<PageContent>, DiagramifyError> {
        let extractor = self.for_path(path)?;
        if !path.exists() {
            return Err(DiagramifyError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let owned = path.to_path_buf();
        let name = extractor.name();
        debug!("Extracting {} with {} extractor", owned.display(), name);

        let pages = tokio::task::spawn_blocking(move || extractor.extract(&owned))
            .await
            .map_err(|e| DiagramifyError::Internal(format!("Extraction task panicked: {}", e)))??;

        info!("Extracted {} page(s) from {}", pages.len(), path.display());
        Ok(pages)
    }
}
