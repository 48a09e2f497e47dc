//! Records produced by the pipeline.
//!
//! Every record carries the 0-indexed `page_index` of the page it came from.
//! Render failures leave gaps in [`DiagramOutput::diagrams`], but an image
//! can always be traced back to its source page.

use serde::{Deserialize, Serialize};

/// What kind of page a description was generated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    Text,
    Image,
}

/// Cleaned Mermaid markup for one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramDescription {
    /// 0-indexed page position in reading order.
    pub page_index: usize,
    pub kind: PageKind,
    pub code: String,
    /// True when the model call failed and the fallback diagram was used.
    pub fallback: bool,
}

impl DiagramDescription {
    /// 1-indexed page number, as shown to users and in logs.
    pub fn page_number(&self) -> usize {
        self.page_index + 1
    }
}

/// A rendered PNG saved under the static directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedDiagram {
    /// 0-indexed page position in reading order.
    pub page_index: usize,
    /// Path relative to the static directory, using `/` separators.
    pub file_name: String,
}

impl RenderedDiagram {
    pub fn page_number(&self) -> usize {
        self.page_index + 1
    }
}

/// Counters for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Pages produced by the extractor.
    pub total_pages: usize,
    /// Pages whose model call succeeded.
    pub described_pages: usize,
    /// Pages that received the fallback diagram.
    pub fallback_pages: usize,
    /// Pages whose image was saved.
    pub rendered_pages: usize,
    /// Pages dropped because rendering failed.
    pub failed_renders: usize,
    pub duration_ms: u64,
}

/// Result of a full pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagramOutput {
    /// Saved images in page order.
    pub diagrams: Vec<RenderedDiagram>,
    pub stats: ConversionStats,
}

/// File name of the image for a given page.
pub fn diagram_file_name(page_index: usize) -> String {
    format!("diagram_{page_index}.png")
}
