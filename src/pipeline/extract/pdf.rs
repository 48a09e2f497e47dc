//! PDF text extraction via pdfium.
//!
//! Pages come out in document order. Pages without a text layer (scans)
//! yield an empty string; there is no OCR fallback.

use super::{PageContent, PageExtractor};
use crate::error::DiagramifyError;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct PdfExtractor {
    lib_dir: Option<PathBuf>,
}

impl PdfExtractor {
    pub fn new(lib_dir: Option<PathBuf>) -> Self {
        Self { lib_dir }
    }
}

impl PageExtractor for PdfExtractor {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["pdf"]
    }

    fn extract(&self, path: &Path) -> Result<Vec<PageContent>, DiagramifyError> {
        let pdfium = bind_pdfium(self.lib_dir.as_deref())?;

        let document = pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| DiagramifyError::CorruptPdf {
                path: path.to_path_buf(),
                detail: format!("{:?}", e),
            })?;

        let pages = document.pages();
        let mut results = Vec::with_capacity(pages.len() as usize);

        for (idx, page) in pages.iter().enumerate() {
            let text = page
                .text()
                .map_err(|e| DiagramifyError::CorruptPdf {
                    path: path.to_path_buf(),
                    detail: format!("page {}: {:?}", idx + 1, e),
                })?
                .all();
            debug!("PDF page {}: {} chars", idx + 1, text.len());
            results.push(PageContent::Text(text));
        }

        Ok(results)
    }
}

/// Bind to pdfium from `lib_dir`, or from the system library path.
pub(crate) fn bind_pdfium(lib_dir: Option<&Path>) -> Result<Pdfium, DiagramifyError> {
    let bindings = match lib_dir {
        Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)),
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| DiagramifyError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lib_dir() -> Option<PathBuf> {
        std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from)
    }

    /// Write a PDF with one line of text per page.
    fn write_pdf(pdfium: &Pdfium, path: &Path, lines: &[&str]) -> Result<(), PdfiumError> {
        let mut document = pdfium.create_new_pdf()?;
        let font = document.fonts_mut().helvetica();
        for line in lines {
            let mut page = document
                .pages_mut()
                .create_page_at_end(PdfPagePaperSize::a4())?;
            page.objects_mut().create_text_object(
                PdfPoints::new(72.0),
                PdfPoints::new(720.0),
                *line,
                font,
                PdfPoints::new(18.0),
            )?;
        }
        document.save_to_file(path)
    }

    #[test]
    fn binding_to_missing_dir_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let err = bind_pdfium(Some(dir.path())).err().expect("no pdfium in an empty dir");
        assert!(matches!(err, DiagramifyError::PdfiumBindingFailed(_)));
    }

    #[test]
    fn pages_come_out_in_document_order() {
        let pdfium = match bind_pdfium(lib_dir().as_deref()) {
            Ok(p) => p,
            Err(e) => {
                println!("SKIP: pdfium not available ({e})");
                return;
            }
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("three.pdf");
        write_pdf(&pdfium, &path, &["First page", "Second page", "Third page"]).unwrap();
        drop(pdfium);

        let pages = PdfExtractor::new(lib_dir()).extract(&path).unwrap();
        assert_eq!(pages.len(), 3);
        for (page, expected) in pages.iter().zip(["First", "Second", "Third"]) {
            let text = page.as_text().expect("pdf pages are text");
            assert!(text.contains(expected), "{text:?} should contain {expected}");
        }
    }
}
