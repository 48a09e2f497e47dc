//! Plain text files are one page; no line or paragraph splitting.

use super::{PageContent, PageExtractor};
use crate::error::DiagramifyError;
use std::path::Path;

pub struct TextExtractor;

impl PageExtractor for TextExtractor {
    fn name(&self) -> &'static str {
        "text"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["txt"]
    }

    fn extract(&self, path: &Path) -> Result<Vec<PageContent>, DiagramifyError> {
        let bytes = std::fs::read(path).map_err(|e| DiagramifyError::io(path, e))?;
        Ok(vec![PageContent::Text(
            String::from_utf8_lossy(&bytes).into_owned(),
        )])
    }
}
