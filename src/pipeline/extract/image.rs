//! Raster images are a single page whose content is the decoded image.

use super::{PageContent, PageExtractor};
use crate::error::DiagramifyError;
use std::path::Path;
use tracing::debug;

pub struct ImageExtractor;

impl PageExtractor for ImageExtractor {
    fn name(&self) -> &'static str {
        "image"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["jpg", "jpeg", "png"]
    }

    fn extract(&self, path: &Path) -> Result<Vec<PageContent>, DiagramifyError> {
        let decode_err = |detail: String| DiagramifyError::ImageDecode {
            path: path.to_path_buf(),
            detail,
        };
        // Content sniffing wins over the extension.
        let img = image::ImageReader::open(path)
            .map_err(|e| DiagramifyError::io(path, e))?
            .with_guessed_format()
            .map_err(|e| DiagramifyError::io(path, e))?
            .decode()
            .map_err(|e| decode_err(e.to_string()))?;
        debug!("Decoded image {}x{}", img.width(), img.height());
        Ok(vec![PageContent::Image(img)])
    }
}
