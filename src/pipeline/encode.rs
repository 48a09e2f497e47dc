//! Base64 encoding for the two places bytes travel as text.
//!
//! * Image pages go to the model as base64 PNG ([`encode_page_image`]).
//! * Diagram markup goes to the rendering service as a URL path segment
//!   ([`encode_diagram`]). The URL-safe alphabet keeps `/` and `+` out of
//!   the path.

use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE},
    Engine as _,
};
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// A base64 image ready to embed in a model request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    /// Standard-alphabet base64, no data-URI prefix.
    pub data: String,
}

/// Encode an image page as a base64 PNG.
pub fn encode_page_image(img: &DynamicImage) -> Result<InlineImage, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;

    let data = STANDARD.encode(&buf);
    debug!("Encoded image → {} bytes base64", data.len());

    Ok(InlineImage {
        mime_type: "image/png".to_string(),
        data,
    })
}

/// Encode Mermaid markup for the rendering service URL.
pub fn encode_diagram(code: &str) -> String {
    URL_SAFE.encode(code.as_bytes())
}
