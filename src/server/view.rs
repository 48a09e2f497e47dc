//! HTML for the upload form and the diagram list.

use crate::output::RenderedDiagram;
use html_escape::{encode_double_quoted_attribute, encode_text};

const HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>diagramify</title>
<style>
body { font-family: sans-serif; max-width: 60rem; margin: 2rem auto; padding: 0 1rem; }
figure { margin: 1.5rem 0; border-top: 1px solid #ddd; padding-top: 1rem; }
img { max-width: 100%; }
</style>
</head>
<body>
<h1>Document to diagrams</h1>
<form method="post" action="/" enctype="multipart/form-data">
<input type="file" name="file" accept=".pdf,.pptx,.jpg,.jpeg,.png,.txt">
<button type="submit">Upload</button>
</form>
"#;

const TAIL: &str = "</body>\n</html>\n";

/// Render the page, listing `diagrams` under the form in the given order.
pub fn render_page(diagrams: &[RenderedDiagram]) -> String {
    let mut html = String::from(HEAD);

    if !diagrams.is_empty() {
        html.push_str("<section id=\"diagrams\">\n");
        for diagram in diagrams {
            let src = format!("/static/{}", diagram.file_name);
            let src = encode_double_quoted_attribute(&src);
            let name = diagram
                .file_name
                .rsplit('/')
                .next()
                .unwrap_or(&diagram.file_name);

            html.push_str(&format!(
                "<figure>\n<figcaption>Page {page}</figcaption>\n\
<img src=\"{src}\" alt=\"Diagram for page {page}\">\n\
<p><a href=\"{src}\" download>{name}</a></p>\n</figure>\n",
                page = diagram.page_number(),
                src = src,
                name = encode_text(name),
            ));
        }
        html.push_str("</section>\n");
    }

    html.push_str(TAIL);
    html
}
