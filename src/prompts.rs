//! Prompts for page → Mermaid generation.
//!
//! Every prompt lives here so the describe stage only deals with calling the
//! model and handling its failures. Page numbers passed in are 1-indexed.

/// Diagram substituted for a page whose model call failed.
pub const FALLBACK_DIAGRAM: &str = "graph TD; A --> B;";

/// Illustrative mindmap embedded in the text prompt. The prompt tells the
/// model not to reproduce it.
const MINDMAP_EXAMPLE: &str = r#"mindmap
  root((mindmap))
    Origins
      Long history
      ::icon(fa fa-book)
      Popularisation
        British popular psychology author Tony Buzan
    Research
      On effectivness<br/>and features
      On Automatic creation
        Uses
            Creative techniques
            Strategic planning
            Argument mapping
    Tools
      Pen and paper
      Mermaid"#;

/// Build the mindmap prompt for a page of extracted text.
pub fn text_prompt(page_number: usize, page_text: &str) -> String {
    format!(
        r#"You are a Mermaid diagram expert, specifically skilled in creating mindmaps.
Your task is to analyze the following text from page {page_number} and generate Mermaid code that
visually represents the key concepts and relationships in the form of a mindmap:
```
{page_text}
```
Make sure the generated Mermaid code is valid and can be rendered correctly by Mermaid.js.
Do not include any explanatory text outside of the Mermaid code block.

Important Instructions for Mermaid Code Generation:

* Use the following Mermaid mindmap syntax as a guide:

```
{MINDMAP_EXAMPLE}
```
* Do not repeat the example mindmap; only include content that is actually on the page.
* Ensure correct indentation and spacing for sub-nodes.
* Use parentheses `(())` for the root node.
* Use the correct arrow symbol `-->` for connections where applicable.
* Include newlines where necessary for proper formatting.
* Use `::icon(font-awesome icon class)` for adding icons.
* Use `<br/>` for line breaks within a node."#
    )
}

/// Build the prompt that accompanies an image page.
pub fn image_prompt(page_number: usize) -> String {
    format!(
        "Process the image from page {page_number} to generate Mermaid code that visually \
represents the key concepts and relationships. Make sure the generated Mermaid code is valid \
and can be rendered correctly by Mermaid.js. Do not include any explanatory text outside of \
the Mermaid code block."
    )
}
