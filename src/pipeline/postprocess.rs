//! Post-processing: deterministic cleanup of model-generated Mermaid.
//!
//! Models wrap their answer in code fences, prefix it with the dialect name,
//! or pad connectors with spaces the renderer chokes on. Two entry points:
//!
//! * [`clean_description`] runs on every model answer.
//! * [`clean_for_render`] runs again right before encoding for the renderer
//!   and also strips a stray leading `mermaid` token.
//!
//! Both are idempotent: `f(f(x)) == f(x)`.

use once_cell::sync::Lazy;
use regex::Regex;

/// Clean a raw model answer: fences, surrounding whitespace, connectors.
pub fn clean_description(input: &str) -> String {
    let s = strip_fence_tokens(input);
    collapse_arrow_padding(s.trim())
}

/// Clean markup right before rendering.
pub fn clean_for_render(input: &str) -> String {
    let s = strip_fence_tokens(input);
    let s = strip_dialect_prefix(s.trim());
    collapse_arrow_padding(s)
}

// ── Rule 1: Remove code-fence tokens ─────────────────────────────────────────

/// Removes every ```` ``` ```` token, wherever it appears. A leftover
/// language tag on the first line (```` ```mermaid ````) becomes a leading
/// `mermaid` token, handled by [`strip_dialect_prefix`].
fn strip_fence_tokens(input: &str) -> String {
    input.replace("```", "")
}

// ── Rule 2: Strip leading dialect name ───────────────────────────────────────

static RE_DIALECT_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:mermaid\s+)+").unwrap());

fn strip_dialect_prefix(input: &str) -> &str {
    match RE_DIALECT_PREFIX.find(input) {
        Some(m) => &input[m.end()..],
        None => input,
    }
}

// ── Rule 3: Collapse padded connectors ───────────────────────────────────────

static RE_PADDED_ARROW: Lazy<Regex> = Lazy::new(|| Regex::new(r" +--> +").unwrap());

fn collapse_arrow_padding(input: &str) -> String {
    RE_PADDED_ARROW.replace_all(input, "-->").into_owned()
}
