//! PowerPoint (`.pptx`) slide text extraction.
//!
//! Slide order follows `p:sldIdLst` in `ppt/presentation.xml`, resolved
//! through `ppt/_rels/presentation.xml.rels`. Archives without a usable
//! presentation part fall back to numeric `slideN.xml` order, so `slide10`
//! never sorts before `slide2`.
//!
//! Every shape text body (`p:txBody`) contributes one block: its paragraphs
//! joined with `\n`. Blocks join with `\n`. Shapes without text are skipped,
//! as are slides' tables and pictures.

use super::{PageContent, PageExtractor};
use crate::error::DiagramifyError;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::{debug, warn};
use zip::ZipArchive;

type Archive = ZipArchive<Cursor<Vec<u8>>>;

pub struct PptxExtractor;

impl PageExtractor for PptxExtractor {
    fn name(&self) -> &'static str {
        "pptx"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["pptx"]
    }

    fn extract(&self, path: &Path) -> Result<Vec<PageContent>, DiagramifyError> {
        let corrupt = |detail: String| DiagramifyError::CorruptSlideshow {
            path: path.to_path_buf(),
            detail,
        };

        let bytes = std::fs::read(path).map_err(|e| DiagramifyError::io(path, e))?;
        let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| corrupt(e.to_string()))?;

        let slides = slide_order(&mut archive);
        debug!("Slideshow has {} slide(s)", slides.len());

        let mut pages = Vec::with_capacity(slides.len());
        for part in &slides {
            let xml = read_part(&mut archive, part)
                .ok_or_else(|| corrupt(format!("missing slide part '{}'", part)))?;
            let text = slide_text(&xml).map_err(|e| corrupt(format!("{}: {}", part, e)))?;
            pages.push(PageContent::Text(text));
        }

        Ok(pages)
    }
}

fn read_part(archive: &mut Archive, name: &str) -> Option<String> {
    let mut file = archive.by_name(name).ok()?;
    let mut content = String::new();
    file.read_to_string(&mut content).ok()?;
    Some(content)
}

/// Slide part names in presentation order.
fn slide_order(archive: &mut Archive) -> Vec<String> {
    let declared = read_part(archive, "ppt/presentation.xml")
        .zip(read_part(archive, "ppt/_rels/presentation.xml.rels"))
        .map(|(presentation, rels)| {
            let targets = relationship_targets(&rels);
            slide_rel_ids(&presentation)
                .into_iter()
                .filter_map(|id| targets.get(&id).map(|t| resolve_target(t)))
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let declared: Vec<String> = declared
        .into_iter()
        .filter(|part| archive.by_name(part).is_ok())
        .collect();

    if !declared.is_empty() {
        return declared;
    }

    warn!("No usable slide list in presentation.xml; using slide file numbering");
    numbered_slides(archive.file_names())
}

/// `ppt/slides/slideN.xml` entries sorted by N.
fn numbered_slides<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut slides: Vec<(u32, String)> = names
        .filter_map(|name| {
            let n = name
                .strip_prefix("ppt/slides/slide")?
                .strip_suffix(".xml")?
                .parse::<u32>()
                .ok()?;
            Some((n, name.to_string()))
        })
        .collect();
    slides.sort_by_key(|(n, _)| *n);
    slides.into_iter().map(|(_, name)| name).collect()
}

/// Relationship targets are relative to `ppt/` unless absolute.
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("ppt/{}", target.trim_start_matches("./")),
    }
}

/// `Id → Target` from a relationships part.
fn relationship_targets(rels_xml: &str) -> HashMap<String, String> {
    let mut targets = HashMap::new();
    let mut reader = Reader::from_str(rels_xml);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.local_name().as_ref() == b"Relationship" => {
                let mut id = None;
                let mut target = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Id" => id = String::from_utf8(attr.value.to_vec()).ok(),
                        b"Target" => target = String::from_utf8(attr.value.to_vec()).ok(),
                        _ => {}
                    }
                }
                if let (Some(id), Some(target)) = (id, target) {
                    targets.insert(id, target);
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }

    targets
}

/// Relationship ids of `p:sldId` entries, in list order.
fn slide_rel_ids(presentation_xml: &str) -> Vec<String> {
    let mut ids = Vec::new();
    let mut reader = Reader::from_str(presentation_xml);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"p:sldId" => {
                if let Some(id) = e
                    .attributes()
                    .flatten()
                    .find(|a| a.key.as_ref() == b"r:id")
                    .and_then(|a| String::from_utf8(a.value.to_vec()).ok())
                {
                    ids.push(id);
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }

    ids
}

/// Text of every shape on a slide.
fn slide_text(slide_xml: &str) -> Result<String, String> {
    let mut reader = Reader::from_str(slide_xml);
    let mut shapes: Vec<String> = Vec::new();
    // Paragraphs of the text body being read, if any.
    let mut body: Option<Vec<String>> = None;
    let mut in_run_text = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("XML error at {}: {}", reader.buffer_position(), e))?;

        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"p:txBody" => body = Some(Vec::new()),
                b"a:p" => {
                    if let Some(paragraphs) = body.as_mut() {
                        paragraphs.push(String::new());
                    }
                }
                b"a:t" => in_run_text = body.is_some(),
                b"a:br" => push_text(&mut body, "\n"),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"a:br" => push_text(&mut body, "\n"),
                b"a:p" => {
                    if let Some(paragraphs) = body.as_mut() {
                        paragraphs.push(String::new());
                    }
                }
                _ => {}
            },
            Event::Text(t) if in_run_text => {
                let decoded = t.decode().map_err(|e| e.to_string())?;
                push_text(&mut body, &decoded);
            }
            Event::GeneralRef(r) if in_run_text => {
                let name = r.decode().map_err(|e| e.to_string())?;
                if let Some(resolved) = resolve_entity(&name) {
                    push_text(&mut body, &resolved);
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"a:t" => in_run_text = false,
                b"p:txBody" => {
                    if let Some(paragraphs) = body.take() {
                        let text = paragraphs.join("\n");
                        if !text.trim().is_empty() {
                            shapes.push(text);
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(shapes.join("\n"))
}

fn push_text(body: &mut Option<Vec<String>>, text: &str) {
    if let Some(paragraphs) = body.as_mut() {
        match paragraphs.last_mut() {
            Some(last) => last.push_str(text),
            None => paragraphs.push(text.to_string()),
        }
    }
}

fn resolve_entity(name: &str) -> Option<String> {
    if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        return u32::from_str_radix(hex, 16)
            .ok()
            .and_then(char::from_u32)
            .map(String::from);
    }
    if let Some(dec) = name.strip_prefix('#') {
        return dec.parse::<u32>().ok().and_then(char::from_u32).map(String::from);
    }
    let resolved = match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        _ => return None,
    };
    Some(resolved.to_string())
}
