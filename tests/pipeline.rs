//! End-to-end pipeline tests against a local stand-in renderer.
//!
//! No network access or API key is needed: the model is a stub and the
//! rendering endpoint is an axum server on an ephemeral port.

mod common;

use common::*;
use diagramify::prompts::FALLBACK_DIAGRAM;
use diagramify::{generate_diagrams, generate_from_upload, DiagramifyError};
use std::sync::Arc;

#[tokio::test]
async fn three_slide_deck_yields_three_diagrams_in_order() {
    let root = tempfile::tempdir().unwrap();
    let (render_url, rendered) = spawn_renderer().await;
    let model = Arc::new(KeywordModel::default());
    let ctx = test_context(root.path(), &render_url, Arc::clone(&model));

    let deck = root.path().join("deck.pptx");
    std::fs::write(&deck, write_pptx(&["Alpha", "Beta", "Gamma"])).unwrap();
    let out_dir = root.path().join("out");

    let output = generate_diagrams(&ctx, &deck, &out_dir, "").await.unwrap();

    let names: Vec<&str> = output.diagrams.iter().map(|d| d.file_name.as_str()).collect();
    assert_eq!(names, vec!["diagram_0.png", "diagram_1.png", "diagram_2.png"]);
    for name in names {
        assert_eq!(std::fs::read(out_dir.join(name)).unwrap(), FAKE_PNG);
    }
    assert_eq!(output.stats.total_pages, 3);
    assert_eq!(output.stats.rendered_pages, 3);
    assert_eq!(output.stats.failed_renders, 0);

    // Prompts follow presentation order, with 1-based page numbers.
    let prompts = model.prompts.lock().unwrap();
    assert!(prompts[0].contains("from page 1") && prompts[0].contains("Alpha"));
    assert!(prompts[1].contains("from page 2") && prompts[1].contains("Beta"));
    assert!(prompts[2].contains("from page 3") && prompts[2].contains("Gamma"));

    // The renderer never sees fences or a leading dialect token.
    for markup in rendered.lock().unwrap().iter() {
        assert!(!markup.contains("```"));
        assert!(markup.starts_with("mindmap"), "got: {markup}");
    }
}

#[tokio::test]
async fn render_failures_leave_gaps_without_shifting_names() {
    let root = tempfile::tempdir().unwrap();
    let (render_url, _) = spawn_renderer().await;
    let ctx = test_context(root.path(), &render_url, Arc::new(KeywordModel::default()));

    let deck = root.path().join("deck.pptx");
    std::fs::write(&deck, write_pptx(&["one", RENDER_FAIL, "three"])).unwrap();
    let out_dir = root.path().join("out");

    let output = generate_diagrams(&ctx, &deck, &out_dir, "").await.unwrap();

    assert_eq!(output.diagrams.len(), 2);
    assert_eq!(
        output.diagrams.iter().map(|d| d.page_index).collect::<Vec<_>>(),
        vec![0, 2]
    );
    assert_eq!(output.diagrams[1].file_name, "diagram_2.png");
    assert!(!out_dir.join("diagram_1.png").exists());
    assert_eq!(output.stats.failed_renders, 1);
}

#[tokio::test]
async fn model_failure_falls_back_and_still_renders() {
    let root = tempfile::tempdir().unwrap();
    let (render_url, rendered) = spawn_renderer().await;
    let ctx = test_context(root.path(), &render_url, Arc::new(KeywordModel::default()));

    let deck = root.path().join("deck.pptx");
    std::fs::write(&deck, write_pptx(&["fine", MODEL_FAIL])).unwrap();

    let output = generate_diagrams(&ctx, &deck, &root.path().join("out"), "")
        .await
        .unwrap();

    assert_eq!(output.diagrams.len(), 2);
    assert_eq!(output.stats.fallback_pages, 1);
    assert_eq!(output.stats.described_pages, 1);
    // Fallback markup is rendered after the connector collapse.
    let rendered = rendered.lock().unwrap();
    assert_eq!(rendered[1], FALLBACK_DIAGRAM.replace(" --> ", "-->"));
}

#[tokio::test]
async fn text_file_is_a_single_page() {
    let root = tempfile::tempdir().unwrap();
    let (render_url, _) = spawn_renderer().await;
    let model = Arc::new(KeywordModel::default());
    let ctx = test_context(root.path(), &render_url, Arc::clone(&model));

    let output = generate_from_upload(&ctx, "notes.txt", b"Cells divide.\nDNA replicates.")
        .await
        .unwrap();

    assert_eq!(output.diagrams.len(), 1);
    let file_name = &output.diagrams[0].file_name;
    assert!(file_name.ends_with("/diagram_0.png"), "got: {file_name}");
    let saved = root.path().join("static").join(file_name);
    assert_eq!(std::fs::read(saved).unwrap(), FAKE_PNG);
    assert!(model.prompts.lock().unwrap()[0].contains("DNA replicates."));
}

#[tokio::test]
async fn image_upload_is_sent_to_the_model() {
    let root = tempfile::tempdir().unwrap();
    let (render_url, rendered) = spawn_renderer().await;
    let ctx = test_context(root.path(), &render_url, Arc::new(KeywordModel::default()));

    let mut png = std::io::Cursor::new(Vec::new());
    image::DynamicImage::new_rgb8(8, 8)
        .write_to(&mut png, image::ImageFormat::Png)
        .unwrap();

    let output = generate_from_upload(&ctx, "board.PNG", png.get_ref())
        .await
        .unwrap();

    assert_eq!(output.diagrams.len(), 1);
    assert_eq!(output.stats.fallback_pages, 0);
    assert_eq!(rendered.lock().unwrap()[0], "graph LR; picture-->diagram");
}

#[tokio::test]
async fn concurrent_uploads_do_not_collide() {
    let root = tempfile::tempdir().unwrap();
    let (render_url, _) = spawn_renderer().await;
    let ctx = test_context(root.path(), &render_url, Arc::new(KeywordModel::default()));

    let (a, b) = tokio::join!(
        generate_from_upload(&ctx, "same.txt", b"first"),
        generate_from_upload(&ctx, "same.txt", b"second"),
    );
    let (a, b) = (a.unwrap(), b.unwrap());
    assert_ne!(a.diagrams[0].file_name, b.diagrams[0].file_name);
}

#[tokio::test]
async fn unsupported_extension_produces_nothing() {
    let root = tempfile::tempdir().unwrap();
    let (render_url, rendered) = spawn_renderer().await;
    let model = Arc::new(KeywordModel::default());
    let ctx = test_context(root.path(), &render_url, Arc::clone(&model));

    let err = generate_from_upload(&ctx, "report.docx", b"PK\x03\x04")
        .await
        .unwrap_err();

    assert!(matches!(err, DiagramifyError::UnsupportedFileType { .. }));
    assert!(model.prompts.lock().unwrap().is_empty());
    assert!(rendered.lock().unwrap().is_empty());
}

#[tokio::test]
async fn corrupt_deck_is_a_fatal_error() {
    let root = tempfile::tempdir().unwrap();
    let (render_url, _) = spawn_renderer().await;
    let ctx = test_context(root.path(), &render_url, Arc::new(KeywordModel::default()));

    let err = generate_from_upload(&ctx, "deck.pptx", b"not a zip")
        .await
        .unwrap_err();
    assert!(matches!(err, DiagramifyError::CorruptSlideshow { .. }));
}

#[tokio::test]
async fn garbage_pdf_is_a_fatal_error() {
    let root = tempfile::tempdir().unwrap();
    let (render_url, rendered) = spawn_renderer().await;
    let ctx = test_context(root.path(), &render_url, Arc::new(KeywordModel::default()));

    let err = generate_from_upload(&ctx, "paper.pdf", b"%PDF-1.7 truncated")
        .await
        .unwrap_err();

    // Without a pdfium library on the test host only binding can fail.
    assert!(
        matches!(
            err,
            DiagramifyError::CorruptPdf { .. } | DiagramifyError::PdfiumBindingFailed(_)
        ),
        "got: {err}"
    );
    assert!(rendered.lock().unwrap().is_empty());
}
