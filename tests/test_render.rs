//! PDF renderer tests

use psychat_interview::render::markdown::{Block, clean_report, parse_blocks};
use psychat_interview::{DocumentRenderer, PdfReportRenderer, SessionId};

const SAMPLE: &str = "Rapport Psychiatrique\n\
Généré le 12/03/2025\n\
# Reason for consultation\n\
\n\
**Topic raised by the patient:** insomnia [to complete]\n\
\n\
\n\
## Sleep\n\
- Wakes at *4am*\n\
- Uses `melatonin`\n\
1. Sleep hygiene\n\
2. Follow-up in two weeks\n";

#[test]
fn test_cleaned_sample_blocks() {
    let cleaned = clean_report(SAMPLE);
    assert!(!cleaned.contains("Rapport Psychiatrique"));
    assert!(!cleaned.contains("[to complete]"));
    assert!(!cleaned.contains("\n\n\n"));

    let blocks = parse_blocks(&cleaned);
    let headings = blocks
        .iter()
        .filter(|b| matches!(b, Block::Heading { .. }))
        .count();
    let items = blocks
        .iter()
        .filter(|b| matches!(b, Block::Bullet(_) | Block::Numbered { .. }))
        .count();
    assert_eq!(headings, 2);
    assert_eq!(items, 4);
}

#[test]
fn test_pdf_is_written_and_readable() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let renderer = PdfReportRenderer::new(dir.path());
    let session_id = SessionId::generate();

    let long = format!("{SAMPLE}\n{}", "A long paragraph about daily routine. ".repeat(400));
    let path = renderer.render(&long, &session_id).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with(&format!("report_{}_", session_id.short())));
    assert_eq!(renderer.content_type(), "application/pdf");
}

#[test]
fn test_render_bytes_of_empty_report() {
    let renderer = PdfReportRenderer::default();
    let bytes = renderer.render_bytes("").unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}
