//! Document rendering
//!
//! Turns a finished session's report text into a downloadable file. The
//! gateway only knows the [`DocumentRenderer`] trait; the bundled
//! implementation is [`PdfReportRenderer`].

pub mod markdown;
mod pdf;

use chrono::Local;
use std::io::Write;
use std::path::PathBuf;

use crate::error::{InterviewError, Result};
use crate::types::SessionId;

/// Renders report text into a document on disk
///
/// Called on the blocking thread pool.
pub trait DocumentRenderer: Send + Sync {
    /// Render `markdown` for `session_id`; `None` on any fault
    fn render(&self, markdown: &str, session_id: &SessionId) -> Option<PathBuf>;

    /// MIME type of the produced files
    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    /// File extension of the produced files
    fn extension(&self) -> &'static str {
        "pdf"
    }
}

/// Multi-page A4 PDF renderer
#[derive(Debug, Clone)]
pub struct PdfReportRenderer {
    output_dir: PathBuf,
}

impl PdfReportRenderer {
    /// Write reports into `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Render to PDF bytes without touching the filesystem
    pub fn render_bytes(&self, report: &str) -> Result<Vec<u8>> {
        let cleaned = markdown::clean_report(report);
        let blocks = markdown::parse_blocks(&cleaned);
        pdf::render_pdf(&blocks, Local::now())
    }

    fn write_report(&self, report: &str, session_id: &SessionId) -> Result<PathBuf> {
        let bytes = self.render_bytes(report)?;

        let mut file = tempfile::Builder::new()
            .prefix(&format!("report_{}_", session_id.short()))
            .suffix(".pdf")
            .tempfile_in(&self.output_dir)?;
        file.write_all(&bytes)?;
        file.flush()?;

        let (_, path) = file.keep().map_err(|e| {
            InterviewError::rendering(format!("keeping {}: {}", e.file.path().display(), e.error))
        })?;
        Ok(path)
    }
}

impl Default for PdfReportRenderer {
    fn default() -> Self {
        Self::new(std::env::temp_dir())
    }
}

impl DocumentRenderer for PdfReportRenderer {
    fn render(&self, markdown: &str, session_id: &SessionId) -> Option<PathBuf> {
        match self.write_report(markdown, session_id) {
            Ok(path) => Some(path),
            Err(e) => {
                log::error!("[{}] PDF generation failed: {}", session_id, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_into_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = PdfReportRenderer::new(dir.path());
        let id = SessionId::new("abcdef0123456789");

        let path = renderer
            .render("# Findings\n\n- **Sleep:** poor\n1. Follow up", &id)
            .unwrap();

        assert!(path.starts_with(dir.path()));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("report_abcdef01_"));
        assert!(name.ends_with(".pdf"));
        assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn missing_directory_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = PdfReportRenderer::new(dir.path().join("does-not-exist"));
        assert!(renderer.render("text", &SessionId::new("s")).is_none());
    }
}
