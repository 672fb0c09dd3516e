//! Helper functions for session text handling
//!
//! Pure functions: log previews, fallback reports and file names.

use std::any::Any;

use crate::types::{SessionId, TranscriptEntry};
use crate::workflow::NO_RESPONSE;

/// Maximum characters of an answer or question shown in logs
const PREVIEW_CHARS: usize = 80;

/// Topic used when `start` receives an empty one
pub(crate) const DEFAULT_TOPIC: &str = "General consultation";

/// Truncate text for a single log line
pub(super) fn preview(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= PREVIEW_CHARS {
        return flat;
    }
    let cut: String = flat.chars().take(PREVIEW_CHARS).collect();
    format!("{cut}…")
}

/// Suggested download name for a session's report
pub(super) fn report_filename(session_id: &SessionId, extension: &str) -> String {
    format!("psychiatric_report_{}.{extension}", session_id.short())
}

/// Report assembled from the transcript when the workflow left no text
pub(super) fn transcript_report(topic: &str, transcript: &[TranscriptEntry]) -> String {
    let mut report = String::from("# Interview summary\n\n");
    report.push_str(&format!("**Topic:** {topic}\n\n"));

    if transcript.is_empty() {
        report.push_str("No questions were answered before the interview ended.\n");
        return report;
    }

    report.push_str("## Answers collected\n\n");
    for entry in transcript {
        report.push_str(&format!("{}. **{}**\n", entry.turn, entry.question.trim()));
        let answer = entry.answer.trim();
        if answer == NO_RESPONSE {
            report.push_str(&format!("   *{NO_RESPONSE}*\n"));
        } else {
            report.push_str(&format!("   {answer}\n"));
        }
    }
    report
}

/// Final text for a session whose workflow failed
pub(super) fn error_report(detail: &str) -> String {
    format!("An error occurred while running the interview workflow: {detail}")
}

/// Final text for a session cancelled before the workflow finished
pub(super) fn interrupted_report(topic: &str, transcript: &[TranscriptEntry]) -> String {
    format!(
        "*The interview was interrupted before the assessment was complete.*\n\n{}",
        transcript_report(topic, transcript)
    )
}

/// Best-effort text of a caught panic payload
pub(super) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "workflow panicked".to_string()
    }
}
