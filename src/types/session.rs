//! Session lifecycle and gateway response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identifiers::SessionId;

/// Lifecycle status of an interview session
///
/// `Starting → Active → {Completed | Errored}`. A budget-forced exit lands in
/// `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Task spawned, first question not yet observed
    Starting,
    /// Interview in progress
    Active,
    /// Workflow produced its final content
    Completed,
    /// Workflow failed or was cancelled; final content is an error message
    Errored,
}

impl SessionStatus {
    /// True once the session has left `Starting`/`Active`
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Errored)
    }
}

/// What the gateway hands back after `start` or `submit_answer`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InterviewStep {
    /// Next question for the patient
    Question {
        /// Session the question belongs to
        session_id: SessionId,
        /// Question text
        question: String,
        /// 1-based question number
        turn: u32,
    },
    /// Interview over; final report text
    Report {
        /// Session the report belongs to
        session_id: SessionId,
        /// Final report (markdown-like text)
        report: String,
    },
}

impl InterviewStep {
    /// Session the step belongs to
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        match self {
            Self::Question { session_id, .. } | Self::Report { session_id, .. } => session_id,
        }
    }

    /// Question text, if this step is a question
    #[must_use]
    pub fn question(&self) -> Option<&str> {
        match self {
            Self::Question { question, .. } => Some(question),
            Self::Report { .. } => None,
        }
    }

    /// Report text, if this step ends the interview
    #[must_use]
    pub fn report(&self) -> Option<&str> {
        match self {
            Self::Report { report, .. } => Some(report),
            Self::Question { .. } => None,
        }
    }
}

/// One question/answer exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// 1-based question number
    pub turn: u32,
    /// Question asked by the workflow
    pub question: String,
    /// Patient's answer, or the no-response marker
    pub answer: String,
}

/// Rendered report ready for download
#[derive(Debug, Clone)]
pub struct ReportDocument {
    /// Suggested download file name
    pub filename: String,
    /// MIME type of `bytes`
    pub content_type: &'static str,
    /// Document contents
    pub bytes: Vec<u8>,
}

/// Session snapshot for info/list queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Unique identifier for the session
    pub session_id: SessionId,

    /// Topic the interview was started with
    pub topic: String,

    /// Lifecycle status
    pub status: SessionStatus,

    /// Questions asked so far
    pub turn_count: u32,

    /// Question cap
    pub max_turns: u32,

    /// Session runtime in milliseconds
    pub runtime_ms: u64,

    /// Final report text exists
    pub has_report: bool,

    /// Rendered document exists
    pub has_artifact: bool,

    /// Last question, answer or status change
    pub last_activity: DateTime<Utc>,
}

/// Response from `list_sessions`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListSessionsResponse {
    /// Sessions, most recently active first
    pub sessions: Vec<SessionInfo>,

    /// Sessions still starting or active
    pub total_active: usize,

    /// Sessions completed or errored
    pub total_finished: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_step_serializes_flat() {
        let step = InterviewStep::Question {
            session_id: SessionId::new("s-1"),
            question: "How do you sleep?".into(),
            turn: 1,
        };
        let value = serde_json::to_value(&step).unwrap();
        assert_eq!(value["session_id"], "s-1");
        assert_eq!(value["question"], "How do you sleep?");
        assert!(value.get("report").is_none());
    }

    #[test]
    fn report_step_serializes_flat() {
        let step = InterviewStep::Report {
            session_id: SessionId::new("s-1"),
            report: "# Summary".into(),
        };
        let value = serde_json::to_value(&step).unwrap();
        assert_eq!(value["report"], "# Summary");
        assert!(value.get("question").is_none());
    }

    #[test]
    fn status_terminality() {
        assert!(!SessionStatus::Starting.is_terminal());
        assert!(!SessionStatus::Active.is_terminal());
        assert!(SessionStatus::Completed.is_terminal());
        assert!(SessionStatus::Errored.is_terminal());
    }
}
