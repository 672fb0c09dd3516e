//! Session state structures
//!
//! A session is split in two: `SessionState` is the record both the task and
//! the gateway write (behind a short synchronous lock), and `SessionHandle`
//! adds the gateway-only pieces (turn channel end, task handle, cancel token).

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::channel::GatewayEnd;
use crate::types::{SessionId, SessionInfo, SessionStatus, TranscriptEntry};

/// Mutable per-session record
#[derive(Debug)]
pub(crate) struct SessionState {
    pub status: SessionStatus,

    /// Questions asked so far (never above the cap)
    pub turn_count: u32,

    /// Final report text written by the task
    pub final_text: Option<String>,

    /// Rendered document, once the gateway produced one
    pub artifact: Option<PathBuf>,

    pub transcript: Vec<TranscriptEntry>,

    /// The final report has been handed to a caller
    pub report_delivered: bool,

    pub last_activity: DateTime<Utc>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            status: SessionStatus::Starting,
            turn_count: 0,
            final_text: None,
            artifact: None,
            transcript: Vec::new(),
            report_delivered: false,
            last_activity: Utc::now(),
        }
    }

    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    /// `Starting → Active`; later calls are no-ops
    pub fn mark_active(&mut self) {
        if self.status == SessionStatus::Starting {
            self.status = SessionStatus::Active;
        }
        self.touch();
    }

    /// Enter a terminal status with the final text
    ///
    /// Only the first call wins, so a cancellation racing a normal finish
    /// cannot overwrite the report.
    pub fn finish(&mut self, status: SessionStatus, text: String) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = status;
        self.final_text = Some(text);
        self.touch();
        true
    }
}

/// Everything the gateway keeps for one session
pub(crate) struct SessionHandle {
    pub session_id: SessionId,
    pub topic: String,
    pub max_turns: u32,
    pub created_at: Instant,

    /// Shared with the task's answer source and runner
    pub state: Arc<parking_lot::Mutex<SessionState>>,

    /// Gateway half of the turn channel; holding this lock serializes
    /// `submit_answer` calls for the session
    pub gateway: tokio::sync::Mutex<GatewayEnd>,

    /// Interview task, taken when joined
    pub task: parking_lot::Mutex<Option<JoinHandle<()>>>,

    pub cancel: CancellationToken,
}

impl SessionHandle {
    pub fn new(session_id: SessionId, topic: String, max_turns: u32, gateway: GatewayEnd) -> Self {
        Self {
            session_id,
            topic,
            max_turns,
            created_at: Instant::now(),
            state: Arc::new(parking_lot::Mutex::new(SessionState::new())),
            gateway: tokio::sync::Mutex::new(gateway),
            task: parking_lot::Mutex::new(None),
            cancel: CancellationToken::new(),
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.state.lock().status
    }

    /// True when the task has exited (or was never attached)
    pub fn task_finished(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_none_or(JoinHandle::is_finished)
    }

    /// Snapshot for info/list queries
    pub fn info(&self) -> SessionInfo {
        let state = self.state.lock();
        SessionInfo {
            session_id: self.session_id.clone(),
            topic: self.topic.clone(),
            status: state.status,
            turn_count: state.turn_count,
            max_turns: self.max_turns,
            runtime_ms: u64::try_from(self.created_at.elapsed().as_millis()).unwrap_or(u64::MAX),
            has_report: state.final_text.is_some(),
            has_artifact: state.artifact.is_some(),
            last_activity: state.last_activity,
        }
    }
}
