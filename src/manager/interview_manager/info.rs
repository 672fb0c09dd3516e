//! Session information queries

use crate::error::{InterviewError, Result};
use crate::types::{ListSessionsResponse, SessionId, SessionInfo};

use super::core::InterviewManager;

impl InterviewManager {
    /// Snapshot of one session
    pub async fn session_info(&self, session_id: &SessionId) -> Result<SessionInfo> {
        self.registry
            .get(session_id)
            .await
            .map(|handle| handle.info())
            .ok_or_else(|| InterviewError::unknown_session(session_id.as_str()))
    }

    /// Snapshot of every session, most recently active first
    pub async fn list_sessions(&self) -> ListSessionsResponse {
        let mut sessions: Vec<SessionInfo> = self
            .registry
            .handles()
            .await
            .iter()
            .map(|handle| handle.info())
            .collect();
        sessions.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));

        let total_finished = sessions.iter().filter(|s| s.status.is_terminal()).count();

        ListSessionsResponse {
            total_active: sessions.len() - total_finished,
            total_finished,
            sessions,
        }
    }
}
