//! Report download

use std::io::ErrorKind;

use crate::error::{InterviewError, Result};
use crate::types::{ReportDocument, SessionId};

use super::super::helpers::report_filename;
use super::core::InterviewManager;

impl InterviewManager {
    /// Read the rendered report of a finished session
    ///
    /// Fails with `ArtifactNotReady` when nothing was rendered yet or the file
    /// has gone missing from disk.
    pub async fn fetch_artifact(&self, session_id: &SessionId) -> Result<ReportDocument> {
        let handle = self
            .registry
            .get(session_id)
            .await
            .ok_or_else(|| InterviewError::unknown_session(session_id.as_str()))?;

        let path = handle
            .state
            .lock()
            .artifact
            .clone()
            .ok_or_else(|| InterviewError::artifact_not_ready(session_id.as_str()))?;

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::warn!("[{}] Report file {} is missing", session_id, path.display());
                return Err(InterviewError::artifact_not_ready(session_id.as_str()));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(ReportDocument {
            filename: report_filename(session_id, self.renderer.extension()),
            content_type: self.renderer.content_type(),
            bytes,
        })
    }
}
