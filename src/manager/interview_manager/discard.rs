//! Session removal

use std::io::ErrorKind;

use crate::error::Result;
use crate::types::SessionId;

use super::super::session::SessionHandle;
use super::core::InterviewManager;

impl InterviewManager {
    /// Remove a session and delete its report file
    ///
    /// A running task is cancelled at its next suspension point. Discarding an
    /// unknown session succeeds.
    pub async fn discard(&self, session_id: &SessionId) -> Result<()> {
        match self.registry.remove(session_id).await {
            Some(handle) => {
                release_session(&handle).await;
                log::info!("[{}] Session discarded", session_id);
            }
            None => log::debug!("[{}] Nothing to discard", session_id),
        }
        Ok(())
    }
}

/// Cancel the task and delete the artifact of a session already out of the registry
pub(super) async fn release_session(handle: &SessionHandle) {
    handle.cancel.cancel();

    let artifact = handle.state.lock().artifact.take();
    if let Some(path) = artifact {
        match tokio::fs::remove_file(&path).await {
            Ok(()) => log::debug!("[{}] Removed {}", handle.session_id, path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => log::warn!(
                "[{}] Failed to remove {}: {}",
                handle.session_id,
                path.display(),
                e
            ),
        }
    }
}
