//! Session finalization
//!
//! Joins the interview task, reads the final text and renders the document.
//! Called with the session's gateway lock held.

use std::sync::Arc;

use crate::error::Result;
use crate::types::{InterviewStep, SessionStatus};

use super::super::helpers::interrupted_report;
use super::super::session::SessionHandle;
use super::core::InterviewManager;

impl InterviewManager {
    pub(super) async fn finalize(&self, handle: &Arc<SessionHandle>) -> Result<InterviewStep> {
        self.join_task(handle).await;

        let (report, needs_render) = {
            let mut state = handle.state.lock();
            if !state.status.is_terminal() {
                // Task was aborted before it could record an outcome
                let text = interrupted_report(&handle.topic, &state.transcript);
                state.finish(SessionStatus::Errored, text);
            }
            state.report_delivered = true;
            (
                state.final_text.clone().unwrap_or_default(),
                state.artifact.is_none(),
            )
        };

        if needs_render && !report.trim().is_empty() {
            self.render_artifact(handle, &report).await;
        }

        log::info!(
            "[{}] Session finished ({:?})",
            handle.session_id,
            handle.status()
        );

        Ok(InterviewStep::Report {
            session_id: handle.session_id.clone(),
            report,
        })
    }

    async fn join_task(&self, handle: &SessionHandle) {
        let Some(mut task) = handle.task.lock().take() else {
            return;
        };

        match tokio::time::timeout(self.config.finalize_grace, &mut task).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => log::error!("[{}] Interview task failed: {}", handle.session_id, e),
            Err(_) => {
                log::warn!(
                    "[{}] Task did not stop within {:?}; aborting",
                    handle.session_id,
                    self.config.finalize_grace
                );
                handle.cancel.cancel();
                task.abort();
            }
        }
    }

    /// Render the report and attach the file to the session
    ///
    /// A rendering fault is logged and leaves the session without artifact;
    /// the report text is still returned to the caller.
    async fn render_artifact(&self, handle: &SessionHandle, report: &str) {
        let renderer = Arc::clone(&self.renderer);
        let markdown = report.to_string();
        let session_id = handle.session_id.clone();

        let rendered = tokio::task::spawn_blocking(move || renderer.render(&markdown, &session_id))
            .await
            .unwrap_or_else(|e| {
                log::error!("[{}] Renderer task failed: {}", handle.session_id, e);
                None
            });

        let Some(path) = rendered else {
            log::warn!("[{}] Report rendering failed; no download available", handle.session_id);
            return;
        };

        if !self.registry.contains(&handle.session_id).await {
            // Discarded while rendering
            if let Err(e) = tokio::fs::remove_file(&path).await {
                log::warn!("[{}] Failed to remove {}: {}", handle.session_id, path.display(), e);
            }
            return;
        }

        log::info!("[{}] Report rendered to {}", handle.session_id, path.display());
        handle.state.lock().artifact = Some(path);
    }
}
