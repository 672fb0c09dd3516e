//! Answer submission

use crate::channel::PromptEvent;
use crate::error::{InterviewError, Result, WaitKind};
use crate::types::{InterviewStep, SessionId};

use super::super::helpers::preview;
use super::core::InterviewManager;

impl InterviewManager {
    /// Deliver the patient's answer and wait for what comes next
    ///
    /// Returns the next question, or the final report once the workflow is
    /// done. Calls for the same session are served one at a time.
    ///
    /// If neither arrives within `next_prompt_timeout`, the task's liveness is
    /// checked: a finished task is finalized normally, a live one is cancelled
    /// first and the session ends with whatever content it has.
    pub async fn submit_answer(
        &self,
        session_id: &SessionId,
        answer: &str,
    ) -> Result<InterviewStep> {
        let handle = self
            .registry
            .get(session_id)
            .await
            .ok_or_else(|| InterviewError::unknown_session(session_id.as_str()))?;

        let answer = answer.trim();
        if answer.is_empty() {
            return Err(InterviewError::invalid_input("answer must not be empty"));
        }

        let mut gateway = handle.gateway.lock().await;

        let (terminal, delivered) = {
            let state = handle.state.lock();
            (state.status.is_terminal(), state.report_delivered)
        };
        if terminal {
            if delivered {
                return Err(InterviewError::session_complete(session_id.as_str()));
            }
            // Task ended while nobody was waiting; hand the report over now
            return self.finalize(&handle).await;
        }

        match gateway.send_reply(answer) {
            Ok(()) => {}
            Err(InterviewError::ChannelClosed) => {
                log::debug!("[{}] Task already gone; collecting its outcome", session_id);
            }
            Err(e) => return Err(e),
        }
        log::info!("[{}] Answer received: {}", session_id, preview(answer));
        handle.state.lock().touch();

        match gateway
            .await_prompt(self.config.next_prompt_timeout, WaitKind::NextPrompt)
            .await
        {
            Ok(PromptEvent::Question { seq, text }) => Ok(InterviewStep::Question {
                session_id: session_id.clone(),
                question: text,
                turn: seq,
            }),
            Ok(PromptEvent::Finished) => self.finalize(&handle).await,
            Err(e) if e.is_timeout() => {
                if handle.task_finished() {
                    log::info!("[{}] No marker but task has exited; finalizing", session_id);
                } else {
                    log::warn!(
                        "[{}] Task still running after {:?}; cancelling",
                        session_id,
                        self.config.next_prompt_timeout
                    );
                    handle.cancel.cancel();
                }
                self.finalize(&handle).await
            }
            Err(e) => Err(e),
        }
    }
}
