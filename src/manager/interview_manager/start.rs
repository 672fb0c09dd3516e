//! Session creation
//!
//! Spawns the interview task and waits for its first question.

use std::sync::Arc;

use crate::budget::BudgetGuard;
use crate::channel::{PromptEvent, turn_channel};
use crate::error::{Result, WaitKind};
use crate::types::{InterviewStep, SessionId};

use super::super::answer_source::ChannelAnswerSource;
use super::super::background::{InterviewTask, spawn_interview_task};
use super::super::helpers::DEFAULT_TOPIC;
use super::super::session::SessionHandle;
use super::core::InterviewManager;

impl InterviewManager {
    /// Start a new interview session
    ///
    /// Returns the first question, or the report if the workflow finished
    /// without asking anything. If no question arrives within
    /// `first_prompt_timeout` the session is discarded (task cancelled) and a
    /// timeout error is returned.
    pub async fn start(&self, topic: &str) -> Result<InterviewStep> {
        let topic = match topic.trim() {
            "" => DEFAULT_TOPIC.to_string(),
            t => t.to_string(),
        };
        let session_id = SessionId::generate();
        let (workflow_end, gateway_end) = turn_channel();

        let handle = Arc::new(SessionHandle::new(
            session_id.clone(),
            topic.clone(),
            self.config.max_turns,
            gateway_end,
        ));

        let source = Arc::new(ChannelAnswerSource::new(
            session_id.clone(),
            BudgetGuard::new(self.config.max_turns),
            self.config.reply_timeout,
            workflow_end,
            Arc::clone(&handle.state),
            handle.cancel.clone(),
        ));

        // Hold the gateway before the task can ask anything
        let mut gateway = handle.gateway.lock().await;

        let task = spawn_interview_task(InterviewTask {
            session_id: session_id.clone(),
            topic: topic.clone(),
            workflow: Arc::clone(&self.workflow),
            source,
            state: Arc::clone(&handle.state),
            cancel: handle.cancel.clone(),
        });
        *handle.task.lock() = Some(task);
        self.registry.insert(Arc::clone(&handle)).await;

        log::info!("[{}] Session started (topic: {})", session_id, topic);

        match gateway
            .await_prompt(self.config.first_prompt_timeout, WaitKind::FirstPrompt)
            .await
        {
            Ok(PromptEvent::Question { seq, text }) => {
                handle.state.lock().mark_active();
                Ok(InterviewStep::Question {
                    session_id,
                    question: text,
                    turn: seq,
                })
            }
            Ok(PromptEvent::Finished) => {
                log::info!("[{}] Workflow finished before asking anything", session_id);
                self.finalize(&handle).await
            }
            Err(e) => {
                drop(gateway);
                log::warn!("[{}] {}; discarding session", session_id, e);
                self.discard(&session_id).await?;
                Err(e)
            }
        }
    }
}
