//! Answer source backed by a session's turn channel
//!
//! Each `ask` runs: budget check → send prompt → count the turn → wait for the
//! reply (bounded) → record the exchange. A reply timeout degrades to
//! [`NO_RESPONSE`] and the workflow carries on.

use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::budget::BudgetGuard;
use crate::channel::WorkflowEnd;
use crate::error::{InterviewError, Result};
use crate::types::{SessionId, TranscriptEntry};
use crate::workflow::{AnswerSource, NO_RESPONSE};

use super::helpers::preview;
use super::session::SessionState;

pub(super) struct ChannelAnswerSource {
    session_id: SessionId,
    budget: BudgetGuard,
    reply_timeout: Duration,
    /// `None` once the runner has closed the channel
    channel: Mutex<Option<WorkflowEnd>>,
    state: Arc<parking_lot::Mutex<SessionState>>,
    cancel: CancellationToken,
}

impl ChannelAnswerSource {
    pub(super) fn new(
        session_id: SessionId,
        budget: BudgetGuard,
        reply_timeout: Duration,
        channel: WorkflowEnd,
        state: Arc<parking_lot::Mutex<SessionState>>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            session_id,
            budget,
            reply_timeout,
            channel: Mutex::new(Some(channel)),
            state,
            cancel,
        }
    }

    /// Send the completion marker; later `ask` calls fail with `ChannelClosed`
    pub(super) async fn close(&self) {
        if let Some(channel) = self.channel.lock().await.take() {
            channel.finish();
        }
    }

    async fn ask_impl(&self, question: &str) -> Result<String> {
        let mut guard = self.channel.lock().await;
        let channel = guard.as_mut().ok_or(InterviewError::ChannelClosed)?;

        self.budget.check(self.state.lock().turn_count)?;
        channel.send_prompt(question)?;

        // Only a delivered prompt uses up a turn
        let turn = {
            let mut state = self.state.lock();
            let turn = self.budget.record_turn(&mut state.turn_count)?;
            state.touch();
            turn
        };
        log::info!(
            "[{}] Question {}/{}: {}",
            self.session_id,
            turn,
            self.budget.cap(),
            preview(question)
        );

        let reply = tokio::select! {
            () = self.cancel.cancelled() => {
                return Err(InterviewError::cancelled(self.session_id.as_str()));
            }
            reply = channel.await_reply(self.reply_timeout) => reply,
        };

        let answer = match reply {
            Ok(answer) => answer,
            Err(e) if e.is_timeout() => {
                log::warn!(
                    "[{}] No answer to question {} within {:?}",
                    self.session_id,
                    turn,
                    self.reply_timeout
                );
                NO_RESPONSE.to_string()
            }
            Err(e) => return Err(e),
        };

        let mut state = self.state.lock();
        state.transcript.push(TranscriptEntry {
            turn,
            question: question.to_string(),
            answer: answer.clone(),
        });
        state.touch();

        Ok(answer)
    }
}

impl AnswerSource for ChannelAnswerSource {
    fn ask<'a>(&'a self, question: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(self.ask_impl(question))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{PromptEvent, turn_channel};
    use crate::error::WaitKind;
    use crate::manager::SessionHandle;

    const WAIT: Duration = Duration::from_millis(500);

    fn source(cap: u32, reply_timeout: Duration) -> (Arc<ChannelAnswerSource>, SessionHandle) {
        let (workflow, gateway) = turn_channel();
        let handle = SessionHandle::new(SessionId::new("src"), "topic".into(), cap, gateway);
        let source = ChannelAnswerSource::new(
            handle.session_id.clone(),
            BudgetGuard::new(cap),
            reply_timeout,
            workflow,
            Arc::clone(&handle.state),
            handle.cancel.clone(),
        );
        (Arc::new(source), handle)
    }

    #[tokio::test]
    async fn records_transcript() {
        let (source, handle) = source(2, WAIT);

        let asking = tokio::spawn({
            let source = Arc::clone(&source);
            async move { source.ask("How do you feel?").await }
        });

        let mut gateway = handle.gateway.lock().await;
        let event = gateway.await_prompt(WAIT, WaitKind::FirstPrompt).await.unwrap();
        assert!(matches!(event, PromptEvent::Question { seq: 1, .. }));
        gateway.send_reply("Tired").unwrap();

        assert_eq!(asking.await.unwrap().unwrap(), "Tired");
        let state = handle.state.lock();
        assert_eq!(state.turn_count, 1);
        assert_eq!(state.transcript[0].answer, "Tired");
    }

    #[tokio::test]
    async fn reply_timeout_degrades_to_marker() {
        let (source, handle) = source(2, Duration::from_millis(20));
        let answer = source.ask("Anything else?").await.unwrap();
        assert_eq!(answer, NO_RESPONSE);
        assert_eq!(handle.state.lock().transcript[0].answer, NO_RESPONSE);
    }

    #[tokio::test]
    async fn unread_questions_keep_the_interview_going() {
        let (source, handle) = source(5, Duration::from_millis(10));

        for question in ["one", "two", "three"] {
            assert_eq!(source.ask(question).await.unwrap(), NO_RESPONSE);
        }
        assert_eq!(handle.state.lock().turn_count, 3);
        assert_eq!(handle.state.lock().transcript.len(), 3);

        // The gateway only sees the newest question
        let mut gateway = handle.gateway.lock().await;
        let event = gateway.await_prompt(WAIT, WaitKind::NextPrompt).await.unwrap();
        assert_eq!(
            event,
            PromptEvent::Question {
                seq: 3,
                text: "three".into()
            }
        );
    }

    #[tokio::test]
    async fn undelivered_question_is_not_charged() {
        let (workflow, gateway) = turn_channel();
        drop(gateway);
        let state = Arc::new(parking_lot::Mutex::new(SessionState::new()));
        let source = ChannelAnswerSource::new(
            SessionId::new("gone"),
            BudgetGuard::new(3),
            WAIT,
            workflow,
            Arc::clone(&state),
            CancellationToken::new(),
        );

        let err = source.ask("hello?").await.unwrap_err();
        assert!(matches!(err, InterviewError::ChannelClosed));
        assert_eq!(state.lock().turn_count, 0);
        assert!(state.lock().transcript.is_empty());
    }

    #[tokio::test]
    async fn budget_trips_after_cap() {
        let (source, handle) = source(1, Duration::from_millis(10));
        source.ask("one").await.unwrap();
        let err = source.ask("two").await.unwrap_err();
        assert!(err.is_budget_exceeded());
        assert_eq!(handle.state.lock().turn_count, 1);
    }

    #[tokio::test]
    async fn cancellation_interrupts_wait() {
        let (source, handle) = source(2, Duration::from_secs(30));
        handle.cancel.cancel();
        let err = source.ask("Still there?").await.unwrap_err();
        assert!(matches!(err, InterviewError::Cancelled(_)));
    }

    #[tokio::test]
    async fn closed_source_reports_finished() {
        let (source, handle) = source(2, WAIT);
        source.close().await;

        let mut gateway = handle.gateway.lock().await;
        let event = gateway.await_prompt(WAIT, WaitKind::NextPrompt).await.unwrap();
        assert_eq!(event, PromptEvent::Finished);
        assert!(matches!(
            source.ask("late").await,
            Err(InterviewError::ChannelClosed)
        ));
    }
}
