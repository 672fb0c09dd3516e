//! Interview task spawning
//!
//! Each session's workflow runs in its own tokio task. Whatever way the
//! workflow ends (report, budget exit, error, panic, cancellation), the task
//! records a terminal status with some final text and then closes the turn
//! channel, so a gateway waiting for the next prompt is always released.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{InterviewError, Result};
use crate::types::{SessionId, SessionStatus};
use crate::workflow::{AnswerSource, InterviewWorkflow, Interviewer};

use super::answer_source::ChannelAnswerSource;
use super::helpers::{error_report, interrupted_report, panic_message, transcript_report};
use super::session::SessionState;

/// Everything the interview task owns
pub(super) struct InterviewTask {
    pub session_id: SessionId,
    pub topic: String,
    pub workflow: Arc<dyn InterviewWorkflow>,
    pub source: Arc<ChannelAnswerSource>,
    pub state: Arc<parking_lot::Mutex<SessionState>>,
    pub cancel: CancellationToken,
}

enum TaskOutcome {
    Returned(Result<String>),
    Panicked(String),
    Cancelled,
}

/// Spawn the workflow for one session
pub(super) fn spawn_interview_task(task: InterviewTask) -> JoinHandle<()> {
    tokio::spawn(async move {
        let InterviewTask {
            session_id,
            topic,
            workflow,
            source,
            state,
            cancel,
        } = task;

        let answers: Arc<dyn AnswerSource> = source.clone();
        let interviewer = Interviewer::new(session_id.clone(), answers);

        let outcome = {
            let run = AssertUnwindSafe(workflow.run(&topic, &interviewer)).catch_unwind();
            tokio::select! {
                () = cancel.cancelled() => TaskOutcome::Cancelled,
                result = run => match result {
                    Ok(result) => TaskOutcome::Returned(result),
                    Err(payload) => TaskOutcome::Panicked(panic_message(payload.as_ref())),
                },
            }
        };

        let recorded = {
            let mut state = state.lock();
            let (status, text) = resolve_outcome(&session_id, &topic, &state, outcome);
            state.finish(status, text)
        };
        if !recorded {
            log::debug!("[{}] Session already terminal; outcome ignored", session_id);
        }

        source.close().await;
        log::debug!("[{}] Interview task finished", session_id);
    })
}

fn resolve_outcome(
    session_id: &SessionId,
    topic: &str,
    state: &SessionState,
    outcome: TaskOutcome,
) -> (SessionStatus, String) {
    match outcome {
        TaskOutcome::Returned(Ok(text)) if !text.trim().is_empty() => {
            log::info!("[{}] Workflow completed", session_id);
            (SessionStatus::Completed, text)
        }
        TaskOutcome::Returned(Ok(_)) => {
            log::warn!("[{}] Workflow returned no text; using transcript", session_id);
            (
                SessionStatus::Completed,
                transcript_report(topic, &state.transcript),
            )
        }
        TaskOutcome::Returned(Err(InterviewError::BudgetExceeded { cap })) => {
            log::info!(
                "[{}] Workflow stopped at the {} question budget; using transcript",
                session_id,
                cap
            );
            (
                SessionStatus::Completed,
                transcript_report(topic, &state.transcript),
            )
        }
        TaskOutcome::Returned(Err(InterviewError::Cancelled(_))) | TaskOutcome::Cancelled => {
            log::info!("[{}] Interview cancelled", session_id);
            (
                SessionStatus::Errored,
                interrupted_report(topic, &state.transcript),
            )
        }
        TaskOutcome::Returned(Err(e)) => {
            log::error!("[{}] Workflow error: {}", session_id, e);
            (SessionStatus::Errored, error_report(&e.to_string()))
        }
        TaskOutcome::Panicked(msg) => {
            log::error!("[{}] Workflow panicked: {}", session_id, msg);
            (SessionStatus::Errored, error_report(&msg))
        }
    }
}
