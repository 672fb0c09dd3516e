//! Workflow boundary
//!
//! The interview workflow is a long-running pipeline that needs patient input
//! at arbitrary points. It never reads a terminal or a queue directly: it gets
//! an [`Interviewer`] bound to its session, and the interviewer asks through
//! whatever [`AnswerSource`] the host injected (turn channel for the HTTP
//! gateway, stdin for the console).
//!
//! # Example
//!
//! ```no_run
//! use futures::future::BoxFuture;
//! use psychat_interview::workflow::{InterviewWorkflow, Interviewer};
//!
//! struct OneQuestion;
//!
//! impl InterviewWorkflow for OneQuestion {
//!     fn run<'a>(
//!         &'a self,
//!         topic: &'a str,
//!         interviewer: &'a Interviewer,
//!     ) -> BoxFuture<'a, psychat_interview::Result<String>> {
//!         Box::pin(async move {
//!             let answer = interviewer.ask(&format!("Tell me about {topic}")).await?;
//!             Ok(format!("# Report\n\n{answer}"))
//!         })
//!     }
//! }
//! ```

mod clinical;
mod console;

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::Result;
use crate::types::SessionId;

pub use clinical::ClinicalInterviewWorkflow;
pub use console::ConsoleAnswerSource;

/// Answer recorded when the patient does not reply in time
pub const NO_RESPONSE: &str = "No response received";

/// Capability to obtain the patient's answer to one question
///
/// Implementations enforce the question budget and return
/// [`InterviewError::BudgetExceeded`](crate::InterviewError::BudgetExceeded)
/// once it is used up.
pub trait AnswerSource: Send + Sync {
    /// Ask one question and wait for the answer
    fn ask<'a>(&'a self, question: &'a str) -> BoxFuture<'a, Result<String>>;
}

/// Session-scoped context handed to a workflow
#[derive(Clone)]
pub struct Interviewer {
    session_id: SessionId,
    source: Arc<dyn AnswerSource>,
}

impl Interviewer {
    /// Bind an answer source to a session
    pub fn new(session_id: SessionId, source: Arc<dyn AnswerSource>) -> Self {
        Self { session_id, source }
    }

    /// Session this interviewer belongs to
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Ask the patient one question
    ///
    /// Fails with `BudgetExceeded` once the question cap is reached; the
    /// workflow is expected to stop asking and write its report.
    pub async fn ask(&self, question: &str) -> Result<String> {
        self.source.ask(question).await
    }
}

impl std::fmt::Debug for Interviewer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interviewer")
            .field("session_id", &self.session_id)
            .finish_non_exhaustive()
    }
}

/// Multi-step pipeline that interviews the patient and drafts the report
pub trait InterviewWorkflow: Send + Sync {
    /// Run the workflow to completion and return the final report text
    fn run<'a>(&'a self, topic: &'a str, interviewer: &'a Interviewer)
    -> BoxFuture<'a, Result<String>>;
}
