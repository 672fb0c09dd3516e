//! Error types for interview sessions

use std::fmt;

use thiserror::Error;

/// The bounded waits a session can run out of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitKind {
    /// Gateway waiting for the workflow's first question
    FirstPrompt,
    /// Workflow waiting for the patient's reply
    Reply,
    /// Gateway waiting for the next question or the completion marker
    NextPrompt,
}

impl fmt::Display for WaitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::FirstPrompt => "waiting for the first question",
            Self::Reply => "waiting for the patient's answer",
            Self::NextPrompt => "waiting for the next question",
        };
        f.write_str(label)
    }
}

/// Main error type for interview sessions
#[derive(Error, Debug)]
pub enum InterviewError {
    /// Operation referenced a session id absent from the registry
    #[error("Unknown session: {0}")]
    UnknownSession(String),

    /// No rendered report exists for the session (yet)
    #[error("Report not available for session {0}")]
    ArtifactNotReady(String),

    /// A bounded wait elapsed
    #[error("Timeout {0}")]
    Timeout(WaitKind),

    /// A prompt was sent while a previous one is still unanswered
    #[error("Turn channel misuse: {0}")]
    ChannelMisuse(String),

    /// The other side of the turn channel is gone
    #[error("Turn channel closed")]
    ChannelClosed,

    /// Question budget used up; the workflow must conclude
    #[error("Question budget of {cap} reached: give the final answer now and ask nothing more")]
    BudgetExceeded {
        /// Per-session question cap
        cap: u32,
    },

    /// Session has already produced its report
    #[error("Session {0} is already complete")]
    SessionComplete(String),

    /// Session task was cancelled
    #[error("Session {0} was cancelled")]
    Cancelled(String),

    /// Failure inside the interview workflow
    #[error("Workflow error: {0}")]
    Workflow(String),

    /// Document rendering failure
    #[error("Rendering error: {0}")]
    Rendering(String),

    /// Request payload rejected
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for interview operations
pub type Result<T> = std::result::Result<T, InterviewError>;

impl InterviewError {
    /// Create an unknown session error
    pub fn unknown_session(session_id: impl Into<String>) -> Self {
        Self::UnknownSession(session_id.into())
    }

    /// Create an artifact-not-ready error
    pub fn artifact_not_ready(session_id: impl Into<String>) -> Self {
        Self::ArtifactNotReady(session_id.into())
    }

    /// Create a timeout error
    #[must_use]
    pub const fn timeout(kind: WaitKind) -> Self {
        Self::Timeout(kind)
    }

    /// Create a channel misuse error
    pub fn channel_misuse(msg: impl Into<String>) -> Self {
        Self::ChannelMisuse(msg.into())
    }

    /// Create a budget exceeded signal
    #[must_use]
    pub const fn budget_exceeded(cap: u32) -> Self {
        Self::BudgetExceeded { cap }
    }

    /// Create a session complete error
    pub fn session_complete(session_id: impl Into<String>) -> Self {
        Self::SessionComplete(session_id.into())
    }

    /// Create a cancellation error
    pub fn cancelled(session_id: impl Into<String>) -> Self {
        Self::Cancelled(session_id.into())
    }

    /// Create a workflow error
    pub fn workflow(msg: impl Into<String>) -> Self {
        Self::Workflow(msg.into())
    }

    /// Create a rendering error
    pub fn rendering(msg: impl Into<String>) -> Self {
        Self::Rendering(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// True for the budget control signal, which is not a fault
    #[must_use]
    pub const fn is_budget_exceeded(&self) -> bool {
        matches!(self, Self::BudgetExceeded { .. })
    }

    /// True when the error is a bounded wait running out
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}
