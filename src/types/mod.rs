//! Type definitions shared across the crate
//!
//! - [`identifiers`] - Type-safe ID wrappers (`SessionId`)
//! - [`session`] - Session status, gateway steps, snapshots and report documents

pub mod identifiers;
pub mod session;

pub use identifiers::SessionId;
pub use session::{
    InterviewStep, ListSessionsResponse, ReportDocument, SessionInfo, SessionStatus,
    TranscriptEntry,
};
