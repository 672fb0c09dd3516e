//! Interview session management
//!
//! Provides `InterviewManager`, the session gateway: it starts interview
//! tasks, relays answers over each session's turn channel, finalizes reports
//! and discards sessions.
//!
//! # Module Structure
//!
//! - `interview_manager` - Core `InterviewManager` with public API
//! - `session` - Session state structures
//! - `answer_source` - Turn-channel-backed answer source used by tasks
//! - `background` - Interview task spawning
//! - `helpers` - Pure helper functions for report text and file names

mod answer_source;
mod background;
mod helpers;
mod interview_manager;
mod session;

pub use interview_manager::InterviewManager;
pub(crate) use session::SessionHandle;
