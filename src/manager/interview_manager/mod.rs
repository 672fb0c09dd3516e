//! Interview manager implementation
//!
//! This module is organized into logical submodules:
//! - `core`: Core struct, constructors, janitor and shutdown
//! - `start`: Session creation and the first question
//! - `answer`: Answer submission
//! - `finalize`: Task join and report rendering
//! - `artifact`: Report download
//! - `discard`: Session removal
//! - `info`: Session information queries

mod answer;
mod artifact;
mod core;
mod discard;
mod finalize;
mod info;
mod start;

pub use core::InterviewManager;
