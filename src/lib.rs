//! # PsyChat interview sessions
//!
//! Turn-by-turn clinical interviews driven over HTTP. A long-running interview
//! workflow asks the patient questions one at a time; each question is handed
//! to the web client through a per-session turn channel and the client's
//! answer travels back the same way. When the workflow is done (or its
//! question budget runs out) the final report is returned and rendered to a
//! downloadable PDF.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use psychat_interview::{
//!     ClinicalInterviewWorkflow, InterviewManager, PdfReportRenderer, SessionConfig,
//! };
//!
//! # async fn example() -> psychat_interview::Result<()> {
//! let manager = InterviewManager::new(
//!     SessionConfig::default(),
//!     Arc::new(ClinicalInterviewWorkflow::new()),
//!     Arc::new(PdfReportRenderer::default()),
//! );
//!
//! let step = manager.start("Trouble sleeping").await?;
//! let session_id = step.session_id().clone();
//! println!("{}", step.question().unwrap_or_default());
//!
//! let next = manager.submit_answer(&session_id, "I wake up at 4am every night").await?;
//! if let Some(report) = next.report() {
//!     println!("{report}");
//! }
//! manager.discard(&session_id).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`channel`]: turn channel pairing one pending prompt with one reply
//! - [`budget`]: per-session question cap
//! - [`workflow`]: workflow and answer-source traits, bundled clinical workflow
//! - [`manager`]: the session gateway (`start`, `submit_answer`, `fetch_artifact`, `discard`)
//! - [`registry`]: in-memory session table
//! - [`render`]: report cleaning and PDF rendering
//! - [`routes`]: axum HTTP surface
//! - [`config`]: configuration from defaults, `.env` and environment
//! - [`error`]: error types and handling

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod budget;
pub mod channel;
pub mod config;
pub mod error;
pub mod manager;
pub mod registry;
pub mod render;
pub mod routes;
pub mod types;
pub mod workflow;

pub use budget::BudgetGuard;
pub use config::{ServerConfig, SessionConfig};
pub use error::{InterviewError, Result, WaitKind};
pub use manager::InterviewManager;
pub use registry::SessionRegistry;
pub use render::{DocumentRenderer, PdfReportRenderer};
pub use routes::build_router;
pub use types::{
    InterviewStep, ListSessionsResponse, ReportDocument, SessionId, SessionInfo, SessionStatus,
    TranscriptEntry,
};
pub use workflow::{
    AnswerSource, ClinicalInterviewWorkflow, ConsoleAnswerSource, InterviewWorkflow, Interviewer,
};

/// Version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// HTTP SERVER
// ============================================================================

use std::sync::Arc;

/// Run the HTTP gateway until Ctrl-C
///
/// Binds `config.bind_addr`, serves the router with graceful shutdown, then
/// discards every remaining session.
pub async fn start_server(
    config: ServerConfig,
    workflow: Arc<dyn InterviewWorkflow>,
    renderer: Arc<dyn DocumentRenderer>,
) -> anyhow::Result<()> {
    config.validate()?;

    let manager = Arc::new(InterviewManager::new(
        config.session.clone(),
        workflow,
        renderer,
    ));
    let app = build_router(Arc::clone(&manager), &config.allowed_origins);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind_addr, e))?;
    log::info!("PsyChat gateway listening on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    manager.shutdown().await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => log::info!("Shutdown signal received"),
        Err(e) => log::error!("Failed to listen for Ctrl-C: {}", e),
    }
}
