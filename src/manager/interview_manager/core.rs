//! Core interview manager structure and lifecycle management
//!
//! Provides the main `InterviewManager` struct with initialization, idle
//! eviction and shutdown.

use chrono::Utc;
use std::sync::Arc;

use crate::config::SessionConfig;
use crate::error::Result;
use crate::registry::SessionRegistry;
use crate::render::DocumentRenderer;
use crate::workflow::InterviewWorkflow;

use super::discard::release_session;

// ============================================================================
// INTERVIEW MANAGER CORE
// ============================================================================

/// Session gateway for concurrent interview sessions
///
/// The `InterviewManager` drives sessions one turn at a time:
/// - `start` spawns the workflow task and returns its first question
/// - `submit_answer` relays an answer and returns the next question or the report
/// - `fetch_artifact` returns the rendered report
/// - `discard` cancels the task and deletes the session's files
///
/// Sessions idle for longer than `SessionConfig::idle_ttl` are discarded by a
/// background janitor. Must be created inside a tokio runtime.
pub struct InterviewManager {
    pub(crate) registry: SessionRegistry,
    pub(crate) config: SessionConfig,
    pub(crate) workflow: Arc<dyn InterviewWorkflow>,
    pub(crate) renderer: Arc<dyn DocumentRenderer>,
    cleanup_handle: Option<tokio::task::JoinHandle<()>>,
}

impl InterviewManager {
    /// Create a manager with its own registry
    pub fn new(
        config: SessionConfig,
        workflow: Arc<dyn InterviewWorkflow>,
        renderer: Arc<dyn DocumentRenderer>,
    ) -> Self {
        Self::with_registry(SessionRegistry::new(), config, workflow, renderer)
    }

    /// Create a manager over an existing registry
    pub fn with_registry(
        registry: SessionRegistry,
        config: SessionConfig,
        workflow: Arc<dyn InterviewWorkflow>,
        renderer: Arc<dyn DocumentRenderer>,
    ) -> Self {
        let cleanup_handle = spawn_janitor(registry.clone(), &config);

        Self {
            registry,
            config,
            workflow,
            renderer,
            cleanup_handle: Some(cleanup_handle),
        }
    }

    /// Session table backing this manager
    #[must_use]
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }
}

fn spawn_janitor(registry: SessionRegistry, config: &SessionConfig) -> tokio::task::JoinHandle<()> {
    let interval = config.cleanup_interval;
    let idle_ttl = config.idle_ttl;

    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;

            let now = Utc::now();
            for handle in registry.handles().await {
                let idle = now
                    .signed_duration_since(handle.state.lock().last_activity)
                    .to_std()
                    .unwrap_or_default();
                if idle < idle_ttl {
                    continue;
                }

                if registry.remove(&handle.session_id).await.is_some() {
                    log::info!(
                        "[{}] Discarding session idle for {}s",
                        handle.session_id,
                        idle.as_secs()
                    );
                    release_session(&handle).await;
                }
            }
        }
    })
}

impl Drop for InterviewManager {
    fn drop(&mut self) {
        if let Some(handle) = self.cleanup_handle.take() {
            handle.abort();
        }
    }
}

impl InterviewManager {
    /// Gracefully shutdown the manager
    ///
    /// Cancels every session task and deletes every rendered report.
    pub async fn shutdown(&self) -> Result<()> {
        log::info!("Shutting down InterviewManager...");

        for handle in self.registry.drain().await {
            log::debug!("Discarding session: {}", handle.session_id);
            release_session(&handle).await;
        }

        log::info!("InterviewManager shutdown complete");
        Ok(())
    }
}
