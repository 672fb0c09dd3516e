//! Scripted workflows and renderers shared by the integration tests

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures::future::BoxFuture;
use psychat_interview::{
    DocumentRenderer, InterviewError, InterviewManager, InterviewWorkflow, Interviewer, Result,
    SessionConfig, SessionId,
};

/// What a scripted workflow does after its questions
#[derive(Debug, Clone, Copy)]
pub enum Ending {
    /// Keep asking until the budget trips, then report the answers
    Report,
    /// Return a workflow error
    Fail,
    /// Panic
    Panic,
    /// Never return
    Hang,
}

/// Test workflow asking "Question N" with a fixed ending
#[derive(Debug, Clone, Copy)]
pub struct ScriptedWorkflow {
    /// Questions to ask before `ending`; ignored for `Ending::Report`
    pub questions: u32,
    pub ending: Ending,
}

impl ScriptedWorkflow {
    pub fn until_budget() -> Self {
        Self {
            questions: 0,
            ending: Ending::Report,
        }
    }

    pub fn then(questions: u32, ending: Ending) -> Self {
        Self { questions, ending }
    }
}

impl InterviewWorkflow for ScriptedWorkflow {
    fn run<'a>(
        &'a self,
        topic: &'a str,
        interviewer: &'a Interviewer,
    ) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            let mut answers = Vec::new();

            if let Ending::Report = self.ending {
                for n in 1.. {
                    match interviewer.ask(&format!("Question {n}")).await {
                        Ok(answer) => answers.push(answer),
                        Err(e) if e.is_budget_exceeded() => break,
                        Err(e) => return Err(e),
                    }
                }
                let body: Vec<String> = answers.iter().map(|a| format!("- {a}")).collect();
                return Ok(format!("# Report on {topic}\n\n{}", body.join("\n")));
            }

            for n in 1..=self.questions {
                answers.push(interviewer.ask(&format!("Question {n}")).await?);
            }

            match self.ending {
                Ending::Fail => Err(InterviewError::workflow("model unavailable")),
                Ending::Panic => panic!("workflow exploded"),
                Ending::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(String::new())
                }
                Ending::Report => unreachable!(),
            }
        })
    }
}

/// Writes the report text verbatim into a directory
pub struct FileRenderer {
    pub dir: PathBuf,
    pub rendered: AtomicUsize,
}

impl FileRenderer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            rendered: AtomicUsize::new(0),
        }
    }
}

impl DocumentRenderer for FileRenderer {
    fn render(&self, markdown: &str, session_id: &SessionId) -> Option<PathBuf> {
        let path = self.dir.join(format!("report_{}.pdf", session_id.short()));
        std::fs::write(&path, markdown.as_bytes()).ok()?;
        self.rendered.fetch_add(1, Ordering::SeqCst);
        Some(path)
    }
}

/// Always fails
pub struct FailingRenderer;

impl DocumentRenderer for FailingRenderer {
    fn render(&self, _markdown: &str, _session_id: &SessionId) -> Option<PathBuf> {
        None
    }
}

/// Short waits so timeout paths run quickly
pub fn fast_config() -> SessionConfig {
    SessionConfig {
        max_turns: 10,
        first_prompt_timeout: Duration::from_secs(2),
        reply_timeout: Duration::from_secs(2),
        next_prompt_timeout: Duration::from_secs(2),
        finalize_grace: Duration::from_secs(1),
        idle_ttl: Duration::from_secs(3600),
        cleanup_interval: Duration::from_secs(60),
    }
}

pub fn manager_with(
    config: SessionConfig,
    workflow: ScriptedWorkflow,
    renderer: Arc<dyn DocumentRenderer>,
) -> InterviewManager {
    InterviewManager::new(config, Arc::new(workflow), renderer)
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
