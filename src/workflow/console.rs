//! Terminal-backed answer source

use futures::future::BoxFuture;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdin};
use tokio::sync::Mutex;

use crate::budget::BudgetGuard;
use crate::error::{InterviewError, Result};

use super::AnswerSource;

struct ConsoleState {
    reader: BufReader<Stdin>,
    turns: u32,
}

/// Asks questions on stdout and reads answers from stdin
pub struct ConsoleAnswerSource {
    budget: BudgetGuard,
    state: Mutex<ConsoleState>,
}

impl ConsoleAnswerSource {
    /// Create a console source with the given question budget
    #[must_use]
    pub fn new(budget: BudgetGuard) -> Self {
        Self {
            budget,
            state: Mutex::new(ConsoleState {
                reader: BufReader::new(tokio::io::stdin()),
                turns: 0,
            }),
        }
    }

    async fn ask_impl(&self, question: &str) -> Result<String> {
        let mut state = self.state.lock().await;
        let turn = self.budget.record_turn(&mut state.turns)?;

        let mut stdout = tokio::io::stdout();
        let banner = format!(
            "\n---------------------------------\nClinical interviewer [{turn}/{}]: {question}\nYour answer: ",
            self.budget.cap()
        );
        stdout.write_all(banner.as_bytes()).await?;
        stdout.flush().await?;

        let mut line = String::new();
        let read = state.reader.read_line(&mut line).await?;
        if read == 0 {
            return Err(InterviewError::ChannelClosed);
        }
        stdout.write_all(b"---------------------------------\n").await?;

        Ok(line.trim_end().to_string())
    }
}

impl AnswerSource for ConsoleAnswerSource {
    fn ask<'a>(&'a self, question: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(self.ask_impl(question))
    }
}
