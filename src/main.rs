// PsyChat gateway binary
//
// `serve` (default) runs the HTTP gateway; `console` runs one interview on the
// terminal with the same workflow and writes the report to stdout and a PDF.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use psychat_interview::{
    BudgetGuard, ClinicalInterviewWorkflow, ConsoleAnswerSource, DocumentRenderer,
    InterviewWorkflow, Interviewer, PdfReportRenderer, ServerConfig, SessionId, start_server,
};

#[derive(Debug, Parser)]
#[command(name = "psychat-server", version, about = "PsyChat clinical interview gateway")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP gateway
    Serve {
        /// Listen address, overrides PSYCHAT_BIND_ADDR
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Run one interview on this terminal
    Console {
        /// Consultation topic
        #[arg(long, default_value = "General consultation")]
        topic: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = ServerConfig::from_env()?;

    match cli.command.unwrap_or(Command::Serve { bind: None }) {
        Command::Serve { bind } => {
            if let Some(addr) = bind {
                config.bind_addr = addr;
            }
            let renderer = Arc::new(PdfReportRenderer::new(config.report_dir.clone()));
            start_server(config, Arc::new(ClinicalInterviewWorkflow::new()), renderer).await
        }
        Command::Console { topic } => run_console(&config, &topic).await,
    }
}

async fn run_console(config: &ServerConfig, topic: &str) -> Result<()> {
    let session_id = SessionId::generate();
    let source = Arc::new(ConsoleAnswerSource::new(BudgetGuard::new(
        config.session.max_turns,
    )));
    let interviewer = Interviewer::new(session_id.clone(), source);

    let report = match ClinicalInterviewWorkflow::new().run(topic, &interviewer).await {
        Ok(report) => report,
        Err(e) if e.is_budget_exceeded() => {
            anyhow::bail!("interview stopped at the question budget without a report")
        }
        Err(e) => return Err(e.into()),
    };

    println!("\n{report}\n");

    let renderer = PdfReportRenderer::new(config.report_dir.clone());
    let path = tokio::task::spawn_blocking(move || renderer.render(&report, &session_id)).await?;
    match path {
        Some(path) => println!("Report written to {}", path.display()),
        None => log::warn!("Report could not be rendered to PDF"),
    }
    Ok(())
}
