//! Guardrail CLI Application
//!
//! Command-line interface for the Guardrail road-safety compliance
//! tracker.

mod args;
mod cli;
mod mcp;
mod renderer;

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use guardrail_core::TrackerBuilder;
use log::info;
use mcp::{run_stdio_server, GuardrailMcpServer};
use renderer::TerminalRenderer;
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        database_file,
        evidence_dir,
        no_color,
        command,
    } = Args::parse();

    let tracker = TrackerBuilder::new()
        .with_database_path(database_file)
        .with_evidence_dir(evidence_dir)
        .build()
        .await
        .context("Failed to initialize tracker")?;

    let renderer = TerminalRenderer::new(!no_color);

    info!("Guardrail started");

    match command {
        Some(Step { command }) => {
            Cli::new(tracker, renderer)
                .handle_step_command(command)
                .await
        }
        Some(Template { command }) => {
            Cli::new(tracker, renderer)
                .handle_template_command(command)
                .await
        }
        Some(Evidence { command }) => {
            Cli::new(tracker, renderer)
                .handle_evidence_command(command)
                .await
        }
        Some(Generate(args)) => Cli::new(tracker, renderer).generate(args).await,
        Some(Status) => Cli::new(tracker, renderer).compliance_status().await,
        Some(Serve) => {
            info!("Starting Guardrail MCP server");
            run_stdio_server(GuardrailMcpServer::new(tracker))
                .await
                .context("MCP server failed")
        }
        None => Cli::new(tracker, renderer).list_steps().await,
    }
}
