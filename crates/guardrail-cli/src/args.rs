use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::{EvidenceCommands, GenerateArgs, StepCommands, TemplateCommands};

/// Main command-line interface for the Guardrail compliance tracker
///
/// Guardrail tracks a road-safety compliance program: an ordered registry
/// of mandatory steps, per-step document templates with typed fields, and
/// the evidence files that gate step completion. It provides local CLI
/// operations and an MCP (Model Context Protocol) server mode for
/// integration with AI assistants.
#[derive(Parser)]
#[command(version, about, name = "gr")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/guardrail/guardrail.db
    #[arg(long, global = true)]
    pub database_file: Option<PathBuf>,

    /// Directory where evidence files are stored. Defaults to
    /// $XDG_DATA_HOME/guardrail/evidence
    #[arg(long, global = true)]
    pub evidence_dir: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for the Guardrail CLI
///
/// The CLI is organized around the compliance workflow:
/// - `step`: Manage the registry of compliance steps and their lifecycle
/// - `template`: Define and inspect per-step document templates
/// - `evidence`: Attach, replace, list, export, and remove evidence files
/// - `generate`: Produce a document from a step's template and answers
/// - `status`: Show the program-wide compliance summary
/// - `serve`: Start the MCP server for AI assistant integration
#[derive(Subcommand)]
pub enum Commands {
    /// Manage compliance steps
    #[command(alias = "s")]
    Step {
        #[command(subcommand)]
        command: StepCommands,
    },
    /// Manage per-step document templates
    #[command(alias = "t")]
    Template {
        #[command(subcommand)]
        command: TemplateCommands,
    },
    /// Manage evidence files
    #[command(alias = "e")]
    Evidence {
        #[command(subcommand)]
        command: EvidenceCommands,
    },
    /// Generate a document from a step's template
    #[command(alias = "g")]
    Generate(GenerateArgs),
    /// Show the compliance summary
    Status,
    /// Start the MCP server
    Serve,
}
