//! Command-line interface definitions using clap
//!
//! This module defines the CLI structure with clap's derive API, following
//! the parameter wrapper pattern: each command has an argument struct with
//! clap-specific derives plus a conversion into the framework-free core
//! parameter type.
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → Tracker
//! ```
//!
//! Compound values the shell cannot express structurally (template fields
//! and generation answers) get their own `FromStr` argument types
//! (`LABEL:KIND[:ORDER]` and `LABEL=VALUE`), so clap handles parse errors
//! uniformly with every other argument.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use guardrail_core::{
    display::OperationStatus,
    params::{
        AttachEvidence, CreateStep, DefineTemplate, FieldDef, GenerateDocument, Id,
        ReplaceEvidence, SetStepStatus, UpdateStep,
    },
    CreateResult, DeleteResult, GenerateResult, Tracker, UpdateResult,
};

use crate::renderer::TerminalRenderer;

/// Register a new compliance step
#[derive(Args)]
pub struct AddStepArgs {
    /// Ordinal number of the step (unique, defines display order)
    pub number: u32,
    /// Name of the requirement
    pub name: String,
    /// Regulatory citation backing the requirement
    #[arg(short, long, help = "Regulatory citation backing the requirement")]
    pub citation: Option<String>,
}

impl From<AddStepArgs> for CreateStep {
    fn from(val: AddStepArgs) -> Self {
        CreateStep {
            number: val.number,
            name: val.name,
            citation: val.citation,
        }
    }
}

/// Show details of a specific step
#[derive(Args)]
pub struct ShowStepArgs {
    /// ID of the step to display
    #[arg(help = "Unique identifier of the step to show details for")]
    pub id: u64,
}

impl From<ShowStepArgs> for Id {
    fn from(val: ShowStepArgs) -> Self {
        Id { id: val.id }
    }
}

/// Update a step's name or citation
#[derive(Args)]
pub struct UpdateStepArgs {
    #[arg(help = "Unique identifier of the step to update")]
    pub id: u64,
    #[arg(short, long, help = "Updated name of the requirement")]
    pub name: Option<String>,
    #[arg(short, long, help = "Updated regulatory citation")]
    pub citation: Option<String>,
}

impl From<UpdateStepArgs> for UpdateStep {
    fn from(val: UpdateStepArgs) -> Self {
        UpdateStep {
            id: val.id,
            name: val.name,
            citation: val.citation,
        }
    }
}

/// Transition a step's lifecycle status
///
/// Transitions into 'done' require at least one evidence record attached
/// to the step; attach a file or generate a document first.
#[derive(Args)]
pub struct SetStatusArgs {
    #[arg(help = "Unique identifier of the step to transition")]
    pub id: u64,
    #[arg(help = "Target status (pending, inprogress, done, cancelled)")]
    pub status: String,
    #[arg(short, long, help = "Observation recorded with the transition")]
    pub comment: Option<String>,
}

impl From<SetStatusArgs> for SetStepStatus {
    fn from(val: SetStatusArgs) -> Self {
        SetStepStatus {
            id: val.id,
            status: val.status,
            comment: val.comment,
        }
    }
}

/// Reopen a completed or cancelled step
#[derive(Args)]
pub struct ReopenStepArgs {
    #[arg(help = "Unique identifier of the terminal step to return to pending")]
    pub id: u64,
}

impl From<ReopenStepArgs> for Id {
    fn from(val: ReopenStepArgs) -> Self {
        Id { id: val.id }
    }
}

/// Delete a step permanently
#[derive(Args)]
pub struct RemoveStepArgs {
    /// ID of the step to delete
    #[arg(help = "Unique identifier of the step to permanently delete")]
    pub id: u64,
    /// Confirm the deletion (required to prevent accidental deletion)
    #[arg(long)]
    pub confirm: bool,
}

#[derive(Subcommand)]
pub enum StepCommands {
    /// Register a new compliance step
    #[command(alias = "a")]
    Add(AddStepArgs),
    /// List all steps with status and evidence counts
    #[command(aliases = ["l", "ls"])]
    List,
    /// Show details of a specific step
    #[command(alias = "s")]
    Show(ShowStepArgs),
    /// Update a step's name or citation
    #[command(alias = "u")]
    Update(UpdateStepArgs),
    /// Transition a step's lifecycle status
    Status(SetStatusArgs),
    /// Reopen a completed or cancelled step
    Reopen(ReopenStepArgs),
    /// Delete a step permanently
    #[command(aliases = ["d", "rm"])]
    Remove(RemoveStepArgs),
}

/// One template field given on the command line as `LABEL:KIND[:ORDER]`
#[derive(Clone)]
pub struct FieldSpecArg {
    pub label: String,
    pub kind: String,
    pub order: Option<u32>,
}

impl FromStr for FieldSpecArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let label = parts
            .next()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| format!("Invalid field spec '{s}': expected LABEL:KIND[:ORDER]"))?;
        let kind = parts
            .next()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| format!("Invalid field spec '{s}': expected LABEL:KIND[:ORDER]"))?;
        let order = match parts.next() {
            Some(raw) => Some(
                raw.trim()
                    .parse::<u32>()
                    .map_err(|_| format!("Invalid field order '{raw}' in spec '{s}'"))?,
            ),
            None => None,
        };
        Ok(FieldSpecArg {
            label: label.trim().to_string(),
            kind: kind.trim().to_string(),
            order,
        })
    }
}

/// Define (or redefine) a step's document template
///
/// Defining a template replaces any previous definition for the step.
/// Fields default to their command-line position when no explicit order is
/// given.
#[derive(Args)]
pub struct SetTemplateArgs {
    #[arg(help = "Unique identifier of the step the template belongs to")]
    pub step_id: u64,
    /// Document title
    #[arg(short, long)]
    pub title: String,
    /// Fixed introductory text placed before the dynamic fields
    #[arg(short, long, default_value = "")]
    pub intro: String,
    /// Dynamic field as LABEL:KIND[:ORDER]; repeat per field.
    /// KIND is short_text, date, or long_text
    #[arg(
        short,
        long = "field",
        value_name = "LABEL:KIND[:ORDER]",
        help = "Dynamic field as LABEL:KIND[:ORDER]; repeat per field"
    )]
    pub fields: Vec<FieldSpecArg>,
}

impl From<SetTemplateArgs> for DefineTemplate {
    fn from(val: SetTemplateArgs) -> Self {
        DefineTemplate {
            step_id: val.step_id,
            title: val.title,
            intro_text: val.intro,
            fields: val
                .fields
                .into_iter()
                .enumerate()
                .map(|(position, spec)| FieldDef {
                    label: spec.label,
                    kind: spec.kind,
                    order: spec.order.unwrap_or(position as u32 + 1),
                })
                .collect(),
        }
    }
}

/// Show the template configured for a step
#[derive(Args)]
pub struct ShowTemplateArgs {
    #[arg(help = "Unique identifier of the step whose template to show")]
    pub step_id: u64,
}

#[derive(Subcommand)]
pub enum TemplateCommands {
    /// Define (or redefine) a step's document template
    #[command(alias = "s")]
    Set(SetTemplateArgs),
    /// Show the template configured for a step
    Show(ShowTemplateArgs),
}

/// One generation answer given on the command line as `LABEL=VALUE`
#[derive(Clone)]
pub struct AnswerArg {
    pub label: String,
    pub value: String,
}

impl FromStr for AnswerArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (label, value) = s
            .split_once('=')
            .ok_or_else(|| format!("Invalid answer '{s}': expected LABEL=VALUE"))?;
        if label.trim().is_empty() {
            return Err(format!("Invalid answer '{s}': label is empty"));
        }
        Ok(AnswerArg {
            label: label.trim().to_string(),
            value: value.to_string(),
        })
    }
}

/// Generate a document from a step's template
#[derive(Args)]
pub struct GenerateArgs {
    #[arg(help = "Unique identifier of the step whose template drives the generation")]
    pub step_id: u64,
    /// Answer for one declared field as LABEL=VALUE; repeat per field
    #[arg(
        short,
        long = "answer",
        value_name = "LABEL=VALUE",
        help = "Answer for one declared field as LABEL=VALUE; repeat per field"
    )]
    pub answers: Vec<AnswerArg>,
    /// Identity recorded on the generated evidence
    #[arg(long)]
    pub uploaded_by: Option<String>,
}

impl From<GenerateArgs> for GenerateDocument {
    fn from(val: GenerateArgs) -> Self {
        GenerateDocument {
            step_id: val.step_id,
            answers: val
                .answers
                .into_iter()
                .map(|a| (a.label, a.value))
                .collect::<BTreeMap<_, _>>(),
            uploaded_by: val.uploaded_by,
        }
    }
}

/// Attach an evidence file to a step
#[derive(Args)]
pub struct AttachEvidenceArgs {
    #[arg(help = "Unique identifier of the step the file belongs to")]
    pub step_id: u64,
    /// Path of the file to attach
    pub file: PathBuf,
    /// Identity recorded on the evidence
    #[arg(long)]
    pub uploaded_by: Option<String>,
}

/// List the evidence attached to a step
#[derive(Args)]
pub struct ListEvidenceArgs {
    #[arg(help = "Unique identifier of the step whose evidence to list")]
    pub step_id: u64,
}

/// Replace the content of an evidence record
#[derive(Args)]
pub struct ReplaceEvidenceArgs {
    #[arg(help = "Unique identifier of the evidence record to replace")]
    pub id: u64,
    /// Path of the corrected file
    pub file: PathBuf,
}

/// Export the stored bytes of an evidence record
#[derive(Args)]
pub struct ExportEvidenceArgs {
    #[arg(help = "Unique identifier of the evidence record to export")]
    pub id: u64,
    /// Destination path for the exported copy
    pub dest: PathBuf,
}

/// Remove an evidence record and its stored file
#[derive(Args)]
pub struct RemoveEvidenceArgs {
    #[arg(help = "Unique identifier of the evidence record to remove")]
    pub id: u64,
}

#[derive(Subcommand)]
pub enum EvidenceCommands {
    /// Attach an evidence file to a step
    #[command(alias = "a")]
    Attach(AttachEvidenceArgs),
    /// List the evidence attached to a step
    #[command(aliases = ["l", "ls"])]
    List(ListEvidenceArgs),
    /// Replace the content of an evidence record
    Replace(ReplaceEvidenceArgs),
    /// Export the stored bytes of an evidence record
    Export(ExportEvidenceArgs),
    /// Remove an evidence record and its stored file
    #[command(aliases = ["d", "rm"])]
    Remove(RemoveEvidenceArgs),
}

/// CLI command runner tying the tracker to the terminal renderer.
pub struct Cli {
    tracker: Tracker,
    renderer: TerminalRenderer,
}

impl Cli {
    /// Create a new CLI runner.
    pub fn new(tracker: Tracker, renderer: TerminalRenderer) -> Self {
        Self { tracker, renderer }
    }

    /// Handle step subcommands.
    pub async fn handle_step_command(self, command: StepCommands) -> Result<()> {
        match command {
            StepCommands::Add(args) => {
                let step = self.tracker.create_step(&args.into()).await?;
                self.renderer.render(&CreateResult::new(step).to_string())
            }
            StepCommands::List => self.list_steps().await,
            StepCommands::Show(args) => {
                let params: Id = args.into();
                match self.tracker.get_step(&params).await? {
                    Some(step) => self.renderer.render(&step.to_string()),
                    None => bail!("Step with ID {} not found", params.id),
                }
            }
            StepCommands::Update(args) => {
                let params: UpdateStep = args.into();
                let mut changes = Vec::new();
                if params.name.is_some() {
                    changes.push("Updated name".to_string());
                }
                if params.citation.is_some() {
                    changes.push("Updated citation".to_string());
                }
                let step = self.tracker.update_step(&params).await?;
                self.renderer
                    .render(&UpdateResult::with_changes(step, changes).to_string())
            }
            StepCommands::Status(args) => {
                let params: SetStepStatus = args.into();
                let step = self.tracker.set_step_status(&params).await?;
                let changes = vec![format!("Changed status to '{}'", step.status)];
                self.renderer
                    .render(&UpdateResult::with_changes(step, changes).to_string())
            }
            StepCommands::Reopen(args) => {
                let step = self.tracker.reopen_step(&args.into()).await?;
                let changes = vec!["Reopened to 'pending'".to_string()];
                self.renderer
                    .render(&UpdateResult::with_changes(step, changes).to_string())
            }
            StepCommands::Remove(args) => {
                if !args.confirm {
                    return self.renderer.render(
                        &OperationStatus::failure(format!(
                            "Deleting step {} is permanent. Re-run with --confirm to proceed.",
                            args.id
                        ))
                        .to_string(),
                    );
                }
                let step = self.tracker.delete_step(&Id { id: args.id }).await?;
                self.renderer.render(&DeleteResult::new(step).to_string())
            }
        }
    }

    /// Handle template subcommands.
    pub async fn handle_template_command(self, command: TemplateCommands) -> Result<()> {
        match command {
            TemplateCommands::Set(args) => {
                let template = self.tracker.define_template(&args.into()).await?;
                self.renderer
                    .render(&CreateResult::new(template).to_string())
            }
            TemplateCommands::Show(args) => {
                let params = Id { id: args.step_id };
                match self.tracker.get_template(&params).await? {
                    Some(template) => self.renderer.render(&template.to_string()),
                    None => self.renderer.render(&format!(
                        "No template configured for step {}.\n\n\
                         The step can still be completed by attaching evidence manually, \
                         or define a template with 'gr template set'.\n",
                        args.step_id
                    )),
                }
            }
        }
    }

    /// Handle evidence subcommands.
    pub async fn handle_evidence_command(self, command: EvidenceCommands) -> Result<()> {
        match command {
            EvidenceCommands::Attach(args) => {
                let filename = file_name_of(&args.file)?;
                let contents = tokio::fs::read(&args.file)
                    .await
                    .with_context(|| format!("Failed to read {}", args.file.display()))?;
                let evidence = self
                    .tracker
                    .attach_evidence(&AttachEvidence {
                        step_id: args.step_id,
                        filename,
                        contents,
                        uploaded_by: args.uploaded_by,
                    })
                    .await?;
                self.renderer
                    .render(&CreateResult::new(evidence).to_string())
            }
            EvidenceCommands::List(args) => {
                let evidence = self.tracker.list_evidence(&Id { id: args.step_id }).await?;
                self.renderer.render(&format!(
                    "# Evidence for step {}\n\n{}",
                    args.step_id, evidence
                ))
            }
            EvidenceCommands::Replace(args) => {
                let filename = file_name_of(&args.file)?;
                let contents = tokio::fs::read(&args.file)
                    .await
                    .with_context(|| format!("Failed to read {}", args.file.display()))?;
                let evidence = self
                    .tracker
                    .replace_evidence(&ReplaceEvidence {
                        evidence_id: args.id,
                        filename,
                        contents,
                    })
                    .await?;
                self.renderer
                    .render(&UpdateResult::new(evidence).to_string())
            }
            EvidenceCommands::Export(args) => {
                let (evidence, bytes) = self.tracker.read_evidence(&Id { id: args.id }).await?;
                tokio::fs::write(&args.dest, bytes)
                    .await
                    .with_context(|| format!("Failed to write {}", args.dest.display()))?;
                self.renderer.render(
                    &OperationStatus::success(format!(
                        "Exported '{}' to {}",
                        evidence.filename,
                        args.dest.display()
                    ))
                    .to_string(),
                )
            }
            EvidenceCommands::Remove(args) => {
                let evidence = self.tracker.remove_evidence(&Id { id: args.id }).await?;
                self.renderer
                    .render(&DeleteResult::new(evidence).to_string())
            }
        }
    }

    /// Generate a document from a step's template.
    pub async fn generate(self, args: GenerateArgs) -> Result<()> {
        let document = self.tracker.generate_document(&args.into()).await?;
        self.renderer
            .render(&GenerateResult(document).to_string())
    }

    /// Show the program-wide compliance summary.
    pub async fn compliance_status(self) -> Result<()> {
        let summary = self.tracker.compliance_summary().await?;
        self.renderer.render(&summary.to_string())
    }

    /// List the full step registry.
    pub async fn list_steps(self) -> Result<()> {
        let steps = self.tracker.list_steps().await?;
        let title = if steps.is_empty() {
            "No compliance steps registered"
        } else {
            "Compliance Steps"
        };
        self.renderer.render(&format!("# {title}\n\n{steps}"))
    }
}

fn file_name_of(path: &Path) -> Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("Path {} has no file name", path.display()))
}
