//! Core library for the Guardrail compliance tracking application.
//!
//! This crate provides the business logic for a road-safety compliance
//! program: a registry of mandatory steps with a validated status lifecycle,
//! per-step document templates with typed dynamic fields, a deterministic
//! document generator, and an evidence store that gates step completion.
//!
//! # Architecture
//!
//! - **Domain Models** ([`models`]): steps, templates, evidence, and the
//!   compliance summary, each implementing [`std::fmt::Display`] for
//!   markdown output
//! - **Persistence** ([`db`]): SQLite-backed registry where every
//!   check-then-act sequence commits in a single transaction
//! - **Generation** ([`generator`]): binds operator answers to a template
//!   snapshot and hands structured content to a renderer collaborator
//! - **Storage** ([`storage`]): opaque blob store collaborator holding the
//!   evidence bytes
//! - **Facade** ([`tracker`]): the async [`Tracker`] API consumed by the
//!   CLI and MCP interfaces
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use guardrail_core::{params::CreateStep, TrackerBuilder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Create a tracker instance
//! let tracker = TrackerBuilder::new()
//!     .with_database_path(Some("guardrail.db"))
//!     .build()
//!     .await?;
//!
//! // Register a compliance step
//! let step = tracker
//!     .create_step(&CreateStep {
//!         number: 25,
//!         name: "Fatigue plan".to_string(),
//!         citation: Some("Res. 40595 art. 12".to_string()),
//!     })
//!     .await?;
//! println!("Registered: {}", step);
//!
//! // List the registry
//! let steps = tracker.list_steps().await?;
//! println!("{}", steps);
//! # Ok(())
//! # }
//! ```

pub mod db;
pub mod display;
pub mod error;
pub mod generator;
pub mod models;
pub mod params;
pub mod storage;
pub mod tracker;

// Re-export commonly used types
pub use db::Database;
pub use display::{
    CreateResult, DeleteResult, EvidenceList, GenerateResult, OperationStatus, Steps, UpdateResult,
};
pub use error::{Result, TrackerError};
pub use generator::{build_content, ContentRow, DocumentContent, DocumentRenderer, MarkdownRenderer};
pub use models::{
    ComplianceSummary, Evidence, FieldKind, FieldSchema, GeneratedDocument, Provenance, Step,
    StepStatus, TemplateDefinition,
};
pub use params::{
    AttachEvidence, CreateStep, DefineTemplate, FieldDef, GenerateDocument, Id, ReplaceEvidence,
    SetStepStatus, UpdateStep,
};
pub use storage::{BlobStore, FsBlobStore};
pub use tracker::{Tracker, TrackerBuilder};
