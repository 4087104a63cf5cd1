//! MCP server implementation for Guardrail
//!
//! This module implements the Model Context Protocol server for Guardrail,
//! providing a standardized interface for AI models to interact with the
//! compliance tracking system.

use std::sync::Arc;

use anyhow::Result;
use guardrail_core::Tracker;
use log::{debug, error, info};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        GetPromptRequestParam, GetPromptResult, Implementation, ListPromptsResult,
        PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    tool, tool_handler, tool_router, ErrorData as McpError, RoleServer, ServerHandler,
};
use tokio::{
    signal::unix::{signal, SignalKind},
    sync::Mutex,
};

pub mod errors;
pub mod handlers;
pub mod prompts;

// Re-export parameter types and result type from handlers for external use
pub use handlers::{
    AttachEvidenceFile, CreateStep, DefineTemplate, GenerateDocument, Id, McpParams, McpResult,
    ReplaceEvidenceFile, SetStepStatus, UpdateStep,
};

/// MCP server for Guardrail
#[derive(Clone)]
pub struct GuardrailMcpServer {
    tracker: Arc<Mutex<Tracker>>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl GuardrailMcpServer {
    /// Create a new Guardrail MCP server
    pub fn new(tracker: Tracker) -> Self {
        Self {
            tracker: Arc::new(Mutex::new(tracker)),
            tool_router: Self::tool_router(),
        }
    }

    fn handlers(&self) -> handlers::McpHandlers {
        handlers::McpHandlers::new(self.tracker.clone())
    }

    #[tool(
        name = "create_step",
        description = "Register a new compliance step in the program checklist. Provide the ordinal number (unique, defines display order), a clear name, and optionally the regulatory citation backing the requirement. New steps start in 'pending' status with no evidence."
    )]
    async fn create_step(&self, params: Parameters<CreateStep>) -> McpResult {
        self.handlers().create_step(params).await
    }

    #[tool(
        name = "list_steps",
        description = "List every compliance step in the registry, ordered by number, with current status, citation, evidence count, and last observation. Use this to see program progress at a glance."
    )]
    async fn list_steps(&self) -> McpResult {
        self.handlers().list_steps().await
    }

    #[tool(
        name = "show_step",
        description = "Display full details of one compliance step by ID: status, citation, evidence count, and the observation recorded on its last status change."
    )]
    async fn show_step(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().show_step(params).await
    }

    #[tool(
        name = "update_step",
        description = "Rename a step or update its regulatory citation. This never touches the step's lifecycle status; use set_step_status for transitions."
    )]
    async fn update_step(&self, params: Parameters<UpdateStep>) -> McpResult {
        self.handlers().update_step(params).await
    }

    #[tool(
        name = "set_step_status",
        description = "Transition a step to 'pending', 'inprogress', 'done', or 'cancelled', optionally recording an observation. Marking a step 'done' requires at least one evidence record already attached (manual upload or generated document both count); the check is atomic with the status write. 'done' and 'cancelled' are terminal - use reopen_step to leave them."
    )]
    async fn set_step_status(&self, params: Parameters<SetStepStatus>) -> McpResult {
        self.handlers().set_step_status(params).await
    }

    #[tool(
        name = "reopen_step",
        description = "Administrative reopen: return a 'done' or 'cancelled' step to 'pending'. This is the only way out of a terminal status. Evidence already attached to the step is preserved."
    )]
    async fn reopen_step(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().reopen_step(params).await
    }

    #[tool(
        name = "delete_step",
        description = "Permanently delete a step and its document template. Blocked while any evidence is attached to the step - remove the evidence records first. This operation cannot be undone."
    )]
    async fn delete_step(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().delete_step(params).await
    }

    #[tool(
        name = "define_template",
        description = "Define (or redefine) the document template for a step. Provide the document title, optional fixed intro text, and at least one field as {label, kind, order} where kind is 'short_text', 'date', or 'long_text'. Redefinition replaces the previous template atomically; documents already generated from it are unaffected."
    )]
    async fn define_template(&self, params: Parameters<DefineTemplate>) -> McpResult {
        self.handlers().define_template(params).await
    }

    #[tool(
        name = "show_template",
        description = "Show the document template configured for a step, or report that none is configured. An unconfigured template is a normal state: the step can still be completed by attaching evidence manually."
    )]
    async fn show_template(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().show_template(params).await
    }

    #[tool(
        name = "generate_document",
        description = "Generate a document from a step's template. Supply 'answers' as a map keyed by field label covering exactly the declared fields; date fields must be ISO calendar dates (YYYY-MM-DD). On success exactly one generated-evidence record is created and the file reference is returned. Fails without side effects when a value is missing or malformed, or when no template is configured."
    )]
    async fn generate_document(&self, params: Parameters<GenerateDocument>) -> McpResult {
        self.handlers().generate_document(params).await
    }

    #[tool(
        name = "attach_evidence",
        description = "Attach a file on the server's filesystem as manual evidence for a step. Provide step_id, source_path, and optionally the uploader identity. The file bytes are copied into the evidence store and a metadata record is created."
    )]
    async fn attach_evidence(
        &self,
        params: Parameters<McpParams<AttachEvidenceFile>>,
    ) -> McpResult {
        self.handlers().attach_evidence(params).await
    }

    #[tool(
        name = "list_evidence",
        description = "List the evidence records attached to a step, newest first, with filename, provenance (manual upload or generated), uploader, and storage path."
    )]
    async fn list_evidence(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().list_evidence(params).await
    }

    #[tool(
        name = "replace_evidence",
        description = "Replace the content of an existing evidence record with a corrected file while keeping the same record identity. The evidence count of the step does not change and references to the record stay valid; the superseded bytes are discarded."
    )]
    async fn replace_evidence(
        &self,
        params: Parameters<McpParams<ReplaceEvidenceFile>>,
    ) -> McpResult {
        self.handlers().replace_evidence(params).await
    }

    #[tool(
        name = "remove_evidence",
        description = "Remove an evidence record and its stored file. If this was the step's last evidence, the step can no longer be marked 'done' until new evidence is attached."
    )]
    async fn remove_evidence(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().remove_evidence(params).await
    }

    #[tool(
        name = "compliance_summary",
        description = "Show per-status step counts and the program-wide completion percentage (share of steps in 'done' status, rounded). An empty registry reports 0 percent."
    )]
    async fn compliance_summary(&self) -> McpResult {
        self.handlers().compliance_summary().await
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for GuardrailMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_prompts()
                .build(),
            server_info: Implementation {
                name: "guardrail".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(r#"Guardrail tracks a road-safety compliance program: an ordered checklist of mandatory steps, per-step document templates, and the evidence files that gate completion.

## Core Concepts
- **Steps**: Mandatory requirements with an ordinal number, regulatory citation, and lifecycle status (pending / inprogress / done / cancelled)
- **Templates**: Per-step document schemas - a title, fixed intro text, and an ordered list of typed fields (short_text, date, long_text)
- **Evidence**: Files attached to a step, either uploaded manually or produced by document generation. A step cannot be marked 'done' without at least one evidence record.

## Workflow Examples

### Setting Up the Checklist
1. Register each statutory requirement with `create_step` (number, name, citation)
2. Review the registry with `list_steps`
3. For steps closed with a standard document, define its schema with `define_template`

### Closing a Step
1. Check `show_template` - if a template is configured, collect the field values and call `generate_document`; otherwise attach a signed file with `attach_evidence`
2. Transition with `set_step_status` to 'done', recording an observation
3. If the transition reports that evidence is required, attach or generate evidence first and retry

### Correcting the Record
- `replace_evidence` swaps a file's content while keeping the record identity
- `reopen_step` returns a terminal step to 'pending' for rework
- `compliance_summary` reports the share of steps done

## Tool Categories
- **Step Management**: create_step, list_steps, show_step, update_step, set_step_status, reopen_step, delete_step
- **Templates**: define_template, show_template
- **Documents & Evidence**: generate_document, attach_evidence, list_evidence, replace_evidence, remove_evidence
- **Reporting**: compliance_summary

## Guarantees
Status transitions are atomic per step: the evidence check and the status write commit together. Generation either records exactly one evidence file or fails with no side effects. Redefining a template never alters documents generated from earlier definitions."#.to_string()),
        }
    }

    async fn list_prompts(
        &self,
        request: Option<PaginatedRequestParam>,
        context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, McpError> {
        self.handlers().list_prompts(request, context).await
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, McpError> {
        self.handlers().get_prompt(request, context).await
    }
}

/// Run the MCP server with stdio transport
pub async fn run_stdio_server(server: GuardrailMcpServer) -> Result<()> {
    use rmcp::{transport::stdio, ServiceExt};

    info!("Starting Guardrail MCP server on stdio");
    debug!(
        "Server created with {} tools",
        server.tool_router.list_all().len()
    );

    let service = server.serve(stdio()).await.inspect_err(|e| {
        error!("serving error: {e:?}");
    })?;

    // Set up signal handlers for graceful shutdown
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        result = service.waiting() => {
            match result {
                Ok(_) => info!("MCP server stopped normally"),
                Err(e) => error!("MCP server error: {e:?}"),
            }
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down gracefully...");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
    }

    info!("MCP server shutdown complete");
    Ok(())
}
