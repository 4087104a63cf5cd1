//! MCP tool handlers implementation

use std::sync::Arc;

use guardrail_core::{
    display::OperationStatus,
    params as core,
    CreateResult, DeleteResult, GenerateResult, Tracker, UpdateResult,
};
use log::debug;
use rmcp::{
    handler::server::wrapper::Parameters,
    model::{
        CallToolResult, Content, GetPromptRequestParam, GetPromptResult, ListPromptsResult,
        PaginatedRequestParam, Prompt, PromptArgument, PromptMessage, PromptMessageContent,
        PromptMessageRole,
    },
    service::RequestContext,
    ErrorData as McpError, RoleServer,
};
use schemars::JsonSchema;
use serde::Deserialize;
use tokio::sync::Mutex;

use super::{errors::to_mcp_error, prompts::prompt_templates};

// ============================================================================
// Generic Parameter Wrapper Implementation
// ============================================================================
//
// Core parameter types stay free of MCP concerns; this transparent wrapper
// adds the Deserialize + JsonSchema derives the protocol needs and passes
// schema generation straight through to the wrapped type.

/// Generic MCP wrapper for core parameter types with serde integration
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct McpParams<T>(T)
where
    T: JsonSchema;

impl<T> JsonSchema for McpParams<T>
where
    T: JsonSchema,
{
    fn schema_name() -> std::borrow::Cow<'static, str> {
        T::schema_name()
    }

    fn json_schema(g: &mut schemars::SchemaGenerator) -> schemars::Schema {
        T::json_schema(g)
    }
}

impl<T> AsRef<T> for McpParams<T>
where
    T: JsonSchema,
{
    fn as_ref(&self) -> &T {
        &self.0
    }
}

// Type aliases for cleaner usage in function signatures
pub type Id = McpParams<core::Id>;
pub type CreateStep = McpParams<core::CreateStep>;
pub type UpdateStep = McpParams<core::UpdateStep>;
pub type SetStepStatus = McpParams<core::SetStepStatus>;
pub type DefineTemplate = McpParams<core::DefineTemplate>;
pub type GenerateDocument = McpParams<core::GenerateDocument>;

/// Parameters for attaching an evidence file by path.
///
/// MCP clients hand over a path on the server's filesystem rather than raw
/// bytes; the handler reads the file and forwards the contents to the core.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct AttachEvidenceFile {
    /// ID of the step the file belongs to
    pub step_id: u64,
    /// Path of the file to attach
    pub source_path: String,
    /// Identity recorded on the evidence
    pub uploaded_by: Option<String>,
}

/// Parameters for replacing an evidence record's content by path.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ReplaceEvidenceFile {
    /// ID of the evidence record to replace
    pub evidence_id: u64,
    /// Path of the corrected file
    pub source_path: String,
}

pub type McpResult = Result<CallToolResult, McpError>;

/// Handler implementations for the MCP server
pub struct McpHandlers {
    tracker: Arc<Mutex<Tracker>>,
}

impl McpHandlers {
    pub fn new(tracker: Arc<Mutex<Tracker>>) -> Self {
        Self { tracker }
    }

    pub async fn create_step(&self, Parameters(params): Parameters<CreateStep>) -> McpResult {
        debug!("create_step: {:?}", params);

        let step = self
            .tracker
            .lock()
            .await
            .create_step(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to create step", &e))?;

        let result = CreateResult::new(step);
        Ok(CallToolResult::success(vec![Content::text(
            result.to_string(),
        )]))
    }

    pub async fn list_steps(&self) -> McpResult {
        debug!("list_steps");

        let steps = self
            .tracker
            .lock()
            .await
            .list_steps()
            .await
            .map_err(|e| to_mcp_error("Failed to list steps", &e))?;

        let title = if steps.is_empty() {
            "No compliance steps registered"
        } else {
            "Compliance Steps"
        };
        let result = format!("# {}\n\n{}", title, steps);
        Ok(CallToolResult::success(vec![Content::text(result)]))
    }

    pub async fn show_step(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("show_step: {:?}", params);

        let tracker = self.tracker.lock().await;
        let inner_params = params.as_ref();
        let step = tracker
            .get_step(inner_params)
            .await
            .map_err(|e| to_mcp_error("Failed to get step", &e))?
            .ok_or_else(|| {
                McpError::invalid_params(
                    format!("Step with ID {} not found", inner_params.id),
                    None,
                )
            })?;

        Ok(CallToolResult::success(vec![Content::text(
            step.to_string(),
        )]))
    }

    pub async fn update_step(&self, Parameters(params): Parameters<UpdateStep>) -> McpResult {
        debug!("update_step: {:?}", params);

        let tracker = self.tracker.lock().await;
        let inner_params = params.as_ref();
        let step = tracker
            .update_step(inner_params)
            .await
            .map_err(|e| to_mcp_error("Failed to update step", &e))?;

        let mut messages = Vec::new();
        if inner_params.name.is_some() {
            messages.push("Updated name".to_string());
        }
        if inner_params.citation.is_some() {
            messages.push("Updated citation".to_string());
        }

        let result = if messages.is_empty() {
            "No updates provided for step".to_string()
        } else {
            UpdateResult::with_changes(step, messages).to_string()
        };
        Ok(CallToolResult::success(vec![Content::text(result)]))
    }

    pub async fn set_step_status(
        &self,
        Parameters(params): Parameters<SetStepStatus>,
    ) -> McpResult {
        debug!("set_step_status: {:?}", params);

        let tracker = self.tracker.lock().await;
        let step = tracker
            .set_step_status(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to change step status", &e))?;

        let changes = vec![format!("Changed status to '{}'", step.status)];
        let result = UpdateResult::with_changes(step, changes);
        Ok(CallToolResult::success(vec![Content::text(
            result.to_string(),
        )]))
    }

    pub async fn reopen_step(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("reopen_step: {:?}", params);

        let tracker = self.tracker.lock().await;
        let step = tracker
            .reopen_step(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to reopen step", &e))?;

        let result = OperationStatus::success(format!(
            "Reopened step {} to 'pending'. Its evidence history is preserved.",
            step.id
        ));
        Ok(CallToolResult::success(vec![Content::text(
            result.to_string(),
        )]))
    }

    pub async fn delete_step(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("delete_step: {:?}", params);

        let tracker = self.tracker.lock().await;
        let step = tracker
            .delete_step(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to delete step", &e))?;

        let result = OperationStatus::success(format!(
            "Permanently deleted step '{}' (ID: {}). This action cannot be undone.",
            step.name, step.id
        ));
        Ok(CallToolResult::success(vec![Content::text(
            result.to_string(),
        )]))
    }

    pub async fn define_template(
        &self,
        Parameters(params): Parameters<DefineTemplate>,
    ) -> McpResult {
        debug!("define_template: {:?}", params);

        let tracker = self.tracker.lock().await;
        let template = tracker
            .define_template(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to define template", &e))?;

        let result = CreateResult::new(template);
        Ok(CallToolResult::success(vec![Content::text(
            result.to_string(),
        )]))
    }

    pub async fn show_template(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("show_template: {:?}", params);

        let tracker = self.tracker.lock().await;
        let inner_params = params.as_ref();
        let template = tracker
            .get_template(inner_params)
            .await
            .map_err(|e| to_mcp_error("Failed to get template", &e))?;

        // "Not configured" is a normal state, not an error: the caller
        // should fall back to the manual evidence path.
        let result = match template {
            Some(template) => template.to_string(),
            None => format!(
                "No template configured for step {}. The step can still be completed \
                 by attaching evidence manually, or define a template with 'define_template'.",
                inner_params.id
            ),
        };
        Ok(CallToolResult::success(vec![Content::text(result)]))
    }

    pub async fn generate_document(
        &self,
        Parameters(params): Parameters<GenerateDocument>,
    ) -> McpResult {
        debug!("generate_document: {:?}", params);

        let tracker = self.tracker.lock().await;
        let document = tracker
            .generate_document(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to generate document", &e))?;

        let result = GenerateResult(document);
        Ok(CallToolResult::success(vec![Content::text(
            result.to_string(),
        )]))
    }

    pub async fn attach_evidence(
        &self,
        Parameters(params): Parameters<McpParams<AttachEvidenceFile>>,
    ) -> McpResult {
        debug!("attach_evidence: {:?}", params);

        let request = params.as_ref();
        let contents = tokio::fs::read(&request.source_path).await.map_err(|e| {
            McpError::invalid_params(
                format!("Failed to read '{}': {}", request.source_path, e),
                None,
            )
        })?;
        let filename = file_name_of(&request.source_path);

        let tracker = self.tracker.lock().await;
        let evidence = tracker
            .attach_evidence(&core::AttachEvidence {
                step_id: request.step_id,
                filename,
                contents,
                uploaded_by: request.uploaded_by.clone(),
            })
            .await
            .map_err(|e| to_mcp_error("Failed to attach evidence", &e))?;

        let result = CreateResult::new(evidence);
        Ok(CallToolResult::success(vec![Content::text(
            result.to_string(),
        )]))
    }

    pub async fn list_evidence(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("list_evidence: {:?}", params);

        let tracker = self.tracker.lock().await;
        let inner_params = params.as_ref();
        let evidence = tracker
            .list_evidence(inner_params)
            .await
            .map_err(|e| to_mcp_error("Failed to list evidence", &e))?;

        let result = format!("# Evidence for step {}\n\n{}", inner_params.id, evidence);
        Ok(CallToolResult::success(vec![Content::text(result)]))
    }

    pub async fn replace_evidence(
        &self,
        Parameters(params): Parameters<McpParams<ReplaceEvidenceFile>>,
    ) -> McpResult {
        debug!("replace_evidence: {:?}", params);

        let request = params.as_ref();
        let contents = tokio::fs::read(&request.source_path).await.map_err(|e| {
            McpError::invalid_params(
                format!("Failed to read '{}': {}", request.source_path, e),
                None,
            )
        })?;
        let filename = file_name_of(&request.source_path);

        let tracker = self.tracker.lock().await;
        let evidence = tracker
            .replace_evidence(&core::ReplaceEvidence {
                evidence_id: request.evidence_id,
                filename,
                contents,
            })
            .await
            .map_err(|e| to_mcp_error("Failed to replace evidence", &e))?;

        let result = UpdateResult::new(evidence);
        Ok(CallToolResult::success(vec![Content::text(
            result.to_string(),
        )]))
    }

    pub async fn remove_evidence(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("remove_evidence: {:?}", params);

        let tracker = self.tracker.lock().await;
        let evidence = tracker
            .remove_evidence(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to remove evidence", &e))?;

        let result = DeleteResult::new(evidence);
        Ok(CallToolResult::success(vec![Content::text(
            result.to_string(),
        )]))
    }

    pub async fn compliance_summary(&self) -> McpResult {
        debug!("compliance_summary");

        let summary = self
            .tracker
            .lock()
            .await
            .compliance_summary()
            .await
            .map_err(|e| to_mcp_error("Failed to compute compliance summary", &e))?;

        Ok(CallToolResult::success(vec![Content::text(
            summary.to_string(),
        )]))
    }

    /// List all available prompts
    pub async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, McpError> {
        debug!("list_prompts");

        let prompts = prompt_templates()
            .iter()
            .map(|template| {
                Prompt::new(
                    &template.name,
                    Some(&template.description),
                    Some(
                        template
                            .arguments
                            .iter()
                            .map(|arg| PromptArgument {
                                name: arg.name.clone(),
                                title: None,
                                description: Some(arg.description.clone()),
                                required: Some(arg.required),
                            })
                            .collect(),
                    ),
                )
            })
            .collect();

        Ok(ListPromptsResult {
            next_cursor: None,
            prompts,
        })
    }

    /// Get a specific prompt by name and apply arguments
    pub async fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, McpError> {
        debug!("get_prompt: {}", request.name);

        let templates = prompt_templates();
        let template = templates
            .iter()
            .find(|t| t.name == request.name)
            .ok_or_else(|| McpError::invalid_params("Prompt not found", None))?;

        let mut prompt_text = template.template.clone();

        if let Some(args) = &request.arguments {
            for arg_def in &template.arguments {
                if let Some(arg_value) = args.get(&arg_def.name) {
                    if let Some(arg_str) = arg_value.as_str() {
                        let placeholder = format!("{{{}}}", arg_def.name);
                        prompt_text = prompt_text.replace(&placeholder, arg_str);
                    } else if arg_def.required {
                        return Err(McpError::invalid_params(
                            format!("Argument '{}' must be a string", arg_def.name),
                            None,
                        ));
                    }
                } else if arg_def.required {
                    return Err(McpError::invalid_params(
                        format!("Required argument '{}' is missing", arg_def.name),
                        None,
                    ));
                }
            }
        } else {
            let required_args: Vec<_> = template
                .arguments
                .iter()
                .filter(|arg| arg.required)
                .map(|arg| arg.name.as_str())
                .collect();
            if !required_args.is_empty() {
                return Err(McpError::invalid_params(
                    format!("Required arguments missing: {}", required_args.join(", ")),
                    None,
                ));
            }
        }

        Ok(GetPromptResult {
            description: Some(template.description.clone()),
            messages: vec![PromptMessage {
                role: PromptMessageRole::User,
                content: PromptMessageContent::text(prompt_text),
            }],
        })
    }
}

fn file_name_of(path: &str) -> String {
    std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}
