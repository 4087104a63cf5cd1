//! Prompt templates for MCP server

/// Argument definition for a prompt template
#[derive(Debug, Clone)]
pub struct PromptTemplateArg {
    pub name: String,
    pub description: String,
    pub required: bool,
}

/// Definition of a prompt template
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub name: String,
    pub description: String,
    pub template: String,
    pub arguments: Vec<PromptTemplateArg>,
}

/// Get predefined prompt templates for compliance tracking
pub fn prompt_templates() -> Vec<PromptTemplate> {
    vec![
        PromptTemplate {
            name: "setup".to_string(),
            description: "Bootstrap the compliance checklist from a regulation description"
                .to_string(),
            template: r#"You are setting up a road-safety compliance program in Guardrail.

# Regulation
{regulation}

# Your Task
Turn the regulation into a tracked checklist using Guardrail's MCP tools.

## Step 1: Review the Current Registry
Call `list_steps` first. If steps already exist, extend the registry instead of duplicating entries, and pick ordinal numbers after the highest in use.

## Step 2: Register the Steps
For each distinct mandatory requirement in the regulation, call `create_step` with:
- **number**: its position in the statutory checklist
- **name**: a short, action-oriented name for the requirement
- **citation**: the article/resolution reference, quoted exactly

## Step 3: Configure Document Templates
For every step that is normally closed with a standard document (plans, designations, review records), call `define_template`:
- **title**: the formal document title, as it should appear in the archive
- **intro_text**: the fixed boilerplate paragraph, if the document has one
- **fields**: one entry per blank the operator fills in, ordered as they appear in the document. Use 'short_text' for names and references, 'date' for dates, 'long_text' for narrative sections.

Steps closed with externally produced files (photos, signed contracts, third-party certificates) need no template - evidence is attached manually for those.

## Quality Guidelines
- One step per obligation; do not merge unrelated requirements
- Keep citations verbatim so auditors can trace each step to its source
- Field labels become form labels for operators: short and unambiguous

Finish by calling `list_steps` and presenting the registry."#
                .to_string(),
            arguments: vec![PromptTemplateArg {
                name: "regulation".to_string(),
                description: "Description or excerpt of the regulation to track".to_string(),
                required: true,
            }],
        },
        PromptTemplate {
            name: "close-step".to_string(),
            description: "Guide a compliance step from its current state to 'done' with evidence"
                .to_string(),
            template: r#"You are closing out a compliance step in Guardrail.

# Step to Close
Step ID: {step_id}

# Procedure

## 1. Inspect the Step
Call `show_step(id: {step_id})` to see its status, citation, and evidence count. If the step is already 'done' or 'cancelled', stop and report that.

## 2. Secure Evidence
Call `show_template(id: {step_id})`:
- **Template configured**: gather a value for every declared field from the user, then call `generate_document`. Date fields must be YYYY-MM-DD. If a value is missing or malformed the call fails field-by-field - correct and retry.
- **No template**: ask the user for the file that proves compliance and call `attach_evidence` with its path.

Check `list_evidence(id: {step_id})` afterwards; exactly one new record should have appeared.

## 3. Transition
Call `set_step_status` with status 'done' and a short observation describing how the requirement was satisfied. If the tool reports that evidence is required, step 2 did not record anything - do not force the transition, go back and secure evidence.

## 4. Report
Call `compliance_summary` and tell the user the updated completion percentage."#
                .to_string(),
            arguments: vec![PromptTemplateArg {
                name: "step_id".to_string(),
                description: "The ID of the step to close".to_string(),
                required: true,
            }],
        },
    ]
}
