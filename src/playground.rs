//! Rule-based pattern playground
//!
//! Each built-in template shows one prompt-engineering pattern applied to the
//! user's task. Placeholders are `<name>` (required) or `<name=default>`.

use crate::utils::command::{TemplateVariable, parse_template_variables, replace_template_variables};
use crate::utils::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The variable every template is built around
pub const TASK_VARIABLE: &str = "task";

const INPUT_MAX: usize = 4_000;

struct Template {
    pattern: &'static str,
    name: &'static str,
    body: &'static str,
}

const TEMPLATES: &[Template] = &[
    Template {
        pattern: "persona",
        name: "Persona",
        body: "You are <role=a senior software engineer> with deep experience in <domain=modern web development>.\n\n<task>\n\nAnswer the way that expert would, and call out anything they would push back on.",
    },
    Template {
        pattern: "chain-of-thought",
        name: "Chain of Thought",
        body: "<task>\n\nWork through this step by step. Lay out your reasoning before giving the final answer, and label the final answer clearly.",
    },
    Template {
        pattern: "few-shot",
        name: "Few-Shot",
        body: "Here are examples of the expected output:\n\n<examples=Input: ...\nOutput: ...>\n\nFollowing the same format, handle this:\n\n<task>",
    },
    Template {
        pattern: "zero-shot",
        name: "Zero-Shot",
        body: "<task>",
    },
    Template {
        pattern: "role-task-format",
        name: "Role, Task, Format",
        body: "Role: <role=an experienced technical writer>\nTask: <task>\nFormat: <format=a concise bulleted list>",
    },
    Template {
        pattern: "critique-and-refine",
        name: "Critique and Refine",
        body: "<task>\n\nFirst draft an answer. Then critique the draft against <criteria=correctness, clarity and completeness>. Finally, output an improved version that addresses every critique.",
    },
    Template {
        pattern: "constraints-first",
        name: "Constraints First",
        body: "Constraints:\n<constraints=- Keep the answer under 200 words\n- Do not invent APIs>\n\nWithin those constraints: <task>",
    },
    Template {
        pattern: "context-grounding",
        name: "Context Grounding",
        body: "Context:\n<context>\n\nUsing only the context above: <task>\n\nIf the context does not contain the answer, say so instead of guessing.",
    },
];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateVariableInfo {
    pub name: String,
    pub default: Option<String>,
    pub required: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateInfo {
    pub pattern: String,
    pub name: String,
    pub template: String,
    pub variables: Vec<TemplateVariableInfo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub pattern: String,
    #[serde(default)]
    pub inputs: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RenderedPrompt {
    pub pattern: String,
    pub prompt: String,
    /// Required variables that had no value
    pub missing: Vec<String>,
}

fn variable_info(variable: TemplateVariable) -> TemplateVariableInfo {
    TemplateVariableInfo {
        required: variable.default.is_none(),
        name: variable.name,
        default: variable.default,
    }
}

pub fn templates() -> Vec<TemplateInfo> {
    TEMPLATES
        .iter()
        .map(|t| TemplateInfo {
            pattern: t.pattern.to_string(),
            name: t.name.to_string(),
            template: t.body.to_string(),
            variables: parse_template_variables(t.body).into_iter().map(variable_info).collect(),
        })
        .collect()
}

pub fn render(request: &RenderRequest) -> AppResult<RenderedPrompt> {
    let template = TEMPLATES
        .iter()
        .find(|t| t.pattern == request.pattern)
        .ok_or_else(|| AppError::not_found("Pattern template", &request.pattern))?;

    let task = request.inputs.get(TASK_VARIABLE).map(|t| t.trim()).unwrap_or_default();
    if task.is_empty() {
        return Err(AppError::Validation("Describe a task to apply the pattern to".to_string()));
    }

    if let Some((name, _)) = request.inputs.iter().find(|(_, v)| v.chars().count() > INPUT_MAX) {
        return Err(AppError::Validation(format!(
            "Input '{}' must be at most {} characters",
            name, INPUT_MAX
        )));
    }

    let missing = parse_template_variables(template.body)
        .into_iter()
        .filter(|v| v.default.is_none())
        .filter(|v| request.inputs.get(&v.name).is_none_or(|value| value.trim().is_empty()))
        .map(|v| v.name)
        .collect();

    Ok(RenderedPrompt {
        pattern: template.pattern.to_string(),
        prompt: replace_template_variables(template.body, &request.inputs).trim().to_string(),
        missing,
    })
}
