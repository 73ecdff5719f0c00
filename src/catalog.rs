//! Pure reshaping of wire descriptors into display entries. No I/O here;
//! absent optional fields become explicit placeholders.

use crate::mcp::types::{McpPrompt, McpResource, McpTool};
use serde_json::Value;

pub const NO_DESCRIPTION: &str = "(no description)";
pub const NONE: &str = "(none)";

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub tools: Vec<ToolEntry>,
    pub resources: Vec<ResourceEntry>,
    pub prompts: Vec<PromptEntry>,
}

#[derive(Debug, Clone)]
pub struct ParamRow {
    pub name: String,
    pub ty: String,
    pub required: bool,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct ToolEntry {
    pub name: String,
    pub description: String,
    pub params: Vec<ParamRow>,
}

#[derive(Debug, Clone)]
pub struct ResourceEntry {
    pub uri: String,
    pub name: String,
    pub description: String,
    pub mime_type: String,
}

#[derive(Debug, Clone)]
pub struct PromptArgRow {
    pub name: String,
    pub required: bool,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct PromptEntry {
    pub name: String,
    pub description: String,
    pub args: Vec<PromptArgRow>,
}

impl ToolEntry {
    pub fn from_tool(tool: &McpTool) -> Self {
        Self {
            name: tool.name.clone(),
            description: text_or_placeholder(tool.description.as_deref()),
            params: params_from_schema(&tool.input_schema),
        }
    }
}

impl ResourceEntry {
    pub fn from_resource(resource: &McpResource) -> Self {
        Self {
            uri: resource.uri.clone(),
            name: or_none(resource.name.as_deref()),
            description: text_or_placeholder(resource.description.as_deref()),
            mime_type: or_none(resource.mime_type.as_deref()),
        }
    }
}

impl PromptEntry {
    pub fn from_prompt(prompt: &McpPrompt) -> Self {
        Self {
            name: prompt.name.clone(),
            description: text_or_placeholder(prompt.description.as_deref()),
            args: prompt
                .arguments
                .iter()
                .map(|arg| PromptArgRow {
                    name: arg.name.clone(),
                    required: arg.required.unwrap_or(false),
                    description: text_or_placeholder(arg.description.as_deref()),
                })
                .collect(),
        }
    }
}

/// Parameter rows in the schema's own property order, with the `required`
/// array folded into a per-row flag.
fn params_from_schema(schema: &Value) -> Vec<ParamRow> {
    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    schema
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| {
            props
                .iter()
                .map(|(name, info)| ParamRow {
                    name: name.clone(),
                    ty: info
                        .get("type")
                        .and_then(Value::as_str)
                        .unwrap_or("unknown")
                        .to_string(),
                    required: required.contains(&name.as_str()),
                    description: text_or_placeholder(
                        info.get("description").and_then(Value::as_str),
                    ),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn or_none(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => NONE.to_string(),
    }
}

fn text_or_placeholder(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => NO_DESCRIPTION.to_string(),
    }
}
