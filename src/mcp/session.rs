use crate::config::{TransportConfig, TransportKind};
use crate::error::{Result, ScoutError};
use crate::mcp::transport::{McpTransport, CODE_METHOD_NOT_FOUND};
use crate::mcp::transport_http::StreamableHttpTransport;
use crate::mcp::transport_sse::SseTransport;
use crate::mcp::types::{
    InitializeResult, InvocationResult, McpPrompt, McpResource, McpTool, Outcome, Payload,
    PromptListResponse, ResourceListResponse, ServerCapabilities, ServerInfo, ToolCallResult,
    ToolListResponse,
};
use colored::*;
use jsonschema::JSONSchema;
use serde_json::{json, Value};
use tokio::time::timeout;

const MCP_PROTOCOL_VERSION: &str = "2024-11-05";
const CLIENT_NAME: &str = "drugscout";

/// One live connection to an MCP server. Owns the transport; `close` takes
/// it out so a second call is a no-op.
pub struct McpSession {
    transport: Option<Box<dyn McpTransport>>,
    init: InitializeResult,
    tools: Option<Vec<McpTool>>,
    verbose: bool,
}

impl McpSession {
    /// Build the transport for the configured kind and perform the MCP
    /// handshake, all bounded by the connect timeout. On timeout the
    /// in-flight transport is dropped, not closed.
    pub async fn open(config: &TransportConfig, verbose: bool) -> Result<Self> {
        let transport: Box<dyn McpTransport> = match config.kind {
            TransportKind::Sse => Box::new(SseTransport::new(config)?),
            TransportKind::StreamableHttp => Box::new(StreamableHttpTransport::new(config)?),
        };

        timeout(config.connect_timeout, Self::open_with(transport, verbose))
            .await
            .map_err(|_| {
                ScoutError::Timeout(format!(
                    "handshake with {} exceeded {}s",
                    config.url,
                    config.connect_timeout.as_secs()
                ))
            })?
    }

    /// Handshake over an already-built transport. The transport is closed
    /// again if any handshake step fails, so open/close always pair up.
    pub async fn open_with(mut transport: Box<dyn McpTransport>, verbose: bool) -> Result<Self> {
        transport.open().await?;

        match Self::handshake(transport.as_mut(), verbose).await {
            Ok(init) => Ok(Self {
                transport: Some(transport),
                init,
                tools: None,
                verbose,
            }),
            Err(e) => {
                let _ = transport.close().await;
                Err(e)
            }
        }
    }

    async fn handshake(transport: &mut dyn McpTransport, verbose: bool) -> Result<InitializeResult> {
        let params = json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": {
                "name": CLIENT_NAME,
                "version": env!("CARGO_PKG_VERSION"),
            },
        });

        let raw = transport.request("initialize", params).await?;
        let init: InitializeResult = serde_json::from_value(raw)?;

        if verbose {
            eprintln!(
                "{}",
                format!(
                    "[scout] connected to {} v{} (protocol {})",
                    init.server_info.name, init.server_info.version, init.protocol_version
                )
                .dimmed()
            );
        }

        transport.notify("notifications/initialized", json!({})).await?;
        Ok(init)
    }

    pub fn server_info(&self) -> &ServerInfo {
        &self.init.server_info
    }

    pub fn protocol_version(&self) -> &str {
        &self.init.protocol_version
    }

    pub fn capabilities(&self) -> &ServerCapabilities {
        &self.init.capabilities
    }

    /// Tool descriptors cached by the last successful `list_tools`.
    pub fn tools(&self) -> &[McpTool] {
        self.tools.as_deref().unwrap_or(&[])
    }

    pub fn tool(&self, name: &str) -> Option<&McpTool> {
        self.tools().iter().find(|tool| tool.name == name)
    }

    /// List the server's tools. An absent capability or a "method not found"
    /// answer yields an empty list, never an error.
    pub async fn list_tools(&mut self) -> Result<Vec<McpTool>> {
        if self.init.capabilities.tools.is_none() {
            self.tools = Some(Vec::new());
            return Ok(Vec::new());
        }

        match self.transport_mut()?.request("tools/list", json!({})).await {
            Ok(raw) => {
                let list: ToolListResponse = serde_json::from_value(raw)?;
                self.tools = Some(list.tools.clone());
                Ok(list.tools)
            }
            Err(ScoutError::Rpc { code, .. }) if code == CODE_METHOD_NOT_FOUND => {
                self.tools = Some(Vec::new());
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn list_resources(&mut self) -> Result<Vec<McpResource>> {
        if self.init.capabilities.resources.is_none() {
            return Ok(Vec::new());
        }

        match self
            .transport_mut()?
            .request("resources/list", json!({}))
            .await
        {
            Ok(raw) => {
                let list: ResourceListResponse = serde_json::from_value(raw)?;
                Ok(list.resources)
            }
            Err(ScoutError::Rpc { code, .. }) if code == CODE_METHOD_NOT_FOUND => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    pub async fn list_prompts(&mut self) -> Result<Vec<McpPrompt>> {
        if self.init.capabilities.prompts.is_none() {
            return Ok(Vec::new());
        }

        match self
            .transport_mut()?
            .request("prompts/list", json!({}))
            .await
        {
            Ok(raw) => {
                let list: PromptListResponse = serde_json::from_value(raw)?;
                Ok(list.prompts)
            }
            Err(ScoutError::Rpc { code, .. }) if code == CODE_METHOD_NOT_FOUND => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Call one tool. Arguments are validated against the advertised schema
    /// before anything goes on the wire; a validation failure is the only
    /// error this returns. Transport and remote failures are captured in the
    /// result so a batch can keep going.
    pub async fn invoke(&mut self, tool_name: &str, arguments: Value) -> Result<InvocationResult> {
        if self.tools.is_none() {
            self.list_tools().await?;
        }

        let descriptor = match self.tool(tool_name) {
            Some(tool) => tool.clone(),
            None => {
                return Ok(InvocationResult {
                    tool_name: tool_name.to_string(),
                    arguments,
                    outcome: Outcome::Failure(format!(
                        "tool '{}' is not advertised by the server",
                        tool_name
                    )),
                })
            }
        };

        self.validate_arguments(&descriptor, &arguments)?;

        if self.verbose {
            eprintln!(
                "{}",
                format!("[scout] calling {} with {}", tool_name, arguments).dimmed()
            );
        }

        let params = json!({
            "name": tool_name,
            "arguments": arguments,
        });
        let outcome = match self.transport_mut()?.request("tools/call", params).await {
            Ok(raw) => match serde_json::from_value::<ToolCallResult>(raw) {
                Ok(result) => outcome_from_result(result),
                Err(e) => Outcome::Failure(format!("unreadable tool result: {}", e)),
            },
            Err(e) => Outcome::Failure(e.to_string()),
        };

        Ok(InvocationResult {
            tool_name: tool_name.to_string(),
            arguments,
            outcome,
        })
    }

    fn validate_arguments(&self, tool: &McpTool, arguments: &Value) -> Result<()> {
        // Fail fast on missing required names before compiling the schema,
        // so the message lists exactly what the caller forgot.
        let missing: Vec<&str> = tool
            .required_params()
            .into_iter()
            .filter(|name| arguments.get(name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ScoutError::Validation {
                tool: tool.name.clone(),
                message: format!("missing required arguments: {}", missing.join(", ")),
            });
        }

        if tool.input_schema.is_object() {
            let schema = JSONSchema::compile(&tool.input_schema).map_err(|e| {
                ScoutError::Validation {
                    tool: tool.name.clone(),
                    message: format!("tool schema does not compile: {}", e),
                }
            })?;
            // The error iterator borrows the compiled schema, so the
            // messages are collected before anything is returned.
            let details: Vec<String> = match schema.validate(arguments) {
                Ok(()) => Vec::new(),
                Err(errors) => errors
                    .map(|e| format!("{}: {}", e.instance_path, e))
                    .collect(),
            };
            if !details.is_empty() {
                return Err(ScoutError::Validation {
                    tool: tool.name.clone(),
                    message: details.join("; "),
                });
            }
        }

        Ok(())
    }

    /// Idempotent: the first call releases the transport, later calls are
    /// no-ops.
    pub async fn close(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            let _ = transport.close().await;
            if self.verbose {
                eprintln!("{}", "[scout] session closed".dimmed());
            }
        }
    }

    fn transport_mut(&mut self) -> Result<&mut Box<dyn McpTransport>> {
        self.transport
            .as_mut()
            .ok_or_else(|| ScoutError::Protocol("session is closed".to_string()))
    }
}

fn outcome_from_result(result: ToolCallResult) -> Outcome {
    let text = result
        .content
        .iter()
        .filter(|content| content.content_type == "text")
        .map(|content| content.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    if result.is_error == Some(true) {
        let message = if text.is_empty() {
            "tool reported an error without details".to_string()
        } else {
            text
        };
        Outcome::Failure(message)
    } else {
        Outcome::Success(Payload::from_text(text))
    }
}
