use crate::catalog::{Catalog, PromptEntry, ResourceEntry, ToolEntry};
use crate::config::TransportConfig;
use crate::error::{Result, ScoutError};
use crate::mcp::transport::McpTransport;
use crate::mcp::types::{InvocationResult, McpTool, Outcome};
use crate::mcp::McpSession;
use chrono::{DateTime, Local};
use serde_json::{json, Value};
use std::future::Future;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Connecting,
    Exploring,
    Invoking(usize),
    Done,
    Failed,
}

/// Which tool a scripted step addresses.
#[derive(Debug, Clone)]
pub enum StepTarget {
    Named(String),
    /// The first tool the server advertises, whatever it is.
    FirstListed,
}

/// How the step's arguments are built.
#[derive(Debug, Clone)]
pub enum ArgSpec {
    Literal(Value),
    /// Fill every required property from the tool's schema with defaults.
    FromSchema,
}

#[derive(Debug, Clone)]
pub struct DemoStep {
    pub label: String,
    pub target: StepTarget,
    pub args: ArgSpec,
}

impl DemoStep {
    pub fn named(label: &str, tool: &str, args: Value) -> Self {
        Self {
            label: label.to_string(),
            target: StepTarget::Named(tool.to_string()),
            args: ArgSpec::Literal(args),
        }
    }

    pub fn first_listed(label: &str) -> Self {
        Self {
            label: label.to_string(),
            target: StepTarget::FirstListed,
            args: ArgSpec::FromSchema,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerSummary {
    pub name: String,
    pub version: String,
    pub protocol_version: String,
    pub supports_tools: bool,
    pub supports_resources: bool,
    pub supports_prompts: bool,
}

impl ServerSummary {
    fn from_session(session: &McpSession) -> Self {
        let caps = session.capabilities();
        Self {
            name: session.server_info().name.clone(),
            version: session.server_info().version.clone(),
            protocol_version: session.protocol_version().to_string(),
            supports_tools: caps.tools.is_some(),
            supports_resources: caps.resources.is_some(),
            supports_prompts: caps.prompts.is_some(),
        }
    }
}

/// One scripted step's entry in the report.
#[derive(Debug, Clone)]
pub struct StepReport {
    pub label: String,
    pub invocation: InvocationResult,
}

#[derive(Debug)]
pub struct RunReport {
    pub started: DateTime<Local>,
    pub server: Option<ServerSummary>,
    pub catalog: Catalog,
    pub results: Vec<StepReport>,
    pub warnings: Vec<String>,
    pub fatal: Option<ScoutError>,
    pub interrupted: bool,
}

impl RunReport {
    fn new() -> Self {
        Self {
            started: Local::now(),
            server: None,
            catalog: Catalog::default(),
            results: Vec::new(),
            warnings: Vec::new(),
            fatal: None,
            interrupted: false,
        }
    }

    pub fn succeeded(&self) -> usize {
        self.results
            .iter()
            .filter(|step| step.invocation.outcome.is_success())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }
}

/// Drives one session through connect, catalog exploration and the scripted
/// invocations. Steps run strictly in order; one failing step never stops
/// the rest, only a failed handshake does.
pub struct DemoRunner {
    steps: Vec<DemoStep>,
    state: RunState,
    verbose: bool,
}

impl DemoRunner {
    pub fn new(steps: Vec<DemoStep>, verbose: bool) -> Self {
        Self {
            steps,
            state: RunState::Idle,
            verbose,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Run to completion with no external cancellation.
    pub async fn run(&mut self, config: &TransportConfig) -> RunReport {
        self.run_with_shutdown(config, std::future::pending()).await
    }

    /// Run until done or until `shutdown` resolves. However the run ends,
    /// a successfully opened session is closed before this returns.
    pub async fn run_with_shutdown<F>(&mut self, config: &TransportConfig, shutdown: F) -> RunReport
    where
        F: Future<Output = ()>,
    {
        let verbose = self.verbose;
        self.run_inner(McpSession::open(config, verbose), shutdown)
            .await
    }

    /// Same flow over a caller-supplied transport.
    pub async fn run_with_transport<F>(
        &mut self,
        transport: Box<dyn McpTransport>,
        shutdown: F,
    ) -> RunReport
    where
        F: Future<Output = ()>,
    {
        let verbose = self.verbose;
        self.run_inner(McpSession::open_with(transport, verbose), shutdown)
            .await
    }

    async fn run_inner<O, F>(&mut self, opening: O, shutdown: F) -> RunReport
    where
        O: Future<Output = Result<McpSession>>,
        F: Future<Output = ()>,
    {
        let mut report = RunReport::new();
        self.state = RunState::Connecting;

        tokio::pin!(opening);
        tokio::pin!(shutdown);

        // If shutdown wins this race the abandoned opening future drops its
        // half-open transport; close() only ever pairs with a completed open.
        let opened = tokio::select! {
            biased;
            result = &mut opening => Some(result),
            _ = &mut shutdown => None,
        };

        let mut session = match opened {
            Some(Ok(session)) => session,
            Some(Err(e)) => {
                report.fatal = Some(e);
                self.state = RunState::Failed;
                return report;
            }
            None => {
                report.interrupted = true;
                self.state = RunState::Failed;
                return report;
            }
        };

        report.server = Some(ServerSummary::from_session(&session));

        let finished = tokio::select! {
            biased;
            _ = self.drive(&mut session, &mut report) => true,
            _ = &mut shutdown => false,
        };

        // The one guaranteed release point for the session, shutdown or not.
        session.close().await;

        if finished {
            self.state = RunState::Done;
        } else {
            report.interrupted = true;
            self.state = RunState::Failed;
        }
        report
    }

    async fn drive(&mut self, session: &mut McpSession, report: &mut RunReport) {
        self.state = RunState::Exploring;

        // The three capability listings are independent; one failing only
        // costs its own section of the report.
        match session.list_tools().await {
            Ok(tools) => report.catalog.tools = tools.iter().map(ToolEntry::from_tool).collect(),
            Err(e) => report.warnings.push(format!("listing tools failed: {}", e)),
        }
        match session.list_resources().await {
            Ok(resources) => {
                report.catalog.resources = resources
                    .iter()
                    .map(ResourceEntry::from_resource)
                    .collect();
            }
            Err(e) => report.warnings.push(format!("listing resources failed: {}", e)),
        }
        match session.list_prompts().await {
            Ok(prompts) => {
                report.catalog.prompts = prompts.iter().map(PromptEntry::from_prompt).collect();
            }
            Err(e) => report.warnings.push(format!("listing prompts failed: {}", e)),
        }

        for (i, step) in self.steps.iter().enumerate() {
            self.state = RunState::Invoking(i);

            let tool_name = match &step.target {
                StepTarget::Named(name) => name.clone(),
                StepTarget::FirstListed => match session.tools().first() {
                    Some(tool) => tool.name.clone(),
                    None => {
                        report.results.push(StepReport {
                            label: step.label.clone(),
                            invocation: InvocationResult {
                                tool_name: "(first listed tool)".to_string(),
                                arguments: json!({}),
                                outcome: Outcome::Failure(
                                    "no tools advertised by the server".to_string(),
                                ),
                            },
                        });
                        continue;
                    }
                },
            };

            let arguments = match &step.args {
                ArgSpec::Literal(value) => value.clone(),
                ArgSpec::FromSchema => derive_arguments(session.tool(&tool_name)),
            };

            let invocation = match session.invoke(&tool_name, arguments.clone()).await {
                Ok(result) => result,
                // Validation failures stay local to the step.
                Err(e) => InvocationResult {
                    tool_name,
                    arguments,
                    outcome: Outcome::Failure(e.to_string()),
                },
            };

            report.results.push(StepReport {
                label: step.label.clone(),
                invocation,
            });
        }
    }
}

/// Build arguments for a tool from its schema: fill each required property,
/// preferring drug-domain hints over bare type defaults.
pub fn derive_arguments(tool: Option<&McpTool>) -> Value {
    let Some(tool) = tool else {
        return json!({});
    };

    let properties = tool.input_schema.get("properties").and_then(Value::as_object);
    let mut arguments = serde_json::Map::new();

    for name in tool.required_params() {
        let ty = properties
            .and_then(|props| props.get(name))
            .and_then(|info| info.get("type"))
            .and_then(Value::as_str)
            .unwrap_or("string");

        let lower = name.to_lowercase();
        let value = if lower.contains("search")
            || lower.contains("query")
            || lower.contains("drug")
            || lower.contains("name")
        {
            json!("aspirin")
        } else if lower.contains("limit") || lower.contains("top_k") {
            json!(3)
        } else {
            match ty {
                "number" | "integer" => json!(1),
                "boolean" => json!(true),
                _ => json!("example text"),
            }
        };

        arguments.insert(name.to_string(), value);
    }

    Value::Object(arguments)
}
