use clap::Parser;
use colored::*;
use serde_json::Value;
use std::process;

use drugscout::cli::ConnectionArgs;
use drugscout::config::ScoutConfig;
use drugscout::mcp::types::Outcome;
use drugscout::mcp::McpSession;
use drugscout::ui;

/// Invoke one tool on an MCP server with raw JSON arguments. Debugging
/// companion to the scripted demos.
#[derive(Parser, Debug)]
#[command(name = "call-tool")]
#[command(about = "Invoke a single MCP tool with raw JSON arguments", long_about = None)]
struct Args {
    #[command(flatten)]
    conn: ConnectionArgs,

    #[arg(help = "Tool name, e.g. search_drug_labels")]
    tool: String,

    #[arg(help = "Arguments as a JSON object, e.g. '{\"search\":\"aspirin\",\"limit\":1}'")]
    arguments: Option<String>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match ScoutConfig::from_env_and_args(&args.conn) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            process::exit(1);
        }
    };

    let arguments: Value = match args.arguments.as_deref() {
        Some(raw) => match serde_json::from_str(raw) {
            Ok(Value::Object(map)) => Value::Object(map),
            Ok(_) => {
                eprintln!("{} arguments must be a JSON object", "Error:".red());
                process::exit(1);
            }
            Err(e) => {
                eprintln!("{} arguments are not valid JSON: {}", "Error:".red(), e);
                process::exit(1);
            }
        },
        None => Value::Object(serde_json::Map::new()),
    };

    let mut session = match McpSession::open(&config.transport, config.verbose).await {
        Ok(session) => session,
        Err(e) => {
            ui::print_fatal(&e);
            process::exit(1);
        }
    };

    let result = session.invoke(&args.tool, arguments).await;
    session.close().await;

    match result {
        Ok(invocation) => {
            ui::print_invocation(&invocation);
            if matches!(invocation.outcome, Outcome::Failure(_)) {
                process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            process::exit(1);
        }
    }
}
