use crate::catalog::Catalog;
use crate::config::ScoutConfig;
use crate::error::ScoutError;
use crate::mcp::types::{InvocationResult, Outcome};
use crate::runner::RunReport;
use colored::*;

const PAYLOAD_PREVIEW_CHARS: usize = 500;

pub fn print_banner(config: &ScoutConfig) {
    println!("{}", "drugscout — MCP tool session explorer".bold());
    println!(
        "{}",
        format!(
            "transport: {}   endpoint: {}",
            config.transport.kind, config.transport.url
        )
        .dimmed()
    );
    println!("{}", "-".repeat(70).dimmed());
}

pub fn print_report(report: &RunReport) {
    println!(
        "{}",
        format!("run started {}", report.started.format("%Y-%m-%d %H:%M:%S"))
            .dimmed()
    );
    println!();

    if let Some(server) = &report.server {
        println!("{}", "Server".bold().cyan());
        println!("  {} v{}", server.name, server.version);
        println!("  protocol {}", server.protocol_version);
        println!(
            "  capabilities: {}",
            [
                ("tools", server.supports_tools),
                ("resources", server.supports_resources),
                ("prompts", server.supports_prompts),
            ]
            .iter()
            .map(|(name, supported)| {
                if *supported {
                    name.to_string()
                } else {
                    format!("{} (absent)", name)
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
        );
        println!();
    }

    print_catalog(&report.catalog);

    for warning in &report.warnings {
        println!("{}", format!("Warning: {}", warning).yellow());
    }
    if !report.warnings.is_empty() {
        println!();
    }

    if !report.results.is_empty() {
        println!("{}", "Invocations".bold().cyan());
        for step in &report.results {
            println!("{}", format!("• {}", step.label).bold());
            print_invocation(&step.invocation);
        }
    }

    if let Some(fatal) = &report.fatal {
        print_fatal(fatal);
    } else if report.interrupted {
        println!("{}", "Run interrupted; session was closed.".yellow());
    } else {
        println!(
            "{}",
            format!(
                "Done: {} succeeded, {} failed.",
                report.succeeded(),
                report.failed()
            )
            .green()
        );
    }
}

pub fn print_catalog(catalog: &Catalog) {
    println!("{}", "Tools".bold().cyan());
    if catalog.tools.is_empty() {
        println!("  (none)");
    }
    for (i, tool) in catalog.tools.iter().enumerate() {
        println!("  {}. {}", i + 1, tool.name.bold());
        print_description(&tool.description, "     ");
        for param in &tool.params {
            let marker = if param.required {
                "[required]".red()
            } else {
                "[optional]".dimmed()
            };
            let mut desc_lines = param.description.lines();
            println!(
                "     - {} ({}) {}  {}",
                param.name,
                param.ty,
                marker,
                desc_lines.next().unwrap_or("").dimmed()
            );
            for line in desc_lines {
                println!("        {}", line.trim().dimmed());
            }
        }
    }
    println!();

    println!("{}", "Resources".bold().cyan());
    if catalog.resources.is_empty() {
        println!("  (none)");
    }
    for (i, resource) in catalog.resources.iter().enumerate() {
        println!("  {}. {}", i + 1, resource.uri);
        println!(
            "     name: {}  mime: {}",
            resource.name, resource.mime_type
        );
        print_description(&resource.description, "     ");
    }
    println!();

    println!("{}", "Prompts".bold().cyan());
    if catalog.prompts.is_empty() {
        println!("  (none)");
    }
    for (i, prompt) in catalog.prompts.iter().enumerate() {
        println!("  {}. {}", i + 1, prompt.name.bold());
        print_description(&prompt.description, "     ");
        for arg in &prompt.args {
            let marker = if arg.required {
                "[required]".red()
            } else {
                "[optional]".dimmed()
            };
            let mut desc_lines = arg.description.lines();
            println!(
                "     - {} {}  {}",
                arg.name,
                marker,
                desc_lines.next().unwrap_or("").dimmed()
            );
            for line in desc_lines {
                println!("        {}", line.trim().dimmed());
            }
        }
    }
    println!();
}

/// Multi-line descriptions keep their continuation lines, indented under
/// the first.
fn print_description(description: &str, indent: &str) {
    for line in description.lines() {
        println!("{}{}", indent, line.trim().dimmed());
    }
}

pub fn print_invocation(invocation: &InvocationResult) {
    println!(
        "  {} {}",
        invocation.tool_name.bold(),
        invocation.arguments.to_string().dimmed()
    );
    match &invocation.outcome {
        Outcome::Success(payload) => {
            let rendered = payload.render();
            let preview: String = rendered.chars().take(PAYLOAD_PREVIEW_CHARS).collect();
            println!("  {}", "success".green());
            for line in preview.lines() {
                println!("    {}", line);
            }
            if rendered.chars().count() > PAYLOAD_PREVIEW_CHARS {
                println!(
                    "    {}",
                    format!(
                        "... (truncated, full result is {} chars)",
                        rendered.chars().count()
                    )
                    .dimmed()
                );
            }
        }
        Outcome::Failure(message) => {
            println!("  {} {}", "failed:".red(), message);
        }
    }
    println!();
}

/// Fatal errors come with the checklist a stuck user actually needs.
pub fn print_fatal(error: &ScoutError) {
    eprintln!("{} {}", "Error:".red().bold(), error);
    match error {
        ScoutError::Connection(_) | ScoutError::Auth(_) | ScoutError::Timeout(_) => {
            eprintln!("{}", "Check:".dimmed());
            eprintln!("{}", "  1. the endpoint URL is correct".dimmed());
            eprintln!("{}", "  2. the network can reach the server".dimmed());
            eprintln!(
                "{}",
                "  3. DRUGSCOUT_AUTH_KEY and DRUGSCOUT_AUTH_USERCODE are valid".dimmed()
            );
        }
        _ => {}
    }
}
