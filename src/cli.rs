use clap::{Parser, ValueEnum};

/// Connection options shared by every binary. Each one overrides the
/// corresponding environment variable and config-file entry.
#[derive(clap::Args, Debug, Default)]
pub struct ConnectionArgs {
    #[arg(
        short = 't',
        long = "transport",
        help = "Transport kind: 'sse' or 'http' (streamable HTTP)"
    )]
    pub transport: Option<String>,

    #[arg(short = 'e', long = "endpoint", help = "MCP server URL")]
    pub endpoint: Option<String>,

    #[arg(
        long = "connect-timeout",
        help = "Handshake timeout in seconds"
    )]
    pub connect_timeout: Option<u64>,

    #[arg(
        long = "read-timeout",
        help = "Per-call read timeout in seconds"
    )]
    pub read_timeout: Option<u64>,

    #[arg(short = 'v', long = "verbose", help = "Print protocol diagnostics to stderr")]
    pub verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DemoKind {
    /// Scripted OpenFDA drug-information walkthrough
    Drugs,
    /// List the catalog and call the first advertised tool with derived arguments
    Probe,
}

#[derive(Parser, Debug)]
#[command(name = "drugscout")]
#[command(
    about = "Explore an MCP drug-information server: list tools, resources and prompts, then run example tool calls",
    long_about = None
)]
pub struct Args {
    #[command(flatten)]
    pub conn: ConnectionArgs,

    #[arg(
        long = "demo",
        value_enum,
        default_value = "drugs",
        help = "Which scripted sequence to run"
    )]
    pub demo: DemoKind,
}
