use clap::Parser;
use colored::*;
use std::process;

use drugscout::cli::{Args, DemoKind};
use drugscout::config::ScoutConfig;
use drugscout::runner::DemoRunner;
use drugscout::{demos, ui};

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

    let steps = match args.demo {
        DemoKind::Drugs => demos::drug_walkthrough(),
        DemoKind::Probe => demos::catalog_probe(),
    };

    ui::print_banner(&config);

    let mut runner = DemoRunner::new(steps, config.verbose);
    let report = runner
        .run_with_shutdown(&config.transport, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;

    ui::print_report(&report);

    if report.interrupted {
        process::exit(130);
    }
    if report.fatal.is_some() {
        process::exit(1);
    }
}
