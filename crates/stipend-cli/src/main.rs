//! Stipend CLI - Student finance dashboard
//!
//! Usage:
//!   stipend summary --from 2023-01-01       Monthly cash flow
//!   stipend anomalies --threshold 2.5       Unusual expenses
//!   stipend scenarios presets               What-if comparisons
//!   stipend roi                             Degree break-even estimates

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();

    let config_path = cli.config.as_deref();
    let data_dir = cli.data_dir.as_deref();
    let json = cli.json;
    let session = || commands::load_session(config_path, data_dir);

    match cli.command {
        Commands::Summary { from, to } => {
            let (from, to) = commands::parse_window(from.as_deref(), to.as_deref())?;
            commands::cmd_summary(&session()?.dataset, from, to, json)
        }
        Commands::Categories { from, to } => {
            let (from, to) = commands::parse_window(from.as_deref(), to.as_deref())?;
            commands::cmd_categories(&session()?.dataset, from, to, json)
        }
        Commands::Groups { from, to } => {
            let (from, to) = commands::parse_window(from.as_deref(), to.as_deref())?;
            commands::cmd_groups(&session()?.dataset, from, to, json)
        }
        Commands::Metrics => commands::cmd_metrics(&session()?.dataset, json),
        Commands::Payments => commands::cmd_payments(&session()?.dataset, json),
        Commands::Cities => commands::cmd_cities(&session()?.dataset, json),
        Commands::Anomalies { threshold, limit } => {
            let session = session()?;
            let mut detection = session.config.detection;
            if let Some(t) = threshold {
                detection.threshold = t;
            }
            commands::cmd_anomalies(&session.dataset, detection, limit, json)
        }
        Commands::Scenarios { action } => match action {
            ScenariosAction::Presets { export } => {
                commands::cmd_scenarios_presets(&session()?.dataset, export.as_deref(), json)
            }
            ScenariosAction::Custom {
                name,
                adjust,
                salary,
                export,
            } => commands::cmd_scenarios_custom(
                &session()?.dataset,
                &name,
                &adjust,
                salary,
                export.as_deref(),
                json,
            ),
        },
        Commands::Roi => {
            let session = session()?;
            commands::cmd_roi(&session.dataset, session.config.roi, json)
        }
        Commands::Status => {
            let config = commands::load_config(config_path)?;
            commands::cmd_status(&config, data_dir, json)
        }
    }
}
