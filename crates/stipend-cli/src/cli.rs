//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Stipend - Student finance dashboard
#[derive(Parser)]
#[command(name = "stipend")]
#[command(about = "Expense analytics, what-if scenarios and degree ROI for students", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to the data-dir override, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the four CSV files (overrides the config)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print results as JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Monthly expenses, income and cumulative net
    Summary {
        /// Start date (YYYY-MM-DD), defaults to the first expense
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD), defaults to the last expense
        #[arg(long)]
        to: Option<String>,
    },

    /// Spending per category
    Categories {
        #[arg(long)]
        from: Option<String>,

        #[arg(long)]
        to: Option<String>,
    },

    /// Spending per category group (Housing, Food, ...)
    Groups {
        #[arg(long)]
        from: Option<String>,

        #[arg(long)]
        to: Option<String>,
    },

    /// Headline totals and tuition figures
    Metrics,

    /// Spending per payment type
    Payments,

    /// Cost-of-living reference per city
    Cities,

    /// Expenses unusually far from their category's typical amount
    Anomalies {
        /// Z-score threshold (defaults to the configured value)
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Maximum rows to display
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// What-if budget scenarios
    Scenarios {
        #[command(subcommand)]
        action: ScenariosAction,
    },

    /// Degree return on investment and break-even estimates
    Roi,

    /// Show configuration, data files and the load report
    Status,
}

#[derive(Subcommand)]
pub enum ScenariosAction {
    /// Run the preset scenario menu and compare against the baseline
    Presets {
        /// Write the comparison table to a CSV file
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Evaluate a custom scenario
    Custom {
        /// Scenario name
        #[arg(short, long)]
        name: String,

        /// Category adjustment, e.g. Rent=0.10 or Groceries=-15% (repeatable)
        #[arg(short, long = "adjust", value_name = "CATEGORY=DELTA")]
        adjust: Vec<String>,

        /// Salary adjustment as a fraction (0.2 = +20%)
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        salary: f64,

        /// Write the comparison table to a CSV file
        #[arg(long)]
        export: Option<PathBuf>,
    },
}
