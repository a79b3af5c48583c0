//! Shared utilities for commands
//!
//! This module contains:
//! - `load_config` / `load_session` - Resolve config and load the four CSV files
//! - `parse_window` - Parse `--from` / `--to` date arguments
//! - `parse_adjustments` - Parse `Category=delta` scenario arguments

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use stipend_core::{DashboardConfig, Dataset};
use tracing::debug;

/// Loaded configuration and data for one invocation
pub struct Session {
    pub config: DashboardConfig,
    pub dataset: Dataset,
}

pub fn load_config(config_path: Option<&Path>) -> Result<DashboardConfig> {
    DashboardConfig::load(config_path).context("Failed to load configuration")
}

pub fn load_session(config_path: Option<&Path>, data_dir: Option<&Path>) -> Result<Session> {
    let config = load_config(config_path)?;
    let paths = config.data_paths(data_dir);
    debug!("Loading expenses from {}", paths.expenses.display());

    let dataset = Dataset::load_with(&paths, config.quality).with_context(|| {
        format!(
            "Failed to load dashboard data (try --data-dir; expected files in {})",
            data_dir.unwrap_or(config.data.dir.as_path()).display()
        )
    })?;

    Ok(Session { config, dataset })
}

fn parse_date_arg(value: Option<&str>, flag: &str) -> Result<Option<NaiveDate>> {
    value
        .map(|v| {
            NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d")
                .with_context(|| format!("Invalid --{} date format (use YYYY-MM-DD)", flag))
        })
        .transpose()
}

/// Parse an optional `--from` / `--to` pair
pub fn parse_window(
    from: Option<&str>,
    to: Option<&str>,
) -> Result<(Option<NaiveDate>, Option<NaiveDate>)> {
    let from = parse_date_arg(from, "from")?;
    let to = parse_date_arg(to, "to")?;
    if let (Some(f), Some(t)) = (from, to) {
        if f > t {
            bail!("--from {} is after --to {}", f, t);
        }
    }
    Ok((from, to))
}

/// Parse `Category=delta` pairs; delta is a fraction (0.1) or a percentage (10%)
pub fn parse_adjustments(args: &[String]) -> Result<BTreeMap<String, f64>> {
    let mut adjustments = BTreeMap::new();
    for arg in args {
        let Some((category, delta)) = arg.split_once('=') else {
            bail!("Invalid adjustment '{}': expected CATEGORY=DELTA", arg);
        };
        let category = category.trim();
        if category.is_empty() {
            bail!("Invalid adjustment '{}': missing category", arg);
        }

        let delta = delta.trim();
        let value = match delta.strip_suffix('%') {
            Some(pct) => pct.trim().parse::<f64>().map(|p| p / 100.0),
            None => delta.parse::<f64>(),
        }
        .with_context(|| format!("Invalid adjustment '{}': '{}' is not a number", arg, delta))?;
        if !value.is_finite() {
            bail!("Invalid adjustment '{}': delta must be finite", arg);
        }

        adjustments.insert(category.to_string(), value);
    }
    Ok(adjustments)
}
