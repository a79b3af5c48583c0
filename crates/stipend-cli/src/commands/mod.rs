//! CLI command implementations
//!
//! Commands are organized by dashboard tab:
//! - `reports` - Overview reports (summary, categories, groups, metrics, payments, cities)
//! - `anomalies` - Unusual expense listing
//! - `scenarios` - Preset and custom what-if scenarios
//! - `roi` - Degree ROI and break-even
//! - `session` - Shared utilities (config/data loading, argument parsing)
//! - `status` - Configuration and load report

pub mod anomalies;
pub mod reports;
pub mod roi;
pub mod scenarios;
pub mod session;
pub mod status;

// Re-export command functions for main.rs
pub use anomalies::*;
pub use reports::*;
pub use roi::*;
pub use scenarios::*;
pub use session::*;
pub use status::*;

use anyhow::{Context, Result};
use serde::Serialize;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// "$1,234.56", with a leading minus for negatives
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return "n/a".to_string();
    }
    let cents = (amount.abs() * 100.0).round() as u64;
    let digits = (cents / 100).to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

/// Signed percentage with one decimal, e.g. "+8.0%"
pub fn format_percent(pct: f64) -> String {
    format!("{:+.1}%", pct)
}

pub fn format_years(years: f64) -> String {
    if years.is_finite() {
        format!("{:.1} years", years)
    } else {
        "never".to_string()
    }
}

/// Pretty-print a value as JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output as JSON")?;
    println!("{}", json);
    Ok(())
}
