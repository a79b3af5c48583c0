//! Status command: configuration, data files and load report

use std::path::Path;

use anyhow::Result;
use serde::Serialize;
use stipend_core::config::default_config_path;
use stipend_core::{CleaningReport, DashboardConfig, Dataset, LoadReport};

use super::{format_currency, print_json};

#[derive(Serialize)]
struct StatusReport<'a> {
    files: Vec<FileStatus>,
    anomaly_threshold: f64,
    cache_ttl_secs: u64,
    report: Option<&'a LoadReport>,
    error: Option<String>,
}

#[derive(Serialize)]
struct FileStatus {
    table: &'static str,
    path: String,
    exists: bool,
}

/// Report where data is read from and how loading went. Load failures are
/// shown rather than returned.
pub fn cmd_status(config: &DashboardConfig, data_dir: Option<&Path>, json: bool) -> Result<()> {
    let paths = config.data_paths(data_dir);
    let files: Vec<FileStatus> = [
        ("expenses", &paths.expenses),
        ("income", &paths.income),
        ("city_costs", &paths.city_costs),
        ("salary_reference", &paths.salary_reference),
    ]
    .into_iter()
    .map(|(table, path)| FileStatus {
        table,
        path: path.display().to_string(),
        exists: path.exists(),
    })
    .collect();

    let loaded = Dataset::load_with(&paths, config.quality);
    let (report, error) = match &loaded {
        Ok(dataset) => (Some(&dataset.report), None),
        Err(e) => (None, Some(e.to_string())),
    };

    if json {
        return print_json(&StatusReport {
            files,
            anomaly_threshold: config.detection.threshold,
            cache_ttl_secs: config.cache_ttl.as_secs(),
            report,
            error,
        });
    }

    println!();
    println!("📊 Stipend Status");
    println!("   ─────────────────────────────────────────────────────────────");
    match default_config_path() {
        Some(path) if path.exists() => println!("   Config override: {}", path.display()),
        _ => println!("   Config override: (none, using defaults)"),
    }
    println!("   Anomaly threshold: {}", config.detection.threshold);
    println!();

    for f in &files {
        let mark = if f.exists { "✅" } else { "❌" };
        println!("   {} {:17} {}", mark, f.table, f.path);
    }

    if let Some(err) = error {
        println!();
        println!("   ❌ Error loading data: {}", err);
        println!();
        return Ok(());
    }

    if let Some(report) = report {
        println!();
        print_cleaning("Expenses", &report.expenses);
        print_cleaning("Income", &report.income);
        println!(
            "   City costs: {} rows, salary reference: {} rows ({} dropped)",
            report.city_cost_rows, report.salary_reference_rows, report.salary_reference_dropped
        );
        if let Some((start, end)) = report.date_range {
            println!("   Date range: {} to {}", start, end);
        }

        if report.issues.is_empty() {
            println!();
            println!("   ✅ No data quality issues");
        } else {
            println!();
            for issue in &report.issues {
                println!("   ⚠️  {}", issue);
            }
        }
    }

    println!();
    Ok(())
}

fn print_cleaning(label: &str, r: &CleaningReport) {
    println!(
        "   {}: {} kept of {} read (duplicates {}, negatives {}, filled amounts {})",
        label, r.rows_kept, r.rows_read, r.duplicates_removed, r.negatives_dropped, r.amounts_filled
    );
    if r.rows_kept > 0 {
        println!("      Largest amount: {}", format_currency(r.max_amount));
    }
}
