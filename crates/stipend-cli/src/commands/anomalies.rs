//! Anomaly listing

use anyhow::Result;
use stipend_core::{AnomalyDetector, Dataset, DetectionConfig};

use super::{format_currency, print_json, truncate};

/// List anomalies, showing at most `limit` rows (JSON output is never truncated)
pub fn cmd_anomalies(
    dataset: &Dataset,
    detection: DetectionConfig,
    limit: usize,
    json: bool,
) -> Result<()> {
    let anomalies = AnomalyDetector::with_config(&dataset.expenses, detection).detect();
    if json {
        return print_json(&anomalies);
    }

    println!();
    println!("🚨 Unusual Expenses (|z| > {})", detection.threshold);
    println!("   ─────────────────────────────────────────────────────────────");

    if anomalies.is_empty() {
        println!("   ✅ No unusual expenses found.");
        return Ok(());
    }

    println!(
        "   {:10} │ {:18} │ {:>12} │ {:>6} │ {:>12}",
        "Date", "Category", "Amount", "Z", "Typical"
    );
    println!("   ───────────┼────────────────────┼──────────────┼────────┼──────────────");
    for a in anomalies.iter().take(limit) {
        println!(
            "   {:10} │ {:18} │ {:>12} │ {:>6.2} │ {:>12}",
            a.date,
            truncate(&a.category, 18),
            format_currency(a.amount),
            a.z_score,
            format_currency(a.category_mean),
        );
    }

    if anomalies.len() > limit {
        println!();
        println!(
            "   ... and {} more (use --limit to show more)",
            anomalies.len() - limit
        );
    }

    Ok(())
}
