//! Scenario command implementations (presets, custom)

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use stipend_core::{Dataset, Scenario, ScenarioComparison, ScenarioEngine};

use super::{format_currency, format_percent, parse_adjustments, print_json, truncate};

#[derive(Serialize)]
struct ScenarioReport<'a> {
    comparison: &'a ScenarioComparison,
    best: Option<&'a str>,
    worst: Option<&'a str>,
}

/// Engine with the full expense and income tables as baseline
pub fn baseline_engine(dataset: &Dataset) -> ScenarioEngine {
    let mut engine = ScenarioEngine::new();
    engine.set_baseline(dataset.expenses.clone(), dataset.income.clone());
    engine
}

pub fn cmd_scenarios_presets(dataset: &Dataset, export: Option<&Path>, json: bool) -> Result<()> {
    let mut engine = baseline_engine(dataset);
    engine.run_preset_scenarios()?;
    report(&engine, export, json)
}

pub fn cmd_scenarios_custom(
    dataset: &Dataset,
    name: &str,
    adjust: &[String],
    salary: f64,
    export: Option<&Path>,
    json: bool,
) -> Result<()> {
    let adjustments = parse_adjustments(adjust)?;
    let mut engine = baseline_engine(dataset);
    let scenario = engine.create_scenario(name, &adjustments, salary)?;

    if !json {
        print_ignored(&scenario);
    }
    report(&engine, export, json)
}

fn print_ignored(scenario: &Scenario) {
    if scenario.ignored_adjustments.is_empty() {
        return;
    }
    println!();
    println!(
        "   ⚠️  Not in your data, ignored: {}",
        scenario.ignored_adjustments.join(", ")
    );
}

fn report(engine: &ScenarioEngine, export: Option<&Path>, json: bool) -> Result<()> {
    let comparison = engine.compare_scenarios()?;

    if let Some(path) = export {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        comparison
            .write_csv(file)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    if json {
        return print_json(&ScenarioReport {
            comparison: &comparison,
            best: engine.best_scenario(),
            worst: engine.worst_scenario(),
        });
    }

    println!();
    println!("🔮 Scenario Comparison");
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   {:30} │ {:>12} │ {:>12} │ {:>12} │ {:>8} │ {:>8} │ {:>8}",
        "Scenario", "Expenses", "Income", "Net", "Exp Δ", "Inc Δ", "Net Δ"
    );
    println!(
        "   ───────────────────────────────┼──────────────┼──────────────┼──────────────┼──────────┼──────────┼──────────"
    );
    for row in &comparison.rows {
        println!(
            "   {:30} │ {:>12} │ {:>12} │ {:>12} │ {:>8} │ {:>8} │ {:>8}",
            truncate(&row.scenario, 30),
            format_currency(row.total_expenses),
            format_currency(row.total_income),
            format_currency(row.net_amount),
            format_percent(row.expense_change_pct),
            format_percent(row.income_change_pct),
            format_percent(row.net_change_pct),
        );
    }

    let label = |key: &str| {
        engine
            .scenario(key)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| key.to_string())
    };
    println!();
    match (engine.best_scenario(), engine.worst_scenario()) {
        (Some(best), Some(worst)) => {
            println!("   🏆 Best:  {}", label(best));
            println!("   📉 Worst: {}", label(worst));
        }
        _ => println!("   No scenarios yet."),
    }

    if let Some(path) = export {
        println!();
        println!("   Exported to {}", path.display());
    }

    Ok(())
}
