//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::fs;
use std::path::Path;

use stipend_core::test_utils::{
    dataset, date, expense, income, salary_reference, three_month_baseline,
};
use stipend_core::{CityCost, Dataset, DetectionConfig, FallbackSalaries};
use tempfile::TempDir;

use crate::commands::{self, format_currency, format_percent, format_years, truncate};

fn sample_dataset() -> Dataset {
    let (mut expenses, income_rows) = three_month_baseline();
    expenses.push(expense(date(2023, 2, 10), "Tuition", 8000.0));
    let city_costs = vec![CityCost {
        city: "Austin".into(),
        category: "Rent".into(),
        monthly_cost: 1650.0,
    }];
    dataset(expenses, income_rows, city_costs, salary_reference())
}

fn write_data_dir(dir: &Path) {
    fs::write(
        dir.join("cost_of_living.csv"),
        "Date,Category,Amount,PaymentType,City\n\
         2023-01-01,Rent,1200,Bank Transfer,Austin\n\
         2023-01-15,Groceries,300,Credit Card,Austin\n",
    )
    .unwrap();
    fs::write(
        dir.join("salary.csv"),
        "Date,Amount,Category,City\n2023-01-28,2500,Part-Time,Austin\n",
    )
    .unwrap();
    fs::write(
        dir.join("city_costs.csv"),
        "City,Category,MonthlyCost\nAustin,Rent,1650\n",
    )
    .unwrap();
    fs::write(
        dir.join("salary_data.csv"),
        "City,Role,AverageSalary\nAustin,Software Engineer,110000\n",
    )
    .unwrap();
}

// ========== Formatting Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("Rent", 10), "Rent");
    assert_eq!(truncate("Combined (Rent +10%)", 10), "Combine...");
    assert_eq!(truncate("Café Münster", 6), "Caf...");
}

#[test]
fn test_format_currency() {
    assert_eq!(format_currency(0.0), "$0.00");
    assert_eq!(format_currency(1234.567), "$1,234.57");
    assert_eq!(format_currency(1_000_000.0), "$1,000,000.00");
    assert_eq!(format_currency(-50.0), "-$50.00");
    assert_eq!(format_currency(-0.001), "$0.00");
    assert_eq!(format_currency(f64::INFINITY), "n/a");
}

#[test]
fn test_format_percent_and_years() {
    assert_eq!(format_percent(8.0), "+8.0%");
    assert_eq!(format_percent(-12.04), "-12.0%");
    assert_eq!(format_years(2.31), "2.3 years");
    assert_eq!(format_years(f64::INFINITY), "never");
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_parse_adjustments() {
    let args = vec![
        "Rent=0.10".to_string(),
        "Groceries = -15%".to_string(),
        "Rent=0.2".to_string(),
    ];
    let adjustments = commands::parse_adjustments(&args).unwrap();
    assert_eq!(adjustments.len(), 2);
    assert_eq!(adjustments["Rent"], 0.2);
    assert!((adjustments["Groceries"] + 0.15).abs() < 1e-12);
}

#[test]
fn test_parse_adjustments_rejects_malformed() {
    assert!(commands::parse_adjustments(&["Rent".to_string()]).is_err());
    assert!(commands::parse_adjustments(&["=0.1".to_string()]).is_err());
    assert!(commands::parse_adjustments(&["Rent=lots".to_string()]).is_err());
    assert!(commands::parse_adjustments(&["Rent=inf".to_string()]).is_err());
}

#[test]
fn test_parse_window() {
    let (from, to) = commands::parse_window(Some("2023-01-01"), None).unwrap();
    assert_eq!(from, Some(date(2023, 1, 1)));
    assert_eq!(to, None);

    assert!(commands::parse_window(Some("01/05/2023"), None).is_err());
    assert!(commands::parse_window(Some("2023-03-01"), Some("2023-01-01")).is_err());
}

// ========== Report Command Tests ==========

#[test]
fn test_report_commands_render() {
    let data = sample_dataset();
    for json in [false, true] {
        assert!(commands::cmd_summary(&data, None, None, json).is_ok());
        assert!(commands::cmd_categories(&data, Some(date(2023, 2, 1)), None, json).is_ok());
        assert!(commands::cmd_groups(&data, None, None, json).is_ok());
        assert!(commands::cmd_metrics(&data, json).is_ok());
        assert!(commands::cmd_payments(&data, json).is_ok());
        assert!(commands::cmd_cities(&data, json).is_ok());
    }
}

#[test]
fn test_report_commands_handle_empty_data() {
    let data = dataset(vec![], vec![], vec![], vec![]);
    assert!(commands::cmd_summary(&data, None, None, false).is_ok());
    assert!(commands::cmd_categories(&data, None, None, false).is_ok());
    assert!(commands::cmd_payments(&data, false).is_ok());
    assert!(commands::cmd_cities(&data, false).is_ok());
    assert!(commands::cmd_roi(&data, FallbackSalaries::default(), false).is_ok());
}

#[test]
fn test_cmd_anomalies_with_limit() {
    let mut expenses: Vec<_> = [50.0, 55.0, 52.0, 51.0, 5000.0]
        .iter()
        .enumerate()
        .map(|(i, a)| expense(date(2024, 3, i as u32 + 1), "Travel", *a))
        .collect();
    expenses.push(expense(date(2024, 3, 9), "Rent", 1200.0));
    let data = dataset(expenses, vec![], vec![], vec![]);

    let detection = DetectionConfig { threshold: 1.5 };
    assert!(commands::cmd_anomalies(&data, detection, 0, false).is_ok());
    assert!(commands::cmd_anomalies(&data, detection, 10, true).is_ok());
    assert!(commands::cmd_anomalies(&data, DetectionConfig::default(), 10, false).is_ok());
}

// ========== Scenario Command Tests ==========

#[test]
fn test_cmd_scenarios_presets() {
    let data = sample_dataset();
    assert!(commands::cmd_scenarios_presets(&data, None, false).is_ok());
    assert!(commands::cmd_scenarios_presets(&data, None, true).is_ok());
}

#[test]
fn test_cmd_scenarios_custom_exports_csv() {
    let data = sample_dataset();
    let temp = TempDir::new().unwrap();
    let export = temp.path().join("custom.csv");

    let adjust = vec!["Rent=10%".to_string(), "Skiing=0.5".to_string()];
    commands::cmd_scenarios_custom(&data, "Rent up", &adjust, 0.05, Some(export.as_path()), false).unwrap();

    let text = fs::read_to_string(&export).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Scenario,Total Expenses"));
    assert!(lines[1].starts_with("Baseline,"));
    assert!(lines[2].starts_with("Rent up,"));
}

#[test]
fn test_cmd_scenarios_custom_rejects_bad_adjustment() {
    let data = sample_dataset();
    let result =
        commands::cmd_scenarios_custom(&data, "bad", &["Rent:0.1".to_string()], 0.0, None, false);
    assert!(result.is_err());
}

#[test]
fn test_baseline_engine_uses_full_tables() {
    let data = sample_dataset();
    let engine = commands::baseline_engine(&data);
    let metrics = engine.baseline_metrics().unwrap();
    assert_eq!(metrics.total_expenses, 4500.0 + 8000.0);
    assert_eq!(metrics.total_income, 7500.0);
    assert!(engine.available_categories().contains(&"Tuition".to_string()));
}

// ========== ROI Command Tests ==========

#[test]
fn test_cmd_roi() {
    let data = sample_dataset();
    assert!(commands::cmd_roi(&data, FallbackSalaries::default(), false).is_ok());
    assert!(commands::cmd_roi(&data, FallbackSalaries::default(), true).is_ok());

    let no_reference = dataset(
        vec![expense(date(2023, 1, 1), "Rent", 1200.0)],
        vec![income(date(2023, 1, 28), 2500.0, "Austin")],
        vec![],
        vec![],
    );
    assert!(commands::cmd_roi(&no_reference, FallbackSalaries::default(), false).is_ok());
}

// ========== Session and Status Tests ==========

#[test]
fn test_load_session_from_data_dir() {
    let temp = TempDir::new().unwrap();
    write_data_dir(temp.path());

    let session = commands::load_session(None, Some(temp.path())).unwrap();
    assert_eq!(session.dataset.expenses.len(), 2);
    assert_eq!(session.dataset.income.len(), 1);
    assert_eq!(session.dataset.salary_reference.len(), 1);
}

#[test]
fn test_load_session_missing_data_fails() {
    let temp = TempDir::new().unwrap();
    let err = commands::load_session(None, Some(temp.path())).err().unwrap();
    assert!(format!("{:#}", err).contains("cost_of_living.csv"));
}

#[test]
fn test_load_session_with_config_file() {
    let data = TempDir::new().unwrap();
    write_data_dir(data.path());
    fs::rename(
        data.path().join("cost_of_living.csv"),
        data.path().join("spend.csv"),
    )
    .unwrap();

    let config_dir = TempDir::new().unwrap();
    let config_path = config_dir.path().join("stipend.toml");
    fs::write(
        &config_path,
        "[data]\nexpenses = \"spend.csv\"\n\n[anomaly]\nthreshold = 3.0\n",
    )
    .unwrap();

    let session = commands::load_session(Some(config_path.as_path()), Some(data.path())).unwrap();
    assert_eq!(session.config.detection.threshold, 3.0);
    assert_eq!(session.dataset.expenses.len(), 2);
}

#[test]
fn test_cmd_status_reports_without_failing() {
    let config = commands::load_config(None).unwrap();

    let empty = TempDir::new().unwrap();
    assert!(commands::cmd_status(&config, Some(empty.path()), false).is_ok());
    assert!(commands::cmd_status(&config, Some(empty.path()), true).is_ok());

    let temp = TempDir::new().unwrap();
    write_data_dir(temp.path());
    assert!(commands::cmd_status(&config, Some(temp.path()), false).is_ok());
}
