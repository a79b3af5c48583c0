//! What-if budget scenarios
//!
//! A [`ScenarioEngine`] owns one baseline snapshot (expenses plus income) and
//! the scenarios evaluated against it. Each scenario scales selected expense
//! categories and total income by fractional deltas, then reports the
//! resulting totals and percent changes relative to the baseline.
//!
//! The engine is a plain value: one per session, passed explicitly.

use std::collections::BTreeMap;
use std::io::Write;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Expense, Income};

/// Totals for the baseline or for an adjusted scenario
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioMetrics {
    pub total_expenses: f64,
    pub total_income: f64,
    /// total_income - total_expenses
    pub net_amount: f64,
}

/// Percent changes against the baseline (10.0 means +10%)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioChanges {
    pub total_expenses: f64,
    pub total_income: f64,
    pub net_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    /// Category -> fractional delta (0.10 = +10%)
    pub expense_adjustments: BTreeMap<String, f64>,
    pub salary_adjustment: f64,
    pub metrics: ScenarioMetrics,
    pub changes: ScenarioChanges,
    /// Adjusted categories that do not occur in the baseline and had no effect
    pub ignored_adjustments: Vec<String>,
}

/// A fixed entry of the preset menu
struct Preset {
    key: &'static str,
    name: &'static str,
    adjustments: &'static [(&'static str, f64)],
    salary_adjustment: f64,
}

/// Presets run only when every adjusted category exists in the baseline.
/// Salary-only presets therefore always run.
const PRESETS: &[Preset] = &[
    Preset {
        key: "rent_increase",
        name: "Rent Increase (10%)",
        adjustments: &[("Rent", 0.10)],
        salary_adjustment: 0.0,
    },
    Preset {
        key: "groceries_decrease",
        name: "Groceries Decrease (15%)",
        adjustments: &[("Groceries", -0.15)],
        salary_adjustment: 0.0,
    },
    Preset {
        key: "salary_increase",
        name: "Salary Increase (20%)",
        adjustments: &[],
        salary_adjustment: 0.20,
    },
    Preset {
        key: "combined",
        name: "Combined (Rent +10%, Groceries -15%, Salary +20%)",
        adjustments: &[("Rent", 0.10), ("Groceries", -0.15)],
        salary_adjustment: 0.20,
    },
    Preset {
        key: "tuition_increase",
        name: "Tuition Increase (15%)",
        adjustments: &[("Tuition", 0.15)],
        salary_adjustment: 0.0,
    },
    Preset {
        key: "gas_increase",
        name: "Gas Price Increase (25%)",
        adjustments: &[("Gas", 0.25)],
        salary_adjustment: 0.0,
    },
];

struct Baseline {
    expenses: Vec<Expense>,
    income: Vec<Income>,
    /// Per-category expense sub-totals; keys are the baseline category set
    category_totals: BTreeMap<String, f64>,
    metrics: ScenarioMetrics,
}

impl Baseline {
    fn new(expenses: Vec<Expense>, income: Vec<Income>) -> Self {
        let mut category_totals: BTreeMap<String, f64> = BTreeMap::new();
        for e in &expenses {
            *category_totals.entry(e.category.clone()).or_insert(0.0) += e.amount;
        }
        let total_expenses: f64 = expenses.iter().map(|e| e.amount).sum();
        let total_income: f64 = income.iter().map(|i| i.amount).sum();
        Self {
            expenses,
            income,
            category_totals,
            metrics: ScenarioMetrics {
                total_expenses,
                total_income,
                net_amount: total_income - total_expenses,
            },
        }
    }

    fn has_category(&self, category: &str) -> bool {
        self.category_totals.contains_key(category)
    }
}

/// One row of the comparison table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    #[serde(rename = "Scenario")]
    pub scenario: String,
    #[serde(rename = "Total Expenses")]
    pub total_expenses: f64,
    #[serde(rename = "Total Income")]
    pub total_income: f64,
    #[serde(rename = "Net Amount")]
    pub net_amount: f64,
    #[serde(rename = "Expense Change (%)")]
    pub expense_change_pct: f64,
    #[serde(rename = "Income Change (%)")]
    pub income_change_pct: f64,
    #[serde(rename = "Net Change (%)")]
    pub net_change_pct: f64,
}

impl ComparisonRow {
    fn new(name: &str, metrics: ScenarioMetrics, changes: ScenarioChanges) -> Self {
        Self {
            scenario: name.to_string(),
            total_expenses: metrics.total_expenses,
            total_income: metrics.total_income,
            net_amount: metrics.net_amount,
            expense_change_pct: changes.total_expenses,
            income_change_pct: changes.total_income,
            net_change_pct: changes.net_amount,
        }
    }
}

/// Baseline row followed by every stored scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub rows: Vec<ComparisonRow>,
}

impl ScenarioComparison {
    /// Write the table as CSV with a header row
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        for row in &self.rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

#[derive(Default)]
pub struct ScenarioEngine {
    baseline: Option<Baseline>,
    /// (key, scenario) in insertion order; keys are unique
    scenarios: Vec<(String, Scenario)>,
}

impl ScenarioEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the baseline and discard every stored scenario
    pub fn set_baseline(&mut self, expenses: Vec<Expense>, income: Vec<Income>) {
        let baseline = Baseline::new(expenses, income);
        debug!(
            expenses = baseline.expenses.len(),
            income = baseline.income.len(),
            categories = baseline.category_totals.len(),
            "Scenario baseline set"
        );
        self.baseline = Some(baseline);
        self.scenarios.clear();
    }

    pub fn has_baseline(&self) -> bool {
        self.baseline.is_some()
    }

    pub fn baseline_expenses(&self) -> Option<&[Expense]> {
        self.baseline.as_ref().map(|b| b.expenses.as_slice())
    }

    pub fn baseline_income(&self) -> Option<&[Income]> {
        self.baseline.as_ref().map(|b| b.income.as_slice())
    }

    pub fn baseline_metrics(&self) -> Result<ScenarioMetrics> {
        Ok(self.require_baseline()?.metrics)
    }

    /// Sorted distinct expense categories of the baseline
    pub fn available_categories(&self) -> Vec<String> {
        self.baseline
            .as_ref()
            .map(|b| b.category_totals.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Evaluate a scenario and store it under `name`, replacing any previous one
    pub fn create_scenario(
        &mut self,
        name: &str,
        expense_adjustments: &BTreeMap<String, f64>,
        salary_adjustment: f64,
    ) -> Result<Scenario> {
        let scenario = self.evaluate(name, expense_adjustments, salary_adjustment)?;
        self.store(name.to_string(), scenario.clone());
        Ok(scenario)
    }

    /// Evaluate the preset menu against the baseline
    ///
    /// Presets whose categories are missing from the baseline are left out.
    /// Generated scenarios are stored under their menu keys and returned in
    /// menu order.
    pub fn run_preset_scenarios(&mut self) -> Result<Vec<(String, Scenario)>> {
        let baseline = self.require_baseline()?;

        let applicable: Vec<&Preset> = PRESETS
            .iter()
            .filter(|p| p.adjustments.iter().all(|(c, _)| baseline.has_category(c)))
            .collect();

        let mut generated = Vec::with_capacity(applicable.len());
        for preset in applicable {
            let adjustments: BTreeMap<String, f64> = preset
                .adjustments
                .iter()
                .map(|(c, d)| (c.to_string(), *d))
                .collect();
            let scenario = self.evaluate(preset.name, &adjustments, preset.salary_adjustment)?;
            generated.push((preset.key.to_string(), scenario));
        }

        for (key, scenario) in &generated {
            self.store(key.clone(), scenario.clone());
        }
        debug!(count = generated.len(), "Preset scenarios generated");
        Ok(generated)
    }

    /// Stored scenario by key
    pub fn scenario(&self, key: &str) -> Option<&Scenario> {
        self.scenarios
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, s)| s)
    }

    /// Stored scenarios in insertion order
    pub fn scenarios(&self) -> impl Iterator<Item = (&str, &Scenario)> {
        self.scenarios.iter().map(|(k, s)| (k.as_str(), s))
    }

    pub fn compare_scenarios(&self) -> Result<ScenarioComparison> {
        let baseline = self.require_baseline()?;
        if self.scenarios.is_empty() {
            return Err(Error::NoScenarios);
        }

        let mut rows = Vec::with_capacity(self.scenarios.len() + 1);
        rows.push(ComparisonRow::new(
            "Baseline",
            baseline.metrics,
            ScenarioChanges::default(),
        ));
        rows.extend(
            self.scenarios
                .iter()
                .map(|(_, s)| ComparisonRow::new(&s.name, s.metrics, s.changes)),
        );
        Ok(ScenarioComparison { rows })
    }

    /// Key of the stored scenario with the highest net amount
    pub fn best_scenario(&self) -> Option<&str> {
        self.extreme_by_net(|candidate, current| candidate > current)
    }

    /// Key of the stored scenario with the lowest net amount
    pub fn worst_scenario(&self) -> Option<&str> {
        self.extreme_by_net(|candidate, current| candidate < current)
    }

    // First scenario wins ties
    fn extreme_by_net(&self, better: impl Fn(f64, f64) -> bool) -> Option<&str> {
        let mut best: Option<(&str, f64)> = None;
        for (key, s) in &self.scenarios {
            let net = s.metrics.net_amount;
            match best {
                Some((_, current)) if !better(net, current) => {}
                _ => best = Some((key.as_str(), net)),
            }
        }
        best.map(|(k, _)| k)
    }

    fn require_baseline(&self) -> Result<&Baseline> {
        self.baseline.as_ref().ok_or_else(|| {
            Error::Precondition("baseline data must be set before running scenarios".into())
        })
    }

    fn evaluate(
        &self,
        name: &str,
        expense_adjustments: &BTreeMap<String, f64>,
        salary_adjustment: f64,
    ) -> Result<Scenario> {
        let baseline = self.require_baseline()?;
        let base = baseline.metrics;

        let mut total_expenses = base.total_expenses;
        let mut ignored = Vec::new();
        for (category, delta) in expense_adjustments {
            match baseline.category_totals.get(category) {
                Some(old) => total_expenses += old * (1.0 + delta) - old,
                None => ignored.push(category.clone()),
            }
        }

        let total_income = base.total_income * (1.0 + salary_adjustment);
        let net_amount = total_income - total_expenses;

        if !ignored.is_empty() {
            debug!(scenario = name, ignored = ?ignored, "Ignoring unknown categories");
        }

        Ok(Scenario {
            name: name.to_string(),
            expense_adjustments: expense_adjustments.clone(),
            salary_adjustment,
            metrics: ScenarioMetrics {
                total_expenses,
                total_income,
                net_amount,
            },
            changes: ScenarioChanges {
                total_expenses: percent_change(total_expenses, base.total_expenses),
                total_income: percent_change(total_income, base.total_income),
                net_amount: percent_change(net_amount, base.net_amount),
            },
            ignored_adjustments: ignored,
        })
    }

    fn store(&mut self, key: String, scenario: Scenario) {
        match self.scenarios.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = scenario,
            None => self.scenarios.push((key, scenario)),
        }
    }
}

/// Percent change of `new` from `base`, 0 when `base` is 0
fn percent_change(new: f64, base: f64) -> f64 {
    if base == 0.0 {
        0.0
    } else {
        (new - base) / base * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{date, expense, income, three_month_baseline};

    fn adjust(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(c, d)| (c.to_string(), *d)).collect()
    }

    fn engine() -> ScenarioEngine {
        let (expenses, income) = three_month_baseline();
        let mut engine = ScenarioEngine::new();
        engine.set_baseline(expenses, income);
        engine
    }

    #[test]
    fn test_rent_increase_end_to_end() {
        let mut engine = engine();
        let base = engine.baseline_metrics().unwrap();
        assert_eq!(base.total_expenses, 4500.0);
        assert_eq!(base.total_income, 7500.0);
        assert_eq!(base.net_amount, 3000.0);

        let s = engine
            .create_scenario("Rent +10%", &adjust(&[("Rent", 0.10)]), 0.0)
            .unwrap();
        assert!((s.metrics.total_expenses - 4860.0).abs() < 1e-9);
        assert!((s.changes.total_expenses - 8.0).abs() < 1e-9);
        assert_eq!(s.metrics.total_income, 7500.0);
        assert!((s.metrics.net_amount - 2640.0).abs() < 1e-9);
        assert!((s.changes.net_amount - (-12.0)).abs() < 1e-9);
        assert!(s.ignored_adjustments.is_empty());
    }

    #[test]
    fn test_create_scenario_is_idempotent() {
        let mut engine = engine();
        let adjustments = adjust(&[("Rent", 0.10), ("Groceries", -0.15)]);
        let first = engine.create_scenario("mix", &adjustments, 0.05).unwrap();
        let second = engine.create_scenario("mix", &adjustments, 0.05).unwrap();
        assert_eq!(first, second);
        assert_eq!(engine.scenarios().count(), 1);
    }

    #[test]
    fn test_empty_adjustment_reproduces_baseline() {
        let mut engine = engine();
        let s = engine.create_scenario("noop", &BTreeMap::new(), 0.0).unwrap();
        assert_eq!(s.metrics, engine.baseline_metrics().unwrap());
        assert_eq!(s.changes, ScenarioChanges::default());
    }

    #[test]
    fn test_unknown_category_is_ignored_and_reported() {
        let mut engine = engine();
        let s = engine
            .create_scenario("ski trip", &adjust(&[("Skiing", 0.5), ("Rent", 0.0)]), 0.0)
            .unwrap();
        assert_eq!(s.metrics.total_expenses, 4500.0);
        assert_eq!(s.ignored_adjustments, vec!["Skiing".to_string()]);
    }

    #[test]
    fn test_salary_adjustment_scales_income() {
        let mut engine = engine();
        let s = engine.create_scenario("raise", &BTreeMap::new(), 0.20).unwrap();
        assert!((s.metrics.total_income - 9000.0).abs() < 1e-9);
        assert!((s.changes.total_income - 20.0).abs() < 1e-9);
        assert!((s.changes.net_amount - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_baseline_net_gives_zero_change() {
        let mut engine = ScenarioEngine::new();
        engine.set_baseline(
            vec![expense(date(2023, 1, 1), "Rent", 1000.0)],
            vec![income(date(2023, 1, 28), 1000.0, "Austin")],
        );
        let s = engine
            .create_scenario("rent", &adjust(&[("Rent", 0.10)]), 0.0)
            .unwrap();
        assert!((s.metrics.net_amount - (-100.0)).abs() < 1e-9);
        assert_eq!(s.changes.net_amount, 0.0);
        assert!(s.changes.net_amount.is_finite());
    }

    #[test]
    fn test_zero_baseline_income_gives_zero_change() {
        let mut engine = ScenarioEngine::new();
        engine.set_baseline(vec![expense(date(2023, 1, 1), "Rent", 1000.0)], vec![]);
        let s = engine.create_scenario("raise", &BTreeMap::new(), 0.5).unwrap();
        assert_eq!(s.metrics.total_income, 0.0);
        assert_eq!(s.changes.total_income, 0.0);
    }

    #[test]
    fn test_operations_before_baseline_are_caller_errors() {
        let mut engine = ScenarioEngine::new();
        let err = engine
            .create_scenario("x", &BTreeMap::new(), 0.0)
            .unwrap_err();
        assert!(matches!(err, Error::Precondition(_)));
        assert!(engine.run_preset_scenarios().unwrap_err().is_caller_error());
        assert!(engine.baseline_metrics().is_err());
        assert!(engine.available_categories().is_empty());
    }

    #[test]
    fn test_presets_skip_missing_categories() {
        let mut engine = engine();
        let presets = engine.run_preset_scenarios().unwrap();
        let keys: Vec<&str> = presets.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec!["rent_increase", "groceries_decrease", "salary_increase", "combined"]
        );
        assert!(engine.scenario("tuition_increase").is_none());
        assert!(engine.scenario("gas_increase").is_none());

        let combined = engine.scenario("combined").unwrap();
        // 4500 + 360 - 135
        assert!((combined.metrics.total_expenses - 4725.0).abs() < 1e-9);
        assert!((combined.metrics.total_income - 9000.0).abs() < 1e-9);
    }

    #[test]
    fn test_salary_preset_runs_without_expense_categories() {
        let mut engine = ScenarioEngine::new();
        engine.set_baseline(
            vec![expense(date(2023, 1, 2), "Books", 80.0)],
            vec![income(date(2023, 1, 28), 1000.0, "Austin")],
        );
        let presets = engine.run_preset_scenarios().unwrap();
        assert_eq!(presets.len(), 1);
        assert_eq!(presets[0].0, "salary_increase");
        assert_eq!(presets[0].1.name, "Salary Increase (20%)");
    }

    #[test]
    fn test_presets_accumulate_with_custom_scenarios() {
        let mut engine = engine();
        engine
            .create_scenario("frugal", &adjust(&[("Groceries", -0.5)]), 0.0)
            .unwrap();
        engine.run_preset_scenarios().unwrap();
        engine.run_preset_scenarios().unwrap();

        let keys: Vec<&str> = engine.scenarios().map(|(k, _)| k).collect();
        assert_eq!(keys.len(), 5);
        assert_eq!(keys[0], "frugal");
    }

    #[test]
    fn test_set_baseline_clears_scenarios() {
        let mut engine = engine();
        engine.run_preset_scenarios().unwrap();
        assert!(engine.best_scenario().is_some());

        engine.set_baseline(vec![expense(date(2024, 5, 1), "Gas", 40.0)], vec![]);
        assert_eq!(engine.scenarios().count(), 0);
        assert_eq!(engine.best_scenario(), None);
        assert!(matches!(engine.compare_scenarios(), Err(Error::NoScenarios)));
        assert_eq!(engine.available_categories(), vec!["Gas".to_string()]);
        assert_eq!(engine.baseline_expenses().map(|e| e.len()), Some(1));
        assert_eq!(engine.baseline_income().map(|i| i.len()), Some(0));
    }

    #[test]
    fn test_best_and_worst_by_net() {
        let mut engine = engine();
        assert_eq!(engine.best_scenario(), None);
        assert_eq!(engine.worst_scenario(), None);

        engine.run_preset_scenarios().unwrap();
        assert_eq!(engine.best_scenario(), Some("salary_increase"));
        assert_eq!(engine.worst_scenario(), Some("rent_increase"));
    }

    #[test]
    fn test_compare_has_leading_baseline_row() {
        let mut engine = engine();
        engine
            .create_scenario("Rent +10%", &adjust(&[("Rent", 0.10)]), 0.0)
            .unwrap();
        let comparison = engine.compare_scenarios().unwrap();
        assert_eq!(comparison.rows.len(), 2);
        let baseline = &comparison.rows[0];
        assert_eq!(baseline.scenario, "Baseline");
        assert_eq!(baseline.net_amount, 3000.0);
        assert_eq!(baseline.expense_change_pct, 0.0);
        assert_eq!(comparison.rows[1].scenario, "Rent +10%");
    }

    #[test]
    fn test_comparison_csv_export() {
        let mut engine = engine();
        engine.create_scenario("raise", &BTreeMap::new(), 0.1).unwrap();
        let mut buf = Vec::new();
        engine.compare_scenarios().unwrap().write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Scenario,Total Expenses,Total Income,Net Amount,Expense Change (%),Income Change (%),Net Change (%)")
        );
        assert!(lines.next().unwrap().starts_with("Baseline,4500"));
        assert!(lines.next().unwrap().starts_with("raise,4500"));
    }
}
