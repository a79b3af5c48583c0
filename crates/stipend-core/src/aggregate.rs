//! Monthly and per-category aggregation over date windows
//!
//! When a window bound is omitted it defaults to the extent of the expense
//! table. The same window is applied to income, so income outside the
//! expense extent only shows up when the caller passes explicit bounds.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;

use crate::categories::CategoryGroup;
use crate::import::Dataset;
use crate::models::{
    CategoryBreakdownRow, CityCost, CityCostSummary, Expense, GroupBreakdownRow, Income,
    KeyMetrics, MonthlySummaryRow, PaymentBreakdownRow,
};

/// Category that the overview separates out of monthly averages
pub const TUITION_CATEGORY: &str = "Tuition";

/// Read-only aggregation over cleaned expense and income tables
pub struct Aggregator<'a> {
    expenses: &'a [Expense],
    income: &'a [Income],
}

impl<'a> Aggregator<'a> {
    pub fn new(expenses: &'a [Expense], income: &'a [Income]) -> Self {
        Self { expenses, income }
    }

    pub fn from_dataset(dataset: &'a Dataset) -> Self {
        Self::new(&dataset.expenses, &dataset.income)
    }

    /// Full date extent of the expense table
    pub fn expense_extent(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.expenses.iter().map(|e| e.date).min()?;
        let max = self.expenses.iter().map(|e| e.date).max()?;
        Some((min, max))
    }

    /// Resolve optional bounds against the expense extent
    fn window(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Option<(NaiveDate, NaiveDate)> {
        let extent = self.expense_extent();
        let start = start.or(extent.map(|(min, _)| min))?;
        let end = end.or(extent.map(|(_, max)| max))?;
        Some((start, end))
    }

    /// Expenses inside `[start, end]`, for callers that want to reuse a view
    pub fn filtered_expenses(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Vec<Expense> {
        match self.window(start, end) {
            Some((from, to)) => self
                .expenses
                .iter()
                .filter(|e| e.date >= from && e.date <= to)
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }

    /// Per-month expense and income totals with running net
    ///
    /// Months present on only one side get 0 on the other. Returns an empty
    /// vector when nothing falls inside the window.
    pub fn monthly_summary(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Vec<MonthlySummaryRow> {
        let Some((from, to)) = self.window(start, end) else {
            return Vec::new();
        };

        // BTreeMap keeps "YYYY-MM" keys in chronological order
        let mut months: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
        for e in self.expenses.iter().filter(|e| e.date >= from && e.date <= to) {
            months.entry(e.year_month.as_str()).or_default().0 += e.amount;
        }
        for i in self.income.iter().filter(|i| i.date >= from && i.date <= to) {
            months.entry(i.year_month.as_str()).or_default().1 += i.amount;
        }

        let mut cumulative = 0.0;
        months
            .into_iter()
            .map(|(year_month, (total_expenses, total_income))| {
                let net_amount = total_income - total_expenses;
                cumulative += net_amount;
                MonthlySummaryRow {
                    year_month: year_month.to_string(),
                    total_expenses,
                    total_income,
                    net_amount,
                    cumulative_net: cumulative,
                }
            })
            .collect()
    }

    /// Expense totals per category, highest first
    ///
    /// A supplied `subset` is aggregated as-is and the window is ignored.
    pub fn category_breakdown(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        subset: Option<&[Expense]>,
    ) -> Vec<CategoryBreakdownRow> {
        let filtered;
        let rows: &[Expense] = match subset {
            Some(rows) => rows,
            None => {
                filtered = self.filtered_expenses(start, end);
                &filtered
            }
        };
        breakdown_by_category(rows)
    }

    /// Expense totals per category group, highest first
    pub fn group_breakdown(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Vec<GroupBreakdownRow> {
        let mut groups: BTreeMap<CategoryGroup, (f64, usize)> = BTreeMap::new();
        for e in self.filtered_expenses(start, end) {
            let entry = groups.entry(e.category_group).or_default();
            entry.0 += e.amount;
            entry.1 += 1;
        }

        let mut rows: Vec<GroupBreakdownRow> = groups
            .into_iter()
            .map(|(group, (amount, count))| GroupBreakdownRow {
                group,
                amount,
                count,
            })
            .collect();
        rows.sort_by(|a, b| b.amount.total_cmp(&a.amount));
        rows
    }

    /// Spending per payment type over the whole expense table
    pub fn payment_breakdown(&self) -> Vec<PaymentBreakdownRow> {
        let mut by_type: BTreeMap<&str, (f64, usize, BTreeSet<&str>)> = BTreeMap::new();
        for e in self.expenses {
            let entry = by_type.entry(e.payment_type.as_str()).or_default();
            entry.0 += e.amount;
            entry.1 += 1;
            entry.2.insert(e.category.as_str());
        }

        let mut rows: Vec<PaymentBreakdownRow> = by_type
            .into_iter()
            .map(|(payment_type, (total, count, categories))| PaymentBreakdownRow {
                payment_type: payment_type.to_string(),
                total,
                average: total / count as f64,
                count,
                unique_categories: categories.len(),
            })
            .collect();
        rows.sort_by(|a, b| b.total.total_cmp(&a.total));
        rows
    }

    /// Headline totals over the full tables
    pub fn key_metrics(&self) -> KeyMetrics {
        let total_expenses: f64 = self.expenses.iter().map(|e| e.amount).sum();
        let total_income: f64 = self.income.iter().map(|i| i.amount).sum();

        let mut monthly: HashMap<&str, f64> = HashMap::new();
        let mut tuition_months: BTreeSet<&str> = BTreeSet::new();
        let mut tuition_total = 0.0;
        for e in self.expenses {
            if e.category == TUITION_CATEGORY {
                tuition_total += e.amount;
                tuition_months.insert(e.year_month.as_str());
            } else {
                *monthly.entry(e.year_month.as_str()).or_default() += e.amount;
            }
        }

        let avg_monthly_expenses = if monthly.is_empty() {
            0.0
        } else {
            monthly.values().sum::<f64>() / monthly.len() as f64
        };
        let avg_tuition_per_month = if tuition_months.is_empty() {
            0.0
        } else {
            tuition_total / tuition_months.len() as f64
        };

        KeyMetrics {
            total_expenses,
            total_income,
            net_amount: total_income - total_expenses,
            avg_monthly_expenses,
            tuition_total,
            tuition_months: tuition_months.len(),
            avg_tuition_per_month,
        }
    }
}

fn breakdown_by_category(rows: &[Expense]) -> Vec<CategoryBreakdownRow> {
    let mut categories: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for e in rows {
        let entry = categories.entry(e.category.as_str()).or_default();
        entry.0 += e.amount;
        entry.1 += 1;
    }

    let mut breakdown: Vec<CategoryBreakdownRow> = categories
        .into_iter()
        .map(|(category, (amount, count))| CategoryBreakdownRow {
            category: category.to_string(),
            amount,
            count,
        })
        .collect();
    // Stable sort: equal amounts stay in category-name order
    breakdown.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    breakdown
}

/// Total reference cost of living per city, most expensive first
pub fn city_cost_summary(costs: &[CityCost]) -> Vec<CityCostSummary> {
    let mut cities: BTreeMap<&str, Vec<(String, f64)>> = BTreeMap::new();
    for c in costs {
        cities
            .entry(c.city.as_str())
            .or_default()
            .push((c.category.clone(), c.monthly_cost));
    }

    let mut summaries: Vec<CityCostSummary> = cities
        .into_iter()
        .map(|(city, mut categories)| {
            categories.sort_by(|a, b| b.1.total_cmp(&a.1));
            CityCostSummary {
                city: city.to_string(),
                total_monthly_cost: categories.iter().map(|(_, cost)| cost).sum(),
                categories,
            }
        })
        .collect();
    summaries.sort_by(|a, b| b.total_monthly_cost.total_cmp(&a.total_monthly_cost));
    summaries
}
