//! Domain models for Stipend

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::categories::CategoryGroup;

/// A cleaned expense record
///
/// Built by the loader; the calendar fields and `category_group` are derived
/// from `date` and `category` during cleaning and never change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub date: NaiveDate,
    pub category: String,
    /// Always >= 0 after cleaning
    pub amount: f64,
    pub payment_type: String,
    pub city: String,
    pub year: i32,
    pub month: u32,
    /// "YYYY-MM" bucket key
    pub year_month: String,
    pub day_of_week: String,
    pub category_group: CategoryGroup,
}

/// A cleaned income (salary) record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Income {
    pub date: NaiveDate,
    /// Always >= 0 after cleaning
    pub amount: f64,
    pub category: String,
    pub city: String,
    pub year: i32,
    pub month: u32,
    pub year_month: String,
}

/// Cost-of-living reference row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityCost {
    pub city: String,
    pub category: String,
    pub monthly_cost: f64,
}

/// Role/city salary reference row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleSalary {
    pub city: String,
    pub role: String,
    pub average_salary: f64,
}

/// One calendar month of the monthly summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummaryRow {
    pub year_month: String,
    pub total_expenses: f64,
    pub total_income: f64,
    /// income - expenses
    pub net_amount: f64,
    /// Running sum of `net_amount` in month order
    pub cumulative_net: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdownRow {
    pub category: String,
    pub amount: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupBreakdownRow {
    pub group: CategoryGroup,
    pub amount: f64,
    pub count: usize,
}

/// Spending totals for one payment type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentBreakdownRow {
    pub payment_type: String,
    pub total: f64,
    pub average: f64,
    pub count: usize,
    pub unique_categories: usize,
}

/// Headline figures for the overview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyMetrics {
    pub total_expenses: f64,
    pub total_income: f64,
    pub net_amount: f64,
    /// Mean monthly spend with tuition excluded
    pub avg_monthly_expenses: f64,
    pub tuition_total: f64,
    pub tuition_months: usize,
    pub avg_tuition_per_month: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityCostSummary {
    pub city: String,
    pub total_monthly_cost: f64,
    /// (category, monthly cost), highest first
    pub categories: Vec<(String, f64)>,
}

/// An expense flagged as statistically unusual for its category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRecord {
    pub date: NaiveDate,
    pub category: String,
    pub amount: f64,
    pub payment_type: String,
    pub city: String,
    pub z_score: f64,
    pub category_mean: f64,
    pub category_std: f64,
}
