//! CSV loading and cleaning for the four dashboard sources
//!
//! Sources:
//! - expenses: Date,Category,Amount,PaymentType,City
//! - income:   Date,Amount,Category,City
//! - city costs: City,Category,MonthlyCost
//! - salary reference: City,Role,AverageSalary
//!
//! Expense and income rows go through the same cleaning pipeline, in order:
//! drop exact duplicates, fill missing values, drop negative amounts, derive
//! calendar fields, map categories to groups. Every step is idempotent.

use std::collections::HashSet;
use std::fs::File;
use std::hash::Hash;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::categories::group_for;
use crate::error::{Error, Result};
use crate::models::{CityCost, Expense, Income, RoleSalary};

pub const DEFAULT_CATEGORY: &str = "Miscellaneous";
pub const DEFAULT_PAYMENT_TYPE: &str = "Unknown";
pub const DEFAULT_CITY: &str = "Unknown";

/// Locations of the four source files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub expenses: PathBuf,
    pub income: PathBuf,
    pub city_costs: PathBuf,
    pub salary_reference: PathBuf,
}

impl DataPaths {
    /// Default file names inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            expenses: dir.join("cost_of_living.csv"),
            income: dir.join("salary.csv"),
            city_costs: dir.join("city_costs.csv"),
            salary_reference: dir.join("salary_data.csv"),
        }
    }
}

/// Limits above which the loader emits advisory data-quality issues
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityThresholds {
    pub large_expense: f64,
    pub large_income: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            large_expense: 50_000.0,
            large_income: 10_000.0,
        }
    }
}

/// An expense row as read from CSV, before cleaning
#[derive(Debug, Clone, PartialEq)]
pub struct RawExpense {
    pub date: NaiveDate,
    pub category: Option<String>,
    pub amount: Option<f64>,
    pub payment_type: Option<String>,
    pub city: Option<String>,
}

impl From<&Expense> for RawExpense {
    fn from(e: &Expense) -> Self {
        Self {
            date: e.date,
            category: Some(e.category.clone()),
            amount: Some(e.amount),
            payment_type: Some(e.payment_type.clone()),
            city: Some(e.city.clone()),
        }
    }
}

/// An income row as read from CSV, before cleaning
#[derive(Debug, Clone, PartialEq)]
pub struct RawIncome {
    pub date: NaiveDate,
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub city: Option<String>,
}

impl From<&Income> for RawIncome {
    fn from(i: &Income) -> Self {
        Self {
            date: i.date,
            amount: Some(i.amount),
            category: Some(i.category.clone()),
            city: Some(i.city.clone()),
        }
    }
}

/// What cleaning did to one table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningReport {
    pub rows_read: usize,
    pub duplicates_removed: usize,
    pub amounts_filled: usize,
    pub categories_filled: usize,
    pub payment_types_filled: usize,
    pub negatives_dropped: usize,
    pub rows_kept: usize,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub max_amount: f64,
}

/// Advisory finding raised while loading. Never fatal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataQualityIssue {
    LargeExpense { max_amount: f64, threshold: f64 },
    LargeIncome { max_amount: f64, threshold: f64 },
    MissingCategories { count: usize },
    DroppedSalaryReferenceRows { count: usize },
}

impl std::fmt::Display for DataQualityIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LargeExpense { max_amount, .. } => write!(
                f,
                "Extremely large expense amounts detected (max {:.2})",
                max_amount
            ),
            Self::LargeIncome { max_amount, .. } => {
                write!(f, "Large salary amounts detected (max {:.2})", max_amount)
            }
            Self::MissingCategories { count } => {
                write!(f, "Missing categories found ({} filled)", count)
            }
            Self::DroppedSalaryReferenceRows { count } => write!(
                f,
                "{} salary reference rows had no usable AverageSalary",
                count
            ),
        }
    }
}

/// Summary of a full load
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadReport {
    pub expenses: CleaningReport,
    pub income: CleaningReport,
    pub city_cost_rows: usize,
    pub salary_reference_rows: usize,
    pub salary_reference_dropped: usize,
    /// Combined extent of expense and income dates
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub issues: Vec<DataQualityIssue>,
}

/// The four normalized tables
#[derive(Debug, Clone)]
pub struct Dataset {
    pub expenses: Vec<Expense>,
    pub income: Vec<Income>,
    pub city_costs: Vec<CityCost>,
    pub salary_reference: Vec<RoleSalary>,
    pub report: LoadReport,
}

impl Dataset {
    /// Load and clean all four files. Any missing or malformed file fails the
    /// whole load.
    pub fn load(paths: &DataPaths) -> Result<Self> {
        Self::load_with(paths, QualityThresholds::default())
    }

    pub fn load_with(paths: &DataPaths, thresholds: QualityThresholds) -> Result<Self> {
        let (expenses, expense_report) = read_file(&paths.expenses, parse_expenses)?;
        let (income, income_report) = read_file(&paths.income, parse_income)?;
        let city_costs = read_file(&paths.city_costs, parse_city_costs)?;
        let (salary_reference, dropped) =
            read_file(&paths.salary_reference, parse_salary_reference)?;

        Ok(Self::assemble(
            expenses,
            expense_report,
            income,
            income_report,
            city_costs,
            salary_reference,
            dropped,
            thresholds,
        ))
    }

    /// Parse from arbitrary readers. Failures are labelled with the table name.
    pub fn from_readers<E: Read, I: Read, C: Read, S: Read>(
        expenses: E,
        income: I,
        city_costs: C,
        salary_reference: S,
        thresholds: QualityThresholds,
    ) -> Result<Self> {
        let (expenses, expense_report) =
            parse_expenses(expenses).map_err(|e| Error::load("expenses", e))?;
        let (income, income_report) = parse_income(income).map_err(|e| Error::load("income", e))?;
        let city_costs = parse_city_costs(city_costs).map_err(|e| Error::load("city_costs", e))?;
        let (salary_reference, dropped) = parse_salary_reference(salary_reference)
            .map_err(|e| Error::load("salary_reference", e))?;

        Ok(Self::assemble(
            expenses,
            expense_report,
            income,
            income_report,
            city_costs,
            salary_reference,
            dropped,
            thresholds,
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        expenses: Vec<Expense>,
        expense_report: CleaningReport,
        income: Vec<Income>,
        income_report: CleaningReport,
        city_costs: Vec<CityCost>,
        salary_reference: Vec<RoleSalary>,
        salary_reference_dropped: usize,
        thresholds: QualityThresholds,
    ) -> Self {
        let mut report = LoadReport {
            city_cost_rows: city_costs.len(),
            salary_reference_rows: salary_reference.len(),
            salary_reference_dropped,
            date_range: merge_ranges(expense_report.date_range, income_report.date_range),
            expenses: expense_report,
            income: income_report,
            issues: Vec::new(),
        };
        report.issues = assess_quality(&report, thresholds);

        info!(
            expenses = expenses.len(),
            income = income.len(),
            city_costs = city_costs.len(),
            salary_reference = salary_reference.len(),
            "Loaded dashboard data"
        );
        if let Some((min, max)) = report.date_range {
            info!("Data date range: {} to {}", min, max);
        }
        for issue in &report.issues {
            warn!("Data quality: {}", issue);
        }

        Self {
            expenses,
            income,
            city_costs,
            salary_reference,
            report,
        }
    }
}

fn read_file<T>(path: &Path, parse: impl FnOnce(File) -> Result<T>) -> Result<T> {
    let file = File::open(path).map_err(|e| Error::load(path, e.into()))?;
    parse(file).map_err(|e| Error::load(path, e))
}

fn merge_ranges(
    a: Option<(NaiveDate, NaiveDate)>,
    b: Option<(NaiveDate, NaiveDate)>,
) -> Option<(NaiveDate, NaiveDate)> {
    match (a, b) {
        (Some((a_min, a_max)), Some((b_min, b_max))) => Some((a_min.min(b_min), a_max.max(b_max))),
        (Some(r), None) | (None, Some(r)) => Some(r),
        (None, None) => None,
    }
}

fn assess_quality(report: &LoadReport, thresholds: QualityThresholds) -> Vec<DataQualityIssue> {
    let mut issues = Vec::new();

    if report.expenses.max_amount > thresholds.large_expense {
        issues.push(DataQualityIssue::LargeExpense {
            max_amount: report.expenses.max_amount,
            threshold: thresholds.large_expense,
        });
    }
    if report.income.max_amount > thresholds.large_income {
        issues.push(DataQualityIssue::LargeIncome {
            max_amount: report.income.max_amount,
            threshold: thresholds.large_income,
        });
    }
    if report.expenses.categories_filled > 0 {
        issues.push(DataQualityIssue::MissingCategories {
            count: report.expenses.categories_filled,
        });
    }
    if report.salary_reference_dropped > 0 {
        issues.push(DataQualityIssue::DroppedSalaryReferenceRows {
            count: report.salary_reference_dropped,
        });
    }

    issues
}

// =============================================================================
// Expenses and income
// =============================================================================

/// Read and clean an expense CSV
pub fn parse_expenses<R: Read>(reader: R) -> Result<(Vec<Expense>, CleaningReport)> {
    let mut rdr = csv_reader(reader);
    let headers = rdr.headers()?.clone();
    let date_col = column_index(&headers, "Date")?;
    let category_col = column_index(&headers, "Category")?;
    let amount_col = column_index(&headers, "Amount")?;
    let payment_col = column_index(&headers, "PaymentType")?;
    let city_col = column_index(&headers, "City")?;

    let mut raw = Vec::new();
    for result in rdr.records() {
        let record = result?;
        raw.push(RawExpense {
            date: record_date(&record, date_col)?,
            category: field(&record, category_col),
            amount: field(&record, amount_col).and_then(|s| parse_amount(&s)),
            payment_type: field(&record, payment_col),
            city: field(&record, city_col),
        });
    }

    debug!("Read {} raw expense rows", raw.len());
    Ok(clean_expenses(raw))
}

/// Apply the cleaning pipeline to raw expense rows
pub fn clean_expenses(raw: Vec<RawExpense>) -> (Vec<Expense>, CleaningReport) {
    let mut report = CleaningReport {
        rows_read: raw.len(),
        ..Default::default()
    };

    let (rows, removed) = dedup_by_key(raw, |r| {
        (
            r.date,
            r.category.clone(),
            r.amount.map(f64::to_bits),
            r.payment_type.clone(),
            r.city.clone(),
        )
    });
    report.duplicates_removed = removed;

    let mut expenses = Vec::with_capacity(rows.len());
    for row in rows {
        let amount = row.amount.unwrap_or_else(|| {
            report.amounts_filled += 1;
            0.0
        });
        let category = row.category.unwrap_or_else(|| {
            report.categories_filled += 1;
            DEFAULT_CATEGORY.to_string()
        });
        let payment_type = row.payment_type.unwrap_or_else(|| {
            report.payment_types_filled += 1;
            DEFAULT_PAYMENT_TYPE.to_string()
        });

        if amount < 0.0 {
            report.negatives_dropped += 1;
            continue;
        }

        expenses.push(Expense {
            date: row.date,
            category_group: group_for(&category),
            category,
            amount,
            payment_type,
            city: row.city.unwrap_or_else(|| DEFAULT_CITY.to_string()),
            year: row.date.year(),
            month: row.date.month(),
            year_month: year_month(row.date),
            day_of_week: weekday_name(row.date.weekday()).to_string(),
        });
    }

    finish_report(
        &mut report,
        expenses.iter().map(|e| (e.date, e.amount)),
        expenses.len(),
    );
    debug!(
        kept = report.rows_kept,
        duplicates = report.duplicates_removed,
        negatives = report.negatives_dropped,
        "Cleaned expenses"
    );
    (expenses, report)
}

/// Read and clean an income CSV
pub fn parse_income<R: Read>(reader: R) -> Result<(Vec<Income>, CleaningReport)> {
    let mut rdr = csv_reader(reader);
    let headers = rdr.headers()?.clone();
    let date_col = column_index(&headers, "Date")?;
    let amount_col = column_index(&headers, "Amount")?;
    let category_col = column_index(&headers, "Category")?;
    let city_col = column_index(&headers, "City")?;

    let mut raw = Vec::new();
    for result in rdr.records() {
        let record = result?;
        raw.push(RawIncome {
            date: record_date(&record, date_col)?,
            amount: field(&record, amount_col).and_then(|s| parse_amount(&s)),
            category: field(&record, category_col),
            city: field(&record, city_col),
        });
    }

    debug!("Read {} raw income rows", raw.len());
    Ok(clean_income(raw))
}

/// Apply the cleaning pipeline to raw income rows
pub fn clean_income(raw: Vec<RawIncome>) -> (Vec<Income>, CleaningReport) {
    let mut report = CleaningReport {
        rows_read: raw.len(),
        ..Default::default()
    };

    let (rows, removed) = dedup_by_key(raw, |r| {
        (
            r.date,
            r.amount.map(f64::to_bits),
            r.category.clone(),
            r.city.clone(),
        )
    });
    report.duplicates_removed = removed;

    let mut income = Vec::with_capacity(rows.len());
    for row in rows {
        let amount = row.amount.unwrap_or_else(|| {
            report.amounts_filled += 1;
            0.0
        });
        let category = row.category.unwrap_or_else(|| {
            report.categories_filled += 1;
            DEFAULT_CATEGORY.to_string()
        });

        if amount < 0.0 {
            report.negatives_dropped += 1;
            continue;
        }

        income.push(Income {
            date: row.date,
            amount,
            category,
            city: row.city.unwrap_or_else(|| DEFAULT_CITY.to_string()),
            year: row.date.year(),
            month: row.date.month(),
            year_month: year_month(row.date),
        });
    }

    finish_report(
        &mut report,
        income.iter().map(|i| (i.date, i.amount)),
        income.len(),
    );
    debug!(
        kept = report.rows_kept,
        duplicates = report.duplicates_removed,
        negatives = report.negatives_dropped,
        "Cleaned income"
    );
    (income, report)
}

fn finish_report(
    report: &mut CleaningReport,
    rows: impl Iterator<Item = (NaiveDate, f64)>,
    kept: usize,
) {
    report.rows_kept = kept;
    for (date, amount) in rows {
        report.date_range = Some(match report.date_range {
            Some((min, max)) => (min.min(date), max.max(date)),
            None => (date, date),
        });
        if amount > report.max_amount {
            report.max_amount = amount;
        }
    }
}

/// Keep the first occurrence of each key, preserving order
fn dedup_by_key<T, K: Eq + Hash>(rows: Vec<T>, key: impl Fn(&T) -> K) -> (Vec<T>, usize) {
    let before = rows.len();
    let mut seen = HashSet::with_capacity(before);
    let kept: Vec<T> = rows.into_iter().filter(|r| seen.insert(key(r))).collect();
    let removed = before - kept.len();
    (kept, removed)
}

// =============================================================================
// Reference tables
// =============================================================================

/// Read the city cost-of-living reference. Unparseable costs count as 0.
pub fn parse_city_costs<R: Read>(reader: R) -> Result<Vec<CityCost>> {
    let mut rdr = csv_reader(reader);
    let headers = rdr.headers()?.clone();
    let city_col = column_index(&headers, "City")?;
    let category_col = column_index(&headers, "Category")?;
    let cost_col = column_index(&headers, "MonthlyCost")?;

    let mut costs = Vec::new();
    for result in rdr.records() {
        let record = result?;
        costs.push(CityCost {
            city: field(&record, city_col).unwrap_or_else(|| DEFAULT_CITY.to_string()),
            category: field(&record, category_col)
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            monthly_cost: field(&record, cost_col)
                .and_then(|s| parse_amount(&s))
                .unwrap_or(0.0),
        });
    }

    debug!("Parsed {} city cost rows", costs.len());
    Ok(costs)
}

/// Read the role/city salary reference
///
/// Rows without a usable AverageSalary are dropped; the count of dropped rows
/// is returned alongside.
pub fn parse_salary_reference<R: Read>(reader: R) -> Result<(Vec<RoleSalary>, usize)> {
    let mut rdr = csv_reader(reader);
    let headers = rdr.headers()?.clone();
    let city_col = column_index(&headers, "City")?;
    let role_col = column_index(&headers, "Role")?;
    let salary_col = column_index(&headers, "AverageSalary")?;

    let mut salaries = Vec::new();
    let mut dropped = 0;
    for result in rdr.records() {
        let record = result?;
        let Some(average_salary) = field(&record, salary_col).and_then(|s| parse_amount(&s))
        else {
            dropped += 1;
            continue;
        };
        salaries.push(RoleSalary {
            city: field(&record, city_col).unwrap_or_else(|| DEFAULT_CITY.to_string()),
            role: field(&record, role_col).unwrap_or_else(|| "Unknown".to_string()),
            average_salary,
        });
    }

    debug!(
        "Parsed {} salary reference rows ({} dropped)",
        salaries.len(),
        dropped
    );
    Ok((salaries, dropped))
}

// =============================================================================
// Field helpers
// =============================================================================

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn column_index(headers: &StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
        .ok_or_else(|| Error::InvalidData(format!("Missing column: {}", name)))
}

/// Non-empty trimmed field value
fn field(record: &StringRecord, idx: usize) -> Option<String> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn record_date(record: &StringRecord, idx: usize) -> Result<NaiveDate> {
    let line = record.position().map(|p| p.line()).unwrap_or(0);
    let value = field(record, idx)
        .ok_or_else(|| Error::InvalidData(format!("Line {}: missing date", line)))?;
    parse_date(&value).map_err(|_| {
        Error::InvalidData(format!("Line {}: unable to parse date: {}", line, value))
    })
}

/// Parse a date string in various common formats
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d", // 2024-01-15
        "%m/%d/%Y", // 01/15/2024
        "%m/%d/%y", // 01/15/24
        "%m-%d-%Y", // 01-15-2024
        "%d/%m/%Y", // 15/01/2024 (European)
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    // Timestamps exported with a time component
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }

    Err(Error::InvalidData(format!("Unable to parse date: {}", s)))
}

/// Parse an amount string, handling currency symbols, commas and accounting
/// parentheses. Returns None for anything that is not a finite number.
pub fn parse_amount(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .replace(['$', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// "YYYY-MM" bucket key; lexical order is chronological
pub fn year_month(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
