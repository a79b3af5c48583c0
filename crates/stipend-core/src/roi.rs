//! Degree return-on-investment estimates
//!
//! Break-even timelines under three salary outlooks. Salary figures come
//! from the role/city salary reference (min, median and max across all
//! rows) or from fixed fallbacks when the reference is empty.
//!
//! The degree cost is the sum of every recorded expense, living costs
//! included, not tuition alone.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::models::{Expense, Income, RoleSalary};

/// Salary figures used when no reference data is available
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FallbackSalaries {
    pub conservative: f64,
    pub realistic: f64,
    pub optimistic: f64,
}

impl Default for FallbackSalaries {
    fn default() -> Self {
        Self {
            conservative: 60000.0,
            realistic: 85000.0,
            optimistic: 120000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SalarySource {
    Dataset,
    Fallback,
}

impl SalarySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SalarySource::Dataset => "dataset",
            SalarySource::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for SalarySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outlook {
    Conservative,
    Realistic,
    Optimistic,
}

impl Outlook {
    pub fn all() -> &'static [Outlook] {
        &[Outlook::Conservative, Outlook::Realistic, Outlook::Optimistic]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outlook::Conservative => "conservative",
            Outlook::Realistic => "realistic",
            Outlook::Optimistic => "optimistic",
        }
    }

    /// Months without income before the first paycheck
    pub fn job_search_months(&self) -> u32 {
        match self {
            Outlook::Conservative => 6,
            Outlook::Realistic => 3,
            Outlook::Optimistic => 1,
        }
    }

    /// Fraction of salary put toward recovering the degree cost
    pub fn savings_rate(&self) -> f64 {
        match self {
            Outlook::Conservative => 0.15,
            Outlook::Realistic => 0.25,
            Outlook::Optimistic => 0.35,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Outlook::Conservative => "Conservative estimate with 6-month job search (lowest salary)",
            Outlook::Realistic => "Realistic estimate with 3-month job search (median salary)",
            Outlook::Optimistic => "Optimistic estimate with quick job placement (highest salary)",
        }
    }
}

impl std::str::FromStr for Outlook {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "conservative" => Ok(Outlook::Conservative),
            "realistic" => Ok(Outlook::Realistic),
            "optimistic" => Ok(Outlook::Optimistic),
            _ => Err(format!("Unknown outlook: {}", s)),
        }
    }
}

impl std::fmt::Display for Outlook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalaryRanges {
    pub conservative: f64,
    pub realistic: f64,
    pub optimistic: f64,
}

impl SalaryRanges {
    pub fn for_outlook(&self, outlook: Outlook) -> f64 {
        match outlook {
            Outlook::Conservative => self.conservative,
            Outlook::Realistic => self.realistic,
            Outlook::Optimistic => self.optimistic,
        }
    }
}

/// Min/median/max salary, rounded to whole currency units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalaryStats {
    pub min: f64,
    pub median: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiScenario {
    pub outlook: Outlook,
    pub annual_salary: f64,
    pub monthly_salary: f64,
    pub monthly_savings: f64,
    /// Infinite when monthly savings are not positive
    pub break_even_months: f64,
    /// (break_even_months + job_search_months) / 12, infinite with break_even_months
    pub break_even_years: f64,
    /// (annual_salary - cost) / cost * 100, 0 when cost is 0
    pub roi_percentage: f64,
    pub job_search_months: u32,
    pub savings_rate: f64,
}

impl RoiScenario {
    fn compute(outlook: Outlook, annual_salary: f64, total_degree_cost: f64) -> Self {
        let job_search_months = outlook.job_search_months();
        let savings_rate = outlook.savings_rate();
        let monthly_salary = annual_salary / 12.0;
        let monthly_savings = monthly_salary * savings_rate;

        let (break_even_months, break_even_years) = if monthly_savings > 0.0 {
            let months = total_degree_cost / monthly_savings;
            (months, (months + job_search_months as f64) / 12.0)
        } else {
            (f64::INFINITY, f64::INFINITY)
        };

        let roi_percentage = if total_degree_cost > 0.0 {
            (annual_salary - total_degree_cost) / total_degree_cost * 100.0
        } else {
            0.0
        };

        Self {
            outlook,
            annual_salary,
            monthly_salary,
            monthly_savings,
            break_even_months,
            break_even_years,
            roi_percentage,
            job_search_months,
            savings_rate,
        }
    }
}

/// Figures the analysis was derived from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiDataPoints {
    pub total_expenses: f64,
    pub actual_salary_total: f64,
    /// Distinct calendar months with income records
    pub actual_salary_months: usize,
    /// Income total per city
    pub city_breakdown: BTreeMap<String, f64>,
    /// Reference salaries in input order; empty on fallback
    pub dataset_salaries: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiAnalysis {
    pub total_degree_cost: f64,
    pub actual_monthly_salary: f64,
    pub actual_annual_salary: f64,
    /// Annualized actual income per city
    pub city_annual_salaries: BTreeMap<String, f64>,
    pub salary_ranges: SalaryRanges,
    pub salary_source: SalarySource,
    pub city_salary_stats: BTreeMap<String, SalaryStats>,
    pub role_salary_stats: BTreeMap<String, SalaryStats>,
    /// One entry per outlook, conservative first
    pub scenarios: Vec<RoiScenario>,
    /// Realistic outlook's break-even years
    pub break_even_years: f64,
    pub data_points: RoiDataPoints,
}

impl RoiAnalysis {
    pub fn scenario(&self, outlook: Outlook) -> Option<&RoiScenario> {
        self.scenarios.iter().find(|s| s.outlook == outlook)
    }
}

pub fn roi_analysis(
    expenses: &[Expense],
    income: &[Income],
    salary_reference: &[RoleSalary],
    fallback: FallbackSalaries,
) -> RoiAnalysis {
    let total_degree_cost: f64 = expenses.iter().map(|e| e.amount).sum();

    let actual_salary_total: f64 = income.iter().map(|i| i.amount).sum();
    let actual_salary_months = income
        .iter()
        .map(|i| i.year_month.as_str())
        .collect::<BTreeSet<_>>()
        .len();
    let actual_monthly_salary = if actual_salary_months > 0 {
        actual_salary_total / actual_salary_months as f64
    } else {
        0.0
    };

    let (city_breakdown, city_annual_salaries) = city_income(income);

    let dataset_salaries: Vec<f64> = salary_reference.iter().map(|r| r.average_salary).collect();
    let (salary_ranges, salary_source) = match min_median_max(&dataset_salaries) {
        Some(stats) => {
            info!(
                conservative = stats.min,
                realistic = stats.median,
                optimistic = stats.max,
                "Salary ranges from reference data"
            );
            (
                SalaryRanges {
                    conservative: stats.min,
                    realistic: stats.median,
                    optimistic: stats.max,
                },
                SalarySource::Dataset,
            )
        }
        None => {
            warn!("Salary reference is empty, using fallback salary ranges");
            (
                SalaryRanges {
                    conservative: fallback.conservative,
                    realistic: fallback.realistic,
                    optimistic: fallback.optimistic,
                },
                SalarySource::Fallback,
            )
        }
    };

    let scenarios: Vec<RoiScenario> = Outlook::all()
        .iter()
        .map(|&o| RoiScenario::compute(o, salary_ranges.for_outlook(o), total_degree_cost))
        .collect();
    let break_even_years =
        RoiScenario::compute(Outlook::Realistic, salary_ranges.realistic, total_degree_cost)
            .break_even_years;

    RoiAnalysis {
        total_degree_cost,
        actual_monthly_salary,
        actual_annual_salary: actual_monthly_salary * 12.0,
        city_annual_salaries,
        salary_ranges,
        salary_source,
        city_salary_stats: grouped_stats(salary_reference, |r| &r.city),
        role_salary_stats: grouped_stats(salary_reference, |r| &r.role),
        scenarios,
        break_even_years,
        data_points: RoiDataPoints {
            total_expenses: total_degree_cost,
            actual_salary_total,
            actual_salary_months,
            city_breakdown,
            dataset_salaries,
        },
    }
}

/// Per-city income totals and their annualized monthly rate
fn city_income(income: &[Income]) -> (BTreeMap<String, f64>, BTreeMap<String, f64>) {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    let mut months: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for i in income {
        *totals.entry(i.city.clone()).or_insert(0.0) += i.amount;
        months
            .entry(i.city.as_str())
            .or_default()
            .insert(i.year_month.as_str());
    }

    let annual = totals
        .iter()
        .map(|(city, total)| {
            let n = months.get(city.as_str()).map_or(0, |m| m.len());
            let annual = if n > 0 { total / n as f64 * 12.0 } else { 0.0 };
            (city.clone(), annual)
        })
        .collect();
    (totals, annual)
}

fn grouped_stats(
    rows: &[RoleSalary],
    key: impl Fn(&RoleSalary) -> &String,
) -> BTreeMap<String, SalaryStats> {
    let mut groups: BTreeMap<&String, Vec<f64>> = BTreeMap::new();
    for r in rows {
        groups.entry(key(r)).or_default().push(r.average_salary);
    }
    groups
        .into_iter()
        .filter_map(|(k, values)| {
            let s = min_median_max(&values)?;
            Some((
                k.clone(),
                SalaryStats {
                    min: s.min.round_ties_even(),
                    median: s.median.round_ties_even(),
                    max: s.max.round_ties_even(),
                },
            ))
        })
        .collect()
}

/// Unrounded min/median/max; median of an even count averages the middle pair
fn min_median_max(values: &[f64]) -> Option<SalaryStats> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    let median = if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    };
    Some(SalaryStats {
        min: sorted[0],
        median,
        max: sorted[n - 1],
    })
}
