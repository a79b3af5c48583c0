//! Fixture builders for tests
//!
//! Records are built through the real cleaning pipeline so derived fields
//! (month bucket, weekday, group) match what the loader would produce.

use chrono::NaiveDate;

use crate::import::{
    clean_expenses, clean_income, Dataset, LoadReport, RawExpense, RawIncome,
};
use crate::models::{CityCost, Expense, Income, RoleSalary};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid fixture date")
}

/// Expense paid by credit card in College Station
pub fn expense(date: NaiveDate, category: &str, amount: f64) -> Expense {
    expense_paid(date, category, amount, "Credit Card")
}

pub fn expense_paid(date: NaiveDate, category: &str, amount: f64, payment_type: &str) -> Expense {
    let raw = RawExpense {
        date,
        category: Some(category.to_string()),
        amount: Some(amount),
        payment_type: Some(payment_type.to_string()),
        city: Some("College Station".to_string()),
    };
    let (mut cleaned, _) = clean_expenses(vec![raw]);
    cleaned.pop().expect("fixture expense must be non-negative")
}

pub fn income(date: NaiveDate, amount: f64, city: &str) -> Income {
    let raw = RawIncome {
        date,
        amount: Some(amount),
        category: Some("Part-Time".to_string()),
        city: Some(city.to_string()),
    };
    let (mut cleaned, _) = clean_income(vec![raw]);
    cleaned.pop().expect("fixture income must be non-negative")
}

pub fn role_salary(city: &str, role: &str, average_salary: f64) -> RoleSalary {
    RoleSalary {
        city: city.to_string(),
        role: role.to_string(),
        average_salary,
    }
}

/// Three months of rent (1200) and groceries (300) against 2500/month income
pub fn three_month_baseline() -> (Vec<Expense>, Vec<Income>) {
    let mut expenses = Vec::new();
    let mut income_rows = Vec::new();
    for month in 1..=3 {
        expenses.push(expense(date(2023, month, 1), "Rent", 1200.0));
        expenses.push(expense(date(2023, month, 15), "Groceries", 300.0));
        income_rows.push(income(date(2023, month, 28), 2500.0, "Austin"));
    }
    (expenses, income_rows)
}

/// Small salary reference spanning two cities and two roles
pub fn salary_reference() -> Vec<RoleSalary> {
    vec![
        role_salary("Austin", "Software Engineer", 110000.0),
        role_salary("Austin", "Data Analyst", 70000.0),
        role_salary("Seattle", "Software Engineer", 150000.0),
        role_salary("Seattle", "Data Analyst", 90000.0),
    ]
}

/// Assemble an in-memory dataset without going through CSV
pub fn dataset(
    expenses: Vec<Expense>,
    income: Vec<Income>,
    city_costs: Vec<CityCost>,
    salary_reference: Vec<RoleSalary>,
) -> Dataset {
    Dataset {
        expenses,
        income,
        city_costs,
        salary_reference,
        report: LoadReport::default(),
    }
}
