//! ROI command

use anyhow::Result;
use stipend_core::{roi_analysis, Dataset, FallbackSalaries, SalarySource};

use super::{format_currency, format_years, print_json};

pub fn cmd_roi(dataset: &Dataset, fallback: FallbackSalaries, json: bool) -> Result<()> {
    let roi = roi_analysis(
        &dataset.expenses,
        &dataset.income,
        &dataset.salary_reference,
        fallback,
    );
    if json {
        return print_json(&roi);
    }

    println!();
    println!("🎓 Degree ROI");
    println!("   ─────────────────────────────────────────────────────────────");
    // All recorded expenses, living costs included
    println!("   Degree cost (all expenses): {}", format_currency(roi.total_degree_cost));
    println!(
        "   Actual salary:              {}/year ({} months of income)",
        format_currency(roi.actual_annual_salary),
        roi.data_points.actual_salary_months
    );
    if roi.salary_source == SalarySource::Fallback {
        println!("   ⚠️  No salary reference data, using default salary ranges");
    }
    println!(
        "   Break-even (realistic):     {}",
        format_years(roi.break_even_years)
    );
    println!();

    println!(
        "   {:12} │ {:>12} │ {:>7} │ {:>10} │ {:>12} │ {:>9}",
        "Outlook", "Salary", "Savings", "Job Search", "Break-even", "ROI"
    );
    println!("   ─────────────┼──────────────┼─────────┼────────────┼──────────────┼───────────");
    for s in &roi.scenarios {
        println!(
            "   {:12} │ {:>12} │ {:>6.0}% │ {:>7} mo │ {:>12} │ {:>8.0}%",
            s.outlook.as_str(),
            format_currency(s.annual_salary),
            s.savings_rate * 100.0,
            s.job_search_months,
            format_years(s.break_even_years),
            s.roi_percentage,
        );
    }

    if !roi.city_annual_salaries.is_empty() {
        println!();
        println!("   Actual salary by city (annualized)");
        for (city, annual) in &roi.city_annual_salaries {
            println!("      {:22} {:>12}", city, format_currency(*annual));
        }
    }

    if !roi.role_salary_stats.is_empty() {
        println!();
        println!("   Reference salaries by role (min / median / max)");
        for (role, stats) in &roi.role_salary_stats {
            println!(
                "      {:22} {} / {} / {}",
                role,
                format_currency(stats.min),
                format_currency(stats.median),
                format_currency(stats.max)
            );
        }
    }

    Ok(())
}
