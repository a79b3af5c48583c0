//! Report command implementations

use anyhow::Result;
use chrono::NaiveDate;
use stipend_core::{city_cost_summary, Aggregator, Dataset};

use super::{format_currency, print_json, truncate};

fn print_window(from: Option<NaiveDate>, to: Option<NaiveDate>, aggregator: &Aggregator) {
    let extent = aggregator.expense_extent();
    let from = from.or(extent.map(|(min, _)| min));
    let to = to.or(extent.map(|(_, max)| max));
    if let (Some(from), Some(to)) = (from, to) {
        println!("   Period: {} to {}", from, to);
    }
}

pub fn cmd_summary(
    dataset: &Dataset,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    json: bool,
) -> Result<()> {
    let aggregator = Aggregator::from_dataset(dataset);
    let rows = aggregator.monthly_summary(from, to);
    if json {
        return print_json(&rows);
    }

    println!();
    println!("📅 Monthly Summary");
    print_window(from, to, &aggregator);
    println!("   ─────────────────────────────────────────────────────────────");

    if rows.is_empty() {
        println!("   No records found in this period.");
        return Ok(());
    }

    println!(
        "   {:8} │ {:>12} │ {:>12} │ {:>12} │ {:>12}",
        "Month", "Expenses", "Income", "Net", "Cumulative"
    );
    println!("   ─────────┼──────────────┼──────────────┼──────────────┼──────────────");
    for row in &rows {
        println!(
            "   {:8} │ {:>12} │ {:>12} │ {:>12} │ {:>12}",
            row.year_month,
            format_currency(row.total_expenses),
            format_currency(row.total_income),
            format_currency(row.net_amount),
            format_currency(row.cumulative_net),
        );
    }

    Ok(())
}

pub fn cmd_categories(
    dataset: &Dataset,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    json: bool,
) -> Result<()> {
    let aggregator = Aggregator::from_dataset(dataset);
    let window = aggregator.filtered_expenses(from, to);
    let rows = aggregator.category_breakdown(from, to, Some(window.as_slice()));
    if json {
        return print_json(&rows);
    }

    println!();
    println!("📊 Spending by Category");
    print_window(from, to, &aggregator);
    println!("   ─────────────────────────────────────────────────────────────");

    if rows.is_empty() {
        println!("   No spending found in this period.");
        return Ok(());
    }

    let total: f64 = rows.iter().map(|r| r.amount).sum();
    println!("   Total: {}", format_currency(total));
    println!();
    println!(
        "   {:25} │ {:>12} │ {:>6} │ {:>5}",
        "Category", "Amount", "%", "Count"
    );
    println!("   ──────────────────────────┼──────────────┼────────┼───────");
    for row in &rows {
        let pct = if total > 0.0 {
            row.amount / total * 100.0
        } else {
            0.0
        };
        println!(
            "   {:25} │ {:>12} │ {:>5.1}% │ {:>5}",
            truncate(&row.category, 25),
            format_currency(row.amount),
            pct,
            row.count
        );
    }

    Ok(())
}

pub fn cmd_groups(
    dataset: &Dataset,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    json: bool,
) -> Result<()> {
    let aggregator = Aggregator::from_dataset(dataset);
    let rows = aggregator.group_breakdown(from, to);
    if json {
        return print_json(&rows);
    }

    println!();
    println!("🗂️  Spending by Group");
    print_window(from, to, &aggregator);
    println!("   ─────────────────────────────────────────────");

    if rows.is_empty() {
        println!("   No spending found in this period.");
        return Ok(());
    }

    for row in &rows {
        println!(
            "   {:16} {:>12}  ({} transactions)",
            row.group.as_str(),
            format_currency(row.amount),
            row.count
        );
    }

    Ok(())
}

pub fn cmd_metrics(dataset: &Dataset, json: bool) -> Result<()> {
    let metrics = Aggregator::from_dataset(dataset).key_metrics();
    if json {
        return print_json(&metrics);
    }

    println!();
    println!("╭─────────────────────────────────────────╮");
    println!("│           🎓 Stipend Overview           │");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Total expenses:     {}", format_currency(metrics.total_expenses));
    println!("  Total income:       {}", format_currency(metrics.total_income));
    println!("  Net:                {}", format_currency(metrics.net_amount));
    println!(
        "  Avg monthly spend:  {}  (excluding tuition)",
        format_currency(metrics.avg_monthly_expenses)
    );
    println!();
    println!("  Tuition total:      {}", format_currency(metrics.tuition_total));
    if metrics.tuition_months > 0 {
        println!(
            "  Tuition per month:  {}  over {} months",
            format_currency(metrics.avg_tuition_per_month),
            metrics.tuition_months
        );
    }

    Ok(())
}

pub fn cmd_payments(dataset: &Dataset, json: bool) -> Result<()> {
    let rows = Aggregator::from_dataset(dataset).payment_breakdown();
    if json {
        return print_json(&rows);
    }

    println!();
    println!("💳 Spending by Payment Type");
    println!("   ─────────────────────────────────────────────────────────────");

    if rows.is_empty() {
        println!("   No expenses recorded.");
        return Ok(());
    }

    println!(
        "   {:18} │ {:>12} │ {:>10} │ {:>5} │ {:>10}",
        "Payment Type", "Total", "Average", "Count", "Categories"
    );
    println!("   ───────────────────┼──────────────┼────────────┼───────┼────────────");
    for row in &rows {
        println!(
            "   {:18} │ {:>12} │ {:>10} │ {:>5} │ {:>10}",
            truncate(&row.payment_type, 18),
            format_currency(row.total),
            format_currency(row.average),
            row.count,
            row.unique_categories
        );
    }

    Ok(())
}

pub fn cmd_cities(dataset: &Dataset, json: bool) -> Result<()> {
    let summaries = city_cost_summary(&dataset.city_costs);
    if json {
        return print_json(&summaries);
    }

    println!();
    println!("🏙️  Cost of Living by City");
    println!("   ─────────────────────────────────────────────");

    if summaries.is_empty() {
        println!("   No city cost data.");
        return Ok(());
    }

    for city in &summaries {
        println!(
            "   {}  {}/month",
            city.city,
            format_currency(city.total_monthly_cost)
        );
        for (category, cost) in &city.categories {
            println!("      {:22} {:>12}", truncate(category, 22), format_currency(*cost));
        }
    }

    Ok(())
}
