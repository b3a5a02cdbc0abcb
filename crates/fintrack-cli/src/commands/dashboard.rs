//! Dashboard command implementation

use anyhow::{Context, Result};
use fintrack_core::dashboard::{DashboardService, DashboardView};
use fintrack_core::db::Database;

use super::{build_filter, find_user, truncate};
use crate::cli::FilterArgs;

pub fn cmd_dashboard(db: &Database, username: &str, filter: &FilterArgs, json: bool) -> Result<()> {
    let user = find_user(db, username)?;
    let filter = build_filter(filter)?;
    let view = DashboardService::new(db.clone()).build(user.id, &filter)?;

    if json {
        let out = serde_json::to_string_pretty(&view).context("Failed to serialize dashboard")?;
        println!("{}", out);
        return Ok(());
    }

    print_dashboard(&user.username, &view);
    Ok(())
}

fn print_dashboard(username: &str, view: &DashboardView) {
    println!();
    println!("╭─────────────────────────────────────────╮");
    println!("│          💰 Fintrack Dashboard          │");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  User:            {}", username);
    println!("  Total spent:     ${:.2}", view.total_expense);
    println!("  Transactions:    {}", view.total_transactions);
    println!("  Top category:    {}", view.top_category);

    match &view.predicted_expense {
        Some(prediction) => match prediction.amount() {
            Some(amount) => println!("  📈 Next month:   ${:.2}", amount),
            None => println!("  📈 Next month:   {}", prediction),
        },
        None => println!("  📈 Next month:   -"),
    }

    if view.category_labels.is_empty() {
        println!();
        println!("  No expenses recorded yet.");
        return;
    }

    println!();
    println!("  By category");
    println!("   ─────────────────────────────────────────────────────────────");
    for (label, value) in view.category_labels.iter().zip(&view.category_values) {
        println!("   {:<25} │ {:>12}", truncate(label, 25), format!("${:.2}", value));
    }

    println!();
    println!("  By date");
    println!("   ─────────────────────────────────────────────────────────────");
    for (label, value) in view.date_labels.iter().zip(&view.date_values) {
        println!("   {:<25} │ {:>12}", label, format!("${:.2}", value));
    }

    println!();
    println!("  By month");
    println!("   ─────────────────────────────────────────────────────────────");
    for bucket in &view.monthly {
        println!(
            "   {:<25} │ {:>12}",
            bucket.month.to_string(),
            format!("${:.2}", bucket.total)
        );
    }
    println!();
}
