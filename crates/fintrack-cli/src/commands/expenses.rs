//! Expense and export command implementations

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use fintrack_core::db::Database;
use fintrack_core::models::NewExpense;

use super::{build_filter, find_user, truncate};
use crate::cli::FilterArgs;

pub fn cmd_expenses_add(
    db: &Database,
    username: &str,
    title: &str,
    amount: f64,
    category: &str,
    date: &str,
) -> Result<()> {
    let user = find_user(db, username)?;
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .context("Invalid --date format (use YYYY-MM-DD)")?;

    let expense = db
        .insert_expense(
            user.id,
            &NewExpense {
                title: title.to_string(),
                amount,
                category: category.to_string(),
                date,
            },
        )
        .context("Failed to add expense")?;

    db.log_audit(
        Some(user.id),
        "create",
        Some("expense"),
        Some(expense.id),
        Some("cli"),
    )?;

    println!(
        "✅ Added expense #{}: {} ${:.2} ({}) on {}",
        expense.id, expense.title, expense.amount, expense.category, expense.date
    );
    Ok(())
}

pub fn cmd_expenses_list(db: &Database, username: &str, filter: &FilterArgs) -> Result<()> {
    let user = find_user(db, username)?;
    let filter = build_filter(filter)?;
    let expenses = db.list_expenses(user.id, &filter)?;

    if expenses.is_empty() {
        println!("No expenses found. Add one with:");
        println!(
            "  fintrack expenses add --user {} --title Lunch --amount 12.50 --category Food --date 2024-01-15",
            user.username
        );
        return Ok(());
    }

    println!();
    println!("📝 Expenses for {}", user.username);
    println!("   ─────────────────────────────────────────────────────────────");

    for expense in &expenses {
        println!(
            "   {:>4} │ {} │ {:>10} │ {:<15} │ {}",
            expense.id,
            expense.date,
            format!("${:.2}", expense.amount),
            truncate(&expense.category, 15),
            truncate(&expense.title, 40)
        );
    }

    let total: f64 = expenses.iter().map(|e| e.amount).sum();
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   {} expenses, ${:.2} total", expenses.len(), total);

    Ok(())
}

pub fn cmd_expenses_delete(db: &Database, username: &str, id: i64) -> Result<()> {
    let user = find_user(db, username)?;
    db.delete_expense(user.id, id)
        .with_context(|| format!("Failed to delete expense {}", id))?;
    db.log_audit(Some(user.id), "delete", Some("expense"), Some(id), Some("cli"))?;

    println!("🗑️  Deleted expense #{}", id);
    Ok(())
}

pub fn cmd_export(
    db: &Database,
    username: &str,
    output: Option<&Path>,
    filter: &FilterArgs,
) -> Result<()> {
    let user = find_user(db, username)?;
    let filter = build_filter(filter)?;
    let export = db.export_expenses_csv(user.id, &filter)?;

    match output {
        Some(path) => {
            let mut file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            file.write_all(export.content.as_bytes())?;

            println!("✅ Exported {} expenses to {}", export.rows, path.display());
        }
        None => {
            // Write to stdout
            print!("{}", export.content);
        }
    }

    Ok(())
}
