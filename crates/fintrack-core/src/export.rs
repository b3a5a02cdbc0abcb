//! CSV export of a user's expenses

use std::io::Write;

use serde::Serialize;

use crate::db::{Database, ExpenseFilter};
use crate::error::{Error, Result};
use crate::models::Expense;

#[derive(Serialize)]
struct ExpenseRow<'a> {
    id: i64,
    date: String,
    title: &'a str,
    category: &'a str,
    amount: String,
}

impl<'a> From<&'a Expense> for ExpenseRow<'a> {
    fn from(expense: &'a Expense) -> Self {
        Self {
            id: expense.id,
            date: expense.date.format("%Y-%m-%d").to_string(),
            title: &expense.title,
            category: &expense.category,
            amount: format!("{:.2}", expense.amount),
        }
    }
}

/// A rendered CSV export
#[derive(Debug, Clone)]
pub struct CsvExport {
    pub content: String,
    /// Number of expenses written, not counting the header
    pub rows: usize,
}

/// Write expenses as CSV (`id,date,title,category,amount`) to `out`
pub fn write_expenses_csv<W: Write>(expenses: &[Expense], out: W) -> Result<()> {
    // Header is written explicitly so an empty export still has one
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(out);
    writer.write_record(["id", "date", "title", "category", "amount"])?;
    for expense in expenses {
        writer.serialize(ExpenseRow::from(expense))?;
    }
    writer.flush()?;
    Ok(())
}

impl Database {
    /// Export a user's filtered expenses as a CSV string
    pub fn export_expenses_csv(&self, user_id: i64, filter: &ExpenseFilter) -> Result<CsvExport> {
        let expenses = self.list_expenses(user_id, filter)?;
        let mut buf = Vec::new();
        write_expenses_csv(&expenses, &mut buf)?;
        let content = String::from_utf8(buf)
            .map_err(|e| Error::InvalidData(format!("Non-UTF-8 export: {}", e)))?;
        Ok(CsvExport {
            content,
            rows: expenses.len(),
        })
    }
}
