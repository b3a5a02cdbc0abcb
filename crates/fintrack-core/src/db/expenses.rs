//! Expense operations
//!
//! Reads and writes are always scoped to an owner. Single-row operations
//! distinguish a missing expense (`NotFound`) from someone else's
//! (`Forbidden`).

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};

use super::expense_filter::ExpenseFilter;
use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Expense, NewExpense};

const EXPENSE_COLUMNS: &str = "e.id, e.user_id, e.title, e.amount, e.category, e.date, e.created_at";

fn row_to_expense(row: &Row<'_>) -> rusqlite::Result<Expense> {
    let date: String = row.get(5)?;
    let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let created_at: String = row.get(6)?;
    Ok(Expense {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        amount: row.get(3)?,
        category: row.get(4)?,
        date,
        created_at: parse_datetime(&created_at),
    })
}

impl Database {
    /// Add an expense for a user
    pub fn insert_expense(&self, user_id: i64, expense: &NewExpense) -> Result<Expense> {
        let expense = expense.clone().normalized()?;
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO expenses (user_id, title, amount, category, date)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![
                user_id,
                expense.title,
                expense.amount,
                expense.category,
                expense.date.to_string(),
            ],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);

        self.get_expense(id)?
            .ok_or_else(|| Error::NotFound(format!("expense {}", id)))
    }

    /// Get an expense by ID regardless of owner
    pub fn get_expense(&self, id: i64) -> Result<Option<Expense>> {
        let conn = self.conn()?;
        let expense = conn
            .query_row(
                &format!("SELECT {} FROM expenses e WHERE e.id = ?", EXPENSE_COLUMNS),
                params![id],
                row_to_expense,
            )
            .optional()?;
        Ok(expense)
    }

    /// Get an expense, checking that `user_id` owns it
    pub fn get_owned_expense(&self, user_id: i64, id: i64) -> Result<Expense> {
        let expense = self
            .get_expense(id)?
            .ok_or_else(|| Error::NotFound(format!("expense {}", id)))?;
        if expense.user_id != user_id {
            return Err(Error::Forbidden(
                "You are not authorized to access this expense".to_string(),
            ));
        }
        Ok(expense)
    }

    /// Replace the editable fields of an owned expense
    pub fn update_expense(&self, user_id: i64, id: i64, expense: &NewExpense) -> Result<Expense> {
        let expense = expense.clone().normalized()?;
        self.get_owned_expense(user_id, id)?;

        let conn = self.conn()?;
        conn.execute(
            r#"
            UPDATE expenses
            SET title = ?, amount = ?, category = ?, date = ?
            WHERE id = ? AND user_id = ?
            "#,
            params![
                expense.title,
                expense.amount,
                expense.category,
                expense.date.to_string(),
                id,
                user_id,
            ],
        )?;
        drop(conn);

        self.get_owned_expense(user_id, id)
    }

    /// Delete an owned expense
    pub fn delete_expense(&self, user_id: i64, id: i64) -> Result<()> {
        self.get_owned_expense(user_id, id)?;

        let conn = self.conn()?;
        conn.execute(
            "DELETE FROM expenses WHERE id = ? AND user_id = ?",
            params![id, user_id],
        )?;
        Ok(())
    }

    /// List a user's expenses matching the filter, newest first
    pub fn list_expenses(&self, user_id: i64, filter: &ExpenseFilter) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        let built = filter.build(user_id);

        let sql = format!(
            "SELECT {} FROM expenses e {} {}",
            EXPENSE_COLUMNS, built.where_clause, built.order_clause
        );
        let mut stmt = conn.prepare(&sql)?;
        let expenses = stmt
            .query_map(built.params_refs().as_slice(), row_to_expense)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(expenses)
    }

    /// Count a user's expenses matching the filter
    pub fn count_expenses(&self, user_id: i64, filter: &ExpenseFilter) -> Result<i64> {
        let conn = self.conn()?;
        let built = filter.build(user_id);
        let count = conn.query_row(
            &built.build_count_query(),
            built.params_refs().as_slice(),
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
