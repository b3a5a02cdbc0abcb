//! Expense handlers

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, Response, StatusCode},
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use crate::{AppError, AppState, CurrentUser, SuccessResponse};
use fintrack_core::db::ExpenseFilter;
use fintrack_core::models::{Expense, NewExpense};

/// Query parameters shared by the list, export and dashboard routes
#[derive(Debug, Default, Deserialize)]
pub struct ExpenseQuery {
    /// Matches title or category, case-insensitive
    pub search: Option<String>,
    /// Inclusive lower bound (YYYY-MM-DD)
    pub start_date: Option<String>,
    /// Inclusive upper bound (YYYY-MM-DD)
    pub end_date: Option<String>,
}

impl ExpenseQuery {
    pub fn filter(&self) -> fintrack_core::Result<ExpenseFilter> {
        ExpenseFilter::new()
            .search(self.search.as_deref())
            .with_date_strings(self.start_date.as_deref(), self.end_date.as_deref())
    }
}

/// Add/edit form; the date stays a string so a bad value is a 400
#[derive(Debug, Deserialize)]
pub struct ExpenseForm {
    pub title: String,
    pub amount: f64,
    pub category: String,
    pub date: String,
}

impl ExpenseForm {
    fn into_new_expense(self) -> Result<NewExpense, AppError> {
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| AppError::bad_request("Invalid date format (use YYYY-MM-DD)"))?;
        Ok(NewExpense {
            title: self.title,
            amount: self.amount,
            category: self.category,
            date,
        })
    }
}

/// GET /api/expenses - The caller's expenses, newest first
pub async fn list_expenses(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Query(params): Query<ExpenseQuery>,
) -> Result<Json<Vec<Expense>>, AppError> {
    let filter = params.filter()?;
    let expenses = state.db.list_expenses(current.id, &filter)?;
    Ok(Json(expenses))
}

/// POST /api/expenses - Add an expense
pub async fn create_expense(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Json(form): Json<ExpenseForm>,
) -> Result<(StatusCode, Json<Expense>), AppError> {
    let new_expense = form.into_new_expense()?;
    let expense = state.db.insert_expense(current.id, &new_expense)?;

    state.db.log_audit(
        Some(current.id),
        "create",
        Some("expense"),
        Some(expense.id),
        Some(&format!("amount={:.2}, category={}", expense.amount, expense.category)),
    )?;

    Ok((StatusCode::CREATED, Json(expense)))
}

/// GET /api/expenses/:id - One owned expense
pub async fn get_expense(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<Expense>, AppError> {
    let expense = state.db.get_owned_expense(current.id, id)?;
    Ok(Json(expense))
}

/// PUT /api/expenses/:id - Edit an owned expense
pub async fn update_expense(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(form): Json<ExpenseForm>,
) -> Result<Json<Expense>, AppError> {
    let new_expense = form.into_new_expense()?;
    let expense = state.db.update_expense(current.id, id, &new_expense)?;

    state
        .db
        .log_audit(Some(current.id), "update", Some("expense"), Some(id), None)?;

    Ok(Json(expense))
}

/// DELETE /api/expenses/:id - Remove an owned expense
pub async fn delete_expense(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.db.delete_expense(current.id, id)?;

    state
        .db
        .log_audit(Some(current.id), "delete", Some("expense"), Some(id), None)?;

    Ok(Json(SuccessResponse { success: true }))
}

/// GET /api/expenses/export - CSV download of the filtered list
pub async fn export_expenses(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Query(params): Query<ExpenseQuery>,
) -> Result<Response<Body>, AppError> {
    let filter = params.filter()?;
    let export = state.db.export_expenses_csv(current.id, &filter)?;
    let rows = export.rows;

    state.db.log_audit(
        Some(current.id),
        "export",
        Some("expense"),
        None,
        Some(&format!("rows={}", rows)),
    )?;
    info!(user_id = current.id, rows, "Exported expenses to CSV");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"expenses.csv\"",
        )
        .body(Body::from(export.content))
        .map_err(|e| AppError::internal(&e.to_string()))
}
