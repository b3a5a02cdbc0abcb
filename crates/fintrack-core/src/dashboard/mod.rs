//! Dashboard computation
//!
//! - `aggregate` - totals by category and date, top category, count
//! - `trend` - monthly buckets and the next-month projection
//! - `view` - the serializable view-model
//!
//! `DashboardService` ties these to the store for one user at a time. It keeps
//! no per-request state and is built once per application instance.

pub mod aggregate;
pub mod trend;
pub mod view;

use tracing::debug;

use crate::db::{Database, ExpenseFilter};
use crate::error::Result;
use crate::models::Expense;

pub use aggregate::{aggregate, Aggregate, OrderedTotals, NO_TOP_CATEGORY};
pub use trend::{
    monthly_buckets, predict_next_month, LeastSquares, LinearFit, MonthlyBucket, Prediction,
    Predictor, TrendModel, YearMonth, NOT_ENOUGH_DATA,
};
pub use view::DashboardView;

/// Build the view for an already-scoped expense list
pub fn build_view<M: TrendModel>(expenses: Vec<Expense>, model: &M) -> DashboardView {
    let summary = aggregate(&expenses);
    let monthly = monthly_buckets(&expenses);
    let prediction = trend::predict_from_buckets(model, &monthly);
    DashboardView::new(expenses, summary, monthly, prediction)
}

/// Per-user dashboard over the expense store
#[derive(Clone)]
pub struct DashboardService<M = LeastSquares> {
    db: Database,
    model: M,
}

impl DashboardService<LeastSquares> {
    pub fn new(db: Database) -> Self {
        Self::with_model(db, LeastSquares)
    }
}

impl<M: TrendModel> DashboardService<M> {
    pub fn with_model(db: Database, model: M) -> Self {
        Self { db, model }
    }

    /// Fetch the user's filtered expenses and summarize them
    pub fn build(&self, user_id: i64, filter: &ExpenseFilter) -> Result<DashboardView> {
        let expenses = self.db.list_expenses(user_id, filter)?;
        let view = build_view(expenses, &self.model);

        debug!(
            user_id,
            expenses = view.total_transactions,
            months = view.monthly.len(),
            prediction = ?view.predicted_expense,
            "Built dashboard"
        );

        Ok(view)
    }
}

#[cfg(test)]
pub(crate) fn test_expense(amount: f64, category: &str, date: &str) -> Expense {
    use std::sync::atomic::{AtomicI64, Ordering};
    static NEXT_ID: AtomicI64 = AtomicI64::new(1);

    Expense {
        id: NEXT_ID.fetch_add(1, Ordering::SeqCst),
        user_id: 1,
        title: format!("{} expense", category),
        amount,
        category: category.to_string(),
        date: chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        created_at: chrono::Utc::now(),
    }
}
