//! Dashboard view-model
//!
//! Flattens the aggregate and the prediction into the shape a chart or
//! template consumes. Label and value sequences come from a single pass over
//! the source mapping, so position `i` of each always refers to the same key.

use serde::Serialize;

use super::aggregate::{Aggregate, OrderedTotals};
use super::trend::{MonthlyBucket, Prediction};
use crate::models::Expense;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub expenses: Vec<Expense>,
    pub total_expense: f64,
    pub top_category: String,
    pub total_transactions: usize,
    pub category_totals: OrderedTotals,
    pub date_totals: OrderedTotals,
    pub category_labels: Vec<String>,
    pub category_values: Vec<f64>,
    pub date_labels: Vec<String>,
    pub date_values: Vec<f64>,
    /// The series the trend was fitted on
    pub monthly: Vec<MonthlyBucket>,
    /// `null`, a number, or the not-enough-data message
    pub predicted_expense: Option<Prediction>,
}

fn series(totals: &OrderedTotals) -> (Vec<String>, Vec<f64>) {
    totals.iter().map(|(k, v)| (k.to_string(), v)).unzip()
}

impl DashboardView {
    pub fn new(
        expenses: Vec<Expense>,
        aggregate: Aggregate,
        monthly: Vec<MonthlyBucket>,
        prediction: Option<Prediction>,
    ) -> Self {
        let (category_labels, category_values) = series(&aggregate.category_totals);
        let (date_labels, date_values) = series(&aggregate.date_totals);

        Self {
            expenses,
            total_expense: aggregate.total,
            top_category: aggregate.top_category,
            total_transactions: aggregate.transaction_count,
            category_totals: aggregate.category_totals,
            date_totals: aggregate.date_totals,
            category_labels,
            category_values,
            date_labels,
            date_values,
            monthly,
            predicted_expense: prediction,
        }
    }
}
