//! Next-month spending projection
//!
//! Expenses are bucketed by calendar month, the buckets are ranked 0, 1, 2, ...
//! in chronological order, and a trend model fitted on (rank, total) is
//! evaluated one rank past the last observed month. This is a lightweight
//! heuristic, not a forecast: no regularization, no validation split.

use std::collections::BTreeMap;
use std::fmt;

use chrono::Datelike;
use serde::ser::{Serialize, Serializer};

use crate::models::Expense;

/// Message reported when fewer than two months of data exist
pub const NOT_ENOUGH_DATA: &str = "Not enough data to predict. We need at least 2 months of data.";

/// Minimum number of distinct months needed to fit a trend
pub const MIN_MONTHS: usize = 2;

/// A calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of<D: Datelike>(date: &D) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Summed spend for one calendar month
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct MonthlyBucket {
    pub month: YearMonth,
    /// Rank among the months present, not the calendar month number
    pub index: usize,
    pub total: f64,
}

/// Group expenses by calendar month, oldest first, with contiguous indices
pub fn monthly_buckets(expenses: &[Expense]) -> Vec<MonthlyBucket> {
    let mut totals: BTreeMap<YearMonth, f64> = BTreeMap::new();
    for expense in expenses {
        *totals.entry(YearMonth::of(&expense.date)).or_insert(0.0) += expense.amount;
    }

    totals
        .into_iter()
        .enumerate()
        .map(|(index, (month, total))| MonthlyBucket {
            month,
            index,
            total,
        })
        .collect()
}

/// Something fitted that can be evaluated at a point
pub trait Predictor {
    fn predict(&self, x: f64) -> f64;
}

/// A model that can be fitted to (x, y) points
pub trait TrendModel {
    type Fit: Predictor;

    fn fit(&self, points: &[(f64, f64)]) -> Self::Fit;
}

/// Ordinary least squares with a single feature
#[derive(Debug, Clone, Copy, Default)]
pub struct LeastSquares;

/// y = slope * x + intercept
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl Predictor for LinearFit {
    fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

impl TrendModel for LeastSquares {
    type Fit = LinearFit;

    /// Zero-variance x yields a non-finite slope; callers gate on point count.
    fn fit(&self, points: &[(f64, f64)]) -> LinearFit {
        let n = points.len() as f64;
        let sum_x: f64 = points.iter().map(|p| p.0).sum();
        let sum_y: f64 = points.iter().map(|p| p.1).sum();
        let sum_xx: f64 = points.iter().map(|p| p.0 * p.0).sum();
        let sum_xy: f64 = points.iter().map(|p| p.0 * p.1).sum();

        let slope = (n * sum_xy - sum_x * sum_y) / (n * sum_xx - sum_x * sum_x);
        let intercept = (sum_y - slope * sum_x) / n;

        LinearFit { slope, intercept }
    }
}

/// Outcome of a next-month projection
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Prediction {
    /// Projected total, rounded to cents
    Amount(f64),
    /// Fewer than two months of data
    InsufficientData,
}

impl Prediction {
    pub fn amount(&self) -> Option<f64> {
        match self {
            Self::Amount(v) => Some(*v),
            Self::InsufficientData => None,
        }
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Amount(v) => write!(f, "{:.2}", v),
            Self::InsufficientData => f.write_str(NOT_ENOUGH_DATA),
        }
    }
}

/// A number, or the explanatory message
impl Serialize for Prediction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Amount(v) => serializer.serialize_f64(*v),
            Self::InsufficientData => serializer.serialize_str(NOT_ENOUGH_DATA),
        }
    }
}

/// Half-cent ties go to the even cent
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Project the total for the month after the last one present in `buckets`
///
/// `None` when there are no buckets at all.
pub fn predict_from_buckets<M: TrendModel>(
    model: &M,
    buckets: &[MonthlyBucket],
) -> Option<Prediction> {
    let last = buckets.last()?;
    if buckets.len() < MIN_MONTHS {
        return Some(Prediction::InsufficientData);
    }

    let points: Vec<(f64, f64)> = buckets
        .iter()
        .map(|b| (b.index as f64, b.total))
        .collect();
    let fit = model.fit(&points);
    let next = (last.index + 1) as f64;

    Some(Prediction::Amount(round_cents(fit.predict(next))))
}

/// Project next month's total from raw expenses
pub fn predict_next_month<M: TrendModel>(model: &M, expenses: &[Expense]) -> Option<Prediction> {
    predict_from_buckets(model, &monthly_buckets(expenses))
}
