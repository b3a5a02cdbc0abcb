//! Per-request expense aggregation
//!
//! Totals by category and by date, overall total, top category, and count.
//! Pure functions over an already-scoped expense list.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::models::Expense;

/// Top category reported for an empty expense list
pub const NO_TOP_CATEGORY: &str = "N/A";

/// Running sums keyed by string, iterated in first-insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderedTotals {
    entries: Vec<(String, f64)>,
    index: HashMap<String, usize>,
}

impl OrderedTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to `key`, appending the key if it is new
    pub fn add(&mut self, key: &str, amount: f64) {
        match self.index.get(key) {
            Some(&pos) => self.entries[pos].1 += amount,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), amount));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.index.get(key).map(|&pos| self.entries[pos].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, v)| *v).collect()
    }

    pub fn sum(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v).sum()
    }

    /// Key with the largest total; the earliest key wins a tie
    pub fn max_key(&self) -> Option<&str> {
        let mut best: Option<(&str, f64)> = None;
        for (key, value) in self.iter() {
            match best {
                Some((_, best_value)) if value <= best_value => {}
                _ => best = Some((key, value)),
            }
        }
        best.map(|(key, _)| key)
    }
}

impl Serialize for OrderedTotals {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Summary of one user's (filtered) expenses
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Aggregate {
    pub total: f64,
    pub category_totals: OrderedTotals,
    /// Keyed by `YYYY-MM-DD`
    pub date_totals: OrderedTotals,
    pub top_category: String,
    pub transaction_count: usize,
}

/// Aggregate an expense list
///
/// Categories are compared verbatim: "Food", "food" and "Food " are three keys.
pub fn aggregate(expenses: &[Expense]) -> Aggregate {
    let mut total = 0.0;
    let mut category_totals = OrderedTotals::new();
    let mut date_totals = OrderedTotals::new();

    for expense in expenses {
        total += expense.amount;
        category_totals.add(&expense.category, expense.amount);
        date_totals.add(&expense.date.format("%Y-%m-%d").to_string(), expense.amount);
    }

    let top_category = category_totals
        .max_key()
        .unwrap_or(NO_TOP_CATEGORY)
        .to_string();

    Aggregate {
        total,
        category_totals,
        date_totals,
        top_category,
        transaction_count: expenses.len(),
    }
}
