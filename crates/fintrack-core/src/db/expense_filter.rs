//! Expense filter builder for constructing dynamic SQL queries
//!
//! Every query built here is scoped to a single owner; the optional search and
//! date bounds narrow that user's expenses further.

use chrono::NaiveDate;

/// Caller-supplied narrowing of a user's expenses
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseFilter {
    /// Case-insensitive substring match on title or category
    pub search: Option<String>,
    /// Inclusive lower bound on the expense date
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on the expense date
    pub end_date: Option<NaiveDate>,
}

/// Result of building a filter - contains SQL components and parameters
pub struct FilterResult {
    /// WHERE clause including "WHERE" keyword (always present, owner scoping)
    pub where_clause: String,
    /// ORDER BY clause including "ORDER BY" keyword
    pub order_clause: &'static str,
    /// Parameters for the query (boxed for rusqlite compatibility)
    pub params: Vec<Box<dyn rusqlite::ToSql>>,
}

impl ExpenseFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set search query; blank input clears it
    pub fn search(mut self, query: Option<&str>) -> Self {
        self.search = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string);
        self
    }

    pub fn start_date(mut self, date: Option<NaiveDate>) -> Self {
        self.start_date = date;
        self
    }

    pub fn end_date(mut self, date: Option<NaiveDate>) -> Self {
        self.end_date = date;
        self
    }

    /// Parse optional `YYYY-MM-DD` bounds as they arrive from a query string
    ///
    /// Empty strings are treated as absent, matching an unfilled form field.
    pub fn with_date_strings(
        self,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> crate::Result<Self> {
        let start = parse_optional_date(start_date, "start_date")?;
        let end = parse_optional_date(end_date, "end_date")?;
        Ok(self.start_date(start).end_date(end))
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_none() && self.start_date.is_none() && self.end_date.is_none()
    }

    /// Build the filter components for one owner
    pub fn build(&self, user_id: i64) -> FilterResult {
        let mut conditions = vec!["e.user_id = ?".to_string()];
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(user_id)];

        if let Some(q) = &self.search {
            conditions.push(
                "(e.title LIKE ? COLLATE NOCASE OR e.category LIKE ? COLLATE NOCASE)".to_string(),
            );
            let pattern = format!("%{}%", q);
            params.push(Box::new(pattern.clone()));
            params.push(Box::new(pattern));
        }

        if let Some(from) = self.start_date {
            conditions.push("e.date >= ?".to_string());
            params.push(Box::new(from.to_string()));
        }

        if let Some(to) = self.end_date {
            conditions.push("e.date <= ?".to_string());
            params.push(Box::new(to.to_string()));
        }

        FilterResult {
            where_clause: format!("WHERE {}", conditions.join(" AND ")),
            order_clause: "ORDER BY e.date DESC, e.id DESC",
            params,
        }
    }
}

fn parse_optional_date(value: Option<&str>, field: &str) -> crate::Result<Option<NaiveDate>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => NaiveDate::parse_from_str(v, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                crate::Error::InvalidData(format!("Invalid {} (use YYYY-MM-DD): {}", field, v))
            }),
    }
}

impl FilterResult {
    /// Build a COUNT query
    pub fn build_count_query(&self) -> String {
        format!("SELECT COUNT(*) FROM expenses e {}", self.where_clause)
    }

    /// Get parameter references for query execution
    pub fn params_refs(&self) -> Vec<&dyn rusqlite::ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_only() {
        let result = ExpenseFilter::new().build(7);
        assert_eq!(result.where_clause, "WHERE e.user_id = ?");
        assert_eq!(result.params.len(), 1);
    }

    #[test]
    fn test_blank_search_ignored() {
        let filter = ExpenseFilter::new().search(Some("   "));
        assert!(filter.is_empty());
        assert_eq!(filter.build(1).params.len(), 1);
    }

    #[test]
    fn test_search_is_trimmed() {
        let filter = ExpenseFilter::new().search(Some("  coffee "));
        assert_eq!(filter.search.as_deref(), Some("coffee"));
        let result = filter.build(1);
        assert!(result.where_clause.contains("e.title LIKE ?"));
        assert!(result.where_clause.contains("e.category LIKE ?"));
        assert_eq!(result.params.len(), 3);
    }

    #[test]
    fn test_date_bounds_are_independent() {
        let filter = ExpenseFilter::new()
            .with_date_strings(Some("2024-01-01"), None)
            .unwrap();
        let result = filter.build(1);
        assert!(result.where_clause.contains("e.date >= ?"));
        assert!(!result.where_clause.contains("e.date <= ?"));

        let filter = ExpenseFilter::new()
            .with_date_strings(Some(""), Some("2024-02-29"))
            .unwrap();
        assert_eq!(filter.start_date, None);
        assert_eq!(filter.end_date, NaiveDate::from_ymd_opt(2024, 2, 29));
    }

    #[test]
    fn test_invalid_date_rejected() {
        let err = ExpenseFilter::new()
            .with_date_strings(Some("01/02/2024"), None)
            .unwrap_err();
        assert!(err.to_string().contains("start_date"));
    }

    #[test]
    fn test_count_query() {
        let result = ExpenseFilter::new().search(Some("x")).build(3);
        assert!(result
            .build_count_query()
            .starts_with("SELECT COUNT(*) FROM expenses e WHERE e.user_id = ?"));
    }
}
