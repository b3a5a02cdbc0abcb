//! Domain models for Fintrack

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// A user row including the stored password hash
///
/// Only the login path needs the hash, so it never travels inside `User`.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    /// Argon2 PHC string
    pub password_hash: String,
}

/// A user to be inserted (password already hashed)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// A recorded expense, owned by exactly one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    /// Expected to be non-negative; not enforced
    pub amount: f64,
    pub category: String,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when adding or editing an expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    pub title: String,
    pub amount: f64,
    pub category: String,
    pub date: NaiveDate,
}

impl NewExpense {
    /// Trim text fields and reject empty ones
    pub fn normalized(self) -> crate::Result<Self> {
        let title = self.title.trim().to_string();
        let category = self.category.trim().to_string();
        if title.is_empty() {
            return Err(crate::Error::InvalidData("title is required".to_string()));
        }
        if category.is_empty() {
            return Err(crate::Error::InvalidData(
                "category is required".to_string(),
            ));
        }
        if !self.amount.is_finite() {
            return Err(crate::Error::InvalidData(
                "amount must be a number".to_string(),
            ));
        }
        Ok(Self {
            title,
            category,
            ..self
        })
    }
}

/// Audit log entry
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: String,
    pub user_id: Option<i64>,
    pub action: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<i64>,
    pub details: Option<String>,
}
