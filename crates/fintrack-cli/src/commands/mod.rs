//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Core commands (init) and shared utilities (open_db, find_user)
//! - `dashboard` - Dashboard summary
//! - `expenses` - Expense commands (add, list, delete) and CSV export
//! - `serve` - Web server command
//! - `status` - Database status
//! - `users` - User commands (add, list, delete)

pub mod core;
pub mod dashboard;
pub mod expenses;
pub mod serve;
pub mod status;
pub mod users;

// Re-export command functions for main.rs
pub use self::core::*;
pub use dashboard::*;
pub use expenses::*;
pub use serve::*;
pub use status::*;
pub use users::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
