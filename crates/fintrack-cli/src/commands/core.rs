//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `find_user` - Resolve a `--user` argument
//! - `build_filter` - Turn filter flags into an `ExpenseFilter`
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use fintrack_core::db::{Database, ExpenseFilter};
use fintrack_core::models::User;

use crate::cli::FilterArgs;

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

/// Look up a user by username
pub fn find_user(db: &Database, username: &str) -> Result<User> {
    db.get_user_by_username(username)?
        .with_context(|| format!("User not found: {}", username))
}

pub fn build_filter(args: &FilterArgs) -> Result<ExpenseFilter> {
    ExpenseFilter::new()
        .search(args.search.as_deref())
        .with_date_strings(args.from.as_deref(), args.to.as_deref())
        .context("Invalid --from/--to date (use YYYY-MM-DD)")
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    open_db(db_path, no_encrypt)?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Create a user: fintrack users add --username me --email me@example.com");
    println!("  2. Start web UI: fintrack serve");

    Ok(())
}
