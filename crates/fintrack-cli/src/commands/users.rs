//! User command implementations

use anyhow::{Context, Result};
use fintrack_core::db::Database;
use fintrack_core::Registration;

use super::find_user;

/// Password fallback for non-interactive use
pub const PASSWORD_ENV: &str = "FINTRACK_PASSWORD";

/// `--password`, else FINTRACK_PASSWORD
pub fn resolve_password(flag: Option<String>) -> Result<String> {
    flag.or_else(|| std::env::var(PASSWORD_ENV).ok())
        .filter(|p| !p.is_empty())
        .with_context(|| format!("No password given (use --password or set {})", PASSWORD_ENV))
}

pub fn cmd_users_add(db: &Database, username: &str, email: &str, password: &str) -> Result<()> {
    let user = db
        .register_user(&Registration {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        })
        .context("Failed to create user")?;

    db.log_audit(Some(user.id), "register", Some("user"), Some(user.id), Some("cli"))?;

    println!("✅ Created user '{}' (ID: {})", user.username, user.id);
    Ok(())
}

pub fn cmd_users_list(db: &Database) -> Result<()> {
    let users = db.list_users()?;

    if users.is_empty() {
        println!("No users yet. Create one with:");
        println!("  fintrack users add --username me --email me@example.com");
        return Ok(());
    }

    println!();
    println!("👤 Users");
    println!("   ─────────────────────────────────────────────────────────────");

    for user in users {
        println!(
            "   {:>4} │ {:<20} │ {:<30} │ {}",
            user.id,
            user.username,
            user.email,
            user.created_at.format("%Y-%m-%d")
        );
    }

    Ok(())
}

pub fn cmd_users_delete(db: &Database, username: &str) -> Result<()> {
    let user = find_user(db, username)?;
    db.delete_user(user.id)?;
    println!("🗑️  Deleted user '{}' and their expenses", user.username);
    Ok(())
}
