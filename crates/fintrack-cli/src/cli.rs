//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Fintrack - Track expenses and see where the month is heading
#[derive(Parser)]
#[command(name = "fintrack")]
#[command(about = "Self-hosted expense tracker with spending trends", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path (defaults to [database] path from config)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Config file overriding the built-in defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set FINTRACK_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Optional search and inclusive date range
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Match title or category (case-insensitive)
    #[arg(long)]
    pub search: Option<String>,

    /// Start date (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub from: Option<String>,

    /// End date (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub to: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Manage user accounts
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },

    /// Add, list and delete expenses
    Expenses {
        #[command(subcommand)]
        action: ExpensesAction,
    },

    /// Show totals, breakdowns and next month's prediction
    Dashboard {
        /// Username
        #[arg(short, long)]
        user: String,

        #[command(flatten)]
        filter: FilterArgs,

        /// Print the dashboard as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export expenses to CSV
    Export {
        /// Username
        #[arg(short, long)]
        user: String,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Start the web server
    Serve {
        /// Port to listen on (defaults to [server] port from config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (defaults to [server] host from config)
        #[arg(long)]
        host: Option<String>,

        /// Directory of static files to serve alongside the API
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Show database status
    Status,
}

#[derive(Subcommand)]
pub enum UsersAction {
    /// Create a user
    Add {
        #[arg(long)]
        username: String,

        #[arg(long)]
        email: String,

        /// Password (falls back to FINTRACK_PASSWORD)
        #[arg(long)]
        password: Option<String>,
    },

    /// List users
    List,

    /// Delete a user and all of their expenses
    Delete {
        #[arg(long)]
        username: String,
    },
}

#[derive(Subcommand)]
pub enum ExpensesAction {
    /// Record an expense
    Add {
        /// Username
        #[arg(short, long)]
        user: String,

        #[arg(long)]
        title: String,

        #[arg(long, allow_negative_numbers = true)]
        amount: f64,

        #[arg(long)]
        category: String,

        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: String,
    },

    /// List expenses, newest first
    List {
        /// Username
        #[arg(short, long)]
        user: String,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Delete an expense
    Delete {
        /// Username
        #[arg(short, long)]
        user: String,

        /// Expense ID
        #[arg(long)]
        id: i64,
    },
}
