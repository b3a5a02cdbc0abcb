//! Fintrack CLI - Personal expense tracker
//!
//! Usage:
//!   fintrack init                               Initialize database
//!   fintrack users add --username U --email E   Create a user
//!   fintrack expenses add --user U ...          Record an expense
//!   fintrack dashboard --user U                 Totals and next-month prediction
//!   fintrack serve --port 3000                  Start web server

mod cli;
mod commands;


use anyhow::{Context, Result};
use clap::Parser;
use fintrack_core::config::AppConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let db_path = cli
        .db
        .clone()
        .unwrap_or_else(|| config.database.path.clone());

    match cli.command {
        Commands::Init => commands::cmd_init(&db_path, cli.no_encrypt),
        Commands::Users { action } => {
            let db = commands::open_db(&db_path, cli.no_encrypt)?;
            match action {
                UsersAction::Add {
                    username,
                    email,
                    password,
                } => {
                    let password = commands::resolve_password(password)?;
                    commands::cmd_users_add(&db, &username, &email, &password)
                }
                UsersAction::List => commands::cmd_users_list(&db),
                UsersAction::Delete { username } => commands::cmd_users_delete(&db, &username),
            }
        }
        Commands::Expenses { action } => {
            let db = commands::open_db(&db_path, cli.no_encrypt)?;
            match action {
                ExpensesAction::Add {
                    user,
                    title,
                    amount,
                    category,
                    date,
                } => commands::cmd_expenses_add(&db, &user, &title, amount, &category, &date),
                ExpensesAction::List { user, filter } => {
                    commands::cmd_expenses_list(&db, &user, &filter)
                }
                ExpensesAction::Delete { user, id } => {
                    commands::cmd_expenses_delete(&db, &user, id)
                }
            }
        }
        Commands::Dashboard { user, filter, json } => {
            let db = commands::open_db(&db_path, cli.no_encrypt)?;
            commands::cmd_dashboard(&db, &user, &filter, json)
        }
        Commands::Export {
            user,
            output,
            filter,
        } => {
            let db = commands::open_db(&db_path, cli.no_encrypt)?;
            commands::cmd_export(&db, &user, output.as_deref(), &filter)
        }
        Commands::Serve {
            port,
            host,
            static_dir,
        } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            commands::cmd_serve(
                &db_path,
                &config,
                &host,
                port,
                cli.no_encrypt,
                static_dir.as_deref(),
            )
            .await
        }
        Commands::Status => commands::cmd_status(&db_path, cli.no_encrypt),
    }
}
