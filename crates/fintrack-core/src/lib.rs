//! Fintrack Core Library
//!
//! Shared functionality for the Fintrack expense tracker:
//! - Database access and migrations (users, expenses, audit log)
//! - Account registration and password hashing
//! - Dashboard aggregation and next-month trend projection
//! - Layered configuration
//! - CSV export

pub mod auth;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod export;
pub mod models;

pub use auth::Registration;
pub use config::AppConfig;
pub use dashboard::{DashboardService, DashboardView, Prediction};
pub use db::{Database, ExpenseFilter};
pub use error::{Error, Result};
