//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};
use fintrack_core::config::AppConfig;
use fintrack_server::ServerConfig;

use super::open_db;

pub async fn cmd_serve(
    db_path: &Path,
    config: &AppConfig,
    host: &str,
    port: u16,
    no_encrypt: bool,
    static_dir: Option<&Path>,
) -> Result<()> {
    println!("🚀 Starting Fintrack web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }

    let server_config = ServerConfig::from(config);

    if server_config.secret_key.is_some() {
        println!("   🔑 Sessions: signed with configured secret");
    } else {
        println!("   ⚠️  Sessions: random secret (set FINTRACK_SECRET_KEY to keep logins across restarts)");
    }
    println!("   ⏱️  Session lifetime: {}h", server_config.session_ttl_hours);
    if !server_config.allowed_origins.is_empty() {
        println!(
            "   🌐 CORS origins: {}",
            server_config.allowed_origins.join(", ")
        );
    }
    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    }
    println!();

    let db = open_db(db_path, no_encrypt)?;

    let static_dir = static_dir
        .map(|d| d.to_str().context("Static directory path is not valid UTF-8"))
        .transpose()?;

    fintrack_server::serve_with_config(db, host, port, static_dir, server_config).await
}
