// Standalone migration runner for the products schema

use anyhow::{Context, Result};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use std::path::Path;
use std::str::FromStr;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use vitrina::database_ops::db::run_migrations;
use vitrina::util::env as env_util;

#[tokio::main]
async fn main() -> Result<()> {
    env_util::init_env();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // ensure migrations dir exists at runtime path
    let mig_dir = Path::new("./migrations");
    if !mig_dir.exists() {
        error!(?mig_dir, "migrations directory not found");
        anyhow::bail!("migrations directory not found: {:?}", mig_dir);
    }

    let database_url = env_util::db_url().context("DATABASE_URL is required")?;

    let mut connect_options = PgConnectOptions::from_str(&database_url)?;
    // Ensure TLS is enabled when DSN contains sslmode=require
    if database_url.contains("sslmode=require") && !database_url.contains("sslmode=disable") {
        connect_options = connect_options.ssl_mode(PgSslMode::Require);
    }

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect_with(connect_options)
        .await
        .context("failed to connect to database")?;

    info!("running migrations...");
    run_migrations(&pool).await?;
    info!("migrations complete");

    Ok(())
}
