use anyhow::Result;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::{PgPool, Row};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, instrument};

#[derive(Clone)]
pub struct Db {
    pub pool: PgPool,
}

impl Db {
    // SECURITY: never include raw DSNs in tracing spans (they may contain credentials).
    #[instrument(skip(database_url))]
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let mut connect_options = PgConnectOptions::from_str(database_url)?;

        // Be explicit about TLS when the DSN asks for it.
        if database_url.contains("sslmode=require") && !database_url.contains("sslmode=disable") {
            connect_options = connect_options.ssl_mode(PgSslMode::Require);
        }

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(600))
            .connect_with(connect_options)
            .await?;
        info!("connected to db");

        // Optional auto-migrate gate (default: OFF).
        // Enable explicitly with AUTO_MIGRATE=1/true/on.
        if crate::util::env::env_flag("AUTO_MIGRATE", false) {
            info!("running migrations (AUTO_MIGRATE=on)");
            run_migrations(&pool).await?;
        } else {
            info!("AUTO_MIGRATE disabled; skipping migrations");
        }
        Ok(Self { pool })
    }
}

/// Apply pending `./migrations/*.sql` files in version order.
///
/// File names are `<version>_<description>.sql`; applied versions are tracked
/// in `_migrations`. Files without a numeric version prefix are ignored, so
/// the directory may hold reference SQL alongside versioned migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    use std::collections::HashSet;
    use std::fs;
    use std::path::{Path, PathBuf};

    let dir = Path::new("./migrations");
    if !dir.exists() {
        return Ok(());
    }

    sqlx::raw_sql(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version BIGINT PRIMARY KEY,
            description TEXT,
            installed_at TIMESTAMPTZ DEFAULT now()
         )",
    )
    .execute(pool)
    .await?;

    let applied_rows = sqlx::raw_sql("SELECT version FROM _migrations")
        .fetch_all(pool)
        .await?;
    let mut applied: HashSet<i64> = HashSet::new();
    for row in applied_rows {
        applied.insert(row.try_get::<i64, _>(0)?);
    }

    let mut candidates: Vec<(i64, String, PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("sql") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let (version_part, description) = match stem.split_once('_') {
            Some((v, d)) => (v, d.to_string()),
            None => (stem, String::new()),
        };
        let Ok(version) = version_part.parse::<i64>() else {
            continue;
        };
        candidates.push((version, description, path));
    }
    candidates.sort_by_key(|(version, _, _)| *version);

    for (version, description, path) in candidates {
        if applied.contains(&version) {
            continue;
        }
        let sql = fs::read_to_string(&path)?;
        info!(version, %description, "applying migration");
        sqlx::raw_sql(&sql).execute(pool).await?;
        sqlx::query("INSERT INTO _migrations (version, description) VALUES ($1, $2)")
            .bind(version)
            .bind(&description)
            .execute(pool)
            .await?;
    }
    Ok(())
}
