//! Document store connection factory and migration runner.

use std::str::FromStr;

use anyhow::{bail, Context};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

/// Connection string that selects the process-local store.
pub const MEMORY_URL: &str = "memory://";

/// Migration definition contributed by a module
#[derive(Debug, Clone)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

/// Handle to the configured document store backend.
#[derive(Debug, Clone)]
pub enum Database {
    /// SQLite pool holding one JSON document per record.
    Sqlite(SqlitePool),
    /// Process-local store; nothing survives a restart.
    Memory,
}

impl Database {
    /// Connect to the store named by `url`.
    ///
    /// `memory://` selects the in-process backend, `sqlite:` URLs open (and
    /// create if missing) a SQLite database. Anything else is rejected.
    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        if url.starts_with("memory:") {
            tracing::info!(target: "bookstore-db", backend = "memory", "using in-memory store");
            return Ok(Self::Memory);
        }

        if !url.starts_with("sqlite:") {
            bail!("unsupported database url '{url}'; expected memory:// or sqlite:");
        }

        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("invalid sqlite url '{url}'"))?
            .create_if_missing(true);

        // Every connection to `:memory:` is a separate database, so pin one
        // connection for the lifetime of the pool.
        let pool_options = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .context("failed to open sqlite pool")?;

        tracing::info!(target: "bookstore-db", backend = "sqlite", "connected to store");
        Ok(Self::Sqlite(pool))
    }

    /// Short backend name for logs.
    pub fn backend(&self) -> &'static str {
        match self {
            Database::Sqlite(_) => "sqlite",
            Database::Memory => "memory",
        }
    }

    /// Apply pending migrations in the given order, returning how many ran.
    ///
    /// Applied migrations are recorded per `(module, id)` so reruns are no-ops.
    pub async fn migrate(&self, migrations: &[(String, Migration)]) -> anyhow::Result<usize> {
        let pool = match self {
            Database::Sqlite(pool) => pool,
            Database::Memory => {
                tracing::debug!(target: "bookstore-db", "memory store needs no migrations");
                return Ok(0);
            }
        };

        sqlx::raw_sql(
            "CREATE TABLE IF NOT EXISTS _migrations (
                module     TEXT NOT NULL,
                id         TEXT NOT NULL,
                applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                PRIMARY KEY (module, id)
            )",
        )
        .execute(pool)
        .await
        .context("failed to create migration ledger")?;

        let mut applied = 0;
        for (module, migration) in migrations {
            let seen: Option<(i64,)> =
                sqlx::query_as("SELECT 1 FROM _migrations WHERE module = ? AND id = ?")
                    .bind(module)
                    .bind(migration.id)
                    .fetch_optional(pool)
                    .await
                    .context("failed to read migration ledger")?;
            if seen.is_some() {
                continue;
            }

            let mut tx = pool.begin().await?;
            sqlx::raw_sql(migration.up)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("migration {module}/{} failed", migration.id))?;
            sqlx::query("INSERT INTO _migrations (module, id) VALUES (?, ?)")
                .bind(module)
                .bind(migration.id)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;

            tracing::info!(target: "bookstore-db", %module, id = migration.id, "applied migration");
            applied += 1;
        }

        Ok(applied)
    }

    /// Close the underlying pool, if any.
    pub async fn close(&self) {
        if let Database::Sqlite(pool) = self {
            pool.close().await;
        }
    }
}
