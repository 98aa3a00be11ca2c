use crate::{RunStore, StoredRun};
use async_trait::async_trait;
use chrono::SecondsFormat;
use ideaval_core::{IdeaError, Result};
use ideaval_pipeline::PipelineRun;
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// Run store backed by a single sqlite table.
pub struct SqliteRunStore {
    pool: SqlitePool,
}

fn store_err(context: &str) -> impl FnOnce(sqlx::Error) -> IdeaError + '_ {
    move |e| IdeaError::Store(format!("{context}: {e}"))
}

impl SqliteRunStore {
    /// Open (and create when missing) the database at `database_url`, e.g.
    /// `sqlite://tmp/ideaval.db`.
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(store_err("invalid database url"))?
            .create_if_missing(true);

        if let Some(parent) = options.get_filename().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(store_err("database connection failed"))?;
        Ok(Self { pool })
    }

    /// A private in-memory database. One connection, so every query sees the same data.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(store_err("invalid database url"))?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(store_err("database connection failed"))?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS validation_runs (
                session_id TEXT PRIMARY KEY,
                idea TEXT NOT NULL,
                status TEXT NOT NULL,
                run TEXT NOT NULL,
                finished_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(store_err("migration failed"))?;

        Ok(())
    }
}

#[async_trait]
impl RunStore for SqliteRunStore {
    async fn persist(&self, session_id: &str, run: &PipelineRun) -> Result<()> {
        let run_json = serde_json::to_string(run)?;

        sqlx::query(
            "INSERT OR REPLACE INTO validation_runs (session_id, idea, status, run, finished_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(session_id)
        .bind(&run.idea)
        .bind(run.outcome.status())
        .bind(&run_json)
        .bind(run.finished_at.to_rfc3339_opts(SecondsFormat::Micros, true))
        .execute(&self.pool)
        .await
        .map_err(store_err("insert failed"))?;

        tracing::debug!(session_id, status = run.outcome.status(), "run persisted");
        Ok(())
    }

    async fn load(&self, session_id: &str) -> Result<Option<PipelineRun>> {
        let row = sqlx::query("SELECT run FROM validation_runs WHERE session_id = ?")
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err("query failed"))?;

        match row {
            Some(row) => {
                let run_json: String = row.try_get("run").map_err(store_err("query failed"))?;
                Ok(Some(serde_json::from_str(&run_json)?))
            }
            None => Ok(None),
        }
    }

    async fn list(&self, limit: usize) -> Result<Vec<StoredRun>> {
        let rows = sqlx::query(
            "SELECT session_id, run FROM validation_runs ORDER BY finished_at DESC, session_id ASC LIMIT ?",
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(store_err("query failed"))?;

        let mut stored = Vec::with_capacity(rows.len());
        for row in rows {
            let session_id: String = row.try_get("session_id").map_err(store_err("query failed"))?;
            let run_json: String = row.try_get("run").map_err(store_err("query failed"))?;
            let run = serde_json::from_str(&run_json)?;
            stored.push(StoredRun { session_id, run });
        }
        Ok(stored)
    }
}
