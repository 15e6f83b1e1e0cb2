use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{fs, path::Path, str::FromStr};

/// Durable key/value store for serialized client state snapshots.
#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone)]
pub struct StoredSnapshot {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        create_database_dir(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid database url '{database_url}'"))?
            .create_if_missing(true);

        // Every connection to an in-memory database gets its own database, so
        // pin the pool to a single long-lived connection.
        let pool_options = if is_memory_url(database_url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(connect_options)
            .await
            .with_context(|| format!("failed to open database '{database_url}'"))?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    /// Waits for open connections to finish and closes the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn load_snapshot(&self, key: &str) -> Result<Option<StoredSnapshot>> {
        let row = sqlx::query("SELECT key, value, updated_at FROM snapshots WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to load snapshot '{key}'"))?;

        row.map(|row| {
            Ok::<_, anyhow::Error>(StoredSnapshot {
                key: row.try_get("key")?,
                value: row.try_get("value")?,
                updated_at: row.try_get("updated_at")?,
            })
        })
        .transpose()
    }

    pub async fn save_snapshot(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO snapshots (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to save snapshot '{key}'"))?;
        Ok(())
    }

    /// Returns whether a snapshot existed under `key`.
    pub async fn delete_snapshot(&self, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM snapshots WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to delete snapshot '{key}'"))?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_snapshot_keys(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT key FROM snapshots ORDER BY key")
            .fetch_all(&self.pool)
            .await
            .context("failed to list snapshot keys")?;
        let keys = rows
            .into_iter()
            .map(|row| row.try_get::<String, _>("key"))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(keys)
    }
}

fn is_memory_url(database_url: &str) -> bool {
    database_url.starts_with("sqlite::memory:") || database_url.contains("mode=memory")
}

/// Creates the directory holding a file-backed database.
fn create_database_dir(database_url: &str) -> Result<()> {
    match database_file(database_url).and_then(|file| file.parent()) {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir)
            .with_context(|| format!("cannot create '{}' for '{database_url}'", dir.display())),
        _ => Ok(()),
    }
}

fn database_file(database_url: &str) -> Option<&Path> {
    if is_memory_url(database_url) {
        return None;
    }
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let file = rest.split_once('?').map_or(rest, |(file, _)| file);
    (!file.is_empty()).then(|| Path::new(file))
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
