// src/storage/mod.rs
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};

use crate::receipt::models::PaymentRecord;
use crate::utils::error::StorageError;

/// One audit row: the resolved record serialized as it was returned to the
/// caller, plus the request metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub transaction_id: String,
    pub link: String,
    pub response: String,
    pub ip: String,
    pub user_agent: String,
    pub created_at: String,
}

/// Append-only audit log over a SQLite file. Each append is one INSERT, so
/// concurrent lookups never interleave partial rows.
#[derive(Clone)]
pub struct AuditLog {
    pool: SqlitePool,
}

impl AuditLog {
    /// Opens (creating if missing) the audit database at `path` and ensures
    /// the logs table exists.
    pub async fn open(path: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let log = Self { pool };
        log.init().await?;
        tracing::info!("Audit log ready at {}", path);
        Ok(log)
    }

    /// In-memory variant used by tests.
    #[cfg(test)]
    pub async fn open_in_memory() -> Result<Self, StorageError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let log = Self { pool };
        log.init().await?;
        Ok(log)
    }

    async fn init(&self) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                transaction_id TEXT NOT NULL,
                link TEXT NOT NULL,
                response TEXT NOT NULL,
                ip TEXT NOT NULL,
                user_agent TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Appends one resolved record with its request metadata.
    pub async fn append(
        &self,
        record: &PaymentRecord,
        ip: &str,
        user_agent: &str,
    ) -> Result<(), StorageError> {
        let response = serde_json::to_string(record)?;
        sqlx::query(
            "INSERT INTO logs (transaction_id, link, response, ip, user_agent, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.transaction_id)
        .bind(&record.link)
        .bind(response)
        .bind(ip)
        .bind(user_agent)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        tracing::debug!("Appended audit entry for {}", record.transaction_id);
        Ok(())
    }

    /// Returns the most recent entries, newest first.
    pub async fn recent(&self, limit: i64) -> Result<Vec<AuditLogEntry>, StorageError> {
        let rows = sqlx::query(
            "SELECT transaction_id, link, response, ip, user_agent, created_at \
             FROM logs ORDER BY id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| AuditLogEntry {
                transaction_id: row.get("transaction_id"),
                link: row.get("link"),
                response: row.get("response"),
                ip: row.get("ip"),
                user_agent: row.get("user_agent"),
                created_at: row.get("created_at"),
            })
            .collect())
    }
}
