//! SQLite storage backend for dripsindex.
//!
//! Persists entity records and template instances to a single SQLite file.
//! Uses `sqlx` with WAL mode for concurrent read performance.
//!
//! # Usage
//! ```rust,no_run
//! use dripsindex_storage::sqlite::SqliteStorage;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // File-backed (persistent)
//! let store = SqliteStorage::open("./drips.db").await?;
//!
//! // In-memory (tests / ephemeral)
//! let store = SqliteStorage::in_memory().await?;
//! # Ok(())
//! # }
//! ```

use alloy_primitives::Address;
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use dripsindex_core::{EntityStore, MappingError, TemplateRegistry};

use crate::EntityScan;

fn storage_err(e: impl std::fmt::Display) -> MappingError {
    MappingError::Storage(e.to_string())
}

/// SQLite-backed entity store and template registry.
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Open (or create) a SQLite database at `path`.
    ///
    /// The path may be a plain file path (`"./drips.db"`) or a full
    /// SQLite URL (`"sqlite:./drips.db?mode=rwc"`).
    pub async fn open(path: &str) -> Result<Self, MappingError> {
        let url = if path.starts_with("sqlite:") {
            path.to_string()
        } else {
            format!("sqlite:{path}?mode=rwc")
        };

        let pool = SqlitePool::connect(&url).await.map_err(storage_err)?;

        let storage = Self { pool };
        storage.init_schema().await?;
        Ok(storage)
    }

    /// Open an in-memory SQLite database.
    ///
    /// All data is lost when the pool is dropped. Ideal for tests.
    pub async fn in_memory() -> Result<Self, MappingError> {
        // Each connection to `:memory:` is a separate database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(storage_err)?;

        let storage = Self { pool };
        storage.init_schema().await?;
        Ok(storage)
    }

    /// Create tables and enable WAL mode.
    async fn init_schema(&self) -> Result<(), MappingError> {
        sqlx::query("PRAGMA journal_mode=WAL;")
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS entities (
                entity_type TEXT    NOT NULL,
                id          TEXT    NOT NULL,
                data        TEXT    NOT NULL,
                updated_at  INTEGER NOT NULL,
                PRIMARY KEY (entity_type, id)
            );",
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS template_instances (
                seq        INTEGER PRIMARY KEY AUTOINCREMENT,
                template   TEXT    NOT NULL,
                address    TEXT    NOT NULL,
                created_at INTEGER NOT NULL,
                UNIQUE (template, address)
            );",
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(())
    }
}

// ─── EntityStore impl ────────────────────────────────────────────────────────

#[async_trait]
impl EntityStore for SqliteStorage {
    async fn load(
        &self,
        entity_type: &str,
        id: &str,
    ) -> Result<Option<serde_json::Value>, MappingError> {
        let row = sqlx::query("SELECT data FROM entities WHERE entity_type = ? AND id = ?")
            .bind(entity_type)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let data: String = row.get("data");
        serde_json::from_str(&data)
            .map(Some)
            .map_err(|e| MappingError::Record {
                entity_type: entity_type.to_string(),
                id: id.to_string(),
                reason: e.to_string(),
            })
    }

    async fn save(
        &self,
        entity_type: &str,
        id: &str,
        record: serde_json::Value,
    ) -> Result<(), MappingError> {
        sqlx::query(
            "INSERT OR REPLACE INTO entities (entity_type, id, data, updated_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(entity_type)
        .bind(id)
        .bind(record.to_string())
        .bind(chrono::Utc::now().timestamp())
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        debug!(entity_type, id, "entity saved");
        Ok(())
    }

    async fn remove(&self, entity_type: &str, id: &str) -> Result<(), MappingError> {
        sqlx::query("DELETE FROM entities WHERE entity_type = ? AND id = ?")
            .bind(entity_type)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        debug!(entity_type, id, "entity removed");
        Ok(())
    }
}

// ─── TemplateRegistry impl ───────────────────────────────────────────────────

#[async_trait]
impl TemplateRegistry for SqliteStorage {
    async fn create(&self, template: &str, address: Address) -> Result<(), MappingError> {
        sqlx::query(
            "INSERT OR IGNORE INTO template_instances (template, address, created_at)
             VALUES (?, ?, ?)",
        )
        .bind(template)
        .bind(format!("{address:#x}"))
        .bind(chrono::Utc::now().timestamp())
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(())
    }

    async fn is_tracked(&self, template: &str, address: &Address) -> Result<bool, MappingError> {
        let row = sqlx::query(
            "SELECT 1 FROM template_instances WHERE template = ? AND address = ?",
        )
        .bind(template)
        .bind(format!("{address:#x}"))
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(row.is_some())
    }

    async fn instances(&self, template: &str) -> Result<Vec<Address>, MappingError> {
        let rows = sqlx::query(
            "SELECT address FROM template_instances WHERE template = ? ORDER BY seq",
        )
        .bind(template)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        rows.iter()
            .map(|r| {
                let s: String = r.get("address");
                s.parse::<Address>().map_err(storage_err)
            })
            .collect()
    }
}

// ─── EntityScan impl ─────────────────────────────────────────────────────────

#[async_trait]
impl EntityScan for SqliteStorage {
    async fn scan(
        &self,
        entity_type: &str,
    ) -> Result<Vec<(String, serde_json::Value)>, MappingError> {
        let rows = sqlx::query("SELECT id, data FROM entities WHERE entity_type = ? ORDER BY id")
            .bind(entity_type)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.get("id");
            let data: String = row.get("data");
            let value = serde_json::from_str(&data).map_err(|e| MappingError::Record {
                entity_type: entity_type.to_string(),
                id: id.clone(),
                reason: e.to_string(),
            })?;
            out.push((id, value));
        }
        Ok(out)
    }

    async fn count(&self, entity_type: &str) -> Result<u64, MappingError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM entities WHERE entity_type = ?")
            .bind(entity_type)
            .fetch_one(&self.pool)
            .await
            .map_err(storage_err)?;

        let cnt: i64 = row.get("cnt");
        Ok(cnt as u64)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
