//! SQLite-backed profile store with connection pooling and migrations

use std::fs;
use std::path::{Path, PathBuf};

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};
use tracing::debug;

use super::{ProfileStore, StoredPredictions};
use crate::error::{Error, Result};
use crate::models::UserFinancialProfile;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Profile store wrapper with connection pooling
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
    db_path: PathBuf,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path` and run migrations
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder().max_size(10).build(manager)?;

        let store = Self {
            pool,
            db_path: path.to_path_buf(),
        };
        store.run_migrations()?;

        Ok(store)
    }

    /// Create a throwaway database (for testing)
    ///
    /// Uses a temporary file rather than `:memory:` so every pooled
    /// connection sees the same data.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "finsight_test_{}_{}.db",
            std::process::id(),
            id
        ));

        // Remove any existing file
        let _ = fs::remove_file(&path);

        Self::open(&path)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- WAL mode: readers don't block writers
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;

            -- One JSON profile document per user
            CREATE TABLE IF NOT EXISTS profiles (
                user_id TEXT PRIMARY KEY,
                document TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Last generated prediction set per user
            CREATE TABLE IF NOT EXISTS predictions (
                user_id TEXT PRIMARY KEY,
                document TEXT NOT NULL,
                generated_at TEXT NOT NULL
            );
            "#,
        )?;

        debug!(path = %self.db_path.display(), "Profile store migrations complete");
        Ok(())
    }
}

impl ProfileStore for SqliteStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    fn load_profile(&self, user_id: &str) -> Result<Option<UserFinancialProfile>> {
        let conn = self.conn()?;

        let document: Option<String> = conn
            .query_row(
                "SELECT document FROM profiles WHERE user_id = ?",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;

        match document {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn write_profile(&self, user_id: &str, profile: &UserFinancialProfile) -> Result<()> {
        let conn = self.conn()?;
        let document = serde_json::to_string(profile)?;

        conn.execute(
            r#"
            INSERT INTO profiles (user_id, document) VALUES (?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                document = excluded.document,
                updated_at = CURRENT_TIMESTAMP
            "#,
            params![user_id, document],
        )?;

        Ok(())
    }

    fn delete_profile(&self, user_id: &str) -> Result<bool> {
        let conn = self.conn()?;

        conn.execute(
            "DELETE FROM predictions WHERE user_id = ?",
            params![user_id],
        )?;
        let deleted = conn.execute("DELETE FROM profiles WHERE user_id = ?", params![user_id])?;

        Ok(deleted > 0)
    }

    fn list_users(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT user_id FROM profiles ORDER BY user_id")?;

        let users = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;

        Ok(users)
    }

    fn save_predictions(&self, user_id: &str, predictions: &StoredPredictions) -> Result<()> {
        let conn = self.conn()?;
        let document = serde_json::to_string(&predictions.predictions)?;

        conn.execute(
            r#"
            INSERT INTO predictions (user_id, document, generated_at) VALUES (?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                document = excluded.document,
                generated_at = excluded.generated_at
            "#,
            params![user_id, document, predictions.generated_at.to_rfc3339()],
        )?;

        Ok(())
    }

    fn load_predictions(&self, user_id: &str) -> Result<Option<StoredPredictions>> {
        let conn = self.conn()?;

        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT document, generated_at FROM predictions WHERE user_id = ?",
                params![user_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((document, generated_at)) = row else {
            return Ok(None);
        };

        let generated_at = chrono::DateTime::parse_from_rfc3339(&generated_at)
            .map(|dt| dt.with_timezone(&chrono::Utc))
            .map_err(|e| Error::InvalidData(format!("Bad prediction timestamp: {}", e)))?;

        Ok(Some(StoredPredictions {
            predictions: serde_json::from_str(&document)?,
            generated_at,
        }))
    }
}
