//! Profile persistence
//!
//! Profiles and their last generated predictions are stored as JSON
//! documents keyed by user id.
//!
//! - `memory` - process-local store, used for tests and as the fallback
//! - `sqlite` - SQLite file behind an r2d2 pool

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{StorageBackend, StorageConfig};
use crate::error::{Error, Result};
use crate::models::{PredictionSet, UserFinancialProfile};

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Key stamped with the save time (RFC 3339)
pub const LAST_UPDATED_KEY: &str = "last_updated";
/// Key stamped with the owning user id
pub const USER_ID_KEY: &str = "user_id";

/// Predictions as they were last generated for a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPredictions {
    pub predictions: PredictionSet,
    pub generated_at: DateTime<Utc>,
}

/// Document store for profiles and predictions
pub trait ProfileStore: Send + Sync {
    /// Short backend name for logs and health output
    fn backend(&self) -> &'static str;

    fn load_profile(&self, user_id: &str) -> Result<Option<UserFinancialProfile>>;

    /// Store a profile as-is, replacing any previous document
    fn write_profile(&self, user_id: &str, profile: &UserFinancialProfile) -> Result<()>;

    /// Returns whether a profile existed
    fn delete_profile(&self, user_id: &str) -> Result<bool>;

    /// Stored user ids, sorted
    fn list_users(&self) -> Result<Vec<String>>;

    fn save_predictions(&self, user_id: &str, predictions: &StoredPredictions) -> Result<()>;

    fn load_predictions(&self, user_id: &str) -> Result<Option<StoredPredictions>>;

    /// Stamp and store a profile, returning the stored document
    fn save_profile(
        &self,
        user_id: &str,
        profile: &UserFinancialProfile,
    ) -> Result<UserFinancialProfile> {
        check_user_id(user_id)?;
        let stamped = stamp(user_id, profile.clone(), Utc::now());
        self.write_profile(user_id, &stamped)?;
        Ok(stamped)
    }
}

/// Reject ids that cannot be used as a key
pub fn check_user_id(user_id: &str) -> Result<()> {
    if user_id.trim().is_empty() {
        return Err(Error::InvalidData("user id must not be empty".to_string()));
    }
    Ok(())
}

/// Record the owner and save time in the profile's extra keys
pub fn stamp(
    user_id: &str,
    mut profile: UserFinancialProfile,
    at: DateTime<Utc>,
) -> UserFinancialProfile {
    profile.extra.insert(
        LAST_UPDATED_KEY.to_string(),
        at.to_rfc3339_opts(SecondsFormat::Secs, true).into(),
    );
    profile
        .extra
        .insert(USER_ID_KEY.to_string(), user_id.to_string().into());
    profile
}

/// Open the configured store, falling back to memory if SQLite fails
pub fn open_store(config: &StorageConfig) -> Arc<dyn ProfileStore> {
    match config.backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::Sqlite => match SqliteStore::open(&config.db_path) {
            Ok(store) => {
                info!(path = %config.db_path.display(), "Opened profile store");
                Arc::new(store)
            }
            Err(e) => {
                warn!(
                    path = %config.db_path.display(),
                    error = %e,
                    "Could not open SQLite store, profiles will not persist"
                );
                Arc::new(MemoryStore::new())
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_stamp_sets_keys() {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 0).unwrap();
        let profile = stamp("alice", UserFinancialProfile::sample(), at);

        assert_eq!(profile.extra[LAST_UPDATED_KEY], "2025-03-01T12:30:00Z");
        assert_eq!(profile.extra[USER_ID_KEY], "alice");
    }

    #[test]
    fn test_empty_user_id_rejected() {
        let store = MemoryStore::new();
        let err = store
            .save_profile("  ", &UserFinancialProfile::default())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn test_open_store_falls_back_to_memory() {
        // A regular file cannot be a parent directory
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = StorageConfig {
            backend: StorageBackend::Sqlite,
            db_path: file.path().join("finsight.db"),
        };
        assert_eq!(open_store(&config).backend(), "memory");

        let config = StorageConfig {
            backend: StorageBackend::Memory,
            db_path: "ignored.db".into(),
        };
        assert_eq!(open_store(&config).backend(), "memory");
    }
}
