use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use super::{ProfileStore, StoredPredictions};
use crate::error::Result;
use crate::models::UserFinancialProfile;

#[derive(Debug, Default)]
struct Documents {
    profiles: HashMap<String, UserFinancialProfile>,
    predictions: HashMap<String, StoredPredictions>,
}

/// Process-local store; contents are lost on exit
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: RwLock<Documents>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn load_profile(&self, user_id: &str) -> Result<Option<UserFinancialProfile>> {
        let docs = self.docs.read().unwrap_or_else(PoisonError::into_inner);
        Ok(docs.profiles.get(user_id).cloned())
    }

    fn write_profile(&self, user_id: &str, profile: &UserFinancialProfile) -> Result<()> {
        let mut docs = self.docs.write().unwrap_or_else(PoisonError::into_inner);
        docs.profiles.insert(user_id.to_string(), profile.clone());
        Ok(())
    }

    fn delete_profile(&self, user_id: &str) -> Result<bool> {
        let mut docs = self.docs.write().unwrap_or_else(PoisonError::into_inner);
        docs.predictions.remove(user_id);
        Ok(docs.profiles.remove(user_id).is_some())
    }

    fn list_users(&self) -> Result<Vec<String>> {
        let docs = self.docs.read().unwrap_or_else(PoisonError::into_inner);
        let mut users: Vec<String> = docs.profiles.keys().cloned().collect();
        users.sort();
        Ok(users)
    }

    fn save_predictions(&self, user_id: &str, predictions: &StoredPredictions) -> Result<()> {
        let mut docs = self.docs.write().unwrap_or_else(PoisonError::into_inner);
        docs.predictions
            .insert(user_id.to_string(), predictions.clone());
        Ok(())
    }

    fn load_predictions(&self, user_id: &str) -> Result<Option<StoredPredictions>> {
        let docs = self.docs.read().unwrap_or_else(PoisonError::into_inner);
        Ok(docs.predictions.get(user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BaselinePredictions;
    use crate::projection::project;
    use chrono::Utc;

    #[test]
    fn test_round_trip() {
        let store = MemoryStore::new();
        let saved = store
            .save_profile("alice", &UserFinancialProfile::sample())
            .unwrap();

        let loaded = store.load_profile("alice").unwrap().unwrap();
        assert_eq!(loaded, saved);
        assert!(store.load_profile("bob").unwrap().is_none());
    }

    #[test]
    fn test_list_and_delete() {
        let store = MemoryStore::new();
        for user in ["carol", "alice", "bob"] {
            store
                .save_profile(user, &UserFinancialProfile::default())
                .unwrap();
        }
        assert_eq!(store.list_users().unwrap(), vec!["alice", "bob", "carol"]);

        let predictions = StoredPredictions {
            predictions: project(
                &UserFinancialProfile::default(),
                &BaselinePredictions::neutral(),
            ),
            generated_at: Utc::now(),
        };
        store.save_predictions("bob", &predictions).unwrap();
        assert_eq!(store.load_predictions("bob").unwrap(), Some(predictions));

        assert!(store.delete_profile("bob").unwrap());
        assert!(!store.delete_profile("bob").unwrap());
        assert!(store.load_predictions("bob").unwrap().is_none());
        assert_eq!(store.list_users().unwrap(), vec!["alice", "carol"]);
    }
}
