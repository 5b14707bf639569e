//! In-memory store: useful for testing and ephemeral sessions.

use async_trait::async_trait;
use gymbot_core::error::StoreError;
use gymbot_core::schedule::{UserId, UserSchedule};
use gymbot_core::store::ScheduleStore;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A store that keeps schedules in a HashMap.
/// Useful for testing and sessions where persistence isn't needed.
pub struct InMemoryStore {
    schedules: Arc<RwLock<HashMap<UserId, UserSchedule>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            schedules: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of users with a saved schedule.
    pub async fn user_count(&self) -> usize {
        self.schedules.read().await.len()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScheduleStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn load(&self, user: UserId) -> Result<UserSchedule, StoreError> {
        Ok(self
            .schedules
            .read()
            .await
            .get(&user)
            .cloned()
            .unwrap_or_default())
    }

    async fn save(&self, user: UserId, schedule: &UserSchedule) -> Result<(), StoreError> {
        self.schedules.write().await.insert(user, schedule.clone());
        Ok(())
    }
}
