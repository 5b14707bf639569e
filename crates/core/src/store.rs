//! ScheduleStore trait: per-user persistence of workout schedules.
//!
//! A store owns the persisted schedules exclusively, keyed by user id.
//! `save` always replaces the full schedule; there are no partial updates.

use crate::error::StoreError;
use crate::schedule::{UserId, UserSchedule};
use async_trait::async_trait;

/// The core ScheduleStore trait.
///
/// Implementations: file-per-user JSON, in-memory (for testing).
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// The backend name (e.g., "file", "in_memory").
    fn name(&self) -> &str;

    /// Load a user's schedule. A user with nothing stored gets an empty schedule.
    async fn load(&self, user: UserId) -> std::result::Result<UserSchedule, StoreError>;

    /// Replace a user's schedule in full.
    async fn save(
        &self,
        user: UserId,
        schedule: &UserSchedule,
    ) -> std::result::Result<(), StoreError>;
}
