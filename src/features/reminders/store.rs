//! Persistence seam for reminders

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::{NewReminder, Reminder};

/// Storage the reminder engine reads and writes through
///
/// Implemented by [`crate::database::Database`].
#[async_trait]
pub trait ReminderStore: Send + Sync {
    /// Persist a new pending reminder and return its id
    async fn insert_reminder(&self, reminder: &NewReminder) -> Result<i64>;

    async fn get_reminder(&self, id: i64) -> Result<Option<Reminder>>;

    /// Pending reminders owned by `user_id`, earliest first
    async fn user_reminders(&self, user_id: &str) -> Result<Vec<Reminder>>;

    /// Pending reminders with `due_at <= now`, earliest first
    async fn due_reminders(&self, now: DateTime<Utc>) -> Result<Vec<Reminder>>;

    /// Move a pending reminder to cancelled; returns false if it was not pending
    async fn cancel_reminder(&self, id: i64) -> Result<bool>;

    /// Set only `due_at`, leaving state and dispatch progress untouched
    async fn reschedule_reminder(&self, id: i64, due_at: DateTime<Utc>) -> Result<bool>;

    /// Write a dispatched reminder's next state
    ///
    /// Applies only while the stored row is still pending with
    /// `due_at == previous_due_at`. Returns whether the row was updated.
    async fn commit_dispatch(
        &self,
        reminder: &Reminder,
        previous_due_at: DateTime<Utc>,
    ) -> Result<bool>;
}
