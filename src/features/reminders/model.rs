//! Reminder records and lifecycle state
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use chrono::{DateTime, Utc};

/// Seconds in a minute; the shortest delay, lead time and repeat interval allowed
pub const MIN_SECONDS: i64 = 60;
/// Fourteen days; the furthest a relative or one-off absolute reminder may be set
pub const MAX_RELATIVE_SECONDS: i64 = 14 * 24 * 3600;
/// One year; the longest recurrence interval
pub const MAX_INTERVAL_SECONDS: i64 = 365 * 24 * 3600;

/// Lifecycle state of a reminder
///
/// Only `Pending` reminders are dispatched. The other two states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReminderState {
    /// Waiting for its due time
    Pending,
    /// Cancelled by its owner
    Cancelled,
    /// A one-off that fired, or a recurring reminder with no occurrences left
    Exhausted,
}

impl ReminderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderState::Pending => "pending",
            ReminderState::Cancelled => "cancelled",
            ReminderState::Exhausted => "exhausted",
        }
    }
}

impl std::fmt::Display for ReminderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReminderState {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ReminderState::Pending),
            "cancelled" => Ok(ReminderState::Cancelled),
            "exhausted" => Ok(ReminderState::Exhausted),
            _ => Err(anyhow::anyhow!("Invalid reminder state: {}", s)),
        }
    }
}

/// A persisted reminder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub id: i64,
    /// Discord user id of the owner
    pub user_id: String,
    pub content: String,
    /// Next firing time, always UTC
    pub due_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub last_sent_at: Option<DateTime<Utc>>,
    /// IANA zone the user's input was interpreted in
    pub timezone: String,
    pub is_recurring: bool,
    pub interval_seconds: Option<i64>,
    /// `None` repeats forever
    pub occurrences_left: Option<i64>,
    pub state: ReminderState,
}

impl Reminder {
    pub fn is_active(&self) -> bool {
        self.state == ReminderState::Pending
    }
}

/// Fields of a reminder that does not exist yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReminder {
    pub user_id: String,
    pub content: String,
    pub due_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub timezone: String,
    pub interval_seconds: Option<i64>,
    pub occurrences_left: Option<i64>,
}

impl NewReminder {
    /// Materialize the record the store will hold under `id`
    pub fn into_reminder(self, id: i64) -> Reminder {
        Reminder {
            id,
            user_id: self.user_id,
            content: self.content,
            due_at: self.due_at,
            created_at: self.created_at,
            last_sent_at: None,
            timezone: self.timezone,
            is_recurring: self.interval_seconds.is_some(),
            interval_seconds: self.interval_seconds,
            occurrences_left: self.occurrences_left,
            state: ReminderState::Pending,
        }
    }
}

/// Bounds applied when creating and snoozing reminders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderLimits {
    pub min_seconds: i64,
    pub max_seconds: i64,
    /// How far ahead an absolute time must be; also the roll-forward threshold
    pub min_lead_seconds: i64,
    pub min_interval_seconds: i64,
    pub max_interval_seconds: i64,
}

impl Default for ReminderLimits {
    fn default() -> Self {
        Self {
            min_seconds: MIN_SECONDS,
            max_seconds: MAX_RELATIVE_SECONDS,
            min_lead_seconds: MIN_SECONDS,
            min_interval_seconds: MIN_SECONDS,
            max_interval_seconds: MAX_INTERVAL_SECONDS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> NewReminder {
        NewReminder {
            user_id: "42".to_string(),
            content: "stretch".to_string(),
            due_at: Utc.with_ymd_and_hms(2025, 11, 10, 12, 0, 0).unwrap(),
            created_at: Utc.with_ymd_and_hms(2025, 11, 10, 10, 0, 0).unwrap(),
            timezone: "America/New_York".to_string(),
            interval_seconds: None,
            occurrences_left: None,
        }
    }

    #[test]
    fn test_state_round_trips_through_str() {
        for state in [
            ReminderState::Pending,
            ReminderState::Cancelled,
            ReminderState::Exhausted,
        ] {
            assert_eq!(state.as_str().parse::<ReminderState>().unwrap(), state);
        }
        assert!("active".parse::<ReminderState>().is_err());
    }

    #[test]
    fn test_new_reminder_starts_pending() {
        let reminder = sample().into_reminder(7);
        assert_eq!(reminder.id, 7);
        assert!(reminder.is_active());
        assert!(!reminder.is_recurring);
        assert!(reminder.last_sent_at.is_none());
    }

    #[test]
    fn test_recurring_flag_follows_interval() {
        let mut new = sample();
        new.interval_seconds = Some(3600);
        assert!(new.into_reminder(1).is_recurring);
    }
}
