//! Reminder error taxonomy
//!
//! Every variant's `Display` text is shown to users as-is.

use thiserror::Error;

/// Input text that could not be understood
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Failed to parse `{0}`. Provide relative (e.g. 2h30m) or an absolute date/time (12-hour AM/PM supported).")]
    Time(String),

    #[error("Failed to parse repeat `{0}`. Use hourly, daily, weekly or a pattern like 1d2h or 30m.")]
    Repeat(String),

    #[error("Reminder message cannot be empty.")]
    EmptyMessage,
}

/// A parsed value outside the allowed bounds
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("Minimum relative time is 1 minute.")]
    RelativeTooShort,

    #[error("Maximum relative time is {0}.")]
    RelativeTooLong(String),

    #[error("Absolute time must be at least 1 minute in the future.")]
    AbsoluteTooSoon,

    #[error("Absolute one-off reminders limited to {0} ahead.")]
    AbsoluteTooFar(String),

    #[error("Recurrence interval must be >= 1 minute.")]
    IntervalTooShort,

    #[error("Recurrence interval must be at most {0}.")]
    IntervalTooLong(String),

    #[error("repeat_count must be a positive integer.")]
    NonPositiveCount,
}

/// Failure of a reminder operation
#[derive(Error, Debug)]
pub enum ReminderError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Range(#[from] RangeError),

    #[error("Invalid snooze duration `{0}` (between 1m and 14d).")]
    InvalidDuration(String),

    #[error("Reminder `{0}` not found.")]
    NotFound(i64),

    #[error("You do not own reminder `{0}`.")]
    NotOwner(i64),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl ReminderError {
    /// Whether the error stems from user input rather than infrastructure
    pub fn is_user_error(&self) -> bool {
        !matches!(self, ReminderError::Storage(_))
    }
}

/// Failure to hand a reminder to the notification sink
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("channel {0} could not be resolved")]
    UnknownChannel(u64),

    #[error("discord rejected the message: {0}")]
    Discord(#[from] serenity::Error),

    #[error("delivery failed: {0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_wraps_transparently() {
        let err: ReminderError = ParseError::Time("soon".to_string()).into();
        assert!(err.to_string().starts_with("Failed to parse `soon`"));
        assert!(err.is_user_error());
    }

    #[test]
    fn test_range_error_message() {
        let err: ReminderError = RangeError::RelativeTooLong("14d".to_string()).into();
        assert_eq!(err.to_string(), "Maximum relative time is 14d.");
    }

    #[test]
    fn test_storage_error_is_not_user_error() {
        let err: ReminderError = anyhow::anyhow!("disk full").into();
        assert!(!err.is_user_error());
        assert_eq!(err.to_string(), "disk full");
    }
}
