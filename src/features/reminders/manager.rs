//! Reminder lifecycle: create, list, cancel, snooze
//!
//! Input problems come back as [`ReminderError`] variants with user-facing
//! text; only storage failures are infrastructure errors.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use chrono::{DateTime, Duration, Timelike, Utc};
use chrono_tz::Tz;
use log::{debug, info};
use std::sync::Arc;

use super::display::humanize_seconds;
use super::error::{ParseError, RangeError, ReminderError};
use super::model::{NewReminder, Reminder, ReminderLimits};
use super::parser::{parse_absolute, parse_duration, parse_repeat};
use super::store::ReminderStore;

/// How the `when` text was understood
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleMode {
    Relative,
    Absolute,
}

impl ScheduleMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleMode::Relative => "relative",
            ScheduleMode::Absolute => "absolute",
        }
    }
}

/// Raw user input for a new reminder
#[derive(Debug, Clone, Default)]
pub struct CreateRequest {
    pub when: String,
    pub message: String,
    pub repeat: Option<String>,
    pub repeat_count: Option<i64>,
}

/// A stored reminder plus how its time was read
#[derive(Debug, Clone)]
pub struct Created {
    pub reminder: Reminder,
    pub mode: ScheduleMode,
}

pub struct ReminderManager {
    store: Arc<dyn ReminderStore>,
    limits: ReminderLimits,
    timezone: Tz,
}

impl ReminderManager {
    pub fn new(store: Arc<dyn ReminderStore>, limits: ReminderLimits, timezone: Tz) -> Self {
        Self {
            store,
            limits,
            timezone,
        }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn limits(&self) -> ReminderLimits {
        self.limits
    }

    /// Validate and persist a new reminder for `owner`
    pub async fn create(
        &self,
        owner: &str,
        request: CreateRequest,
        now: DateTime<Utc>,
    ) -> Result<Created, ReminderError> {
        let now = truncate_to_second(now);
        let message = request.message.trim();
        if message.is_empty() {
            return Err(ParseError::EmptyMessage.into());
        }

        let (due_at, mode) = self.resolve_when(&request.when, request.repeat.is_some(), now)?;

        let interval_seconds = match request.repeat.as_deref() {
            Some(raw) => {
                let interval =
                    parse_repeat(raw).ok_or_else(|| ParseError::Repeat(raw.to_string()))?;
                if interval < self.limits.min_interval_seconds {
                    return Err(RangeError::IntervalTooShort.into());
                }
                if interval > self.limits.max_interval_seconds {
                    return Err(RangeError::IntervalTooLong(humanize_seconds(
                        self.limits.max_interval_seconds,
                    ))
                    .into());
                }
                Some(interval)
            }
            None => None,
        };

        if matches!(request.repeat_count, Some(count) if count <= 0) {
            return Err(RangeError::NonPositiveCount.into());
        }
        // A countdown only means something for recurring reminders
        let occurrences_left = interval_seconds.and(request.repeat_count);

        let new = NewReminder {
            user_id: owner.to_string(),
            content: message.to_string(),
            due_at,
            created_at: now,
            timezone: self.timezone.name().to_string(),
            interval_seconds,
            occurrences_left,
        };
        let id = self.store.insert_reminder(&new).await?;

        info!(
            "Created {} reminder {id} for user {owner} due {due_at}{}",
            mode.as_str(),
            interval_seconds
                .map(|s| format!(" repeating every {}", humanize_seconds(s)))
                .unwrap_or_default()
        );

        Ok(Created {
            reminder: new.into_reminder(id),
            mode,
        })
    }

    fn resolve_when(
        &self,
        when: &str,
        has_repeat: bool,
        now: DateTime<Utc>,
    ) -> Result<(DateTime<Utc>, ScheduleMode), ReminderError> {
        if let Some(seconds) = parse_duration(when) {
            if seconds > self.limits.max_seconds {
                return Err(
                    RangeError::RelativeTooLong(humanize_seconds(self.limits.max_seconds)).into(),
                );
            }
            if seconds < self.limits.min_seconds {
                return Err(RangeError::RelativeTooShort.into());
            }
            return Ok((now + Duration::seconds(seconds), ScheduleMode::Relative));
        }

        let due_at = parse_absolute(when, self.timezone, now, self.limits.min_lead_seconds)
            .ok_or_else(|| ParseError::Time(when.trim().to_string()))?;
        let ahead = (due_at - now).num_seconds();
        if ahead < self.limits.min_lead_seconds {
            return Err(RangeError::AbsoluteTooSoon.into());
        }
        if ahead > self.limits.max_seconds && !has_repeat {
            return Err(
                RangeError::AbsoluteTooFar(humanize_seconds(self.limits.max_seconds)).into(),
            );
        }
        Ok((due_at, ScheduleMode::Absolute))
    }

    /// Pending reminders owned by `owner`, earliest first
    pub async fn list(&self, owner: &str) -> Result<Vec<Reminder>, ReminderError> {
        Ok(self.store.user_reminders(owner).await?)
    }

    async fn owned(&self, id: i64, requester: &str) -> Result<Reminder, ReminderError> {
        let reminder = self
            .store
            .get_reminder(id)
            .await?
            .ok_or(ReminderError::NotFound(id))?;
        if reminder.user_id != requester {
            return Err(ReminderError::NotOwner(id));
        }
        Ok(reminder)
    }

    async fn reload(&self, id: i64) -> Result<Reminder, ReminderError> {
        self.store
            .get_reminder(id)
            .await?
            .ok_or(ReminderError::NotFound(id))
    }

    /// Cancel a pending reminder
    ///
    /// Cancelling a reminder that is already cancelled or exhausted succeeds
    /// without touching the record.
    pub async fn cancel(&self, id: i64, requester: &str) -> Result<Reminder, ReminderError> {
        let reminder = self.owned(id, requester).await?;
        if !reminder.is_active() {
            debug!("Reminder {id} already {}", reminder.state);
            return Ok(reminder);
        }

        if self.store.cancel_reminder(id).await? {
            info!("Cancelled reminder {id} for user {requester}");
        } else {
            debug!("Reminder {id} left pending state before it could be cancelled");
        }
        self.reload(id).await
    }

    /// Push a reminder's next firing to `now + duration`
    ///
    /// Only `due_at` is written, so recurrence and dispatch progress are kept
    /// even if a dispatch pass commits concurrently. The state is not checked:
    /// an inactive reminder gets a new `due_at` but stays inactive.
    pub async fn snooze(
        &self,
        id: i64,
        requester: &str,
        duration: &str,
        now: DateTime<Utc>,
    ) -> Result<Reminder, ReminderError> {
        let seconds = parse_duration(duration)
            .filter(|s| (self.limits.min_seconds..=self.limits.max_seconds).contains(s))
            .ok_or_else(|| ReminderError::InvalidDuration(duration.trim().to_string()))?;

        self.owned(id, requester).await?;
        let due_at = truncate_to_second(now) + Duration::seconds(seconds);
        if !self.store.reschedule_reminder(id, due_at).await? {
            return Err(ReminderError::NotFound(id));
        }

        info!("Snoozed reminder {id} for user {requester} until {due_at}");
        self.reload(id).await
    }
}

/// Stored timestamps have second precision
fn truncate_to_second(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.with_nanosecond(0).unwrap_or(ts)
}
