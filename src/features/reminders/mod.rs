//! # Reminders Feature
//!
//! One-off and recurring reminders: parsing of relative and absolute times,
//! owner-scoped lifecycle operations and a polling dispatch loop that posts
//! due reminders to a fixed channel.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 2.0.0: Absolute times in a configured zone, recurrence, snooze, lifecycle states
//! - 1.0.0: Relative one-off reminders

pub mod display;
pub mod error;
pub mod manager;
pub mod model;
pub mod notifier;
pub mod parser;
pub mod scheduler;
pub mod store;

pub use error::{DeliveryError, ParseError, RangeError, ReminderError};
pub use manager::{CreateRequest, Created, ReminderManager, ScheduleMode};
pub use model::{NewReminder, Reminder, ReminderLimits, ReminderState};
pub use notifier::{DiscordSink, NotificationSink, ReminderNotice};
pub use parser::{parse_absolute, parse_duration, parse_repeat};
pub use scheduler::{advance, DispatchReport, ReminderScheduler};
pub use store::ReminderStore;
