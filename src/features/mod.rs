//! # Features
//!
//! Feature modules of the bot. Each feature owns its domain types and
//! exposes a small surface consumed by the command layer and the binary.

pub mod reminders;

pub use reminders::{ReminderManager, ReminderScheduler};
