// Core layer - shared types and configuration
pub mod core;

// Features layer - all feature modules
pub mod features;

// Infrastructure
pub mod database;

// Application layer
pub mod commands;

// Re-export core config for convenience
pub use core::Config;

// Re-export feature items
pub use features::reminders::{
    DiscordSink, NotificationSink, Reminder, ReminderError, ReminderManager, ReminderScheduler,
    ReminderStore,
};
