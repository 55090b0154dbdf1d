//! Shared context for command handlers
//!
//! - **Version**: 2.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 2.0.0: Carry the reminder manager instead of AI services
//! - 1.0.0: Initial implementation with core shared state

use std::sync::Arc;

use crate::features::reminders::ReminderManager;

/// State shared by every command handler
#[derive(Clone)]
pub struct CommandContext {
    pub reminders: Arc<ReminderManager>,
}

impl CommandContext {
    pub fn new(reminders: Arc<ReminderManager>) -> Self {
        Self { reminders }
    }
}
