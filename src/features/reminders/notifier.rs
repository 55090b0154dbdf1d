//! Reminder delivery
//!
//! The dispatch loop only sees [`NotificationSink`]; [`DiscordSink`] is the
//! production implementation posting to a guild channel.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use async_trait::async_trait;
use log::debug;
use serde::Serialize;
use serenity::http::Http;
use serenity::model::id::ChannelId;
use serenity::utils::Color;
use std::sync::Arc;

use super::error::DeliveryError;
use super::model::Reminder;
use crate::core::truncate_for_embed;

/// Structured body of a reminder message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderNotice {
    pub reminder_id: i64,
    pub title: String,
    pub description: String,
    pub footer: String,
}

impl ReminderNotice {
    pub fn for_reminder(reminder: &Reminder) -> Self {
        let title = if reminder.is_recurring {
            "🔁 Recurring Reminder"
        } else {
            "⏰ Reminder"
        };
        Self {
            reminder_id: reminder.id,
            title: title.to_string(),
            description: truncate_for_embed(&reminder.content),
            footer: format!("ID {} • Timezone: {}", reminder.id, reminder.timezone),
        }
    }
}

/// Plain-text part of a reminder message: a mention of the owner
pub fn mention_text(reminder: &Reminder) -> String {
    format!("<@{}>", reminder.user_id)
}

/// Destination for due reminders
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(
        &self,
        channel_id: u64,
        text: &str,
        notice: &ReminderNotice,
    ) -> Result<(), DeliveryError>;
}

/// Posts reminder embeds through the Discord HTTP API
pub struct DiscordSink {
    http: Arc<Http>,
}

impl DiscordSink {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl NotificationSink for DiscordSink {
    async fn deliver(
        &self,
        channel_id: u64,
        text: &str,
        notice: &ReminderNotice,
    ) -> Result<(), DeliveryError> {
        if channel_id == 0 {
            return Err(DeliveryError::UnknownChannel(channel_id));
        }

        ChannelId(channel_id)
            .send_message(&*self.http, |m| {
                m.content(text).embed(|e| {
                    e.title(&notice.title)
                        .description(&notice.description)
                        .color(Color::from_rgb(87, 242, 135))
                        .footer(|f| f.text(&notice.footer))
                })
            })
            .await?;

        debug!(
            "Delivered reminder to channel {channel_id}: {}",
            serde_json::to_string(notice).unwrap_or_default()
        );
        Ok(())
    }
}
