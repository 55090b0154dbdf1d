//! Reminder command handler
//!
//! Handles: reminder (create, list, cancel, snooze, help)
//!
//! - **Version**: 2.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 2.0.0: Single /reminder command with subcommands backed by ReminderManager
//! - 1.0.0: Separate remind, reminders, forget commands

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serenity::model::application::interaction::application_command::{
    ApplicationCommandInteraction, CommandDataOption,
};
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::Context;
use serenity::utils::Color;
use std::sync::Arc;
use uuid::Uuid;

use crate::commands::context::CommandContext;
use crate::commands::handler::SlashCommandHandler;
use crate::commands::slash::reminder::COMMAND_NAME;
use crate::commands::slash::{extract_subcommand, get_integer_option, get_string_option};
use crate::core::{truncate_for_embed, truncate_for_message};
use crate::features::reminders::display::{
    created_description, help_sections, list_description, relative_timestamp,
};
use crate::features::reminders::{CreateRequest, ReminderError};

/// What a subcommand answers with; every reply is ephemeral
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    Embed {
        title: String,
        description: String,
        color: Color,
        fields: Vec<(String, String)>,
        footer: Option<String>,
    },
}

impl Reply {
    fn text(content: impl Into<String>) -> Self {
        Reply::Text(content.into())
    }
}

/// Handler for the /reminder command
pub struct ReminderHandler;

#[async_trait]
impl SlashCommandHandler for ReminderHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &[COMMAND_NAME]
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let request_id = Uuid::new_v4();
        let user_id = command.user.id.to_string();

        let reply = match extract_subcommand(&command.data.options) {
            Some((name, options)) => {
                info!("[{request_id}] /reminder {name} from user {user_id}");
                self.run_subcommand(&ctx, &user_id, &name, &options, Utc::now())
                    .await?
            }
            None => {
                warn!("[{request_id}] /reminder without subcommand");
                Reply::text("Please specify a subcommand. Use `/reminder help` to see available options.")
            }
        };

        send_reply(serenity_ctx, command, reply).await?;
        debug!("[{request_id}] Reply sent");
        Ok(())
    }
}

impl ReminderHandler {
    /// Run one subcommand and build its reply
    ///
    /// User mistakes become text replies; only infrastructure failures are
    /// returned as errors.
    pub async fn run_subcommand(
        &self,
        ctx: &CommandContext,
        user_id: &str,
        subcommand: &str,
        options: &[CommandDataOption],
        now: DateTime<Utc>,
    ) -> Result<Reply> {
        let outcome = match subcommand {
            "create" => self.create(ctx, user_id, options, now).await,
            "list" => self.list(ctx, user_id).await,
            "cancel" => self.cancel(ctx, user_id, options).await,
            "snooze" => self.snooze(ctx, user_id, options, now).await,
            "help" => Ok(self.help(ctx)),
            other => Ok(Reply::text(format!("Unknown subcommand `{other}`."))),
        };

        match outcome {
            Ok(reply) => Ok(reply),
            Err(e) if e.is_user_error() => {
                debug!("Rejected /reminder {subcommand} for user {user_id}: {e}");
                Ok(Reply::text(e.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn create(
        &self,
        ctx: &CommandContext,
        user_id: &str,
        options: &[CommandDataOption],
        now: DateTime<Utc>,
    ) -> Result<Reply, ReminderError> {
        let (Some(when), Some(message)) = (
            get_string_option(options, "when"),
            get_string_option(options, "message"),
        ) else {
            return Ok(Reply::text("Both `when` and `message` are required."));
        };

        let request = CreateRequest {
            when,
            message,
            repeat: get_string_option(options, "repeat").filter(|r| !r.trim().is_empty()),
            repeat_count: get_integer_option(options, "repeat_count"),
        };
        let created = ctx.reminders.create(user_id, request, now).await?;

        Ok(Reply::Embed {
            title: "Reminder Created".to_string(),
            description: truncate_for_embed(&created_description(&created)),
            color: Color::BLURPLE,
            fields: Vec::new(),
            footer: Some(format!("Reminder ID {}", created.reminder.id)),
        })
    }

    async fn list(&self, ctx: &CommandContext, user_id: &str) -> Result<Reply, ReminderError> {
        let reminders = ctx.reminders.list(user_id).await?;
        if reminders.is_empty() {
            return Ok(Reply::text("You have no active reminders."));
        }

        Ok(Reply::Embed {
            title: "Your Reminders".to_string(),
            description: truncate_for_embed(&list_description(&reminders)),
            color: Color::GOLD,
            fields: Vec::new(),
            footer: None,
        })
    }

    async fn cancel(
        &self,
        ctx: &CommandContext,
        user_id: &str,
        options: &[CommandDataOption],
    ) -> Result<Reply, ReminderError> {
        let Some(id) = get_integer_option(options, "reminder_id") else {
            return Ok(Reply::text("`reminder_id` is required."));
        };
        ctx.reminders.cancel(id, user_id).await?;
        Ok(Reply::text(format!("Reminder `{id}` canceled.")))
    }

    async fn snooze(
        &self,
        ctx: &CommandContext,
        user_id: &str,
        options: &[CommandDataOption],
        now: DateTime<Utc>,
    ) -> Result<Reply, ReminderError> {
        let (Some(id), Some(duration)) = (
            get_integer_option(options, "reminder_id"),
            get_string_option(options, "duration"),
        ) else {
            return Ok(Reply::text("Both `reminder_id` and `duration` are required."));
        };
        let reminder = ctx.reminders.snooze(id, user_id, &duration, now).await?;
        Ok(Reply::text(format!(
            "Reminder `{id}` snoozed until {}.",
            relative_timestamp(&reminder.due_at)
        )))
    }

    fn help(&self, ctx: &CommandContext) -> Reply {
        let timezone = ctx.reminders.timezone();
        Reply::Embed {
            title: "Reminder Command Help".to_string(),
            description: format!("All absolute times are interpreted in **{}**.", timezone.name()),
            color: Color::BLURPLE,
            fields: help_sections(timezone.name(), ctx.reminders.limits().max_seconds),
            footer: None,
        }
    }
}

async fn send_reply(
    serenity_ctx: &Context,
    command: &ApplicationCommandInteraction,
    reply: Reply,
) -> Result<()> {
    command
        .create_interaction_response(&serenity_ctx.http, |response| {
            response
                .kind(InteractionResponseType::ChannelMessageWithSource)
                .interaction_response_data(|message| {
                    message.ephemeral(true);
                    match &reply {
                        Reply::Text(content) => message.content(truncate_for_message(content)),
                        Reply::Embed {
                            title,
                            description,
                            color,
                            fields,
                            footer,
                        } => message.embed(|e| {
                            e.title(title).description(description).color(*color);
                            for (name, value) in fields {
                                e.field(name, value, false);
                            }
                            if let Some(text) = footer {
                                e.footer(|f| f.text(text));
                            }
                            e
                        }),
                    }
                })
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::features::reminders::{ReminderLimits, ReminderManager, ReminderStore};
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 10, 15, 0, 0).unwrap()
    }

    async fn context() -> CommandContext {
        let db = Database::new(":memory:").await.unwrap();
        let store: Arc<dyn ReminderStore> = Arc::new(db);
        CommandContext::new(Arc::new(ReminderManager::new(
            store,
            ReminderLimits::default(),
            chrono_tz::America::New_York,
        )))
    }

    fn opt(name: &str, value: serde_json::Value) -> CommandDataOption {
        let kind = if value.is_i64() { 4 } else { 3 };
        serde_json::from_value(serde_json::json!({
            "name": name,
            "type": kind,
            "value": value,
        }))
        .unwrap()
    }

    fn text(reply: Reply) -> String {
        match reply {
            Reply::Text(t) => t,
            other => panic!("expected text reply, got {other:?}"),
        }
    }

    async fn create(ctx: &CommandContext, user: &str, when: &str) -> Reply {
        ReminderHandler
            .run_subcommand(
                ctx,
                user,
                "create",
                &[
                    opt("when", serde_json::json!(when)),
                    opt("message", serde_json::json!("Stretch")),
                ],
                t0(),
            )
            .await
            .unwrap()
    }

    #[test]
    fn test_command_names() {
        assert_eq!(ReminderHandler.command_names(), &["reminder"]);
    }

    #[tokio::test]
    async fn test_create_replies_with_embed() {
        let ctx = context().await;
        match create(&ctx, "1", "10m").await {
            Reply::Embed {
                title,
                description,
                footer,
                ..
            } => {
                assert_eq!(title, "Reminder Created");
                assert!(description.starts_with("Mode: relative"));
                assert_eq!(footer.as_deref(), Some("Reminder ID 1"));
            }
            other => panic!("unexpected reply {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_user_error_is_text() {
        let ctx = context().await;
        let reply = text(create(&ctx, "1", "30s").await);
        assert_eq!(reply, "Minimum relative time is 1 minute.");
    }

    #[tokio::test]
    async fn test_list_empty_and_filled() {
        let ctx = context().await;
        let empty = ReminderHandler
            .run_subcommand(&ctx, "1", "list", &[], t0())
            .await
            .unwrap();
        assert_eq!(text(empty), "You have no active reminders.");

        create(&ctx, "1", "10m").await;
        let listed = ReminderHandler
            .run_subcommand(&ctx, "1", "list", &[], t0())
            .await
            .unwrap();
        match listed {
            Reply::Embed { title, description, .. } => {
                assert_eq!(title, "Your Reminders");
                assert!(description.contains("ID `1`"));
            }
            other => panic!("unexpected reply {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cancel_and_ownership() {
        let ctx = context().await;
        create(&ctx, "1", "10m").await;

        let denied = ReminderHandler
            .run_subcommand(&ctx, "2", "cancel", &[opt("reminder_id", serde_json::json!(1))], t0())
            .await
            .unwrap();
        assert_eq!(text(denied), "You do not own reminder `1`.");

        let ok = ReminderHandler
            .run_subcommand(&ctx, "1", "cancel", &[opt("reminder_id", serde_json::json!(1))], t0())
            .await
            .unwrap();
        assert_eq!(text(ok), "Reminder `1` canceled.");

        let missing = ReminderHandler
            .run_subcommand(&ctx, "1", "cancel", &[opt("reminder_id", serde_json::json!(99))], t0())
            .await
            .unwrap();
        assert_eq!(text(missing), "Reminder `99` not found.");
    }

    #[tokio::test]
    async fn test_snooze_reply() {
        let ctx = context().await;
        create(&ctx, "1", "10m").await;

        let reply = ReminderHandler
            .run_subcommand(
                &ctx,
                "1",
                "snooze",
                &[
                    opt("reminder_id", serde_json::json!(1)),
                    opt("duration", serde_json::json!("1h")),
                ],
                t0(),
            )
            .await
            .unwrap();
        let expected = t0().timestamp() + 3600;
        assert_eq!(
            text(reply),
            format!("Reminder `1` snoozed until <t:{expected}:R>.")
        );
    }

    #[tokio::test]
    async fn test_help_has_sections() {
        let ctx = context().await;
        let reply = ReminderHandler
            .run_subcommand(&ctx, "1", "help", &[], t0())
            .await
            .unwrap();
        match reply {
            Reply::Embed { title, fields, description, .. } => {
                assert_eq!(title, "Reminder Command Help");
                assert_eq!(fields.len(), 5);
                assert!(description.contains("America/New_York"));
            }
            other => panic!("unexpected reply {other:?}"),
        }
    }
}
