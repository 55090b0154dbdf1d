//! Slash command handler trait
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Handlers receive the reminder-aware command context
//! - 1.0.0: Initial implementation for modular command handling

use anyhow::Result;
use async_trait::async_trait;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::prelude::Context;
use std::sync::Arc;

use super::context::CommandContext;

/// Trait for slash command handlers
///
/// Each handler processes one or more top-level slash commands and is looked
/// up by name through a [`super::CommandRegistry`].
///
/// Returning `Err` means the interaction was not answered; the caller sends a
/// generic error reply.
#[async_trait]
pub trait SlashCommandHandler: Send + Sync {
    /// Top-level command names routed to this handler
    fn command_names(&self) -> &'static [&'static str];

    fn handles(&self, name: &str) -> bool {
        self.command_names().contains(&name)
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()>;
}
