//! Command handler registry
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Dispatch by interaction name, build from a handler list
//! - 1.0.0: Initial implementation for handler dispatch

use anyhow::Result;
use log::warn;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::prelude::Context;
use std::collections::HashMap;
use std::sync::Arc;

use super::context::CommandContext;
use super::handler::SlashCommandHandler;

/// Registry mapping command names to handlers
#[derive(Clone, Default)]
pub struct CommandRegistry {
    handlers: HashMap<&'static str, Arc<dyn SlashCommandHandler>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-filled with `handlers`
    pub fn with_handlers(handlers: impl IntoIterator<Item = Arc<dyn SlashCommandHandler>>) -> Self {
        let mut registry = Self::new();
        for handler in handlers {
            registry.register(handler);
        }
        registry
    }

    /// Register a handler under every name it declares; later registrations win
    pub fn register(&mut self, handler: Arc<dyn SlashCommandHandler>) {
        for name in handler.command_names() {
            self.handlers.insert(name, Arc::clone(&handler));
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn SlashCommandHandler>> {
        self.handlers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Number of registered command names (not unique handlers)
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Route an interaction to its handler
    ///
    /// Returns `Ok(false)` when no handler owns the command name.
    pub async fn dispatch(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<bool> {
        let Some(handler) = self.get(&command.data.name) else {
            warn!("No handler registered for /{}", command.data.name);
            return Ok(false);
        };
        handler.handle(ctx, serenity_ctx, command).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct MockHandler {
        names: &'static [&'static str],
    }

    #[async_trait]
    impl SlashCommandHandler for MockHandler {
        fn command_names(&self) -> &'static [&'static str] {
            self.names
        }

        async fn handle(
            &self,
            _ctx: Arc<CommandContext>,
            _serenity_ctx: &Context,
            _command: &ApplicationCommandInteraction,
        ) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_registry_new_is_empty() {
        let registry = CommandRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_registry_multiple_names() {
        let mut registry = CommandRegistry::new();
        registry.register(Arc::new(MockHandler {
            names: &["reminder", "remind"],
        }));

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("reminder"));
        assert!(registry.contains("remind"));
        assert!(registry.get("ping").is_none());
    }

    #[test]
    fn test_with_handlers() {
        let registry = CommandRegistry::with_handlers(vec![
            Arc::new(MockHandler { names: &["a"] }) as Arc<dyn SlashCommandHandler>,
            Arc::new(MockHandler { names: &["b"] }),
        ]);
        assert_eq!(registry.len(), 2);
        assert!(registry.get("a").is_some());
        assert!(registry.get("b").is_some());
    }

    #[test]
    fn test_default_handlers_cover_reminder() {
        let registry = CommandRegistry::with_handlers(crate::commands::handlers::create_all_handlers());
        assert!(registry.contains("reminder"));
    }
}
