use anyhow::Result;
use dotenvy::dotenv;
use log::{error, info};
use serenity::async_trait;
use serenity::model::application::interaction::{Interaction, InteractionResponseType};
use serenity::model::gateway::Ready;
use serenity::model::id::GuildId;
use serenity::prelude::*;
use std::sync::Arc;

use herald::commands::handlers::create_all_handlers;
use herald::commands::{
    register_global_commands, register_guild_commands, CommandContext, CommandRegistry,
};
use herald::core::Config;
use herald::database::Database;
use herald::features::reminders::{
    DiscordSink, ReminderLimits, ReminderManager, ReminderScheduler, ReminderStore,
};

struct Handler {
    registry: CommandRegistry,
    context: Arc<CommandContext>,
    guild_id: Option<GuildId>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("🎉 {} is connected and ready!", ready.user.name);
        info!("📡 Connected to {} guilds", ready.guilds.len());
        info!("🤖 Bot ID: {}", ready.user.id);

        if let Some(shard) = ready.shard {
            info!("⚡ Shard: {}/{}", shard[0] + 1, shard[1]);
        }

        // Guild commands update instantly; global ones can take up to an hour
        if let Some(guild_id) = self.guild_id {
            info!("🔧 Development mode: Registering commands for guild {guild_id}");
            if let Err(e) = register_guild_commands(&ctx, guild_id).await {
                error!("❌ Failed to register guild slash commands: {e}");
            }
        } else {
            info!("🌍 Production mode: Registering commands globally");
            if let Err(e) = register_global_commands(&ctx).await {
                error!("❌ Failed to register global slash commands: {e}");
            }
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::ApplicationCommand(command) = interaction else {
            return;
        };

        match self
            .registry
            .dispatch(Arc::clone(&self.context), &ctx, &command)
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                if let Err(reply_err) = command
                    .create_interaction_response(&ctx.http, |response| {
                        response
                            .kind(InteractionResponseType::ChannelMessageWithSource)
                            .interaction_response_data(|message| {
                                message.content("Unknown command.").ephemeral(true)
                            })
                    })
                    .await
                {
                    error!("Failed to send unknown-command response: {reply_err}");
                }
            }
            Err(e) => {
                error!(
                    "Error handling slash command '{}': {e:#}",
                    command.data.name
                );
                if let Err(reply_err) = command
                    .create_interaction_response(&ctx.http, |response| {
                        response
                            .kind(InteractionResponseType::ChannelMessageWithSource)
                            .interaction_response_data(|message| {
                                message
                                    .content("❌ Sorry, I encountered an error processing your command. Please try again.")
                                    .ephemeral(true)
                            })
                    })
                    .await
                {
                    error!("Failed to send error response: {reply_err}");
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting reminder bot v{}...", env!("CARGO_PKG_VERSION"));
    info!(
        "Reminders post to channel {} using timezone {}",
        config.reminder_channel_id,
        config.reminder_timezone.name()
    );

    let database = Database::new(&config.database_path).await?;
    let store: Arc<dyn ReminderStore> = Arc::new(database);

    let manager = Arc::new(ReminderManager::new(
        Arc::clone(&store),
        ReminderLimits::default(),
        config.reminder_timezone,
    ));

    // Parse guild ID if provided for development mode
    let guild_id = config
        .discord_guild_id
        .as_ref()
        .and_then(|id| id.parse::<u64>().ok())
        .map(GuildId);

    let handler = Handler {
        registry: CommandRegistry::with_handlers(create_all_handlers()),
        context: Arc::new(CommandContext::new(manager)),
        guild_id,
    };

    let intents = GatewayIntents::GUILDS;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    info!("Bot configured successfully. Connecting to Discord gateway...");

    // Start the reminder dispatch loop
    let sink = Arc::new(DiscordSink::new(client.cache_and_http.http.clone()));
    let scheduler = ReminderScheduler::new(
        store,
        sink,
        config.reminder_channel_id,
        config.reminder_poll_interval,
    );
    tokio::spawn(async move {
        scheduler.run().await;
    });

    if let Err(why) = client.start().await {
        error!("Gateway connection failed: {why:?}");
        return Err(anyhow::anyhow!(
            "Failed to establish gateway connection: {}",
            why
        ));
    }

    Ok(())
}
