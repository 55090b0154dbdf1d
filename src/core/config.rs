//! Environment-driven configuration
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Reminder channel, timezone and poll interval settings
//! - 1.0.0: Initial creation with token, guild and database settings

use anyhow::{Context, Result};
use chrono_tz::Tz;
use std::time::Duration;

pub const DEFAULT_DATABASE_PATH: &str = "reminders.db";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::New_York;
pub const DEFAULT_POLL_SECONDS: u64 = 30;

/// Bot configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub discord_guild_id: Option<String>,
    pub database_path: String,
    pub log_level: String,
    /// Channel every reminder is posted to
    pub reminder_channel_id: u64,
    /// Zone used to interpret absolute times typed by users
    pub reminder_timezone: Tz,
    pub reminder_poll_interval: Duration,
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// Call `dotenvy::dotenv()` first if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let discord_token =
            non_empty("DISCORD_TOKEN").context("DISCORD_TOKEN must be set")?;

        let reminder_channel_id = non_empty("REMINDER_CHANNEL_ID")
            .context("REMINDER_CHANNEL_ID must be set")?
            .trim()
            .parse::<u64>()
            .context("REMINDER_CHANNEL_ID must be a numeric channel id")?;

        let reminder_timezone = match non_empty("REMINDER_TIMEZONE") {
            Some(name) => name
                .trim()
                .parse::<Tz>()
                .map_err(|e| anyhow::anyhow!("REMINDER_TIMEZONE is not a valid IANA zone: {e}"))?,
            None => DEFAULT_TIMEZONE,
        };

        let poll_seconds = match non_empty("REMINDER_POLL_SECONDS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .context("REMINDER_POLL_SECONDS must be a positive integer")?,
            None => DEFAULT_POLL_SECONDS,
        };

        Ok(Self {
            discord_token,
            discord_guild_id: non_empty("DISCORD_GUILD_ID"),
            database_path: non_empty("DATABASE_PATH")
                .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string()),
            log_level: non_empty("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            reminder_channel_id,
            reminder_timezone,
            reminder_poll_interval: Duration::from_secs(poll_seconds),
        })
    }
}
