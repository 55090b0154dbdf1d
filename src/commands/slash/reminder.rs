//! # Reminder Command
//!
//! `/reminder` with create, list, cancel, snooze and help subcommands.
//!
//! - **Version**: 2.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 2.0.0: Single `/reminder` command with subcommands, recurrence options
//! - 1.0.0: Separate /remind, /reminders and /forget commands

use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandOptionType;

pub const COMMAND_NAME: &str = "reminder";

pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![create_reminder_command()]
}

fn create_reminder_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name(COMMAND_NAME)
        .description("Create and manage reminders")
        .create_option(|sub| {
            sub.name("create")
                .description("Create a reminder")
                .kind(CommandOptionType::SubCommand)
                .create_sub_option(|o| {
                    o.name("when")
                        .description("Relative (e.g. 10m, 2h30m) or absolute (e.g. 'Nov 12 2025 2:30 PM')")
                        .kind(CommandOptionType::String)
                        .required(true)
                })
                .create_sub_option(|o| {
                    o.name("message")
                        .description("What to remind you about")
                        .kind(CommandOptionType::String)
                        .required(true)
                        .max_length(1500)
                })
                .create_sub_option(|o| {
                    o.name("repeat")
                        .description("Repeat interval (hourly, daily, weekly, or 1d2h, 30m)")
                        .kind(CommandOptionType::String)
                        .required(false)
                })
                .create_sub_option(|o| {
                    o.name("repeat_count")
                        .description("How many times to fire (omit for infinite)")
                        .kind(CommandOptionType::Integer)
                        .required(false)
                        .min_int_value(1)
                })
        })
        .create_option(|sub| {
            sub.name("list")
                .description("List your active reminders")
                .kind(CommandOptionType::SubCommand)
        })
        .create_option(|sub| {
            sub.name("cancel")
                .description("Cancel a reminder")
                .kind(CommandOptionType::SubCommand)
                .create_sub_option(|o| {
                    o.name("reminder_id")
                        .description("Reminder ID from /reminder list")
                        .kind(CommandOptionType::Integer)
                        .required(true)
                        .min_int_value(1)
                })
        })
        .create_option(|sub| {
            sub.name("snooze")
                .description("Push a reminder's next trigger")
                .kind(CommandOptionType::SubCommand)
                .create_sub_option(|o| {
                    o.name("reminder_id")
                        .description("Reminder ID from /reminder list")
                        .kind(CommandOptionType::Integer)
                        .required(true)
                        .min_int_value(1)
                })
                .create_sub_option(|o| {
                    o.name("duration")
                        .description("Relative duration from now (e.g. 10m, 1h)")
                        .kind(CommandOptionType::String)
                        .required(true)
                })
        })
        .create_option(|sub| {
            sub.name("help")
                .description("Show reminder formats and limits")
                .kind(CommandOptionType::SubCommand)
        });
    command
}
