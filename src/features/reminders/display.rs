//! User-facing text for reminder replies
//!
//! Pure formatting so command handlers only deal with Discord plumbing.

use chrono::{DateTime, Utc};

use super::manager::Created;
use super::model::Reminder;

/// Compact duration such as `1d 2h 30m`; seconds only appear below a minute
pub fn humanize_seconds(seconds: i64) -> String {
    let days = seconds / 86400;
    let hours = (seconds % 86400) / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    if secs > 0 && parts.is_empty() {
        parts.push(format!("{secs}s"));
    }

    if parts.is_empty() {
        format!("{seconds}s")
    } else {
        parts.join(" ")
    }
}

/// Discord relative timestamp markup (`<t:unix:R>`)
pub fn relative_timestamp(ts: &DateTime<Utc>) -> String {
    format!("<t:{}:R>", ts.timestamp())
}

/// Remaining occurrences: `∞` for endless recurring, `-` for one-offs
pub fn occurrences_label(reminder: &Reminder) -> String {
    match (reminder.is_recurring, reminder.occurrences_left) {
        (false, _) => "-".to_string(),
        (true, None) => "∞".to_string(),
        (true, Some(n)) => n.to_string(),
    }
}

/// Description of the "Reminder Created" embed
pub fn created_description(created: &Created) -> String {
    let reminder = &created.reminder;
    let mut text = format!(
        "Mode: {}\nMessage: {}\nTimezone: {}\nDue: {}",
        created.mode.as_str(),
        reminder.content,
        reminder.timezone,
        relative_timestamp(&reminder.due_at)
    );
    if let Some(interval) = reminder.interval_seconds {
        text.push_str(&format!(
            "\nRecurring every {} (remaining: {}).",
            humanize_seconds(interval),
            occurrences_label(reminder)
        ));
    }
    text
}

/// One line pair per reminder for `/reminder list`
pub fn list_line(reminder: &Reminder) -> String {
    let mode = if reminder.is_recurring { "R" } else { "1x" };
    format!(
        "ID `{}` | {} | Due {} | TZ {} | Left: {}\n> {}",
        reminder.id,
        mode,
        relative_timestamp(&reminder.due_at),
        reminder.timezone,
        occurrences_label(reminder),
        reminder.content
    )
}

pub fn list_description(reminders: &[Reminder]) -> String {
    reminders
        .iter()
        .map(list_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Sections of the `/reminder help` embed as (name, value)
pub fn help_sections(timezone: &str, max_seconds: i64) -> Vec<(String, String)> {
    vec![
        (
            "Create (relative)".to_string(),
            "`/reminder create when:2h30m message:Stand up and stretch`\n\
             -> Sets a reminder 2 hours 30 minutes from now."
                .to_string(),
        ),
        (
            "Create (absolute, 12-hour supported)".to_string(),
            format!(
                "`/reminder create when:\"Nov 12 2025 2:30 PM\" message:Meeting`\n\
                 -> Interprets `2:30 PM` in {timezone} on Nov 12 2025. If you only provide a time \
                 (e.g. `2:30 PM`), it's scheduled for the next occurrence of that time."
            ),
        ),
        (
            "Recurring reminders".to_string(),
            "`/reminder create when:10m message:Hydrate repeat:daily`\n\
             -> First triggers in 10 minutes, then repeats every day. You can use `hourly`, \
             `daily`, `weekly` or `1d2h`, `30m` patterns for `repeat`.\n\
             Use `repeat_count` to limit occurrences (omit for infinite)."
                .to_string(),
        ),
        (
            "Manage reminders".to_string(),
            "`/reminder list` - show your active reminders\n\
             `/reminder cancel <id>` - cancel a reminder\n\
             `/reminder snooze <id> <duration>` - push the next trigger by a relative duration (e.g. `10m`)"
                .to_string(),
        ),
        (
            "Limits".to_string(),
            format!(
                "Relative max is {}. Minimum delay is 1 minute.",
                humanize_seconds(max_seconds)
            ),
        ),
    ]
}
