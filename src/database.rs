//! # SQLite persistence
//!
//! Single-connection SQLite store. Every call takes the connection lock for
//! its whole statement group, so reads and writes are serialized.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Reminder lifecycle columns (state, recurrence, occurrences) and dispatch compare-and-set
//! - 1.0.0: Initial reminders table

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use log::{debug, info};
use sqlite::{Connection, ConnectionWithFullMutex, State, Statement};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::features::reminders::{NewReminder, Reminder, ReminderState, ReminderStore};

/// Storage format for timestamps; lexically ordered so SQL comparisons work
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS reminders (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL,
        content TEXT NOT NULL,
        due_at TEXT NOT NULL,
        created_at TEXT NOT NULL,
        last_sent_at TEXT,
        timezone TEXT NOT NULL,
        is_recurring INTEGER NOT NULL DEFAULT 0,
        interval_seconds INTEGER,
        occurrences_left INTEGER,
        state TEXT NOT NULL DEFAULT 'pending'
    );
    CREATE INDEX IF NOT EXISTS idx_reminders_state_due ON reminders(state, due_at);
    CREATE INDEX IF NOT EXISTS idx_reminders_user ON reminders(user_id, state);
";

const SELECT_COLUMNS: &str = "SELECT id, user_id, content, due_at, created_at, last_sent_at, \
     timezone, is_recurring, interval_seconds, occurrences_left, state FROM reminders";

#[derive(Clone)]
pub struct Database {
    connection: Arc<Mutex<ConnectionWithFullMutex>>,
}

impl Database {
    /// Open (or create) the database at `path` and ensure the schema exists
    ///
    /// `":memory:"` gives a private in-memory database.
    pub async fn new(path: &str) -> Result<Self> {
        let connection = Connection::open_with_full_mutex(path)
            .with_context(|| format!("Failed to open database at {path}"))?;
        connection
            .execute(SCHEMA)
            .context("Failed to initialize reminders schema")?;
        info!("Database ready at {path}");

        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map(|dt| dt.and_utc())
        .with_context(|| format!("Invalid stored timestamp: {raw}"))
}

fn read_reminder(statement: &Statement<'_>) -> Result<Reminder> {
    let last_sent_at = statement
        .read::<Option<String>, _>("last_sent_at")?
        .map(|raw| parse_timestamp(&raw))
        .transpose()?;

    Ok(Reminder {
        id: statement.read::<i64, _>("id")?,
        user_id: statement.read::<String, _>("user_id")?,
        content: statement.read::<String, _>("content")?,
        due_at: parse_timestamp(&statement.read::<String, _>("due_at")?)?,
        created_at: parse_timestamp(&statement.read::<String, _>("created_at")?)?,
        last_sent_at,
        timezone: statement.read::<String, _>("timezone")?,
        is_recurring: statement.read::<i64, _>("is_recurring")? != 0,
        interval_seconds: statement.read::<Option<i64>, _>("interval_seconds")?,
        occurrences_left: statement.read::<Option<i64>, _>("occurrences_left")?,
        state: statement.read::<String, _>("state")?.parse()?,
    })
}

fn collect_reminders(mut statement: Statement<'_>) -> Result<Vec<Reminder>> {
    let mut reminders = Vec::new();
    while statement.next()? == State::Row {
        reminders.push(read_reminder(&statement)?);
    }
    Ok(reminders)
}

fn changed_rows(connection: &Connection) -> Result<i64> {
    let mut statement = connection.prepare("SELECT changes()")?;
    statement.next()?;
    Ok(statement.read::<i64, _>(0)?)
}

#[async_trait]
impl ReminderStore for Database {
    async fn insert_reminder(&self, reminder: &NewReminder) -> Result<i64> {
        let connection = self.connection.lock().await;

        let mut statement = connection.prepare(
            "INSERT INTO reminders (user_id, content, due_at, created_at, timezone, \
             is_recurring, interval_seconds, occurrences_left, state) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )?;
        statement.bind((1, reminder.user_id.as_str()))?;
        statement.bind((2, reminder.content.as_str()))?;
        statement.bind((3, format_timestamp(&reminder.due_at).as_str()))?;
        statement.bind((4, format_timestamp(&reminder.created_at).as_str()))?;
        statement.bind((5, reminder.timezone.as_str()))?;
        statement.bind((6, reminder.interval_seconds.is_some() as i64))?;
        statement.bind((7, reminder.interval_seconds))?;
        statement.bind((8, reminder.occurrences_left))?;
        statement.bind((9, ReminderState::Pending.as_str()))?;
        statement.next()?;

        let mut id_statement = connection.prepare("SELECT last_insert_rowid()")?;
        id_statement.next()?;
        let id = id_statement.read::<i64, _>(0)?;

        debug!("Inserted reminder {id} for user {}", reminder.user_id);
        Ok(id)
    }

    async fn get_reminder(&self, id: i64) -> Result<Option<Reminder>> {
        let connection = self.connection.lock().await;

        let mut statement = connection.prepare(format!("{SELECT_COLUMNS} WHERE id = ?"))?;
        statement.bind((1, id))?;
        if statement.next()? == State::Row {
            Ok(Some(read_reminder(&statement)?))
        } else {
            Ok(None)
        }
    }

    async fn user_reminders(&self, user_id: &str) -> Result<Vec<Reminder>> {
        let connection = self.connection.lock().await;

        let mut statement = connection.prepare(format!(
            "{SELECT_COLUMNS} WHERE user_id = ? AND state = ? ORDER BY due_at ASC, id ASC"
        ))?;
        statement.bind((1, user_id))?;
        statement.bind((2, ReminderState::Pending.as_str()))?;
        collect_reminders(statement)
    }

    async fn due_reminders(&self, now: DateTime<Utc>) -> Result<Vec<Reminder>> {
        let connection = self.connection.lock().await;

        let mut statement = connection.prepare(format!(
            "{SELECT_COLUMNS} WHERE state = ? AND due_at <= ? ORDER BY due_at ASC, id ASC"
        ))?;
        statement.bind((1, ReminderState::Pending.as_str()))?;
        statement.bind((2, format_timestamp(&now).as_str()))?;
        collect_reminders(statement)
    }

    async fn cancel_reminder(&self, id: i64) -> Result<bool> {
        let connection = self.connection.lock().await;

        let mut statement =
            connection.prepare("UPDATE reminders SET state = ? WHERE id = ? AND state = ?")?;
        statement.bind((1, ReminderState::Cancelled.as_str()))?;
        statement.bind((2, id))?;
        statement.bind((3, ReminderState::Pending.as_str()))?;
        statement.next()?;
        drop(statement);

        Ok(changed_rows(&connection)? > 0)
    }

    async fn reschedule_reminder(&self, id: i64, due_at: DateTime<Utc>) -> Result<bool> {
        let connection = self.connection.lock().await;

        let mut statement = connection.prepare("UPDATE reminders SET due_at = ? WHERE id = ?")?;
        statement.bind((1, format_timestamp(&due_at).as_str()))?;
        statement.bind((2, id))?;
        statement.next()?;
        drop(statement);

        Ok(changed_rows(&connection)? > 0)
    }

    async fn commit_dispatch(
        &self,
        reminder: &Reminder,
        previous_due_at: DateTime<Utc>,
    ) -> Result<bool> {
        let connection = self.connection.lock().await;

        let mut statement = connection.prepare(
            "UPDATE reminders SET due_at = ?, last_sent_at = ?, occurrences_left = ?, state = ? \
             WHERE id = ? AND due_at = ? AND state = ?",
        )?;
        statement.bind((1, format_timestamp(&reminder.due_at).as_str()))?;
        statement.bind((
            2,
            reminder.last_sent_at.as_ref().map(format_timestamp).as_deref(),
        ))?;
        statement.bind((3, reminder.occurrences_left))?;
        statement.bind((4, reminder.state.as_str()))?;
        statement.bind((5, reminder.id))?;
        statement.bind((6, format_timestamp(&previous_due_at).as_str()))?;
        statement.bind((7, ReminderState::Pending.as_str()))?;
        statement.next()?;
        drop(statement);

        Ok(changed_rows(&connection)? > 0)
    }
}
