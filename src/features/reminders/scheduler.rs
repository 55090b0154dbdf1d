//! # Reminder dispatch
//!
//! Polls for due reminders on a fixed interval, delivers each one and moves
//! it to its next state. Delivery is attempted at most once per firing: a
//! failed send is logged and the reminder still advances.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Recurring reminders with occurrence countdown, compare-and-set commits, pluggable sink
//! - 1.0.0: One-off reminders

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::time::{interval, MissedTickBehavior};

use super::model::{Reminder, ReminderState};
use super::notifier::{mention_text, NotificationSink, ReminderNotice};
use super::store::ReminderStore;

/// Next state of a reminder that fired at `now`
///
/// Recurring reminders move forward one interval from their previous due
/// time, regardless of how late this firing is. Fails when the next due
/// time is not representable.
pub fn advance(reminder: &Reminder, now: DateTime<Utc>) -> Result<Reminder> {
    let mut next = reminder.clone();
    next.last_sent_at = Some(now);

    match (next.is_recurring, next.interval_seconds) {
        (true, Some(interval)) => {
            if let Some(left) = next.occurrences_left {
                let left = left - 1;
                next.occurrences_left = Some(left.max(0));
                if left <= 0 {
                    next.state = ReminderState::Exhausted;
                    return Ok(next);
                }
            }
            next.due_at = Duration::try_seconds(interval)
                .and_then(|step| next.due_at.checked_add_signed(step))
                .ok_or_else(|| {
                    anyhow!(
                        "reminder {} interval of {interval}s overflows its due time",
                        reminder.id
                    )
                })?;
        }
        _ => next.state = ReminderState::Exhausted,
    }
    Ok(next)
}

/// Outcome counts of one dispatch pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub due: usize,
    pub delivered: usize,
    pub failed_deliveries: usize,
    pub rescheduled: usize,
    pub retired: usize,
    /// Rows changed by someone else between selection and commit
    pub skipped: usize,
    pub errors: usize,
}

impl DispatchReport {
    pub fn is_empty(&self) -> bool {
        self.due == 0
    }
}

pub struct ReminderScheduler {
    store: Arc<dyn ReminderStore>,
    sink: Arc<dyn NotificationSink>,
    channel_id: u64,
    poll_interval: std::time::Duration,
    in_flight: AtomicBool,
}

impl ReminderScheduler {
    pub fn new(
        store: Arc<dyn ReminderStore>,
        sink: Arc<dyn NotificationSink>,
        channel_id: u64,
        poll_interval: std::time::Duration,
    ) -> Self {
        Self {
            store,
            sink,
            channel_id,
            poll_interval,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Poll forever; meant to be spawned once at startup
    pub async fn run(&self) {
        info!(
            "Reminder dispatch loop started (every {}s)",
            self.poll_interval.as_secs()
        );

        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            match self.run_pass(Utc::now()).await {
                Ok(report) if !report.is_empty() => info!(
                    "Reminder pass: {} due, {} delivered, {} failed sends, {} rescheduled, {} retired, {} skipped, {} errors",
                    report.due,
                    report.delivered,
                    report.failed_deliveries,
                    report.rescheduled,
                    report.retired,
                    report.skipped,
                    report.errors
                ),
                Ok(_) => {}
                Err(e) => error!("Reminder pass failed: {e:#}"),
            }
        }
    }

    /// Fire every reminder due at `now`
    ///
    /// Returns an empty report if another pass is still running.
    pub async fn run_pass(&self, now: DateTime<Utc>) -> Result<DispatchReport> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            warn!("Previous reminder pass still running; skipping");
            return Ok(DispatchReport::default());
        }

        let result = self.dispatch_due(now).await;
        self.in_flight.store(false, Ordering::SeqCst);
        result
    }

    async fn dispatch_due(&self, now: DateTime<Utc>) -> Result<DispatchReport> {
        let due = self.store.due_reminders(now).await?;
        let mut report = DispatchReport {
            due: due.len(),
            ..Default::default()
        };

        for reminder in &due {
            if let Err(e) = self.dispatch_one(reminder, now, &mut report).await {
                report.errors += 1;
                error!("Unexpected error processing reminder {}: {e:#}", reminder.id);
            }
        }

        Ok(report)
    }

    async fn dispatch_one(
        &self,
        reminder: &Reminder,
        now: DateTime<Utc>,
        report: &mut DispatchReport,
    ) -> Result<()> {
        let next = match advance(reminder, now) {
            Ok(next) => next,
            Err(e) => {
                // Retire it so the same record does not fail every pass
                let mut retired = reminder.clone();
                retired.state = ReminderState::Exhausted;
                self.store.commit_dispatch(&retired, reminder.due_at).await?;
                return Err(e);
            }
        };

        let notice = ReminderNotice::for_reminder(reminder);
        match self
            .sink
            .deliver(self.channel_id, &mention_text(reminder), &notice)
            .await
        {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                report.failed_deliveries += 1;
                error!("Failed sending reminder {}: {e}", reminder.id);
            }
        }

        if !self.store.commit_dispatch(&next, reminder.due_at).await? {
            report.skipped += 1;
            warn!(
                "Reminder {} changed during dispatch; keeping the newer state",
                reminder.id
            );
            return Ok(());
        }

        if next.is_active() {
            report.rescheduled += 1;
            debug!("Reminder {} rescheduled for {}", next.id, next.due_at);
        } else {
            report.retired += 1;
            debug!("Reminder {} retired ({})", next.id, next.state);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::features::reminders::error::DeliveryError;
    use crate::features::reminders::manager::{CreateRequest, ReminderManager};
    use crate::features::reminders::model::{NewReminder, ReminderLimits};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<(u64, String, ReminderNotice)>>,
        fail: bool,
    }

    #[async_trait]
    impl NotificationSink for RecordingSink {
        async fn deliver(
            &self,
            channel_id: u64,
            text: &str,
            notice: &ReminderNotice,
        ) -> Result<(), DeliveryError> {
            if self.fail {
                return Err(DeliveryError::Other("offline".to_string()));
            }
            self.sent
                .lock()
                .await
                .push((channel_id, text.to_string(), notice.clone()));
            Ok(())
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 10, 15, 0, 0).unwrap()
    }

    struct Harness {
        db: Arc<Database>,
        manager: ReminderManager,
        sink: Arc<RecordingSink>,
        scheduler: ReminderScheduler,
    }

    async fn harness(fail: bool) -> Harness {
        let db = Arc::new(Database::new(":memory:").await.unwrap());
        let sink = Arc::new(RecordingSink {
            fail,
            ..Default::default()
        });
        let manager = ReminderManager::new(
            db.clone(),
            ReminderLimits::default(),
            chrono_tz::America::New_York,
        );
        let scheduler = ReminderScheduler::new(
            db.clone(),
            sink.clone(),
            777,
            std::time::Duration::from_secs(30),
        );
        Harness {
            db,
            manager,
            sink,
            scheduler,
        }
    }

    fn request(when: &str, repeat: Option<&str>, count: Option<i64>) -> CreateRequest {
        CreateRequest {
            when: when.to_string(),
            message: "Hydrate".to_string(),
            repeat: repeat.map(str::to_string),
            repeat_count: count,
        }
    }

    fn sample(recurring: bool, left: Option<i64>) -> Reminder {
        Reminder {
            id: 1,
            user_id: "u1".to_string(),
            content: "Hydrate".to_string(),
            due_at: t0(),
            created_at: t0() - Duration::hours(1),
            last_sent_at: None,
            timezone: "America/New_York".to_string(),
            is_recurring: recurring,
            interval_seconds: recurring.then_some(3600),
            occurrences_left: left,
            state: ReminderState::Pending,
        }
    }

    #[test]
    fn test_advance_one_off_exhausts() {
        let now = t0() + Duration::seconds(10);
        let next = advance(&sample(false, None), now).unwrap();
        assert_eq!(next.state, ReminderState::Exhausted);
        assert_eq!(next.last_sent_at, Some(now));
        assert_eq!(next.due_at, t0());
    }

    #[test]
    fn test_advance_infinite_recurring_from_previous_due() {
        // Twenty minutes late: no catch-up, one interval from the old due time
        let now = t0() + Duration::minutes(20);
        let next = advance(&sample(true, None), now).unwrap();
        assert_eq!(next.state, ReminderState::Pending);
        assert_eq!(next.due_at, t0() + Duration::hours(1));
        assert_eq!(next.occurrences_left, None);
    }

    #[test]
    fn test_advance_countdown() {
        let next = advance(&sample(true, Some(2)), t0()).unwrap();
        assert_eq!(next.occurrences_left, Some(1));
        assert_eq!(next.due_at, t0() + Duration::hours(1));
        assert!(next.is_active());

        let last = advance(&next, next.due_at).unwrap();
        assert_eq!(last.occurrences_left, Some(0));
        assert_eq!(last.state, ReminderState::Exhausted);
        assert_eq!(last.due_at, next.due_at, "no reschedule after the final firing");
    }

    #[tokio::test]
    async fn test_recurring_with_count_fires_twice() {
        let h = harness(false).await;
        let id = h
            .manager
            .create("u1", request("10m", Some("daily"), Some(2)), t0())
            .await
            .unwrap()
            .reminder
            .id;
        let first_due = t0() + Duration::minutes(10);

        // Not yet due
        assert!(h.scheduler.run_pass(t0()).await.unwrap().is_empty());

        let report = h.scheduler.run_pass(first_due).await.unwrap();
        assert_eq!(report.delivered, 1);
        assert_eq!(report.rescheduled, 1);
        let r = h.db.get_reminder(id).await.unwrap().unwrap();
        assert_eq!(r.occurrences_left, Some(1));
        assert_eq!(r.due_at, first_due + Duration::days(1));
        assert_eq!(r.last_sent_at, Some(first_due));

        let second = first_due + Duration::days(1);
        let report = h.scheduler.run_pass(second).await.unwrap();
        assert_eq!(report.retired, 1);
        let r = h.db.get_reminder(id).await.unwrap().unwrap();
        assert_eq!(r.occurrences_left, Some(0));
        assert_eq!(r.state, ReminderState::Exhausted);
        assert_eq!(r.due_at, second);

        // A third pass has nothing left to fire
        let report = h.scheduler.run_pass(second + Duration::days(7)).await.unwrap();
        assert!(report.is_empty());
        assert_eq!(h.sink.sent.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn test_one_off_delivers_to_configured_channel() {
        let h = harness(false).await;
        h.manager
            .create("u1", request("1m", None, None), t0())
            .await
            .unwrap();

        let report = h
            .scheduler
            .run_pass(t0() + Duration::minutes(5))
            .await
            .unwrap();
        assert_eq!(report.retired, 1);

        let sent = h.sink.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, 777);
        assert_eq!(sent[0].1, "<@u1>");
        assert_eq!(sent[0].2.title, "⏰ Reminder");
    }

    #[tokio::test]
    async fn test_failed_delivery_still_advances() {
        let h = harness(true).await;
        let id = h
            .manager
            .create("u1", request("1m", None, None), t0())
            .await
            .unwrap()
            .reminder
            .id;

        let report = h
            .scheduler
            .run_pass(t0() + Duration::minutes(1))
            .await
            .unwrap();
        assert_eq!(report.failed_deliveries, 1);
        assert_eq!(report.delivered, 0);
        assert_eq!(report.retired, 1);

        let r = h.db.get_reminder(id).await.unwrap().unwrap();
        assert_eq!(r.state, ReminderState::Exhausted);
        assert!(r.last_sent_at.is_some());

        // Not retried
        let report = h
            .scheduler
            .run_pass(t0() + Duration::minutes(2))
            .await
            .unwrap();
        assert!(report.is_empty());
    }

    #[tokio::test]
    async fn test_one_firing_per_pass_after_downtime() {
        let h = harness(false).await;
        let id = h
            .manager
            .create("u1", request("1h", Some("hourly"), None), t0())
            .await
            .unwrap()
            .reminder
            .id;

        // Five hours of downtime
        let now = t0() + Duration::hours(6);
        let report = h.scheduler.run_pass(now).await.unwrap();
        assert_eq!(report.delivered, 1);
        let r = h.db.get_reminder(id).await.unwrap().unwrap();
        assert_eq!(r.due_at, t0() + Duration::hours(2));
    }

    #[tokio::test]
    async fn test_cancelled_reminders_never_fire() {
        let h = harness(false).await;
        let id = h
            .manager
            .create("u1", request("1m", None, None), t0())
            .await
            .unwrap()
            .reminder
            .id;
        h.manager.cancel(id, "u1").await.unwrap();

        let report = h.scheduler.run_pass(t0() + Duration::hours(1)).await.unwrap();
        assert!(report.is_empty());
        assert!(h.sink.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_change_is_not_overwritten() {
        let h = harness(false).await;
        let id = h
            .manager
            .create("u1", request("1m", None, None), t0())
            .await
            .unwrap()
            .reminder
            .id;
        let selected = h.db.get_reminder(id).await.unwrap().unwrap();

        // Owner snoozes between selection and commit
        let snoozed = h
            .manager
            .snooze(id, "u1", "1h", t0() + Duration::minutes(1))
            .await
            .unwrap();

        let next = advance(&selected, t0() + Duration::minutes(1)).unwrap();
        assert!(!h.db.commit_dispatch(&next, selected.due_at).await.unwrap());
        assert_eq!(h.db.get_reminder(id).await.unwrap().unwrap(), snoozed);
    }

    #[tokio::test]
    async fn test_overlapping_pass_is_skipped() {
        let h = harness(false).await;
        h.manager
            .create("u1", request("1m", None, None), t0())
            .await
            .unwrap();

        h.scheduler.in_flight.store(true, Ordering::SeqCst);
        let report = h
            .scheduler
            .run_pass(t0() + Duration::minutes(5))
            .await
            .unwrap();
        assert!(report.is_empty());

        h.scheduler.in_flight.store(false, Ordering::SeqCst);
        let report = h
            .scheduler
            .run_pass(t0() + Duration::minutes(5))
            .await
            .unwrap();
        assert_eq!(report.delivered, 1);
    }

    #[test]
    fn test_advance_rejects_unrepresentable_interval() {
        let mut reminder = sample(true, None);
        reminder.interval_seconds = Some(99_999_999 * 86400);
        assert!(advance(&reminder, t0()).is_err());
    }

    #[tokio::test]
    async fn test_overflowing_interval_does_not_stop_the_batch() {
        let h = harness(false).await;
        let broken = h
            .db
            .insert_reminder(&NewReminder {
                user_id: "u1".to_string(),
                content: "Far future".to_string(),
                due_at: t0() + Duration::minutes(1),
                created_at: t0(),
                timezone: "America/New_York".to_string(),
                interval_seconds: Some(99_999_999 * 86400),
                occurrences_left: None,
            })
            .await
            .unwrap();
        let one_off = h
            .manager
            .create("u2", request("2m", None, None), t0())
            .await
            .unwrap()
            .reminder
            .id;

        let report = h
            .scheduler
            .run_pass(t0() + Duration::minutes(5))
            .await
            .unwrap();
        assert_eq!(report.due, 2);
        assert_eq!(report.errors, 1);
        assert_eq!(report.delivered, 1);
        assert_eq!(report.retired, 1);

        let broken = h.db.get_reminder(broken).await.unwrap().unwrap();
        assert_eq!(broken.state, ReminderState::Exhausted);
        let one_off = h.db.get_reminder(one_off).await.unwrap().unwrap();
        assert_eq!(one_off.state, ReminderState::Exhausted);

        let sent = h.sink.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1, "<@u2>");
    }
}
