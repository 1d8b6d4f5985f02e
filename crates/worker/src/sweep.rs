//! Premium subscription sweep.
//!
//! Each run sends one expiry reminder to listings ending within the next
//! seven days and deactivates listings whose end date has passed. Storage is
//! behind [`SweepStore`] so the runner can be exercised without a database.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use estate_core::premium::EXPIRING_SOON_DAYS;
use estate_core::sweep::{plan_sweep, SweepCandidate, SweepReport};
use estate_core::types::{DbId, Timestamp};
use estate_db::models::notification::CreateEmailNotification;
use estate_db::models::premium::PremiumNoticeTarget;
use estate_db::repositories::PremiumListingRepo;
use estate_db::DbPool;
use estate_events::Notifier;
use tokio_util::sync::CancellationToken;

/// Storage operations the sweep needs.
#[async_trait]
pub trait SweepStore: Send + Sync {
    /// Active listings ending at or before `until`.
    async fn candidates(&self, until: Timestamp) -> Result<Vec<SweepCandidate>, sqlx::Error>;

    async fn notice_target(&self, listing_id: DbId)
        -> Result<Option<PremiumNoticeTarget>, sqlx::Error>;

    async fn mark_reminder_sent(&self, listing_id: DbId, at: Timestamp)
        -> Result<bool, sqlx::Error>;

    /// Deactivate the listing and clear the property's premium flag.
    /// Returns `false` when another run got there first.
    async fn expire(&self, listing_id: DbId, now: Timestamp) -> Result<bool, sqlx::Error>;

    async fn record_notification(&self, entry: &CreateEmailNotification);
}

/// [`SweepStore`] over the PostgreSQL repositories.
pub struct PgSweepStore {
    pool: DbPool,
}

impl PgSweepStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SweepStore for PgSweepStore {
    async fn candidates(&self, until: Timestamp) -> Result<Vec<SweepCandidate>, sqlx::Error> {
        let listings = PremiumListingRepo::list_active_ending_before(&self.pool, until).await?;
        Ok(listings.iter().map(|l| l.sweep_candidate()).collect())
    }

    async fn notice_target(
        &self,
        listing_id: DbId,
    ) -> Result<Option<PremiumNoticeTarget>, sqlx::Error> {
        PremiumListingRepo::notice_target(&self.pool, listing_id).await
    }

    async fn mark_reminder_sent(
        &self,
        listing_id: DbId,
        at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        PremiumListingRepo::mark_reminder_sent(&self.pool, listing_id, at).await
    }

    async fn expire(&self, listing_id: DbId, now: Timestamp) -> Result<bool, sqlx::Error> {
        PremiumListingRepo::expire(&self.pool, listing_id, now).await
    }

    async fn record_notification(&self, entry: &CreateEmailNotification) {
        Notifier::record(&self.pool, entry).await;
    }
}

/// Run one sweep at `now`.
///
/// In a dry run nothing is sent or changed; the report counts what would
/// have happened. A reminder is stamped only once its email went out, so a
/// failed delivery is retried on the next run.
pub async fn run_sweep(
    store: &dyn SweepStore,
    notifier: &Notifier,
    now: Timestamp,
    dry_run: bool,
) -> Result<SweepReport, sqlx::Error> {
    let until = now + chrono::Duration::days(EXPIRING_SOON_DAYS);
    let plan = plan_sweep(&store.candidates(until).await?, now);
    let mut report = SweepReport {
        dry_run,
        ..SweepReport::default()
    };

    if dry_run {
        report.reminders_sent = plan.reminders.len();
        report.expired = plan.expirations.len();
        tracing::info!(
            reminders = report.reminders_sent,
            expirations = report.expired,
            "Dry run: no changes made"
        );
        return Ok(report);
    }

    for &listing_id in &plan.reminders {
        let Some(target) = store.notice_target(listing_id).await? else {
            tracing::warn!(listing_id, "Listing vanished before its reminder was sent");
            continue;
        };
        let entry = notifier.premium_expiring(&target, now).await;
        store.record_notification(&entry).await;

        if !entry.is_sent {
            report.reminders_failed += 1;
        } else if store.mark_reminder_sent(listing_id, now).await? {
            report.reminders_sent += 1;
        } else {
            tracing::debug!(listing_id, "Reminder already stamped by another run");
        }
    }

    for &listing_id in &plan.expirations {
        // Looked up first: the owner is still needed after deactivation.
        let target = store.notice_target(listing_id).await?;
        if !store.expire(listing_id, now).await? {
            tracing::debug!(listing_id, "Listing already expired");
            continue;
        }
        report.expired += 1;
        tracing::info!(listing_id, "Premium listing expired");

        let Some(target) = target else { continue };
        let entry = notifier.premium_expired(&target).await;
        store.record_notification(&entry).await;
        if !entry.is_sent {
            report.expired_emails_failed += 1;
        }
    }

    tracing::info!(
        reminders_sent = report.reminders_sent,
        reminders_failed = report.reminders_failed,
        expired = report.expired,
        expired_emails_failed = report.expired_emails_failed,
        "Premium sweep finished"
    );
    Ok(report)
}

/// Repeat [`run_sweep`] every `every` until `cancel` fires. Failed runs are
/// logged and retried on the next tick.
pub async fn run_loop(
    store: &dyn SweepStore,
    notifier: &Notifier,
    every: Duration,
    dry_run: bool,
    cancel: CancellationToken,
) {
    tracing::info!(interval_secs = every.as_secs(), dry_run, "Premium sweep loop started");
    let mut interval = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Premium sweep loop stopping");
                break;
            }
            _ = interval.tick() => {
                if let Err(e) = run_sweep(store, notifier, Utc::now(), dry_run).await {
                    tracing::error!(error = %e, "Premium sweep failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use chrono::{Duration, TimeZone};
    use estate_events::{EmailError, EmailTemplates, Mailer, OutgoingEmail};

    use super::*;

    #[derive(Debug, Clone)]
    struct Row {
        end_date: Timestamp,
        is_active: bool,
        reminder_sent_at: Option<Timestamp>,
        property_is_premium: bool,
    }

    #[derive(Default)]
    struct MemoryStore {
        rows: Mutex<HashMap<DbId, Row>>,
        notifications: Mutex<Vec<CreateEmailNotification>>,
        /// Stamp reminders on lookup, as a concurrent run would.
        concurrent_stamp: bool,
    }

    impl MemoryStore {
        fn with(rows: Vec<(DbId, Timestamp, bool, Option<Timestamp>)>) -> Self {
            let store = MemoryStore::default();
            {
                let mut map = store.rows.lock().unwrap();
                for (id, end_date, is_active, reminder_sent_at) in rows {
                    map.insert(
                        id,
                        Row {
                            end_date,
                            is_active,
                            reminder_sent_at,
                            property_is_premium: is_active,
                        },
                    );
                }
            }
            store
        }

        fn row(&self, id: DbId) -> Row {
            self.rows.lock().unwrap()[&id].clone()
        }

        fn notification_types(&self) -> Vec<String> {
            self.notifications
                .lock()
                .unwrap()
                .iter()
                .map(|n| n.notification_type.clone())
                .collect()
        }
    }

    #[async_trait]
    impl SweepStore for MemoryStore {
        async fn candidates(&self, until: Timestamp) -> Result<Vec<SweepCandidate>, sqlx::Error> {
            let rows = self.rows.lock().unwrap();
            let mut out: Vec<_> = rows
                .iter()
                .filter(|(_, r)| r.is_active && r.end_date <= until)
                .map(|(&id, r)| SweepCandidate {
                    listing_id: id,
                    end_date: r.end_date,
                    is_active: r.is_active,
                    reminder_sent_at: r.reminder_sent_at,
                })
                .collect();
            out.sort_by_key(|c| c.listing_id);
            Ok(out)
        }

        async fn notice_target(
            &self,
            listing_id: DbId,
        ) -> Result<Option<PremiumNoticeTarget>, sqlx::Error> {
            let mut rows = self.rows.lock().unwrap();
            if self.concurrent_stamp {
                if let Some(r) = rows.get_mut(&listing_id) {
                    r.reminder_sent_at.get_or_insert(r.end_date);
                }
            }
            Ok(rows.get(&listing_id).map(|r| PremiumNoticeTarget {
                listing_id,
                property_id: listing_id + 100,
                property_title: format!("Property {listing_id}"),
                plan_type: "basic".into(),
                end_date: r.end_date,
                user_id: 7,
                username: "sita".into(),
                email: "sita@example.com".into(),
            }))
        }

        async fn mark_reminder_sent(
            &self,
            listing_id: DbId,
            at: Timestamp,
        ) -> Result<bool, sqlx::Error> {
            let mut rows = self.rows.lock().unwrap();
            match rows.get_mut(&listing_id) {
                Some(r) if r.reminder_sent_at.is_none() => {
                    r.reminder_sent_at = Some(at);
                    Ok(true)
                }
                _ => Ok(false),
            }
        }

        async fn expire(&self, listing_id: DbId, now: Timestamp) -> Result<bool, sqlx::Error> {
            let mut rows = self.rows.lock().unwrap();
            match rows.get_mut(&listing_id) {
                Some(r) if r.is_active && r.end_date <= now => {
                    r.is_active = false;
                    r.property_is_premium = false;
                    Ok(true)
                }
                _ => Ok(false),
            }
        }

        async fn record_notification(&self, entry: &CreateEmailNotification) {
            self.notifications.lock().unwrap().push(entry.clone());
        }
    }

    #[derive(Default)]
    struct CountingMailer {
        sent: Mutex<usize>,
        fail: bool,
    }

    #[async_trait]
    impl Mailer for CountingMailer {
        async fn send(&self, _email: &OutgoingEmail) -> Result<(), EmailError> {
            if self.fail {
                return Err(EmailError::Build("relay unavailable".into()));
            }
            *self.sent.lock().unwrap() += 1;
            Ok(())
        }
    }

    fn notifier(mailer: Arc<CountingMailer>) -> Notifier {
        Notifier::new(mailer, EmailTemplates::new("https://estate.example").unwrap())
    }

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn ended_listing_is_expired_exactly_once() {
        let now = now();
        let store = MemoryStore::with(vec![(1, now - Duration::days(1), true, None)]);
        let mailer = Arc::new(CountingMailer::default());
        let notifier = notifier(mailer.clone());

        let first = run_sweep(&store, &notifier, now, false).await.unwrap();
        assert_eq!(first.expired, 1);
        assert_eq!(first.reminders_sent, 0);
        let row = store.row(1);
        assert!(!row.is_active);
        assert!(!row.property_is_premium);
        assert_eq!(store.notification_types(), vec!["premium_expired"]);

        let second = run_sweep(&store, &notifier, now, false).await.unwrap();
        assert_eq!(second.expired, 0);
        assert_eq!(*mailer.sent.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn reminder_is_sent_once_per_listing() {
        let now = now();
        let store = MemoryStore::with(vec![
            (1, now + Duration::days(3), true, None),
            (2, now + Duration::days(30), true, None),
        ]);
        let mailer = Arc::new(CountingMailer::default());
        let notifier = notifier(mailer.clone());

        let first = run_sweep(&store, &notifier, now, false).await.unwrap();
        assert_eq!(first.reminders_sent, 1);
        assert_eq!(store.row(1).reminder_sent_at, Some(now));
        assert!(store.row(2).reminder_sent_at.is_none());

        let later = now + Duration::days(1);
        let second = run_sweep(&store, &notifier, later, false).await.unwrap();
        assert_eq!(second.reminders_sent, 0);
        assert_eq!(store.notification_types(), vec!["premium_expiring"]);
    }

    #[tokio::test]
    async fn failed_reminder_is_retried_next_run() {
        let now = now();
        let store = MemoryStore::with(vec![(1, now + Duration::days(2), true, None)]);
        let failing = notifier(Arc::new(CountingMailer {
            fail: true,
            ..CountingMailer::default()
        }));

        let report = run_sweep(&store, &failing, now, false).await.unwrap();
        assert_eq!(report.reminders_failed, 1);
        assert!(store.row(1).reminder_sent_at.is_none());

        let notifications = store.notifications.lock().unwrap().clone();
        assert_eq!(notifications.len(), 1);
        assert!(!notifications[0].is_sent);
        assert!(notifications[0].error_message.is_some());

        let working = notifier(Arc::new(CountingMailer::default()));
        let retry = run_sweep(&store, &working, now, false).await.unwrap();
        assert_eq!(retry.reminders_sent, 1);
    }

    #[tokio::test]
    async fn reminder_stamped_elsewhere_is_not_counted() {
        let now = now();
        let mut store = MemoryStore::with(vec![(1, now + Duration::days(2), true, None)]);
        store.concurrent_stamp = true;
        let notifier = notifier(Arc::new(CountingMailer::default()));

        let report = run_sweep(&store, &notifier, now, false).await.unwrap();
        assert_eq!(report.reminders_sent, 0);
        assert_eq!(report.reminders_failed, 0);
        assert_eq!(store.row(1).reminder_sent_at, Some(now + Duration::days(2)));
    }

    #[tokio::test]
    async fn expiry_stands_when_email_fails() {
        let now = now();
        let store = MemoryStore::with(vec![(1, now - Duration::hours(1), true, None)]);
        let failing = notifier(Arc::new(CountingMailer {
            fail: true,
            ..CountingMailer::default()
        }));

        let report = run_sweep(&store, &failing, now, false).await.unwrap();
        assert_eq!(report.expired, 1);
        assert_eq!(report.expired_emails_failed, 1);
        assert!(!store.row(1).is_active);
    }

    #[tokio::test]
    async fn dry_run_changes_nothing() {
        let now = now();
        let store = MemoryStore::with(vec![
            (1, now - Duration::days(1), true, None),
            (2, now + Duration::days(1), true, None),
        ]);
        let mailer = Arc::new(CountingMailer::default());

        let report = run_sweep(&store, &notifier(mailer.clone()), now, true)
            .await
            .unwrap();
        assert!(report.dry_run);
        assert_eq!(report.expired, 1);
        assert_eq!(report.reminders_sent, 1);
        assert!(store.row(1).is_active);
        assert!(store.row(2).reminder_sent_at.is_none());
        assert_eq!(*mailer.sent.lock().unwrap(), 0);
        assert!(store.notification_types().is_empty());
    }

    #[tokio::test]
    async fn loop_stops_on_cancel() {
        let store = MemoryStore::default();
        let notifier = notifier(Arc::new(CountingMailer::default()));
        let cancel = CancellationToken::new();
        cancel.cancel();

        run_loop(&store, &notifier, std::time::Duration::from_secs(3600), false, cancel).await;
    }
}
