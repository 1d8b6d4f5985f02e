//! Planning for the premium subscription sweep.
//!
//! The sweep sends one expiry reminder per listing (guarded by
//! `reminder_sent_at`) and deactivates listings whose end date has passed.
//! Planning is pure; the worker carries out the plan.

use chrono::Duration;
use serde::Serialize;

use crate::premium::EXPIRING_SOON_DAYS;
use crate::types::{DbId, Timestamp};

/// The listing fields the sweep looks at.
#[derive(Debug, Clone)]
pub struct SweepCandidate {
    pub listing_id: DbId,
    pub end_date: Timestamp,
    pub is_active: bool,
    pub reminder_sent_at: Option<Timestamp>,
}

/// What one sweep run should do.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepPlan {
    /// Listings that get a `premium_expiring` email.
    pub reminders: Vec<DbId>,
    /// Listings to deactivate and announce as expired.
    pub expirations: Vec<DbId>,
}

impl SweepPlan {
    pub fn is_empty(&self) -> bool {
        self.reminders.is_empty() && self.expirations.is_empty()
    }
}

/// `true` when `end_date` falls in `(now, now + 7 days]`.
pub fn in_reminder_window(end_date: Timestamp, now: Timestamp) -> bool {
    end_date > now && end_date <= now + Duration::days(EXPIRING_SOON_DAYS)
}

/// Decide reminders and expirations for `candidates` at `now`.
///
/// Inactive listings are ignored. A listing is reminded at most once over
/// its lifetime; a listing past its end date is expired and never reminded.
pub fn plan_sweep(candidates: &[SweepCandidate], now: Timestamp) -> SweepPlan {
    let mut plan = SweepPlan::default();

    for c in candidates.iter().filter(|c| c.is_active) {
        if c.end_date <= now {
            plan.expirations.push(c.listing_id);
        } else if in_reminder_window(c.end_date, now) && c.reminder_sent_at.is_none() {
            plan.reminders.push(c.listing_id);
        }
    }

    plan
}

/// Totals reported after each run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub dry_run: bool,
    pub reminders_sent: usize,
    pub reminders_failed: usize,
    pub expired: usize,
    pub expired_emails_failed: usize,
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn candidate(id: DbId, end_in: Duration, active: bool, reminded: bool) -> SweepCandidate {
        let now = Utc::now();
        SweepCandidate {
            listing_id: id,
            end_date: now + end_in,
            is_active: active,
            reminder_sent_at: reminded.then_some(now),
        }
    }

    #[test]
    fn expired_active_listing_is_expired_once() {
        let now = Utc::now();
        let c = vec![candidate(1, Duration::days(-1), true, false)];
        let plan = plan_sweep(&c, now);
        assert_eq!(plan.expirations, vec![1]);
        assert!(plan.reminders.is_empty());
    }

    #[test]
    fn inactive_listings_ignored() {
        let now = Utc::now();
        let c = vec![
            candidate(1, Duration::days(-1), false, false),
            candidate(2, Duration::days(3), false, false),
        ];
        assert!(plan_sweep(&c, now).is_empty());
    }

    #[test]
    fn reminder_only_once() {
        let now = Utc::now();
        let c = vec![
            candidate(1, Duration::days(5), true, false),
            candidate(2, Duration::days(5), true, true),
        ];
        assert_eq!(plan_sweep(&c, now).reminders, vec![1]);
    }

    #[test]
    fn reminder_window_bounds() {
        let now = Utc::now();
        assert!(in_reminder_window(now + Duration::days(7), now));
        assert!(!in_reminder_window(now + Duration::days(7) + Duration::seconds(1), now));
        assert!(!in_reminder_window(now, now));
        let c = vec![candidate(1, Duration::days(20), true, false)];
        assert!(plan_sweep(&c, now).is_empty());
    }

    #[test]
    fn late_sweep_still_reminds_listing_inside_window() {
        let now = Utc::now();
        let c = vec![candidate(1, Duration::days(2), true, false)];
        assert_eq!(plan_sweep(&c, now).reminders, vec![1]);
    }
}
