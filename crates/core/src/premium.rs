//! Premium plans and listing lifecycle rules.
//!
//! Prices are in NPR. A listing is active between `start_date` and
//! `end_date`; the "expiring soon" window is derived, never stored.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{Money, Timestamp};

/// Listings with this many days left or fewer are "expiring soon".
pub const EXPIRING_SOON_DAYS: i64 = 7;

/// Window used by the sweep summary for upcoming expirations.
pub const UPCOMING_WINDOW_DAYS: i64 = 30;

/// Days added by the admin "extend" action.
pub const ADMIN_EXTENSION_DAYS: i64 = 30;

// ---------------------------------------------------------------------------
// Plans
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    Basic,
    Featured,
    Premium,
}

pub const VALID_PLAN_TYPES: &[&str] = &["basic", "featured", "premium"];

impl PlanType {
    pub const ALL: [PlanType; 3] = [PlanType::Basic, PlanType::Featured, PlanType::Premium];

    pub fn as_str(self) -> &'static str {
        match self {
            PlanType::Basic => "basic",
            PlanType::Featured => "featured",
            PlanType::Premium => "premium",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            PlanType::Basic => "Basic Premium",
            PlanType::Featured => "Featured Listing",
            PlanType::Premium => "Premium Plus",
        }
    }

    /// List price in whole NPR.
    pub fn price(self) -> Money {
        match self {
            PlanType::Basic => Money::from(500),
            PlanType::Featured => Money::from(2000),
            PlanType::Premium => Money::from(5000),
        }
    }

    pub fn duration_days(self) -> i64 {
        match self {
            PlanType::Basic => 7,
            PlanType::Featured => 30,
            PlanType::Premium => 90,
        }
    }

    pub fn duration_label(self) -> &'static str {
        match self {
            PlanType::Basic => "1 Week",
            PlanType::Featured => "1 Month",
            PlanType::Premium => "3 Months",
        }
    }

    pub fn features(self) -> &'static [&'static str] {
        match self {
            PlanType::Basic => &[
                "Featured in search results",
                "Priority placement",
                "Basic analytics",
                "Email support",
            ],
            PlanType::Featured => &[
                "All Basic features",
                "Top placement in search",
                "Detailed analytics",
                "Social media promotion",
                "Priority support",
            ],
            PlanType::Premium => &[
                "All Featured features",
                "Homepage spotlight",
                "Advanced analytics",
                "Virtual tour hosting",
                "Dedicated support",
            ],
        }
    }

    /// `end_date` for a listing of this plan starting at `start`.
    pub fn end_date_from(self, start: Timestamp) -> Timestamp {
        start + Duration::days(self.duration_days())
    }
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(PlanType::Basic),
            "featured" => Ok(PlanType::Featured),
            "premium" => Ok(PlanType::Premium),
            other => Err(CoreError::Validation(format!(
                "Invalid plan type '{other}'. Must be one of: {}",
                VALID_PLAN_TYPES.join(", ")
            ))),
        }
    }
}

/// Public description of a plan for the pricing page and API.
#[derive(Debug, Clone, Serialize)]
pub struct PlanInfo {
    pub plan_type: PlanType,
    pub name: &'static str,
    pub duration: &'static str,
    pub duration_days: i64,
    pub price: Money,
    pub features: &'static [&'static str],
}

/// All plans in ascending price order.
pub fn plan_catalog() -> Vec<PlanInfo> {
    PlanType::ALL
        .iter()
        .map(|p| PlanInfo {
            plan_type: *p,
            name: p.display_name(),
            duration: p.duration_label(),
            duration_days: p.duration_days(),
            price: p.price(),
            features: p.features(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Payment status
// ---------------------------------------------------------------------------

pub const PAYMENT_PENDING: &str = "pending";
pub const PAYMENT_COMPLETED: &str = "completed";
pub const PAYMENT_FAILED: &str = "failed";
pub const PAYMENT_REFUNDED: &str = "refunded";
pub const PAYMENT_CANCELLED: &str = "cancelled";

pub const VALID_PAYMENT_STATUSES: &[&str] = &[
    PAYMENT_PENDING,
    PAYMENT_COMPLETED,
    PAYMENT_FAILED,
    PAYMENT_REFUNDED,
    PAYMENT_CANCELLED,
];

pub fn validate_payment_status(status: &str) -> Result<(), CoreError> {
    if VALID_PAYMENT_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid payment status '{status}'. Must be one of: {}",
            VALID_PAYMENT_STATUSES.join(", ")
        )))
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Whole days left until `end_date`, or 0 once it has passed.
pub fn days_remaining(end_date: Timestamp, now: Timestamp) -> i64 {
    if end_date > now {
        (end_date - now).num_days()
    } else {
        0
    }
}

pub fn is_expired(end_date: Timestamp, now: Timestamp) -> bool {
    end_date <= now
}

pub fn is_expiring_soon(end_date: Timestamp, now: Timestamp) -> bool {
    !is_expired(end_date, now) && days_remaining(end_date, now) <= EXPIRING_SOON_DAYS
}

/// Derived lifecycle phase of a listing, as shown on dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingPhase {
    Active,
    ExpiringSoon,
    Expired,
    Inactive,
}

pub fn phase(is_active: bool, end_date: Timestamp, now: Timestamp) -> ListingPhase {
    if !is_active {
        ListingPhase::Inactive
    } else if is_expired(end_date, now) {
        ListingPhase::Expired
    } else if is_expiring_soon(end_date, now) {
        ListingPhase::ExpiringSoon
    } else {
        ListingPhase::Active
    }
}

/// Inquiries per hundred views, 0 when there are no views.
pub fn conversion_rate(views: i64, inquiries: i64) -> f64 {
    if views > 0 {
        inquiries as f64 / views as f64 * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn plan_prices_and_durations() {
        assert_eq!(PlanType::Basic.price(), Money::from(500));
        assert_eq!(PlanType::Featured.duration_days(), 30);
        assert_eq!(PlanType::Premium.duration_days(), 90);
        assert_eq!(plan_catalog().len(), 3);
    }

    #[test]
    fn plan_parse_rejects_unknown() {
        assert_eq!("featured".parse::<PlanType>().unwrap(), PlanType::Featured);
        assert!("gold".parse::<PlanType>().is_err());
    }

    #[test]
    fn days_remaining_zero_in_past() {
        let now = Utc::now();
        assert_eq!(days_remaining(now - Duration::days(1), now), 0);
        assert_eq!(days_remaining(now, now), 0);
    }

    #[test]
    fn days_remaining_counts_whole_days() {
        let now = Utc::now();
        assert_eq!(days_remaining(now + Duration::days(10), now), 10);
        assert_eq!(
            days_remaining(now + Duration::days(3) + Duration::hours(20), now),
            3
        );
    }

    #[test]
    fn expiring_soon_window() {
        let now = Utc::now();
        assert!(is_expiring_soon(now + Duration::days(7), now));
        assert!(is_expiring_soon(now + Duration::hours(2), now));
        assert!(!is_expiring_soon(now + Duration::days(8), now));
        assert!(!is_expiring_soon(now - Duration::hours(1), now));
    }

    #[test]
    fn phase_ordering() {
        let now = Utc::now();
        assert_eq!(phase(false, now + Duration::days(40), now), ListingPhase::Inactive);
        assert_eq!(phase(true, now - Duration::days(1), now), ListingPhase::Expired);
        assert_eq!(phase(true, now + Duration::days(2), now), ListingPhase::ExpiringSoon);
        assert_eq!(phase(true, now + Duration::days(20), now), ListingPhase::Active);
    }

    #[test]
    fn conversion_rate_handles_zero_views() {
        assert_eq!(conversion_rate(0, 5), 0.0);
        assert_eq!(conversion_rate(200, 5), 2.5);
    }

    #[test]
    fn payment_status_validation() {
        assert!(validate_payment_status("completed").is_ok());
        assert!(validate_payment_status("settled").is_err());
    }
}
