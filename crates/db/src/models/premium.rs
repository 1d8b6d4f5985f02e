//! Premium listing and related models.

use estate_core::premium::{self, ListingPhase};
use estate_core::sweep::SweepCandidate;
use estate_core::types::{DbId, Money, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `premium_listings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PremiumListing {
    pub id: DbId,
    pub property_id: DbId,
    pub user_id: DbId,
    pub plan_type: String,
    pub amount_paid: Money,
    pub payment_id: String,
    pub payment_method: String,
    pub payment_status: String,
    pub payment_reference: Option<String>,
    pub payment_details: serde_json::Value,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub is_active: bool,
    pub reminder_sent_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PremiumListing {
    pub fn days_remaining(&self, now: Timestamp) -> i64 {
        premium::days_remaining(self.end_date, now)
    }

    pub fn phase(&self, now: Timestamp) -> ListingPhase {
        premium::phase(self.is_active, self.end_date, now)
    }

    pub fn sweep_candidate(&self) -> SweepCandidate {
        SweepCandidate {
            listing_id: self.id,
            end_date: self.end_date,
            is_active: self.is_active,
            reminder_sent_at: self.reminder_sent_at,
        }
    }
}

/// Listing with its derived lifecycle values, as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct PremiumListingView {
    #[serde(flatten)]
    pub listing: PremiumListing,
    pub days_remaining: i64,
    pub is_expired: bool,
    pub is_expiring_soon: bool,
    pub phase: ListingPhase,
}

impl PremiumListingView {
    pub fn new(listing: PremiumListing, now: Timestamp) -> Self {
        Self {
            days_remaining: listing.days_remaining(now),
            is_expired: premium::is_expired(listing.end_date, now),
            is_expiring_soon: listing.is_active && premium::is_expiring_soon(listing.end_date, now),
            phase: listing.phase(now),
            listing,
        }
    }
}

/// DTO for activating a listing after payment or by an administrator.
///
/// Inserting over an existing row for the same property re-activates it.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivatePremiumListing {
    pub property_id: DbId,
    pub user_id: DbId,
    pub plan_type: String,
    pub amount_paid: Money,
    pub payment_id: String,
    pub payment_method: String,
    pub payment_reference: Option<String>,
    pub payment_details: serde_json::Value,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
}

/// Admin patch of a listing. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePremiumListing {
    pub plan_type: Option<String>,
    pub payment_status: Option<String>,
    pub end_date: Option<Timestamp>,
    pub is_active: Option<bool>,
}

/// Listing joined with the data needed to email its owner.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PremiumNoticeTarget {
    pub listing_id: DbId,
    pub property_id: DbId,
    pub property_title: String,
    pub plan_type: String,
    pub end_date: Timestamp,
    pub user_id: DbId,
    pub username: String,
    pub email: String,
}

/// Aggregate counts for the sweep summary and dashboards.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct PremiumCounts {
    pub active: i64,
    pub inactive: i64,
    pub expiring_soon: i64,
}

/// Per-property engagement for the premium analytics page.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PremiumPropertyStats {
    pub property_id: DbId,
    pub title: String,
    pub plan_type: String,
    pub end_date: Timestamp,
    pub views: i64,
    pub inquiries: i64,
}

impl PremiumPropertyStats {
    pub fn conversion_rate(&self) -> f64 {
        premium::conversion_rate(self.views, self.inquiries)
    }
}
