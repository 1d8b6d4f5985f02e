//! Image moderation state machine.
//!
//! An image starts `pending` and moves between `approved`, `rejected`,
//! `flagged` and `deleted` through [`ModerationAction`]s. Every transition
//! stamps the acting user (or `None` for the automated scanner) and a
//! timestamp. `restore` always lands on `approved`; the status held before
//! deletion is kept in [`ModerationState::status_before_delete`] for audit.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_APPROVED: &str = "approved";
pub const STATUS_REJECTED: &str = "rejected";
pub const STATUS_FLAGGED: &str = "flagged";
pub const STATUS_DELETED: &str = "deleted";

pub const VALID_IMAGE_STATUSES: &[&str] = &[
    STATUS_PENDING,
    STATUS_APPROVED,
    STATUS_REJECTED,
    STATUS_FLAGGED,
    STATUS_DELETED,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageStatus {
    Pending,
    Approved,
    Rejected,
    Flagged,
    Deleted,
}

impl ImageStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageStatus::Pending => STATUS_PENDING,
            ImageStatus::Approved => STATUS_APPROVED,
            ImageStatus::Rejected => STATUS_REJECTED,
            ImageStatus::Flagged => STATUS_FLAGGED,
            ImageStatus::Deleted => STATUS_DELETED,
        }
    }
}

impl fmt::Display for ImageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STATUS_PENDING => Ok(ImageStatus::Pending),
            STATUS_APPROVED => Ok(ImageStatus::Approved),
            STATUS_REJECTED => Ok(ImageStatus::Rejected),
            STATUS_FLAGGED => Ok(ImageStatus::Flagged),
            STATUS_DELETED => Ok(ImageStatus::Deleted),
            other => Err(CoreError::Validation(format!(
                "Invalid image status '{other}'. Must be one of: {}",
                VALID_IMAGE_STATUSES.join(", ")
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// A requested moderation transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModerationAction {
    Approve,
    Reject { reason: Option<String> },
    Flag { reason: Option<String> },
    SoftDelete { reason: Option<String> },
    Restore,
}

impl ModerationAction {
    /// Past-tense verb used in owner notifications ("approved", "flagged", ...).
    pub fn past_tense(&self) -> &'static str {
        match self {
            ModerationAction::Approve => "approved",
            ModerationAction::Reject { .. } => "rejected",
            ModerationAction::Flag { .. } => "flagged",
            ModerationAction::SoftDelete { .. } => "deleted",
            ModerationAction::Restore => "restored",
        }
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// The moderation columns of an image row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModerationState {
    pub status: ImageStatus,
    pub moderated_by: Option<DbId>,
    pub moderated_at: Option<Timestamp>,
    pub moderation_notes: Option<String>,
    pub flagged_at: Option<Timestamp>,
    pub flag_reason: Option<String>,
    pub deleted_at: Option<Timestamp>,
    pub deleted_by: Option<DbId>,
    pub deletion_reason: Option<String>,
    pub status_before_delete: Option<ImageStatus>,
}

impl Default for ModerationState {
    fn default() -> Self {
        Self {
            status: ImageStatus::Pending,
            moderated_by: None,
            moderated_at: None,
            moderation_notes: None,
            flagged_at: None,
            flag_reason: None,
            deleted_at: None,
            deleted_by: None,
            deletion_reason: None,
            status_before_delete: None,
        }
    }
}

impl ModerationState {
    /// Apply `action` and return the resulting state.
    ///
    /// Fails with [`CoreError::Conflict`] when approving a deleted image
    /// (restore it first) or restoring an image that is not deleted.
    pub fn apply(
        &self,
        action: &ModerationAction,
        actor: Option<DbId>,
        now: Timestamp,
    ) -> Result<ModerationState, CoreError> {
        let mut next = self.clone();

        match action {
            ModerationAction::Approve => {
                if self.status == ImageStatus::Deleted {
                    return Err(CoreError::Conflict(
                        "Deleted images must be restored before approval".into(),
                    ));
                }
                next.status = ImageStatus::Approved;
                next.moderated_by = actor;
                next.moderated_at = Some(now);
            }
            ModerationAction::Reject { reason } => {
                next.status = ImageStatus::Rejected;
                next.moderated_by = actor;
                next.moderated_at = Some(now);
                next.moderation_notes = reason.clone();
            }
            ModerationAction::Flag { reason } => {
                next.status = ImageStatus::Flagged;
                next.moderated_by = actor;
                next.moderated_at = Some(now);
                next.flagged_at = Some(now);
                next.flag_reason = reason.clone();
            }
            ModerationAction::SoftDelete { reason } => {
                if self.status != ImageStatus::Deleted {
                    next.status_before_delete = Some(self.status);
                }
                next.status = ImageStatus::Deleted;
                next.deleted_at = Some(now);
                next.deleted_by = actor;
                next.deletion_reason = reason.clone();
            }
            ModerationAction::Restore => {
                if self.status != ImageStatus::Deleted {
                    return Err(CoreError::Conflict(format!(
                        "Only deleted images can be restored (current status: {})",
                        self.status
                    )));
                }
                next.status = ImageStatus::Approved;
                next.moderated_by = actor;
                next.moderated_at = Some(now);
                next.deleted_at = None;
                next.deleted_by = None;
                next.deletion_reason = None;
            }
        }

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};

    use super::*;

    fn flag(reason: &str) -> ModerationAction {
        ModerationAction::Flag {
            reason: Some(reason.to_string()),
        }
    }

    #[test]
    fn status_round_trips_through_str() {
        for s in VALID_IMAGE_STATUSES {
            assert_eq!(s.parse::<ImageStatus>().unwrap().as_str(), *s);
        }
        assert!("archived".parse::<ImageStatus>().is_err());
    }

    #[test]
    fn approve_from_pending_flagged_rejected() {
        let now = Utc::now();
        for start in [
            ImageStatus::Pending,
            ImageStatus::Flagged,
            ImageStatus::Rejected,
        ] {
            let state = ModerationState {
                status: start,
                ..Default::default()
            };
            let next = state.apply(&ModerationAction::Approve, Some(7), now).unwrap();
            assert_eq!(next.status, ImageStatus::Approved);
            assert_eq!(next.moderated_by, Some(7));
            assert_eq!(next.moderated_at, Some(now));
        }
    }

    #[test]
    fn approve_deleted_is_conflict() {
        let state = ModerationState {
            status: ImageStatus::Deleted,
            ..Default::default()
        };
        assert_matches!(
            state.apply(&ModerationAction::Approve, Some(1), Utc::now()),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn reject_records_notes() {
        let next = ModerationState::default()
            .apply(
                &ModerationAction::Reject {
                    reason: Some("blurry".into()),
                },
                Some(2),
                Utc::now(),
            )
            .unwrap();
        assert_eq!(next.status, ImageStatus::Rejected);
        assert_eq!(next.moderation_notes.as_deref(), Some("blurry"));
    }

    #[test]
    fn flag_approve_flag_is_idempotent_on_state_only() {
        let t1 = Utc::now();
        let t2 = t1 + Duration::minutes(5);
        let t3 = t2 + Duration::minutes(5);

        let flagged = ModerationState::default()
            .apply(&flag("tiny"), None, t1)
            .unwrap();
        let approved = flagged.apply(&ModerationAction::Approve, Some(3), t2).unwrap();
        let reflagged = approved.apply(&flag("tiny"), None, t3).unwrap();

        assert_eq!(flagged.status, reflagged.status);
        assert_eq!(flagged.flag_reason, reflagged.flag_reason);
        assert_eq!(flagged.flagged_at, Some(t1));
        assert_eq!(reflagged.flagged_at, Some(t3));
        assert_eq!(reflagged.moderated_at, Some(t3));
        assert_ne!(flagged, reflagged);
    }

    #[test]
    fn delete_then_restore_lands_on_approved_from_any_status() {
        let now = Utc::now();
        for start in [
            ImageStatus::Pending,
            ImageStatus::Approved,
            ImageStatus::Rejected,
            ImageStatus::Flagged,
        ] {
            let state = ModerationState {
                status: start,
                ..Default::default()
            };
            let deleted = state
                .apply(
                    &ModerationAction::SoftDelete {
                        reason: Some("spam".into()),
                    },
                    Some(9),
                    now,
                )
                .unwrap();
            assert_eq!(deleted.status, ImageStatus::Deleted);
            assert_eq!(deleted.status_before_delete, Some(start));
            assert_eq!(deleted.deleted_by, Some(9));

            let restored = deleted.apply(&ModerationAction::Restore, Some(9), now).unwrap();
            assert_eq!(restored.status, ImageStatus::Approved);
            assert_eq!(restored.status_before_delete, Some(start));
            assert!(restored.deleted_at.is_none());
            assert!(restored.deletion_reason.is_none());
        }
    }

    #[test]
    fn deleting_twice_keeps_original_prior_status() {
        let now = Utc::now();
        let state = ModerationState {
            status: ImageStatus::Flagged,
            ..Default::default()
        };
        let action = ModerationAction::SoftDelete { reason: None };
        let twice = state
            .apply(&action, None, now)
            .and_then(|s| s.apply(&action, None, now))
            .unwrap();
        assert_eq!(twice.status_before_delete, Some(ImageStatus::Flagged));
    }

    #[test]
    fn restore_non_deleted_is_conflict() {
        assert_matches!(
            ModerationState::default().apply(&ModerationAction::Restore, None, Utc::now()),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn flag_and_reject_reach_from_deleted() {
        let deleted = ModerationState {
            status: ImageStatus::Deleted,
            ..Default::default()
        };
        let now = Utc::now();
        assert_eq!(
            deleted.apply(&flag("x"), None, now).unwrap().status,
            ImageStatus::Flagged
        );
        assert_eq!(
            deleted
                .apply(&ModerationAction::Reject { reason: None }, None, now)
                .unwrap()
                .status,
            ImageStatus::Rejected
        );
    }
}
