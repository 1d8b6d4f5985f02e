//! Refresh sessions behind the rotating refresh token.

use estate_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// One issued refresh token. Rotation revokes the row and points
/// `replaced_by` at its successor.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshSession {
    pub id: DbId,
    pub user_id: DbId,
    pub token_hash: String,
    pub expires_at: Timestamp,
    pub is_revoked: bool,
    pub replaced_by: Option<DbId>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl RefreshSession {
    /// Usable for a refresh at `now`.
    pub fn is_live(&self, now: Timestamp) -> bool {
        !self.is_revoked && self.expires_at > now
    }

    /// A token that was already rotated away is being presented again.
    pub fn is_reused(&self) -> bool {
        self.is_revoked && self.replaced_by.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct NewRefreshSession {
    pub user_id: DbId,
    pub token_hash: String,
    pub expires_at: Timestamp,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn session(expires_in: Duration, revoked: bool, replaced_by: Option<DbId>) -> RefreshSession {
        let now = Utc::now();
        RefreshSession {
            id: 1,
            user_id: 2,
            token_hash: "h".into(),
            expires_at: now + expires_in,
            is_revoked: revoked,
            replaced_by,
            user_agent: None,
            ip_address: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn liveness_needs_unrevoked_and_unexpired() {
        let now = Utc::now();
        assert!(session(Duration::days(1), false, None).is_live(now));
        assert!(!session(Duration::days(-1), false, None).is_live(now));
        assert!(!session(Duration::days(1), true, None).is_live(now));
    }

    #[test]
    fn only_rotated_tokens_count_as_reuse() {
        assert!(session(Duration::days(1), true, Some(9)).is_reused());
        assert!(!session(Duration::days(1), true, None).is_reused());
        assert!(!session(Duration::days(1), false, None).is_reused());
    }
}
