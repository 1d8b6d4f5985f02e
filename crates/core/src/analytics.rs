//! Analytics vocabularies: share platforms, shared content kinds and user
//! activity types.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Social shares
// ---------------------------------------------------------------------------

pub const VALID_SHARE_PLATFORMS: &[&str] = &[
    "facebook",
    "twitter",
    "linkedin",
    "whatsapp",
    "messenger",
    "email",
    "copy-link",
    "native-share",
    "other",
];

pub const CONTENT_PROPERTY: &str = "property";
pub const CONTENT_BLOG_POST: &str = "blog_post";
pub const CONTENT_OTHER: &str = "other";

pub const VALID_SHARE_CONTENT_TYPES: &[&str] =
    &[CONTENT_PROPERTY, CONTENT_BLOG_POST, "blog_list", "homepage", CONTENT_OTHER];

/// Maximum stored length of a shared page title.
pub const MAX_PAGE_TITLE_LENGTH: usize = 200;

pub fn validate_share_platform(platform: &str) -> Result<(), CoreError> {
    if VALID_SHARE_PLATFORMS.contains(&platform) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid share platform '{platform}'. Must be one of: {}",
            VALID_SHARE_PLATFORMS.join(", ")
        )))
    }
}

/// Normalise the optional content type of a share; missing means `other`.
pub fn resolve_share_content_type(content_type: Option<&str>) -> Result<&str, CoreError> {
    match content_type.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(CONTENT_OTHER),
        Some(ct) if VALID_SHARE_CONTENT_TYPES.contains(&ct) => Ok(ct),
        Some(ct) => Err(CoreError::Validation(format!(
            "Invalid content type '{ct}'. Must be one of: {}",
            VALID_SHARE_CONTENT_TYPES.join(", ")
        ))),
    }
}

/// Truncate a page title on a character boundary.
pub fn clip_page_title(title: &str) -> String {
    title.trim().chars().take(MAX_PAGE_TITLE_LENGTH).collect()
}

/// Share totals keyed by platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShareStats {
    pub total_shares: i64,
    pub platforms: BTreeMap<String, i64>,
}

impl ShareStats {
    /// Build from `(platform, count)` rows. Every known platform is present,
    /// zero when it had no shares.
    pub fn from_counts(rows: &[(String, i64)]) -> Self {
        let mut platforms: BTreeMap<String, i64> = VALID_SHARE_PLATFORMS
            .iter()
            .map(|p| (p.to_string(), 0))
            .collect();
        for (platform, count) in rows {
            *platforms.entry(platform.clone()).or_insert(0) += count;
        }
        Self {
            total_shares: platforms.values().sum(),
            platforms,
        }
    }
}

// ---------------------------------------------------------------------------
// User activity
// ---------------------------------------------------------------------------

pub const ACTIVITY_LOGIN: &str = "login";
pub const ACTIVITY_LOGOUT: &str = "logout";
pub const ACTIVITY_PROPERTY_VIEW: &str = "property_view";
pub const ACTIVITY_PROPERTY_CREATE: &str = "property_create";
pub const ACTIVITY_PROPERTY_UPDATE: &str = "property_update";
pub const ACTIVITY_PROPERTY_DELETE: &str = "property_delete";
pub const ACTIVITY_SEARCH: &str = "search";
pub const ACTIVITY_CONTACT: &str = "contact";
pub const ACTIVITY_PREMIUM_PURCHASE: &str = "premium_purchase";
pub const ACTIVITY_PROFILE_UPDATE: &str = "profile_update";

pub const VALID_ACTIVITY_TYPES: &[&str] = &[
    ACTIVITY_LOGIN,
    ACTIVITY_LOGOUT,
    ACTIVITY_PROPERTY_VIEW,
    ACTIVITY_PROPERTY_CREATE,
    ACTIVITY_PROPERTY_UPDATE,
    ACTIVITY_PROPERTY_DELETE,
    ACTIVITY_SEARCH,
    ACTIVITY_CONTACT,
    ACTIVITY_PREMIUM_PURCHASE,
    ACTIVITY_PROFILE_UPDATE,
];

pub fn validate_activity_type(activity_type: &str) -> Result<(), CoreError> {
    if VALID_ACTIVITY_TYPES.contains(&activity_type) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid activity type '{activity_type}'. Must be one of: {}",
            VALID_ACTIVITY_TYPES.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_validation() {
        assert!(validate_share_platform("whatsapp").is_ok());
        assert!(validate_share_platform("copy-link").is_ok());
        assert!(validate_share_platform("myspace").is_err());
    }

    #[test]
    fn content_type_defaults_to_other() {
        assert_eq!(resolve_share_content_type(None).unwrap(), "other");
        assert_eq!(resolve_share_content_type(Some(" ")).unwrap(), "other");
        assert_eq!(resolve_share_content_type(Some("blog_post")).unwrap(), "blog_post");
        assert!(resolve_share_content_type(Some("video")).is_err());
    }

    #[test]
    fn long_titles_are_clipped() {
        let title = "é".repeat(300);
        assert_eq!(clip_page_title(&title).chars().count(), MAX_PAGE_TITLE_LENGTH);
    }

    #[test]
    fn share_stats_fill_missing_platforms() {
        let stats = ShareStats::from_counts(&[("facebook".into(), 3), ("email".into(), 2)]);
        assert_eq!(stats.total_shares, 5);
        assert_eq!(stats.platforms["facebook"], 3);
        assert_eq!(stats.platforms["linkedin"], 0);
        assert_eq!(stats.platforms.len(), VALID_SHARE_PLATFORMS.len());
    }

    #[test]
    fn activity_types() {
        assert!(validate_activity_type(ACTIVITY_PREMIUM_PURCHASE).is_ok());
        assert!(validate_activity_type("download").is_err());
    }
}
