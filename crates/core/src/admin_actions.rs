//! Admin bulk actions.
//!
//! Every action the admin panel can run over a selection of rows is listed in
//! [`ADMIN_ACTIONS`]. Requests name an action by identifier; the API looks the
//! identifier up here and dispatches on the resulting [`AdminAction`].

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::CoreError;

/// The table a bulk action operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminTarget {
    Properties,
    PremiumListings,
    Images,
    Inquiries,
    BlogPosts,
    Users,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminAction {
    // Properties
    MarkVerified,
    MarkPremium,
    RemovePremium,
    BulkUpdateStatus,
    CreateBulkPremium,
    // Premium listings
    ActivatePremium,
    DeactivatePremium,
    ExtendPremium,
    // Images
    ApproveImages,
    RejectImages,
    FlagImages,
    DeleteImages,
    RestoreImages,
    // Inquiries
    MarkResolved,
    MarkUnresolved,
    // Blog posts
    PublishPosts,
    UnpublishPosts,
    ResetViewCounts,
    // Users
    ActivateUsers,
    DeactivateUsers,
    MakeBrokers,
    MakeBuyers,
}

/// One row of the command table.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AdminActionSpec {
    pub name: &'static str,
    pub action: AdminAction,
    pub target: AdminTarget,
    pub description: &'static str,
    /// Whether the request must carry a `status` value.
    pub requires_status: bool,
}

const fn spec(
    name: &'static str,
    action: AdminAction,
    target: AdminTarget,
    description: &'static str,
) -> AdminActionSpec {
    AdminActionSpec {
        name,
        action,
        target,
        description,
        requires_status: false,
    }
}

pub const ADMIN_ACTIONS: &[AdminActionSpec] = &[
    spec("mark_verified", AdminAction::MarkVerified, AdminTarget::Properties, "Mark selected properties as verified"),
    spec("mark_premium", AdminAction::MarkPremium, AdminTarget::Properties, "Mark selected properties as premium"),
    spec("remove_premium", AdminAction::RemovePremium, AdminTarget::Properties, "Remove premium status from selected properties"),
    AdminActionSpec {
        requires_status: true,
        ..spec("bulk_update_status", AdminAction::BulkUpdateStatus, AdminTarget::Properties, "Bulk update property status")
    },
    spec("create_bulk_premium", AdminAction::CreateBulkPremium, AdminTarget::Properties, "Create basic premium listings for selected properties"),
    spec("activate_premium", AdminAction::ActivatePremium, AdminTarget::PremiumListings, "Activate selected premium listings"),
    spec("deactivate_premium", AdminAction::DeactivatePremium, AdminTarget::PremiumListings, "Deactivate selected premium listings"),
    spec("extend_premium", AdminAction::ExtendPremium, AdminTarget::PremiumListings, "Extend premium period (30 days)"),
    spec("approve_images", AdminAction::ApproveImages, AdminTarget::Images, "Approve selected images"),
    spec("reject_images", AdminAction::RejectImages, AdminTarget::Images, "Reject selected images"),
    spec("flag_images", AdminAction::FlagImages, AdminTarget::Images, "Flag selected images for review"),
    spec("delete_images", AdminAction::DeleteImages, AdminTarget::Images, "Soft-delete selected images"),
    spec("restore_images", AdminAction::RestoreImages, AdminTarget::Images, "Restore selected deleted images"),
    spec("mark_resolved", AdminAction::MarkResolved, AdminTarget::Inquiries, "Mark selected inquiries as resolved"),
    spec("mark_unresolved", AdminAction::MarkUnresolved, AdminTarget::Inquiries, "Mark selected inquiries as unresolved"),
    spec("publish_posts", AdminAction::PublishPosts, AdminTarget::BlogPosts, "Publish selected posts"),
    spec("unpublish_posts", AdminAction::UnpublishPosts, AdminTarget::BlogPosts, "Unpublish selected posts"),
    spec("reset_view_counts", AdminAction::ResetViewCounts, AdminTarget::BlogPosts, "Reset view counts for selected posts"),
    spec("activate_users", AdminAction::ActivateUsers, AdminTarget::Users, "Activate selected users"),
    spec("deactivate_users", AdminAction::DeactivateUsers, AdminTarget::Users, "Deactivate selected users"),
    spec("make_brokers", AdminAction::MakeBrokers, AdminTarget::Users, "Change selected users to brokers"),
    spec("make_buyers", AdminAction::MakeBuyers, AdminTarget::Users, "Change selected users to buyers"),
];

/// Maximum number of ids accepted in one bulk request.
pub const MAX_BULK_IDS: usize = 500;

impl AdminAction {
    pub fn spec(self) -> &'static AdminActionSpec {
        ADMIN_ACTIONS
            .iter()
            .find(|s| s.action == self)
            .unwrap_or(&ADMIN_ACTIONS[0])
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn target(self) -> AdminTarget {
        self.spec().target
    }
}

impl fmt::Display for AdminAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AdminAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ADMIN_ACTIONS
            .iter()
            .find(|spec| spec.name == s)
            .map(|spec| spec.action)
            .ok_or_else(|| CoreError::Validation(format!("Unknown admin action '{s}'")))
    }
}

/// Check the id selection of a bulk request.
pub fn validate_selection(ids: &[i64]) -> Result<(), CoreError> {
    if ids.is_empty() {
        return Err(CoreError::Validation("No items selected".into()));
    }
    if ids.len() > MAX_BULK_IDS {
        return Err(CoreError::Validation(format!(
            "At most {MAX_BULK_IDS} items can be processed at once"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn every_action_has_exactly_one_row() {
        let names: HashSet<_> = ADMIN_ACTIONS.iter().map(|s| s.name).collect();
        let actions: HashSet<_> = ADMIN_ACTIONS.iter().map(|s| s.action).collect();
        assert_eq!(names.len(), ADMIN_ACTIONS.len());
        assert_eq!(actions.len(), ADMIN_ACTIONS.len());
    }

    #[test]
    fn names_round_trip() {
        for spec in ADMIN_ACTIONS {
            let parsed: AdminAction = spec.name.parse().unwrap();
            assert_eq!(parsed, spec.action);
            assert_eq!(parsed.name(), spec.name);
        }
    }

    #[test]
    fn unknown_action_is_validation_error() {
        assert!("drop_tables".parse::<AdminAction>().is_err());
    }

    #[test]
    fn only_bulk_status_requires_status() {
        let needing: Vec<_> = ADMIN_ACTIONS
            .iter()
            .filter(|s| s.requires_status)
            .map(|s| s.name)
            .collect();
        assert_eq!(needing, vec!["bulk_update_status"]);
    }

    #[test]
    fn targets() {
        assert_eq!(AdminAction::ExtendPremium.target(), AdminTarget::PremiumListings);
        assert_eq!(AdminAction::CreateBulkPremium.target(), AdminTarget::Properties);
    }

    #[test]
    fn selection_limits() {
        assert!(validate_selection(&[]).is_err());
        assert!(validate_selection(&[1, 2]).is_ok());
        assert!(validate_selection(&vec![1; MAX_BULK_IDS + 1]).is_err());
    }
}
