//! Role names carried in access tokens and user type values stored on users.
//!
//! Superusers get [`ROLE_ADMIN`]; everyone else gets their `user_type`.

use crate::error::CoreError;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_BROKER: &str = "broker";
pub const ROLE_BUYER: &str = "buyer";

/// Values accepted for `users.user_type`.
pub const VALID_USER_TYPES: &[&str] = &[ROLE_BROKER, ROLE_BUYER];

/// Validate a registration or profile `user_type`.
pub fn validate_user_type(user_type: &str) -> Result<(), CoreError> {
    if VALID_USER_TYPES.contains(&user_type) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid user type '{user_type}'. Must be one of: {}",
            VALID_USER_TYPES.join(", ")
        )))
    }
}

/// Resolve the role embedded in a token for a user row.
pub fn role_for(is_superuser: bool, user_type: &str) -> &str {
    if is_superuser {
        ROLE_ADMIN
    } else {
        user_type
    }
}

/// Whether a role may create property listings.
pub fn can_list_properties(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_BROKER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broker_and_buyer_are_valid() {
        assert!(validate_user_type("broker").is_ok());
        assert!(validate_user_type("buyer").is_ok());
    }

    #[test]
    fn unknown_user_type_rejected() {
        let err = validate_user_type("landlord").unwrap_err();
        assert!(err.to_string().contains("Must be one of"));
    }

    #[test]
    fn superuser_maps_to_admin() {
        assert_eq!(role_for(true, "buyer"), ROLE_ADMIN);
        assert_eq!(role_for(false, "buyer"), ROLE_BUYER);
    }

    #[test]
    fn only_brokers_and_admins_list() {
        assert!(can_list_properties(ROLE_BROKER));
        assert!(can_list_properties(ROLE_ADMIN));
        assert!(!can_list_properties(ROLE_BUYER));
    }
}
