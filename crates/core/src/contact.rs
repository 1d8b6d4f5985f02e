//! Contact inquiry rules.

use crate::error::CoreError;

pub const INQUIRY_GENERAL: &str = "general";
pub const INQUIRY_PROPERTY: &str = "property";

pub const VALID_INQUIRY_TYPES: &[&str] = &[
    INQUIRY_GENERAL,
    INQUIRY_PROPERTY,
    "support",
    "partnership",
    "complaint",
];

pub const MAX_NAME_LENGTH: usize = 255;
pub const MAX_SUBJECT_LENGTH: usize = 255;
pub const MAX_PHONE_LENGTH: usize = 20;

/// Resolve the inquiry type of a submission.
///
/// Missing means `general`, except that an inquiry naming a property defaults
/// to `property`.
pub fn resolve_inquiry_type(
    inquiry_type: Option<&str>,
    has_property: bool,
) -> Result<&str, CoreError> {
    match inquiry_type.map(str::trim).filter(|s| !s.is_empty()) {
        None if has_property => Ok(INQUIRY_PROPERTY),
        None => Ok(INQUIRY_GENERAL),
        Some(t) if VALID_INQUIRY_TYPES.contains(&t) => Ok(t),
        Some(t) => Err(CoreError::Validation(format!(
            "Invalid inquiry type '{t}'. Must be one of: {}",
            VALID_INQUIRY_TYPES.join(", ")
        ))),
    }
}

/// Required free-text fields must contain something besides whitespace.
pub fn require_text(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        Err(CoreError::Validation(format!("{field} is required")))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inquiry_type_defaults() {
        assert_eq!(resolve_inquiry_type(None, false).unwrap(), "general");
        assert_eq!(resolve_inquiry_type(None, true).unwrap(), "property");
        assert_eq!(resolve_inquiry_type(Some("complaint"), true).unwrap(), "complaint");
    }

    #[test]
    fn unknown_inquiry_type_rejected() {
        let err = resolve_inquiry_type(Some("sales"), false).unwrap_err();
        assert!(err.to_string().contains("Must be one of"));
    }

    #[test]
    fn blank_text_rejected() {
        assert!(require_text("message", "  \n").is_err());
        assert!(require_text("message", "Is the flat still available?").is_ok());
    }
}
