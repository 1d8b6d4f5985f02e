//! Upload validation and the fake-image heuristic.
//!
//! The heuristic looks only at stored metadata: an image is suspected when
//! at least [`MIN_INDICATORS`] of the four indicators hold. Unknown size or
//! dimensions count as "indicator does not hold".

use serde::Serialize;

use crate::error::CoreError;
use crate::moderation::ImageStatus;

/// Directory under the media root holding uploaded property images.
pub const IMAGE_DIR: &str = "property_images";

/// Uploads larger than this are rejected (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Accepted file extensions, lowercase, without the dot.
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Files below this size (10 KiB) are suspicious.
pub const MIN_FILE_SIZE_BYTES: i64 = 10 * 1024;

/// Images narrower or shorter than this are suspicious.
pub const MIN_DIMENSION_PX: i32 = 300;

/// Number of indicators that must hold for an image to be suspected.
pub const MIN_INDICATORS: usize = 2;

// ---------------------------------------------------------------------------
// Upload validation
// ---------------------------------------------------------------------------

/// Lowercased extension of `filename`, if it has one.
pub fn extension_of(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Check size and extension of an uploaded file, collecting every problem.
pub fn validate_upload(filename: &str, size: usize) -> Result<String, CoreError> {
    let mut errors = Vec::new();

    if size == 0 {
        errors.push("File is empty.".to_string());
    }
    if size > MAX_UPLOAD_BYTES {
        errors.push("File size too large. Maximum 10MB allowed.".to_string());
    }

    let ext = extension_of(filename);
    match ext.as_deref() {
        Some(e) if ALLOWED_EXTENSIONS.contains(&e) => {}
        _ => errors.push(format!(
            "File type not allowed. Allowed types: {}",
            ALLOWED_EXTENSIONS.join(", ")
        )),
    }

    if errors.is_empty() {
        Ok(ext.unwrap_or_default())
    } else {
        Err(CoreError::Validation(errors.join(" ")))
    }
}

// ---------------------------------------------------------------------------
// Heuristic
// ---------------------------------------------------------------------------

/// Metadata the heuristic inspects.
#[derive(Debug, Clone, Copy)]
pub struct ImageSignals {
    pub file_size: Option<i64>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub is_duplicate: bool,
    pub status: ImageStatus,
}

/// Outcome of running the heuristic over one image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuspicionReport {
    pub suspected: bool,
    pub reasons: Vec<&'static str>,
}

impl SuspicionReport {
    /// Reason line recorded as `flag_reason` by the automated scanner.
    pub fn flag_reason(&self) -> String {
        format!("Automated detection: {}", self.reasons.join(", "))
    }
}

/// Evaluate the four indicators and report which ones hold.
pub fn assess(signals: &ImageSignals) -> SuspicionReport {
    let mut reasons = Vec::new();

    if signals.file_size.is_some_and(|s| s < MIN_FILE_SIZE_BYTES) {
        reasons.push("File size too small");
    }
    let small_width = signals.width.is_some_and(|w| w < MIN_DIMENSION_PX);
    let small_height = signals.height.is_some_and(|h| h < MIN_DIMENSION_PX);
    if small_width || small_height {
        reasons.push("Image dimensions too small");
    }
    if signals.is_duplicate {
        reasons.push("Marked as duplicate");
    }
    if signals.status == ImageStatus::Flagged {
        reasons.push("Already flagged");
    }

    SuspicionReport {
        suspected: reasons.len() >= MIN_INDICATORS,
        reasons,
    }
}

/// `true` iff at least two indicators hold.
pub fn is_fake_suspected(signals: &ImageSignals) -> bool {
    assess(signals).suspected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(small: bool, tiny: bool, dup: bool, flagged: bool) -> ImageSignals {
        ImageSignals {
            file_size: Some(if small { 2_048 } else { 250_000 }),
            width: Some(if tiny { 120 } else { 1_024 }),
            height: Some(768),
            is_duplicate: dup,
            status: if flagged {
                ImageStatus::Flagged
            } else {
                ImageStatus::Approved
            },
        }
    }

    #[test]
    fn all_sixteen_indicator_combinations() {
        for mask in 0u8..16 {
            let bits = [mask & 1 != 0, mask & 2 != 0, mask & 4 != 0, mask & 8 != 0];
            let s = signals(bits[0], bits[1], bits[2], bits[3]);
            let held = bits.iter().filter(|b| **b).count();
            assert_eq!(is_fake_suspected(&s), held >= 2, "mask {mask:04b}");
            assert_eq!(assess(&s).reasons.len(), held, "mask {mask:04b}");
        }
    }

    #[test]
    fn unknown_metadata_does_not_count() {
        let s = ImageSignals {
            file_size: None,
            width: None,
            height: None,
            is_duplicate: true,
            status: ImageStatus::Pending,
        };
        assert!(!is_fake_suspected(&s));
    }

    #[test]
    fn small_height_alone_is_a_dimension_indicator() {
        let s = ImageSignals {
            file_size: Some(5_000),
            width: Some(1_200),
            height: Some(200),
            is_duplicate: false,
            status: ImageStatus::Pending,
        };
        let report = assess(&s);
        assert!(report.suspected);
        assert_eq!(
            report.flag_reason(),
            "Automated detection: File size too small, Image dimensions too small"
        );
    }

    #[test]
    fn upload_accepts_known_extensions_case_insensitively() {
        assert_eq!(validate_upload("Front.JPG", 50_000).unwrap(), "jpg");
        assert_eq!(validate_upload("plan.webp", 1).unwrap(), "webp");
    }

    #[test]
    fn upload_rejects_bad_extension_and_size_together() {
        let err = validate_upload("notes.pdf", MAX_UPLOAD_BYTES + 1).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Maximum 10MB"));
        assert!(msg.contains("File type not allowed"));
    }

    #[test]
    fn upload_without_extension_rejected() {
        assert!(validate_upload("photo", 100).is_err());
        assert!(validate_upload(".png", 100).is_err());
    }
}
