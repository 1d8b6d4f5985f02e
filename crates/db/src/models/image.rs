//! Property image model, moderation columns and statistics.

use std::str::FromStr;

use estate_core::error::CoreError;
use estate_core::fake_image::ImageSignals;
use estate_core::moderation::{ImageStatus, ModerationState};
use estate_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `images` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Image {
    pub id: DbId,
    pub property_id: DbId,
    pub file_path: String,
    pub caption: Option<String>,
    pub status: String,
    pub content_hash: Option<String>,
    pub is_duplicate: bool,
    pub duplicate_of: Option<DbId>,
    pub file_size: Option<i64>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub moderated_by: Option<DbId>,
    pub moderated_at: Option<Timestamp>,
    pub moderation_notes: Option<String>,
    pub flagged_at: Option<Timestamp>,
    pub flag_reason: Option<String>,
    pub deleted_at: Option<Timestamp>,
    pub deleted_by: Option<DbId>,
    pub deletion_reason: Option<String>,
    pub status_before_delete: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Image {
    pub fn image_status(&self) -> Result<ImageStatus, CoreError> {
        ImageStatus::from_str(&self.status)
    }

    /// The moderation columns as a state-machine value.
    pub fn moderation_state(&self) -> Result<ModerationState, CoreError> {
        Ok(ModerationState {
            status: self.image_status()?,
            moderated_by: self.moderated_by,
            moderated_at: self.moderated_at,
            moderation_notes: self.moderation_notes.clone(),
            flagged_at: self.flagged_at,
            flag_reason: self.flag_reason.clone(),
            deleted_at: self.deleted_at,
            deleted_by: self.deleted_by,
            deletion_reason: self.deletion_reason.clone(),
            status_before_delete: self
                .status_before_delete
                .as_deref()
                .map(ImageStatus::from_str)
                .transpose()?,
        })
    }

    /// Inputs to the fake-image heuristic.
    pub fn signals(&self) -> Result<ImageSignals, CoreError> {
        Ok(ImageSignals {
            file_size: self.file_size,
            width: self.width,
            height: self.height,
            is_duplicate: self.is_duplicate,
            status: self.image_status()?,
        })
    }
}

/// DTO for inserting an uploaded image.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateImage {
    pub property_id: DbId,
    pub file_path: String,
    pub caption: Option<String>,
    pub content_hash: Option<String>,
    pub is_duplicate: bool,
    pub duplicate_of: Option<DbId>,
    pub file_size: Option<i64>,
    pub width: Option<i32>,
    pub height: Option<i32>,
}

/// Image row joined with its property for the review queue.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ImageWithProperty {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub image: Image,
    pub property_title: String,
    pub owner_id: DbId,
}

/// Counts and sizes across all images.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct ImageStats {
    pub total_images: i64,
    pub pending_images: i64,
    pub approved_images: i64,
    pub rejected_images: i64,
    pub flagged_images: i64,
    pub deleted_images: i64,
    pub duplicate_images: i64,
    pub total_file_size: i64,
    pub average_file_size: i64,
}

impl ImageStats {
    /// Share of all images in a given count, as a percentage.
    pub fn percent(&self, count: i64) -> f64 {
        if self.total_images == 0 {
            0.0
        } else {
            count as f64 / self.total_images as f64 * 100.0
        }
    }
}
