//! Batch image scans: exact duplicates and the fake-image heuristic.

use chrono::Utc;
use estate_core::duplicates::group_duplicates;
use estate_core::fake_image::{assess, ImageSignals, SuspicionReport};
use estate_core::moderation::{ImageStatus, ModerationAction, ModerationState};
use estate_core::types::{DbId, Timestamp};
use estate_db::repositories::ImageRepo;
use estate_db::DbPool;
use serde::Serialize;

#[derive(Debug, Default, Serialize)]
pub struct DuplicateReport {
    pub dry_run: bool,
    pub scanned: usize,
    pub duplicates: usize,
    pub updated: u64,
}

/// Group images by content hash and mark every non-master member.
pub async fn detect_duplicates(pool: &DbPool, dry_run: bool) -> anyhow::Result<DuplicateReport> {
    let hashes = ImageRepo::list_hashes(pool).await?;
    let marks = group_duplicates(&hashes);

    let updated = if dry_run || marks.is_empty() {
        0
    } else {
        ImageRepo::apply_duplicate_marks(pool, &marks).await?
    };

    for mark in marks.iter().take(20) {
        tracing::debug!(image_id = mark.image_id, master_id = mark.master_id, "Duplicate image");
    }
    tracing::info!(
        scanned = hashes.len(),
        duplicates = marks.len(),
        updated,
        dry_run,
        "Duplicate detection finished"
    );

    Ok(DuplicateReport {
        dry_run,
        scanned: hashes.len(),
        duplicates: marks.len(),
        updated,
    })
}

/// An image the heuristic wants flagged, with the state to store.
#[derive(Debug)]
pub struct FakeFlag {
    pub image_id: DbId,
    pub report: SuspicionReport,
    pub next: ModerationState,
}

/// Run the heuristic over `(id, signals, state)` rows and plan a flag for
/// each suspected image that is still pending or approved.
pub fn plan_fake_flags<I>(images: I, now: Timestamp) -> Vec<FakeFlag>
where
    I: IntoIterator<Item = (DbId, ImageSignals, ModerationState)>,
{
    images
        .into_iter()
        .filter(|(_, signals, _)| {
            matches!(signals.status, ImageStatus::Pending | ImageStatus::Approved)
        })
        .filter_map(|(image_id, signals, state)| {
            let report = assess(&signals);
            if !report.suspected {
                return None;
            }
            let action = ModerationAction::Flag {
                reason: Some(report.flag_reason()),
            };
            match state.apply(&action, None, now) {
                Ok(next) => Some(FakeFlag {
                    image_id,
                    report,
                    next,
                }),
                Err(e) => {
                    tracing::warn!(image_id, error = %e, "Cannot flag image");
                    None
                }
            }
        })
        .collect()
}

#[derive(Debug, Default, Serialize)]
pub struct FakeImageReport {
    pub dry_run: bool,
    pub scanned: usize,
    pub suspected: usize,
    pub flagged: usize,
}

/// Flag images the heuristic suspects. Rows with unreadable moderation
/// columns are skipped.
pub async fn detect_fake_images(
    pool: &DbPool,
    limit: Option<i64>,
    dry_run: bool,
) -> anyhow::Result<FakeImageReport> {
    let images = ImageRepo::list_scannable(pool, limit).await?;
    let scanned = images.len();

    let rows = images.iter().filter_map(|img| {
        match (img.signals(), img.moderation_state()) {
            (Ok(signals), Ok(state)) => Some((img.id, signals, state)),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(image_id = img.id, error = %e, "Skipping image");
                None
            }
        }
    });
    let flags = plan_fake_flags(rows, Utc::now());

    let mut flagged = 0;
    for flag in &flags {
        tracing::info!(
            image_id = flag.image_id,
            reasons = ?flag.report.reasons,
            dry_run,
            "Suspected fake image"
        );
        if dry_run {
            continue;
        }
        if ImageRepo::save_moderation(pool, flag.image_id, &flag.next)
            .await?
            .is_some()
        {
            flagged += 1;
        }
    }

    tracing::info!(scanned, suspected = flags.len(), flagged, dry_run, "Fake image scan finished");
    Ok(FakeImageReport {
        dry_run,
        scanned,
        suspected: flags.len(),
        flagged,
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn signals(size: i64, width: i32, duplicate: bool, status: ImageStatus) -> ImageSignals {
        ImageSignals {
            file_size: Some(size),
            width: Some(width),
            height: Some(600),
            is_duplicate: duplicate,
            status,
        }
    }

    fn state(status: ImageStatus) -> ModerationState {
        ModerationState {
            status,
            ..ModerationState::default()
        }
    }

    #[test]
    fn two_indicators_are_flagged_with_reasons() {
        let now = Utc.with_ymd_and_hms(2025, 2, 1, 8, 0, 0).unwrap();
        let rows = vec![
            (1, signals(2_000, 120, false, ImageStatus::Approved), state(ImageStatus::Approved)),
            (2, signals(2_000, 800, false, ImageStatus::Approved), state(ImageStatus::Approved)),
            (3, signals(500_000, 800, true, ImageStatus::Pending), state(ImageStatus::Pending)),
        ];

        let flags = plan_fake_flags(rows, now);
        assert_eq!(flags.len(), 1);
        let flag = &flags[0];
        assert_eq!(flag.image_id, 1);
        assert_eq!(flag.next.status, ImageStatus::Flagged);
        assert_eq!(flag.next.flagged_at, Some(now));
        assert_eq!(
            flag.next.flag_reason.as_deref(),
            Some("Automated detection: File size too small, Image dimensions too small")
        );
    }

    #[test]
    fn reviewed_images_are_left_alone() {
        let now = Utc.with_ymd_and_hms(2025, 2, 1, 8, 0, 0).unwrap();
        let rows = vec![
            (4, signals(2_000, 120, true, ImageStatus::Flagged), state(ImageStatus::Flagged)),
            (5, signals(2_000, 120, false, ImageStatus::Rejected), state(ImageStatus::Rejected)),
        ];
        assert!(plan_fake_flags(rows, now).is_empty());
    }
}
