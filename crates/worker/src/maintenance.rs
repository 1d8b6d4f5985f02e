//! Housekeeping commands: legal page seeding, orphaned media cleanup and the
//! premium summary.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use estate_core::fake_image::IMAGE_DIR;
use estate_core::legal::DEFAULT_LEGAL_PAGES;
use estate_core::premium::UPCOMING_WINDOW_DAYS;
use estate_db::models::legal::UpsertLegalPage;
use estate_db::models::premium::{PremiumCounts, PremiumNoticeTarget};
use estate_db::repositories::{ImageRepo, LegalPageRepo, PremiumListingRepo};
use estate_db::DbPool;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Legal pages
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Serialize)]
pub struct SeedReport {
    pub created: Vec<&'static str>,
    pub existing: Vec<&'static str>,
}

/// Insert the built-in legal pages that are missing. Pages an admin has
/// already written are never overwritten.
pub async fn seed_legal_pages(pool: &DbPool) -> anyhow::Result<SeedReport> {
    let mut report = SeedReport::default();

    for page in DEFAULT_LEGAL_PAGES {
        if LegalPageRepo::find_by_slug(pool, page.slug).await?.is_some() {
            report.existing.push(page.slug);
            continue;
        }
        LegalPageRepo::upsert(
            pool,
            &UpsertLegalPage {
                slug: page.slug.to_string(),
                title: page.title.to_string(),
                content: page.content.to_string(),
            },
        )
        .await?;
        tracing::info!(slug = page.slug, "Legal page created");
        report.created.push(page.slug);
    }

    Ok(report)
}

// ---------------------------------------------------------------------------
// Orphaned files
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Serialize)]
pub struct CleanupReport {
    pub dry_run: bool,
    pub orphaned: Vec<String>,
    pub deleted: usize,
}

/// Files under `<media_root>/property_images`, as paths relative to the
/// media root. A missing directory yields an empty list.
pub async fn list_image_files(media_root: &Path) -> std::io::Result<Vec<String>> {
    let dir = media_root.join(IMAGE_DIR);
    let mut entries = match tokio::fs::read_dir(&dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            files.push(format!("{IMAGE_DIR}/{name}"));
        }
    }
    files.sort();
    Ok(files)
}

/// Files no image row points at.
pub fn orphaned_files(files: Vec<String>, referenced: &HashSet<String>) -> Vec<String> {
    files
        .into_iter()
        .filter(|f| !referenced.contains(f))
        .collect()
}

/// Remove `orphans` from disk, returning how many were deleted. Failures
/// are logged per file.
pub async fn delete_files(media_root: &Path, orphans: &[String]) -> usize {
    let mut deleted = 0;
    for relative in orphans {
        let path: PathBuf = media_root.join(relative);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(file = %relative, "Orphaned file deleted");
                deleted += 1;
            }
            Err(e) => tracing::error!(file = %relative, error = %e, "Failed to delete file"),
        }
    }
    deleted
}

pub async fn cleanup_orphaned_files(
    pool: &DbPool,
    media_root: &Path,
    dry_run: bool,
) -> anyhow::Result<CleanupReport> {
    let referenced: HashSet<String> = ImageRepo::list_file_paths(pool).await?.into_iter().collect();
    let files = list_image_files(media_root).await?;
    let scanned = files.len();
    let orphaned = orphaned_files(files, &referenced);

    let deleted = if dry_run {
        0
    } else {
        delete_files(media_root, &orphaned).await
    };

    tracing::info!(
        scanned,
        orphaned = orphaned.len(),
        deleted,
        dry_run,
        "Orphaned file cleanup finished"
    );
    Ok(CleanupReport {
        dry_run,
        orphaned,
        deleted,
    })
}

// ---------------------------------------------------------------------------
// Premium summary
// ---------------------------------------------------------------------------

const SUMMARY_UPCOMING_LIMIT: i64 = 10;

#[derive(Debug, Serialize)]
pub struct PremiumSummary {
    #[serde(flatten)]
    pub counts: PremiumCounts,
    pub upcoming_expirations: Vec<PremiumNoticeTarget>,
}

pub async fn premium_summary(pool: &DbPool) -> anyhow::Result<PremiumSummary> {
    let now = Utc::now();
    let counts = PremiumListingRepo::counts(pool, now).await?;
    let upcoming_expirations = PremiumListingRepo::upcoming_expirations(
        pool,
        now,
        now + Duration::days(UPCOMING_WINDOW_DAYS),
        SUMMARY_UPCOMING_LIMIT,
    )
    .await?;
    Ok(PremiumSummary {
        counts,
        upcoming_expirations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_unreferenced_files_are_orphaned() {
        let referenced: HashSet<String> = ["property_images/a.jpg".to_string()].into();
        let files = vec![
            "property_images/a.jpg".to_string(),
            "property_images/b.png".to_string(),
        ];
        assert_eq!(orphaned_files(files, &referenced), vec!["property_images/b.png"]);
    }

    #[tokio::test]
    async fn missing_image_dir_lists_nothing() {
        let root = tempfile::tempdir().unwrap();
        assert!(list_image_files(root.path()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn lists_and_deletes_files() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join(IMAGE_DIR);
        std::fs::create_dir_all(dir.join("nested")).unwrap();
        std::fs::write(dir.join("keep.jpg"), b"x").unwrap();
        std::fs::write(dir.join("stale.webp"), b"x").unwrap();

        let files = list_image_files(root.path()).await.unwrap();
        assert_eq!(
            files,
            vec!["property_images/keep.jpg", "property_images/stale.webp"]
        );

        let referenced: HashSet<String> = ["property_images/keep.jpg".to_string()].into();
        let orphans = orphaned_files(files, &referenced);
        assert_eq!(delete_files(root.path(), &orphans).await, 1);
        assert!(dir.join("keep.jpg").exists());
        assert!(!dir.join("stale.webp").exists());
    }
}
