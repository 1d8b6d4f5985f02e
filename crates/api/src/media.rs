//! Storage of uploaded property images under the media root.
//!
//! Files are written to `<media_root>/property_images/<uuid>.<ext>`; the
//! stored path is relative to the media root and served from `/media`.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use estate_core::fake_image::IMAGE_DIR;
use estate_core::hashing::sha256_hex;
use image::ImageReader;
use uuid::Uuid;

/// Facts about an upload, gathered before the row is inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFacts {
    pub content_hash: String,
    pub file_size: i64,
    pub width: Option<i32>,
    pub height: Option<i32>,
}

/// Hash the bytes and read the pixel dimensions from the image header.
/// Undecodable headers leave the dimensions unknown.
pub fn inspect_upload(bytes: &[u8]) -> UploadFacts {
    let (width, height) = match image_dimensions(bytes) {
        Some((w, h)) => (Some(w), Some(h)),
        None => (None, None),
    };
    UploadFacts {
        content_hash: sha256_hex(bytes),
        file_size: bytes.len() as i64,
        width,
        height,
    }
}

fn image_dimensions(bytes: &[u8]) -> Option<(i32, i32)> {
    let (w, h) = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()?;
    Some((i32::try_from(w).ok()?, i32::try_from(h).ok()?))
}

/// Write an upload and return its path relative to `media_root`.
pub async fn store_upload(media_root: &Path, extension: &str, bytes: &[u8]) -> std::io::Result<String> {
    let relative = format!("{IMAGE_DIR}/{}.{extension}", Uuid::new_v4().simple());
    let absolute = media_root.join(&relative);
    if let Some(parent) = absolute.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&absolute, bytes).await?;
    Ok(relative)
}

/// Absolute path of a stored file.
pub fn resolve(media_root: &Path, relative: &str) -> PathBuf {
    media_root.join(relative.trim_start_matches('/'))
}

/// Remove a stored file; a missing file is not an error.
pub async fn remove_upload(media_root: &Path, relative: &str) -> std::io::Result<()> {
    match tokio::fs::remove_file(resolve(media_root, relative)).await {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use image::{ImageFormat, RgbImage};

    use super::*;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        RgbImage::new(width, height)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn dimensions_read_from_header() {
        let facts = inspect_upload(&png(640, 480));
        assert_eq!(facts.width, Some(640));
        assert_eq!(facts.height, Some(480));
        assert_eq!(facts.content_hash.len(), 64);
    }

    #[test]
    fn garbage_has_unknown_dimensions() {
        let facts = inspect_upload(b"definitely not an image");
        assert_eq!(facts.width, None);
        assert_eq!(facts.file_size, 23);
    }

    #[tokio::test]
    async fn store_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let rel = store_upload(dir.path(), "png", &png(2, 2)).await.unwrap();
        assert!(rel.starts_with("property_images/"));
        assert!(rel.ends_with(".png"));
        assert!(resolve(dir.path(), &rel).exists());

        remove_upload(dir.path(), &rel).await.unwrap();
        assert!(!resolve(dir.path(), &rel).exists());
        remove_upload(dir.path(), &rel).await.unwrap();
    }
}
