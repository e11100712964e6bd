use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info};

use crate::config::Config;
use crate::constants::IMAGE_EXTENSIONS;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No image provided")]
    MissingFile,

    #[error("Only image uploads are allowed")]
    NotAnImage,

    #[error("Image exceeds the {max_bytes} byte limit")]
    TooLarge { max_bytes: usize },

    #[error("Malformed upload: {0}")]
    Malformed(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<std::io::Error> for UploadError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

pub struct UploadService {
    uploads_dir: PathBuf,
    max_bytes: usize,
}

impl UploadService {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            uploads_dir: PathBuf::from(&config.storage.uploads_path),
            max_bytes: config.server.max_upload_bytes,
        }
    }

    #[must_use]
    pub const fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Stores an image under a random name and returns its public path.
    pub async fn save_image(
        &self,
        bytes: &[u8],
        content_type: Option<&str>,
        original_name: Option<&str>,
    ) -> Result<String, UploadError> {
        let content_type = content_type
            .map(str::to_ascii_lowercase)
            .filter(|ct| ct.starts_with("image/"))
            .ok_or(UploadError::NotAnImage)?;

        if bytes.is_empty() {
            return Err(UploadError::MissingFile);
        }
        if bytes.len() > self.max_bytes {
            return Err(UploadError::TooLarge {
                max_bytes: self.max_bytes,
            });
        }

        // The declared type is client-controlled; the bytes must agree it is an image.
        let sniffed = image::guess_format(bytes).map_err(|_| UploadError::NotAnImage)?;
        if sniffed.to_mime_type() != content_type {
            debug!(
                declared = %content_type,
                detected = sniffed.to_mime_type(),
                "Upload type differs from its contents"
            );
        }

        let extension = extension_for(sniffed.to_mime_type(), original_name);
        let filename = format!(
            "{}-{}.{extension}",
            chrono::Utc::now().timestamp_millis(),
            uuid::Uuid::new_v4().simple()
        );

        if !self.uploads_dir.exists() {
            fs::create_dir_all(&self.uploads_dir).await?;
        }

        let file_path = self.uploads_dir.join(&filename);
        fs::write(&file_path, bytes).await?;

        info!(path = %file_path.display(), size = bytes.len(), "Stored uploaded image");
        metrics::counter!("uploads_stored_total").increment(1);

        Ok(format!("/uploads/{filename}"))
    }
}

/// Extension for the detected MIME type, keeping the client's spelling when it agrees.
fn extension_for(content_type: &str, original_name: Option<&str>) -> String {
    let from_name = original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|e| IMAGE_EXTENSIONS.contains(&e.as_str()));

    if let Some(ext) = from_name
        && mime_guess::from_ext(&ext)
            .iter()
            .any(|m| m.essence_str() == content_type)
    {
        return ext;
    }

    mime_guess::get_mime_extensions_str(content_type)
        .and_then(|exts| {
            exts.iter()
                .find(|e| IMAGE_EXTENSIONS.contains(e))
                .or_else(|| exts.first())
        })
        .map_or_else(|| "img".to_string(), |e| (*e).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n0000";
    const JPEG: &[u8] = b"\xff\xd8\xff\xe0JFIF";

    fn service(dir: &Path, max_bytes: usize) -> UploadService {
        UploadService {
            uploads_dir: dir.to_path_buf(),
            max_bytes,
        }
    }

    #[test]
    fn test_extension_prefers_matching_file_name() {
        assert_eq!(extension_for("image/jpeg", Some("Photo.JPG")), "jpg");
        assert_eq!(extension_for("image/png", Some("photo.jpg")), "png");
        assert_eq!(extension_for("image/webp", None), "webp");
    }

    #[tokio::test]
    async fn test_rejects_non_images() {
        let dir = std::env::temp_dir().join(format!("qrmenu-upload-{}", uuid::Uuid::new_v4()));
        let svc = service(&dir, 1024);

        let err = svc
            .save_image(b"%PDF", Some("application/pdf"), Some("x.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::NotAnImage));

        let err = svc.save_image(b"abc", None, None).await.unwrap_err();
        assert!(matches!(err, UploadError::NotAnImage));

        let err = svc
            .save_image(b"<script>alert(1)</script>", Some("image/png"), Some("x.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::NotAnImage));
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_extension_follows_detected_format() {
        let dir = std::env::temp_dir().join(format!("qrmenu-upload-{}", uuid::Uuid::new_v4()));
        let svc = service(&dir, 1024);

        let url = svc
            .save_image(JPEG, Some("image/png"), Some("photo.jpg"))
            .await
            .unwrap();
        assert!(url.ends_with(".jpg"), "{url}");
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_enforces_size_limit_and_stores() {
        let dir = std::env::temp_dir().join(format!("qrmenu-upload-{}", uuid::Uuid::new_v4()));
        let svc = service(&dir, PNG.len());

        let err = svc
            .save_image(b"\x89PNG\r\n\x1a\n00000", Some("image/png"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::TooLarge { max_bytes: 12 }));

        let url = svc
            .save_image(PNG, Some("image/png"), Some("a.png"))
            .await
            .unwrap();
        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with(".png"));

        let stored = dir.join(url.trim_start_matches("/uploads/"));
        assert_eq!(std::fs::read(stored).unwrap(), PNG);
        let _ = std::fs::remove_dir_all(dir);
    }
}
