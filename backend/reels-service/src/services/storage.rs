/// Local-disk video store
///
/// Uploaded files live under a single configured directory and are
/// served back at /uploads/{filename}. Filenames are generated
/// server-side; client-supplied names only contribute a sanitized
/// extension.
use chrono::Utc;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::error::{AppError, Result};

const MAX_EXTENSION_LEN: usize = 10;

#[derive(Clone)]
pub struct VideoStore {
    root: PathBuf,
    max_bytes: usize,
}

impl VideoStore {
    pub fn new(cfg: &StorageConfig) -> Self {
        Self {
            root: PathBuf::from(&cfg.upload_dir),
            max_bytes: cfg.max_upload_bytes,
        }
    }

    /// Create the upload directory if it does not exist yet.
    pub async fn ensure_root(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Collision-free stored filename: `{unix_millis}-{uuid}{.ext}`.
    pub fn generate_filename(original: Option<&str>) -> String {
        let stamp = Utc::now().timestamp_millis();
        let id = Uuid::new_v4();
        match original.and_then(sanitize_extension) {
            Some(ext) => format!("{stamp}-{id}.{ext}"),
            None => format!("{stamp}-{id}"),
        }
    }

    /// Absolute path for a freshly generated filename (writing).
    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    /// Resolve a stored filename for serving. Rejects anything that
    /// could escape the upload directory.
    pub fn resolve(&self, filename: &str) -> Result<PathBuf> {
        if !is_safe_filename(filename) {
            return Err(AppError::BadRequest("Invalid filename".to_string()));
        }
        Ok(self.root.join(filename))
    }

    /// Remove a partially written file, ignoring failures.
    pub async fn discard(&self, filename: &str) {
        let path = self.root.join(filename);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            tracing::debug!(file = %path.display(), "discard failed: {}", e);
        }
    }
}

/// Extension from a client-supplied name: lowercase alphanumerics only,
/// bounded length.
fn sanitize_extension(original: &str) -> Option<String> {
    let ext = original.rsplit('.').next()?;
    if ext.len() == original.len() {
        // No dot at all.
        return None;
    }
    let cleaned: String = ext
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(MAX_EXTENSION_LEN)
        .collect::<String>()
        .to_lowercase();
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Only the filenames this service generates are servable.
fn is_safe_filename(name: &str) -> bool {
    !name.is_empty()
        && !name.contains("..")
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_filename_keeps_extension() {
        let name = VideoStore::generate_filename(Some("lesson one.MP4"));
        assert!(name.ends_with(".mp4"));
        assert!(!name.contains(' '));
    }

    #[test]
    fn generated_filename_without_extension() {
        let name = VideoStore::generate_filename(Some("rawvideo"));
        assert!(!name.contains('.'));
        let name = VideoStore::generate_filename(None);
        assert!(!name.contains('.'));
    }

    #[test]
    fn extension_is_sanitized() {
        assert_eq!(sanitize_extension("a.mp4"), Some("mp4".to_string()));
        assert_eq!(sanitize_extension("a.M P:4"), Some("mp4".to_string()));
        assert_eq!(sanitize_extension("a."), None);
        assert_eq!(sanitize_extension("noext"), None);
    }

    #[test]
    fn traversal_names_rejected() {
        assert!(!is_safe_filename("../etc/passwd"));
        assert!(!is_safe_filename("a/../../b"));
        assert!(!is_safe_filename("dir/file.mp4"));
        assert!(!is_safe_filename(""));
        assert!(is_safe_filename("1717171717-abc-def.mp4"));
    }

    #[tokio::test]
    async fn resolve_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = VideoStore::new(&StorageConfig {
            upload_dir: dir.path().to_string_lossy().into_owned(),
            max_upload_bytes: 1024,
        });
        store.ensure_root().await.unwrap();

        let filename = VideoStore::generate_filename(Some("clip.mp4"));
        tokio::fs::write(store.path_for(&filename), b"data")
            .await
            .unwrap();

        let resolved = store.resolve(&filename).unwrap();
        let contents = tokio::fs::read(resolved).await.unwrap();
        assert_eq!(contents, b"data");

        assert!(store.resolve("../clip.mp4").is_err());
    }
}
