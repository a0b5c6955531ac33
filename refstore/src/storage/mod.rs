//! Local filesystem storage backend.
//!
//! Files land under `<root>/<type>/<featureId>-<uuid>.<ext>`. The extension comes
//! from a MIME-to-extension lookup on the upload's Content-Type; uploads with an
//! unmapped subtype are stored extension-less. Directories are created lazily and
//! idempotently, so concurrent first writes for a type are safe.

use crate::api::models::files::UploadRequest;
use crate::errors::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Handle to a file persisted on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub path: PathBuf,
}

/// Local filesystem store rooted at a configured directory.
#[derive(Debug, Clone)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Persist an upload and return the path it was written to.
    ///
    /// The target directory is derived from the upload's type. UUID v4 in the
    /// filename keeps concurrent uploads for the same feature from colliding.
    pub async fn store(&self, request: &UploadRequest) -> Result<StoredFile> {
        let directory = self.root.join(&request.file_type);
        fs::create_dir_all(&directory).await?;

        let path = directory.join(build_filename(&request.feature_id, &request.content_type));

        let mut file = fs::File::create(&path).await?;
        file.write_all(&request.body).await?;
        file.sync_all().await?;

        tracing::info!(path = %path.display(), bytes = request.body.len(), "stored upload");

        Ok(StoredFile { path })
    }

    /// Read back a previously stored file.
    ///
    /// A missing path, or a path that exists but is not a regular file, is a
    /// not-found error rather than an internal one.
    pub async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        match fs::metadata(path).await {
            Ok(meta) if meta.is_file() => Ok(fs::read(path).await?),
            Ok(_) => Err(not_found(path)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(not_found(path)),
            Err(e) => Err(e.into()),
        }
    }
}

fn not_found(path: &Path) -> Error {
    Error::NotFound {
        message: format!("File '{}' does not exist", path.display()),
    }
}

/// Build a unique filename for an upload: `<featureId>-<uuid>.<ext>`, or
/// `<featureId>-<uuid>` when the Content-Type maps to no known extension.
fn build_filename(feature_id: &str, content_type: &str) -> String {
    let id = Uuid::new_v4();
    match extension_for(content_type) {
        Some(ext) => format!("{feature_id}-{id}.{ext}"),
        None => format!("{feature_id}-{id}"),
    }
}

/// Look up a file extension for a MIME type, ignoring any parameters
/// (e.g. `image/png; charset=binary` resolves the same as `image/png`).
fn extension_for(content_type: &str) -> Option<&'static str> {
    let essence = content_type.split(';').next().unwrap_or(content_type).trim();
    mime_guess::get_mime_extensions_str(essence).and_then(|exts| exts.first()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn upload(file_type: &str, feature_id: &str, content_type: &str, body: &[u8]) -> UploadRequest {
        UploadRequest {
            file_type: file_type.to_string(),
            feature_id: feature_id.to_string(),
            content_type: content_type.to_string(),
            body: Bytes::copy_from_slice(body),
        }
    }

    #[tokio::test]
    async fn store_and_read_round_trip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = DiskStore::new(temp_dir.path().to_path_buf());

        let content = b"\x89PNG\r\n\x1a\nfake image bytes";
        let stored = store.store(&upload("image", "feat-1", "image/png", content)).await.unwrap();

        assert!(stored.path.starts_with(temp_dir.path().join("image")));
        let name = stored.path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("feat-1-"));
        assert!(name.ends_with(".png"));

        let read_back = store.read(&stored.path).await.unwrap();
        assert_eq!(read_back, content);
    }

    #[tokio::test]
    async fn repeated_uploads_get_unique_names() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = DiskStore::new(temp_dir.path().to_path_buf());

        let request = upload("image", "feat-1", "image/png", b"same bytes");
        let first = store.store(&request).await.unwrap();
        let second = store.store(&request).await.unwrap();

        assert_ne!(first.path, second.path);
        assert!(first.path.exists());
        assert!(second.path.exists());
    }

    #[tokio::test]
    async fn directory_creation_is_idempotent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = DiskStore::new(temp_dir.path().to_path_buf());

        store.store(&upload("image", "a", "image/png", b"one")).await.unwrap();
        store.store(&upload("image", "b", "image/png", b"two")).await.unwrap();

        let entries = std::fs::read_dir(temp_dir.path().join("image")).unwrap().count();
        assert_eq!(entries, 2);
    }

    #[tokio::test]
    async fn unknown_subtype_stores_without_extension() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = DiskStore::new(temp_dir.path().to_path_buf());

        let stored = store
            .store(&upload("image", "feat-x", "image/x-nonexistent-subtype", b"bytes"))
            .await
            .unwrap();

        let name = stored.path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("feat-x-"));
        assert!(!name.contains('.'));
    }

    #[tokio::test]
    async fn read_missing_file_is_not_found() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = DiskStore::new(temp_dir.path().to_path_buf());

        let missing = temp_dir.path().join("image/nope.png");
        let err = store.read(&missing).await.unwrap_err();

        assert!(matches!(err, Error::NotFound { .. }));
        assert!(err.to_string().contains("does not exist"));
    }

    #[tokio::test]
    async fn read_directory_is_not_found() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = DiskStore::new(temp_dir.path().to_path_buf());

        store.store(&upload("image", "a", "image/png", b"one")).await.unwrap();

        let err = store.read(&temp_dir.path().join("image")).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn extension_lookup_ignores_parameters() {
        assert_eq!(extension_for("image/png"), Some("png"));
        assert_eq!(extension_for("image/png; charset=binary"), Some("png"));
        assert_eq!(extension_for("image/x-nonexistent-subtype"), None);
    }
}
