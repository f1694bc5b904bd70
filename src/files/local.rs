//! Filesystem-backed object storage for local runs.

use super::{validate_object_path, FileError, FileStorage, StoredObject};
use async_trait::async_trait;
use std::path::PathBuf;

/// Stores objects under `{root}/{bucket}/{path}` and serves them from
/// `{public_base_url}/files/{bucket}/{path}`.
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    root: PathBuf,
    public_base_url: String,
    max_bytes: usize,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            max_bytes,
        }
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        _content_type: Option<&str>,
    ) -> Result<StoredObject, FileError> {
        validate_object_path(bucket)?;
        validate_object_path(path)?;
        if bytes.len() > self.max_bytes {
            return Err(FileError::TooLarge {
                size: bytes.len(),
                limit: self.max_bytes,
            });
        }

        let target = self.root.join(bucket).join(path);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let size = bytes.len();
        tokio::fs::write(&target, bytes).await?;

        tracing::debug!(bucket, path, size, "Object stored on disk");

        Ok(StoredObject {
            bucket: bucket.to_string(),
            path: path.to_string(),
            public_url: self.public_url(bucket, path),
        })
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/files/{}/{}", self.public_base_url, bucket, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_upload_writes_file_and_returns_url() {
        let dir = tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path(), "http://localhost:8080/", 1024);

        let stored = storage
            .upload("avatars", "u1/me.png", vec![1, 2, 3], Some("image/png"))
            .await
            .unwrap();

        assert_eq!(stored.public_url, "http://localhost:8080/files/avatars/u1/me.png");
        let written = std::fs::read(dir.path().join("avatars/u1/me.png")).unwrap();
        assert_eq!(written, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_upload_rejects_oversized_and_traversal() {
        let dir = tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path(), "http://localhost", 2);

        let err = storage
            .upload("resumes", "cv.pdf", vec![0; 3], None)
            .await
            .unwrap_err();
        assert!(matches!(err, FileError::TooLarge { size: 3, limit: 2 }));

        let err = storage
            .upload("resumes", "../cv.pdf", vec![0], None)
            .await
            .unwrap_err();
        assert!(matches!(err, FileError::InvalidPath(_)));
    }
}
