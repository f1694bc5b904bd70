//! File storage collaborator: bucketed object uploads with public URLs.

pub mod local;
pub mod remote;

pub use local::LocalFileStorage;
pub use remote::RestFileStorage;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub const AVATARS_BUCKET: &str = "avatars";
pub const RESUMES_BUCKET: &str = "resumes";
pub const LOGOS_BUCKET: &str = "tool-logos";

#[derive(Debug, Error)]
pub enum FileError {
    #[error("invalid object path '{0}'")]
    InvalidPath(String),

    #[error("file of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },

    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("upload request failed: {0}")]
    Transport(String),

    #[error("storage rejected upload ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Where an uploaded object ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    pub bucket: String,
    pub path: String,
    pub public_url: String,
}

#[async_trait]
pub trait FileStorage: Send + Sync {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<StoredObject, FileError>;

    /// Stable URL of an object; does not check that it exists.
    fn public_url(&self, bucket: &str, path: &str) -> String;
}

/// Rejects empty segments, `..`, absolute paths and backslashes.
pub fn validate_object_path(path: &str) -> Result<(), FileError> {
    let invalid = path.is_empty()
        || path.starts_with('/')
        || path.contains('\\')
        || path
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..");
    if invalid {
        return Err(FileError::InvalidPath(path.to_string()));
    }
    Ok(())
}

/// Builds a collision-free object path: `{owner}/{uuid}.{ext}`.
pub fn object_path(owner: &str, extension: Option<&str>) -> String {
    let owner: String = owner
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let owner = if owner.is_empty() { "anonymous".to_string() } else { owner };
    match extension {
        Some(ext) => format!("{}/{}.{}", owner, uuid::Uuid::new_v4(), ext),
        None => format!("{}/{}", owner, uuid::Uuid::new_v4()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_validation() {
        assert!(validate_object_path("user-1/avatar.png").is_ok());
        assert!(validate_object_path("../etc/passwd").is_err());
        assert!(validate_object_path("/abs.png").is_err());
        assert!(validate_object_path("a//b.png").is_err());
        assert!(validate_object_path("").is_err());
    }

    #[test]
    fn test_object_path_sanitizes_owner() {
        let path = object_path("ada@example.com", Some("pdf"));
        assert!(path.starts_with("ada_example_com/"));
        assert!(path.ends_with(".pdf"));
        assert!(validate_object_path(&path).is_ok());
    }
}
