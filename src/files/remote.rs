//! Hosted object storage over HTTP (`{base_url}/storage/v1/object/...`).

use super::{validate_object_path, FileError, FileStorage, StoredObject};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

#[derive(Clone)]
pub struct RestFileStorage {
    client: reqwest::Client,
    base_url: String,
    max_bytes: usize,
}

impl RestFileStorage {
    pub fn new(base_url: &str, api_key: &str, max_bytes: usize) -> Result<Self, FileError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(api_key)
                .map_err(|e| FileError::Transport(format!("invalid api key header: {}", e)))?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| FileError::Transport(format!("invalid api key header: {}", e)))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| FileError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_bytes,
        })
    }
}

#[async_trait]
impl FileStorage for RestFileStorage {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<StoredObject, FileError> {
        validate_object_path(bucket)?;
        validate_object_path(path)?;
        if bytes.len() > self.max_bytes {
            return Err(FileError::TooLarge {
                size: bytes.len(),
                limit: self.max_bytes,
            });
        }

        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, path);
        let response = self
            .client
            .post(&url)
            .header(
                CONTENT_TYPE,
                content_type.unwrap_or("application/octet-stream"),
            )
            .body(bytes)
            .send()
            .await
            .map_err(|e| FileError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(FileError::Rejected { status, message });
        }

        Ok(StoredObject {
            bucket: bucket.to_string(),
            path: path.to_string(),
            public_url: self.public_url(bucket, path),
        })
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, bucket, path
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url_layout() {
        let storage = RestFileStorage::new("https://db.example.com/", "key", 10).unwrap();
        assert_eq!(
            storage.public_url("avatars", "u1/me.png"),
            "https://db.example.com/storage/v1/object/public/avatars/u1/me.png"
        );
    }

    #[tokio::test]
    async fn test_oversized_upload_fails_before_network() {
        let storage = RestFileStorage::new("http://127.0.0.1:9", "key", 1).unwrap();
        let err = storage
            .upload("resumes", "cv.pdf", vec![0, 0], None)
            .await
            .unwrap_err();
        assert!(matches!(err, FileError::TooLarge { .. }));
    }
}
