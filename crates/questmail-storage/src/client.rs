//! Storage service client.

use bytes::Bytes;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;
use url::Url;

use crate::error::{Error, ErrorBody, Result};

/// Client for one backend project's object storage.
#[derive(Debug, Clone)]
pub struct StorageClient {
    /// Project base URL (no path).
    base_url: Url,
    /// Public API key for the project.
    api_key: String,
    /// HTTP client.
    http_client: Client,
}

impl StorageClient {
    /// Creates a new client for a project.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL does not parse.
    pub fn new(base_url: impl AsRef<str>, api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            base_url: Url::parse(base_url.as_ref())?,
            api_key: api_key.into(),
            http_client: Client::new(),
        })
    }

    /// Uploads a file to a bucket path.
    ///
    /// Refuses to overwrite: the service answers with a conflict when the
    /// path already holds an object.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service rejects the
    /// upload.
    pub async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Bytes,
        access_token: &str,
    ) -> Result<()> {
        let url = self.object_url(&["object", bucket], path)?;
        debug!(%bucket, %path, size = bytes.len(), "uploading object");

        let response = self
            .http_client
            .post(url)
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .header("x-upsert", "false")
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<ErrorBody>(&text) {
                Ok(body) => body.into_error(status.as_u16()),
                Err(_) => Error::Api {
                    status: status.as_u16(),
                    message: text,
                },
            });
        }

        Ok(())
    }

    /// Derives the public URL for an object. No request is made; whether the
    /// object exists (or the bucket is public) is not checked.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot carry path segments.
    pub fn public_url(&self, bucket: &str, path: &str) -> Result<Url> {
        self.object_url(&["object", "public", bucket], path)
    }

    /// Builds a storage URL, splitting the object path on `/` so each
    /// component is encoded as its own segment.
    fn object_url(&self, prefix: &[&str], path: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| Error::InvalidBaseUrl(self.base_url.to_string()))?;
            segments.pop_if_empty();
            segments.extend(["storage", "v1"]);
            segments.extend(prefix.iter().copied());
            segments.extend(path.split('/'));
        }
        Ok(url)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> StorageClient {
        StorageClient::new("https://project.example.co", "anon-key").unwrap()
    }

    #[test]
    fn test_public_url() {
        let url = client()
            .public_url("attachments", "user-1/mail-1/report.pdf")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://project.example.co/storage/v1/object/public/attachments/user-1/mail-1/report.pdf"
        );
    }

    #[test]
    fn test_upload_url() {
        let url = client()
            .object_url(&["object", "attachments"], "user-1/mail-1/report.pdf")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://project.example.co/storage/v1/object/attachments/user-1/mail-1/report.pdf"
        );
    }

    #[test]
    fn test_object_path_encodes_file_names() {
        let url = client()
            .public_url("attachments", "user-1/mail-1/year report.pdf")
            .unwrap();
        assert!(url.as_str().ends_with("/mail-1/year%20report.pdf"));
    }
}
