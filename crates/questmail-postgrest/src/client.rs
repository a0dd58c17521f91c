//! PostgREST client configuration.

use reqwest::Client;
use url::Url;

use crate::error::{Error, Result};
use crate::query::Query;

/// Client for one backend project's REST gateway.
///
/// Holds the project base URL and the public API key. Every request carries
/// the key in the `apikey` header; the `Authorization` bearer is either a
/// per-query access token or the key itself for anonymous access.
#[derive(Debug, Clone)]
pub struct PostgrestClient {
    /// Project base URL (no path).
    base_url: Url,
    /// Public API key for the project.
    api_key: String,
    /// HTTP client.
    http_client: Client,
}

impl PostgrestClient {
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

    /// Starts a request against one table.
    #[must_use]
    pub fn from(&self, table: impl Into<String>) -> Query<'_> {
        Query::new(self, table.into())
    }

    /// Public API key for this project.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// HTTP client shared by all requests.
    pub(crate) const fn http_client(&self) -> &Client {
        &self.http_client
    }

    /// Builds the endpoint URL for a table.
    pub(crate) fn table_url(&self, table: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| Error::InvalidBaseUrl(self.base_url.to_string()))?;
            segments.pop_if_empty();
            segments.extend(["rest", "v1", table]);
        }
        Ok(url)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = PostgrestClient::new("https://project.example.co", "key-123").unwrap();
        assert_eq!(client.api_key(), "key-123");
    }

    #[test]
    fn test_table_url() {
        let client = PostgrestClient::new("https://project.example.co", "key").unwrap();
        let url = client.table_url("mails").unwrap();
        assert_eq!(url.as_str(), "https://project.example.co/rest/v1/mails");
    }

    #[test]
    fn test_table_url_with_trailing_slash() {
        let client = PostgrestClient::new("https://project.example.co/", "key").unwrap();
        let url = client.table_url("online_users").unwrap();
        assert_eq!(
            url.as_str(),
            "https://project.example.co/rest/v1/online_users"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(PostgrestClient::new("not a url", "key").is_err());
    }
}
