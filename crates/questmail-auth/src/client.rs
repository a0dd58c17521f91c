//! Auth service client.

use reqwest::Client;
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};
use crate::session::{AuthUser, ErrorResponse, Session, SessionResponse};

/// Client for one backend project's auth service.
#[derive(Debug, Clone)]
pub struct AuthClient {
    /// Project base URL (no path).
    base_url: Url,
    /// Public API key for the project.
    api_key: String,
    /// HTTP client.
    http_client: Client,
}

impl AuthClient {
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

    /// Signs in with email and password.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the credentials are rejected.
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        let url = self.password_grant_url()?;

        debug!(%email, "signing in");
        let response = self
            .http_client
            .post(url)
            .header("apikey", &self.api_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let response = Self::check(response).await?;
        let session: SessionResponse = response.json().await?;
        Ok(Session::from_response(session))
    }

    /// Registers a new account.
    ///
    /// Returns the session when the service signs the user in immediately,
    /// or `None` when the account still needs confirmation.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service rejects the
    /// registration.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>> {
        let url = self.endpoint("signup")?;

        debug!(%email, "signing up");
        let response = self
            .http_client
            .post(url)
            .header("apikey", &self.api_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let response = Self::check(response).await?;
        let body: Value = response.json().await?;
        session_from_signup(body)
    }

    /// Revokes the session behind an access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn sign_out(&self, access_token: &str) -> Result<()> {
        let url = self.endpoint("logout")?;

        let response = self
            .http_client
            .post(url)
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    /// Fetches the user behind an access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is invalid.
    pub async fn fetch_user(&self, access_token: &str) -> Result<AuthUser> {
        let url = self.endpoint("user")?;

        let response = self
            .http_client
            .get(url)
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    /// Builds the token URL for the password grant.
    fn password_grant_url(&self) -> Result<Url> {
        let mut url = self.endpoint("token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");
        Ok(url)
    }

    /// Builds the endpoint URL for one auth operation.
    fn endpoint(&self, segment: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| Error::InvalidBaseUrl(self.base_url.to_string()))?;
            segments.pop_if_empty();
            segments.extend(["auth", "v1", segment]);
        }
        Ok(url)
    }

    /// Turns non-success responses into typed errors.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        Err(match serde_json::from_str::<ErrorResponse>(&text) {
            Ok(body) => body.into_error(status.as_u16()),
            Err(_) => Error::Api {
                status: status.as_u16(),
                message: text,
            },
        })
    }
}

/// Decodes a sign-up response body.
///
/// The service returns a full session when auto-confirmation is on, or a
/// bare user object when the account still needs confirmation.
fn session_from_signup(body: Value) -> Result<Option<Session>> {
    if body.get("access_token").is_some() {
        let response: SessionResponse = serde_json::from_value(body)?;
        Ok(Some(Session::from_response(response)))
    } else {
        Ok(None)
    }
}
