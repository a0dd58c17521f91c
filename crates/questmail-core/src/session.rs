//! Explicit session lifecycle.
//!
//! One [`SessionManager`] is created at startup and owns the current
//! session; nothing reads auth state ambiently. Interested parties
//! subscribe to a watch channel that publishes every session change.

use questmail_auth::{AuthClient, AuthUser, Session};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Owns the signed-in session and notifies subscribers of changes.
#[derive(Debug)]
pub struct SessionManager {
    auth: AuthClient,
    current: Option<Session>,
    changes: watch::Sender<Option<Session>>,
}

impl SessionManager {
    /// Creates a manager with no session installed.
    #[must_use]
    pub fn new(auth: AuthClient) -> Self {
        let (changes, _) = watch::channel(None);
        Self {
            auth,
            current: None,
            changes,
        }
    }

    /// Signs in with email and password and installs the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the auth service rejects the credentials.
    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<Session> {
        let session = self.auth.sign_in_with_password(email, password).await?;
        info!(user = %session.user.email, "signed in");
        self.install(Some(session.clone()));
        Ok(session)
    }

    /// Registers a new account.
    ///
    /// When the service signs the user in immediately the session is
    /// installed and returned; `None` means a confirmation step is pending.
    ///
    /// # Errors
    ///
    /// Returns an error if the auth service rejects the registration.
    pub async fn sign_up(&mut self, email: &str, password: &str) -> Result<Option<Session>> {
        let session = self.auth.sign_up(email, password).await?;
        if let Some(session) = &session {
            info!(user = %session.user.email, "signed up");
            self.install(Some(session.clone()));
        } else {
            info!(user = %email, "signed up, confirmation pending");
        }
        Ok(session)
    }

    /// Signs out. Local state clears before the revocation call, so a
    /// failed revoke still leaves no session behind.
    ///
    /// # Errors
    ///
    /// Returns an error if the token revocation call fails.
    pub async fn sign_out(&mut self) -> Result<()> {
        let Some(session) = self.current.take() else {
            debug!("sign out with no session installed");
            return Ok(());
        };
        self.changes.send_replace(None);
        self.auth.sign_out(&session.access_token).await?;
        info!("signed out");
        Ok(())
    }

    /// The current session, if signed in.
    #[must_use]
    pub const fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    /// The current session, or `NotAuthenticated`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAuthenticated`] when no session is installed.
    pub fn require(&self) -> Result<&Session> {
        self.current.as_ref().ok_or(Error::NotAuthenticated)
    }

    /// Fetches the account record behind the current session, verifying
    /// the token against the auth service.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAuthenticated`] when no session is installed,
    /// or the auth service's error for a rejected token.
    pub async fn fetch_user(&self) -> Result<AuthUser> {
        let session = self.require()?;
        Ok(self.auth.fetch_user(&session.access_token).await?)
    }

    /// Subscribes to session changes. The receiver observes the value at
    /// subscription time and every replacement after it.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.changes.subscribe()
    }

    fn install(&mut self, session: Option<Session>) {
        self.current.clone_from(&session);
        self.changes.send_replace(session);
    }
}
