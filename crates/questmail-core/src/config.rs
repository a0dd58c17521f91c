//! Environment-supplied configuration.
//!
//! The mail and chat backends are two distinct hosted projects, each with
//! its own URL and public API key.

use crate::error::{Error, Result};

/// Environment variable holding the mail project URL.
pub const ENV_MAIL_URL: &str = "QUESTMAIL_MAIL_URL";
/// Environment variable holding the mail project API key.
pub const ENV_MAIL_KEY: &str = "QUESTMAIL_MAIL_KEY";
/// Environment variable holding the chat project URL.
pub const ENV_CHAT_URL: &str = "QUESTMAIL_CHAT_URL";
/// Environment variable holding the chat project API key.
pub const ENV_CHAT_KEY: &str = "QUESTMAIL_CHAT_KEY";

/// Connection settings for one backend project.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    /// Project base URL.
    pub url: String,
    /// Public API key.
    pub key: String,
}

/// Full application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Mail project: auth, mail tables and attachment storage.
    pub mail: ProjectConfig,
    /// Chat project: message and presence tables plus the change feed.
    pub chat: ProjectConfig,
}

impl Config {
    /// Loads configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first variable that is missing.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            mail: ProjectConfig {
                url: require(ENV_MAIL_URL)?,
                key: require(ENV_MAIL_KEY)?,
            },
            chat: ProjectConfig {
                url: require(ENV_CHAT_URL)?,
                key: require(ENV_CHAT_KEY)?,
            },
        })
    }
}

fn require(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| Error::Config(format!("{name} is not set")))
}
