//! Account commands and the shared sign-in path.

use anyhow::Context as _;
use tracing::debug;

use questmail_auth::AuthClient;
use questmail_core::mail::full_address;
use questmail_core::{Config, MailContext, SessionManager};

use crate::cli::{Credentials, SignupArgs, WhoamiArgs};

/// Environment variable naming the account username.
const ENV_USER: &str = "QUESTMAIL_USER";

/// Environment variable holding the account password.
const ENV_PASS: &str = "QUESTMAIL_PASS";

/// Registers an account and signs in when the service allows it.
pub async fn signup(args: SignupArgs) -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let mut sessions = session_manager(&config)?;
    let (email, password) = resolve(&args.credentials)?;
    match sessions.sign_up(&email, &password).await? {
        Some(session) => println!("Signed up as {}", session.user.email),
        None => println!("Signed up; confirm {email} to finish registration"),
    }
    Ok(())
}

/// Signs in and prints the account as the auth service sees it.
pub async fn whoami(args: WhoamiArgs) -> anyhow::Result<()> {
    let (_, sessions) = sign_in(&args.credentials).await?;
    let user = sessions.fetch_user().await?;
    println!("{} ({})", user.email, user.id);
    Ok(())
}

/// Signs in with the resolved credentials.
pub async fn sign_in(credentials: &Credentials) -> anyhow::Result<(Config, SessionManager)> {
    let config = Config::from_env()?;
    let mut sessions = session_manager(&config)?;
    let (email, password) = resolve(credentials)?;
    sessions.sign_in(&email, &password).await?;
    Ok((config, sessions))
}

/// Signs in and builds the mail context the mail commands run against.
pub async fn mail_context(credentials: &Credentials) -> anyhow::Result<(Config, MailContext)> {
    let (config, sessions) = sign_in(credentials).await?;
    let session = sessions.require()?.clone();
    let ctx = MailContext::new(&config.mail, session)?;
    Ok((config, ctx))
}

fn session_manager(config: &Config) -> anyhow::Result<SessionManager> {
    let auth = AuthClient::new(&config.mail.url, &config.mail.key)?;
    Ok(SessionManager::new(auth))
}

/// Resolves credentials: flags override the environment. The username is
/// bare; the questmail domain is appended here.
fn resolve(credentials: &Credentials) -> anyhow::Result<(String, String)> {
    let user = match &credentials.user {
        Some(user) => user.clone(),
        None => std::env::var(ENV_USER).with_context(|| format!("{ENV_USER} is not set"))?,
    };
    let pass = match &credentials.pass {
        Some(pass) => pass.clone(),
        None => std::env::var(ENV_PASS).with_context(|| format!("{ENV_PASS} is not set"))?,
    };
    let email = full_address(&user);
    debug!(user = %email, "credentials resolved");
    Ok((email, pass))
}
