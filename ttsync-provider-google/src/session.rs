//! Stored Google sessions (access and refresh tokens), one per account.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use google_calendar::{AccessToken, Client};
use serde::{Deserialize, Serialize};

use crate::app_config::{AppConfig, base_dir};
use crate::auth::redirect_uri;

pub struct Session {
    account_email: String,
    data: SessionData,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct SessionData {
    access_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

impl From<&AccessToken> for SessionData {
    fn from(tokens: &AccessToken) -> Self {
        SessionData {
            access_token: tokens.access_token.clone(),
            refresh_token: tokens.refresh_token.clone(),
            expires_at: Utc::now() + Duration::seconds(tokens.expires_in),
        }
    }
}

impl Session {
    fn dir() -> Result<PathBuf> {
        Ok(base_dir()?.join("session"))
    }

    fn path_for_account_email(account_email: &str) -> Result<PathBuf> {
        let email_slug = account_email.replace(['/', '\\', ':'], "_");
        Ok(Self::dir()?.join(format!("{}.toml", email_slug)))
    }

    fn path(&self) -> Result<PathBuf> {
        Self::path_for_account_email(&self.account_email)
    }

    pub fn new(account_email: &str, data: SessionData) -> Self {
        Session {
            account_email: account_email.to_string(),
            data,
        }
    }

    pub fn account_email(&self) -> &str {
        &self.account_email
    }

    /// Accounts with a stored session, sorted.
    pub fn accounts() -> Result<Vec<String>> {
        Ok(Self::accounts_in(&Self::dir()?))
    }

    fn accounts_in(dir: &Path) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return Vec::new();
        };

        let mut accounts: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .collect();
        accounts.sort();
        accounts
    }

    /// The configured account, or the only signed-in one.
    pub fn resolve_account(configured: Option<&str>) -> Result<String> {
        if let Some(account) = configured {
            return Ok(account.to_string());
        }

        let mut accounts = Self::accounts()?;
        match accounts.len() {
            0 => anyhow::bail!("No Google account signed in. Run `ttsync auth` first."),
            1 => Ok(accounts.remove(0)),
            _ => anyhow::bail!(
                "Several Google accounts are signed in ({}). Set google_account in the config.",
                accounts.join(", ")
            ),
        }
    }

    pub fn client(&self) -> Result<Client> {
        let app_config = AppConfig::load()?;

        Ok(Client::new(
            app_config.client_id,
            app_config.client_secret,
            redirect_uri(),
            self.data.access_token.clone(),
            self.data.refresh_token.clone(),
        ))
    }

    /// Load a session and refresh it if expired.
    pub async fn load_valid(account_email: &str) -> Result<Self> {
        let mut session = Self::load(account_email)?;

        if session.is_expired() {
            tracing::debug!(account = account_email, "refreshing Google access token");
            session.refresh().await?;
        }

        Ok(session)
    }

    fn load(account_email: &str) -> Result<Self> {
        Self::load_from(account_email, &Self::path_for_account_email(account_email)?)
    }

    fn load_from(account_email: &str, path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!(
                "Google session for {} not found. Run `ttsync auth` first.",
                account_email
            );
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read Google session from {}", path.display()))?;

        let data: SessionData = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse Google session from {}", path.display()))?;

        Ok(Session::new(account_email, data))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&self.path()?)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(&self.data).context("Failed to serialize session")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write session to {}", path.display()))?;

        // Owner-only, the file holds OAuth tokens.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("Failed to set permissions on {}", path.display()))?;
        }

        Ok(())
    }

    fn is_expired(&self) -> bool {
        Utc::now() >= self.data.expires_at
    }

    async fn refresh(&mut self) -> Result<()> {
        let mut tokens = self
            .client()?
            .refresh_access_token()
            .await
            .context("Failed to refresh token")?;

        // Google usually omits the refresh token on refresh.
        if tokens.refresh_token.is_empty() {
            tokens.refresh_token = self.data.refresh_token.clone();
        }

        self.data = (&tokens).into();
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn data(expires_at: DateTime<Utc>) -> SessionData {
        SessionData {
            access_token: "access".into(),
            refresh_token: "refresh".into(),
            expires_at,
        }
    }

    #[test]
    fn test_session_survives_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session").join("me@example.com.toml");
        let session = Session::new("me@example.com", data(Utc::now() + Duration::hours(1)));

        session.save_to(&path).expect("Should save session");
        let loaded = Session::load_from("me@example.com", &path).expect("Should load session");

        assert_eq!(loaded.account_email(), "me@example.com");
        assert_eq!(loaded.data.refresh_token, "refresh");
        assert!(!loaded.is_expired());
    }

    #[cfg(unix)]
    #[test]
    fn test_session_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("me@example.com.toml");
        Session::new("me@example.com", data(Utc::now()))
            .save_to(&path)
            .unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_missing_session_asks_for_auth() {
        let dir = tempfile::tempdir().unwrap();

        let error = Session::load_from("me@example.com", &dir.path().join("missing.toml"))
            .err()
            .expect("Should fail without a session");

        assert!(error.to_string().contains("ttsync auth"));
    }

    #[test]
    fn test_accounts_are_toml_stems_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b@example.com.toml", "a@example.com.toml", "notes.txt"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }

        assert_eq!(
            Session::accounts_in(dir.path()),
            vec!["a@example.com".to_string(), "b@example.com".to_string()]
        );
        assert!(Session::accounts_in(&dir.path().join("nowhere")).is_empty());
    }

    #[test]
    fn test_past_expiry_is_expired() {
        let session = Session::new("me@example.com", data(Utc::now() - Duration::minutes(1)));

        assert!(session.is_expired());
    }
}
