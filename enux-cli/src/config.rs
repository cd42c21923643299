use anyhow::{anyhow, Context, Result};
use enux_core::{ApiClient, EnuxConfig, FileSessionStore, Session, SessionStore};
use std::sync::Arc;
use tracing::debug;

/// Everything a command needs to talk to the server: the loaded
/// configuration, an API client and the on-disk session store.
#[derive(Clone)]
pub struct CliContext {
    pub config: EnuxConfig,
    pub api: ApiClient,
    pub store: Arc<FileSessionStore>,
    pub guest: bool,
}

impl CliContext {
    pub fn load(guest: bool, api_url: Option<String>) -> Result<Self> {
        let mut config = EnuxConfig::load().context("Failed to load configuration")?;
        if let Some(url) = api_url {
            config.api.base_url = url;
        }
        Self::from_config(config, guest)
    }

    pub fn from_config(config: EnuxConfig, guest: bool) -> Result<Self> {
        config.validate()?;

        let session_path = config.session_path().ok_or_else(|| {
            anyhow!(
                "Could not determine a session file location. \n\
                 Set ENUX_SESSION_PATH or session.path in your config file."
            )
        })?;

        let api = ApiClient::new(&config.api)?;
        debug!(
            base_url = %config.base_url(),
            session = %session_path.display(),
            guest,
            "Loaded CLI context"
        );

        Ok(Self {
            config,
            api,
            store: Arc::new(FileSessionStore::new(session_path)),
            guest,
        })
    }

    /// The session commands run under. `--guest` ignores any stored sign-in.
    pub async fn session(&self) -> Result<Session> {
        if self.guest {
            return Ok(Session::guest());
        }
        Ok(self.store.load().await?)
    }

    pub fn format_time(&self, at: &chrono::DateTime<chrono::Utc>) -> String {
        at.format(&self.config.display.datetime_format).to_string()
    }
}
