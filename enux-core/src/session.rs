//! Signed-in identity and where it is kept between invocations.
//!
//! A [`Session`] is a plain value handed to every data-access call; nothing in
//! the client reads global state. [`SessionStore`] implementations persist the
//! user record returned by the auth endpoints.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{EnuxError, EnuxResult};
use crate::models::AuthUser;

/// Where the caller should navigate after an operation completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Root,
    Onboarding,
    Playbook(String),
    PullRequest(String),
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Route::Root => write!(f, "/"),
            Route::Onboarding => write!(f, "/onboarding"),
            Route::Playbook(id) => write!(f, "/playbook/{}", id),
            Route::PullRequest(id) => write!(f, "/pull-request/{}", id),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    user: Option<AuthUser>,
    guest: bool,
}

impl Session {
    pub fn signed_out() -> Self {
        Self::default()
    }

    /// A browsing-only session. Every authenticated call fails before sending.
    pub fn guest() -> Self {
        Self {
            user: None,
            guest: true,
        }
    }

    pub fn for_user(user: AuthUser) -> Self {
        Self {
            user: Some(user),
            guest: false,
        }
    }

    pub fn user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }

    pub fn is_guest(&self) -> bool {
        self.guest
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.as_ref().and_then(AuthUser::token).is_some()
    }

    /// The token to send as `Authorization: Bearer`, or the missing-token
    /// error when there is none.
    pub fn bearer_token(&self) -> EnuxResult<&str> {
        self.user
            .as_ref()
            .and_then(AuthUser::token)
            .ok_or(EnuxError::AuthTokenMissing)
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the persisted session. Unreadable data yields a signed-out session.
    async fn load(&self) -> EnuxResult<Session>;

    async fn save(&self, user: &AuthUser) -> EnuxResult<()>;

    async fn clear(&self) -> EnuxResult<()>;
}

/// Keeps the signed-in user as a JSON file on disk.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> EnuxResult<Session> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Session::signed_out());
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<AuthUser>(&raw) {
            Ok(user) => {
                debug!("Loaded session for {}", user.email);
                Ok(Session::for_user(user))
            }
            Err(e) => {
                let err = EnuxError::MalformedSession(e.to_string());
                warn!(
                    error_code = err.error_code(),
                    path = %self.path.display(),
                    "Discarding stored session: {}",
                    err
                );
                self.clear().await?;
                Ok(Session::signed_out())
            }
        }
    }

    async fn save(&self, user: &AuthUser) -> EnuxResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(user)?;
        tokio::fs::write(&self.path, json).await?;
        debug!("Saved session to {}", self.path.display());
        Ok(())
    }

    async fn clear(&self) -> EnuxResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store for tests and embedding.
#[derive(Default)]
pub struct MemorySessionStore {
    user: RwLock<Option<AuthUser>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(user: AuthUser) -> Self {
        Self {
            user: RwLock::new(Some(user)),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> EnuxResult<Session> {
        Ok(match self.user.read().await.clone() {
            Some(user) => Session::for_user(user),
            None => Session::signed_out(),
        })
    }

    async fn save(&self, user: &AuthUser) -> EnuxResult<()> {
        *self.user.write().await = Some(user.clone());
        Ok(())
    }

    async fn clear(&self) -> EnuxResult<()> {
        *self.user.write().await = None;
        Ok(())
    }
}
