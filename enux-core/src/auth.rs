//! Email/password authentication against `/auth/*`.
//!
//! Unlike the data-access calls, these operations return an [`AuthError`]
//! descriptor rather than [`EnuxError`], since a failed sign-in is an
//! expected outcome shown to the user rather than a fault.

use reqwest::Method;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::client::{error_message, ApiClient};
use crate::error::{EnuxError, EnuxResult, NETWORK_ERROR_MESSAGE};
use crate::models::AuthUser;
use crate::session::{Route, Session, SessionStore};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AuthError {
    pub message: String,
    pub status: Option<u16>,
}

impl AuthError {
    fn new(message: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            message: message.into(),
            status,
        }
    }
}

impl From<AuthError> for EnuxError {
    fn from(err: AuthError) -> Self {
        EnuxError::AuthenticationFailed {
            message: err.message,
            status: err.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthOutcome {
    pub session: Session,
    /// Where to go next, if anywhere.
    pub route: Option<Route>,
}

impl AuthOutcome {
    pub fn user(&self) -> Option<&AuthUser> {
        self.session.user()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Google,
    Github,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Google => write!(f, "google"),
            Provider::Github => write!(f, "github"),
        }
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "google" => Ok(Provider::Google),
            "github" => Ok(Provider::Github),
            other => Err(format!("Unknown provider: {}", other)),
        }
    }
}

#[derive(Serialize)]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    full_name: &'a str,
    confirm_password: &'a str,
}

#[derive(Serialize)]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
}

pub struct AuthClient {
    api: ApiClient,
    store: Arc<dyn SessionStore>,
}

impl AuthClient {
    pub fn new(api: ApiClient, store: Arc<dyn SessionStore>) -> Self {
        Self { api, store }
    }

    /// The session currently persisted in the store.
    pub async fn current_session(&self) -> EnuxResult<Session> {
        self.store.load().await
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<AuthOutcome, AuthError> {
        let body = SignUpRequest {
            email,
            password,
            full_name,
            confirm_password: password,
        };
        let user = self
            .authenticate(&["auth", "register"], &body, "Registration failed")
            .await?;

        info!(user_id = %user.id, "Account created");
        Ok(AuthOutcome {
            session: Session::for_user(user),
            route: None,
        })
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthOutcome, AuthError> {
        let body = SignInRequest { email, password };
        let user = self
            .authenticate(&["auth", "login"], &body, "Login failed")
            .await?;

        info!(user_id = %user.id, "Signed in");
        Ok(AuthOutcome {
            session: Session::for_user(user),
            route: Some(Route::Onboarding),
        })
    }

    /// Social sign-in is not offered by the backend yet.
    pub async fn sign_in_with_provider(&self, provider: Provider) -> Result<AuthOutcome, AuthError> {
        let err = EnuxError::ProviderNotImplemented(provider.to_string());
        warn!(error_code = err.error_code(), "{}", err);
        Err(AuthError::new(
            format!("{} authentication is not yet implemented", provider),
            None,
        ))
    }

    pub async fn sign_out(&self) -> EnuxResult<Route> {
        self.store.clear().await?;
        info!("Signed out");
        Ok(Route::Root)
    }

    async fn authenticate<B: Serialize>(
        &self,
        path: &[&str],
        body: &B,
        fallback: &str,
    ) -> Result<AuthUser, AuthError> {
        let response = self
            .api
            .public(Method::POST, path)
            .map_err(|e| AuthError::new(e.to_string(), None))?
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!("Auth request failed: {}", e);
                AuthError::new(NETWORK_ERROR_MESSAGE, None)
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AuthError::new(e.to_string(), Some(status.as_u16())))?;

        if !status.is_success() {
            let message =
                error_message(&text, &["detail", "message"]).unwrap_or_else(|| fallback.to_string());
            return Err(AuthError::new(message, Some(status.as_u16())));
        }

        let user: AuthUser = serde_json::from_str(&text).map_err(|e| {
            AuthError::new(
                EnuxError::ResponseParse(e.to_string()).to_string(),
                Some(status.as_u16()),
            )
        })?;

        self.store
            .save(&user)
            .await
            .map_err(|e| AuthError::new(e.to_string(), None))?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySessionStore;

    fn client() -> AuthClient {
        AuthClient::new(
            ApiClient::with_client(reqwest::Client::new(), "http://127.0.0.1:9"),
            Arc::new(MemorySessionStore::new()),
        )
    }

    #[tokio::test]
    async fn test_provider_sign_in_not_implemented() {
        let err = client()
            .sign_in_with_provider(Provider::Github)
            .await
            .unwrap_err();
        assert_eq!(err.message, "github authentication is not yet implemented");
        assert_eq!(err.status, None);
    }

    #[tokio::test]
    async fn test_sign_out_returns_root() {
        assert_eq!(client().sign_out().await.unwrap(), Route::Root);
    }

    #[test]
    fn test_auth_error_into_enux_error() {
        let err: EnuxError = AuthError::new("Invalid credentials", Some(401)).into();
        assert!(err.is_auth_error());
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn test_provider_parse() {
        assert_eq!("GitHub".parse::<Provider>().unwrap(), Provider::Github);
        assert!("facebook".parse::<Provider>().is_err());
    }
}
