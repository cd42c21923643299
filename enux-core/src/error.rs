//! Error types for the Enux core library.
//!
//! Every failure a playbook or pull request operation can produce is a variant
//! of [`EnuxError`]. Precondition failures are raised before any request is
//! sent; transport and server failures come back from the HTTP layer.
//!
//! # Error Codes Reference
//!
//! | Code Range | Category | Description |
//! |------------|----------|-------------|
//! | E1001-E1099 | Auth | Missing token, rejected sign-in, unsupported providers |
//! | E2001-E2099 | Precondition | Required or invalid fields, self-fork/self-PR, permissions, in-flight actions |
//! | E3001-E3099 | Lifecycle | Pull request status transitions and merge outcomes |
//! | E4001-E4099 | Transport | Network failures, server rejections, unparseable responses |
//! | E5001-E5099 | Config | Configuration file and value errors |
//! | E9001-E9099 | General | Internal, IO, and serialization errors |

use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::models::{PullRequestAction, PullRequestStatus};

pub const MISSING_TOKEN_MESSAGE: &str = "Authentication token not found. Please sign in again.";

pub const NETWORK_ERROR_MESSAGE: &str =
    "Network error: Unable to connect to the server. Please check your internet connection.";

/// The main error type for the Enux core library.
#[derive(Debug, Error)]
pub enum EnuxError {
    // ========================================================================
    // Auth Errors (E1001-E1099)
    // ========================================================================
    /// No bearer token could be resolved from the session
    #[error("[E1001] {}", MISSING_TOKEN_MESSAGE)]
    AuthTokenMissing,

    /// Sign-in or sign-up was rejected
    #[error("[E1002] Authentication failed: {message}")]
    AuthenticationFailed {
        message: String,
        status: Option<u16>,
    },

    /// Social provider sign-in is declared but not available
    #[error("[E1003] {0} authentication is not yet implemented")]
    ProviderNotImplemented(String),

    /// The stored session could not be decoded
    #[error("[E1004] Stored session is malformed: {0}")]
    MalformedSession(String),

    // ========================================================================
    // Precondition Errors (E2001-E2099)
    // ========================================================================
    /// A required form field was blank
    #[error("[E2001] {field} required")]
    FieldRequired { field: &'static str },

    /// The owner tried to fork their own playbook
    #[error("[E2002] You cannot fork your own playbook")]
    SelfFork { playbook_id: String },

    /// The owner tried to open a pull request against their own playbook
    #[error("[E2003] You cannot open a pull request against your own playbook")]
    SelfPullRequest { playbook_id: String },

    /// The signed-in user may not merge, close, or decline this pull request
    #[error("[E2004] Not permitted to {action} pull request {pull_request_id}")]
    NotPermitted {
        action: PullRequestAction,
        pull_request_id: String,
    },

    /// Another action on the same pull request has not completed yet
    #[error("[E2005] An action is already in progress for pull request {0}")]
    ActionInProgress(String),

    /// A form field was filled in but its value is unusable
    #[error("[E2006] Invalid {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },

    // ========================================================================
    // Lifecycle Errors (E3001-E3099)
    // ========================================================================
    /// The requested status change is not allowed from the current status
    #[error("[E3001] Cannot {action} a pull request that is {from}")]
    InvalidTransition {
        from: PullRequestStatus,
        action: PullRequestAction,
    },

    /// The backend reported a merge that does not produce a newer version
    #[error("[E3002] Merge of pull request {pull_request_id} is inconsistent: {message}")]
    InconsistentMerge {
        pull_request_id: String,
        message: String,
    },

    // ========================================================================
    // Transport Errors (E4001-E4099)
    // ========================================================================
    /// The request never reached the server
    #[error("[E4001] {}", NETWORK_ERROR_MESSAGE)]
    Network(String),

    /// The server answered with a non-2xx status
    #[error("[E4002] {message}")]
    ServerRejected { status: u16, message: String },

    /// The response body could not be decoded
    #[error("[E4003] Failed to parse server response: {0}")]
    ResponseParse(String),

    // ========================================================================
    // Config Errors (E5001-E5099)
    // ========================================================================
    /// Configuration could not be read or parsed
    #[error("[E5001] Failed to parse configuration: {0}")]
    ConfigParseError(String),

    /// A configuration value is present but unusable
    #[error("[E5002] Invalid configuration value for '{key}': {message}")]
    InvalidConfigValue { key: String, message: String },

    // ========================================================================
    // General Errors (E9001-E9099)
    // ========================================================================
    /// Internal error
    #[error("[E9001] Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("[E9002] IO error: {0}")]
    IoError(String),

    /// Serialization error
    #[error("[E9003] Serialization error: {0}")]
    SerializationError(String),
}

/// Result type alias using EnuxError.
pub type EnuxResult<T> = Result<T, EnuxError>;

impl EnuxError {
    pub fn field_required(field: &'static str) -> Self {
        EnuxError::FieldRequired { field }
    }

    pub fn server_rejected(status: u16, message: impl Into<String>) -> Self {
        EnuxError::ServerRejected {
            status,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for EnuxError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_request() {
            EnuxError::Network(err.to_string())
        } else if err.is_decode() {
            EnuxError::ResponseParse(err.to_string())
        } else if let Some(status) = err.status() {
            EnuxError::server_rejected(status.as_u16(), format!("HTTP error {}", status.as_u16()))
        } else {
            EnuxError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for EnuxError {
    fn from(err: serde_json::Error) -> Self {
        EnuxError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for EnuxError {
    fn from(err: std::io::Error) -> Self {
        EnuxError::IoError(err.to_string())
    }
}

impl From<config::ConfigError> for EnuxError {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound(key) => EnuxError::InvalidConfigValue {
                key,
                message: "Key not found".to_string(),
            },
            config::ConfigError::FileParse { uri, cause } => EnuxError::ConfigParseError(
                format!("Failed to parse {}: {}", uri.unwrap_or_default(), cause),
            ),
            config::ConfigError::Type {
                origin,
                unexpected,
                expected,
                key,
            } => EnuxError::InvalidConfigValue {
                key: key.unwrap_or_else(|| origin.map(|o| o.to_string()).unwrap_or_default()),
                message: format!("Expected {}, got {}", expected, unexpected),
            },
            _ => EnuxError::ConfigParseError(err.to_string()),
        }
    }
}

impl From<crate::config::ConfigLoadError> for EnuxError {
    fn from(err: crate::config::ConfigLoadError) -> Self {
        match err {
            crate::config::ConfigLoadError::Config(e) => e.into(),
            crate::config::ConfigLoadError::InvalidValue { key, message } => {
                EnuxError::InvalidConfigValue { key, message }
            }
            crate::config::ConfigLoadError::MissingRequired(key) => EnuxError::InvalidConfigValue {
                key,
                message: "Missing required value".to_string(),
            },
        }
    }
}

// ============================================================================
// Error categorization helpers
// ============================================================================

impl EnuxError {
    /// Returns true if the error was raised before any request was sent.
    pub fn is_precondition_error(&self) -> bool {
        matches!(
            self,
            EnuxError::AuthTokenMissing
                | EnuxError::ProviderNotImplemented(_)
                | EnuxError::FieldRequired { .. }
                | EnuxError::SelfFork { .. }
                | EnuxError::SelfPullRequest { .. }
                | EnuxError::NotPermitted { .. }
                | EnuxError::ActionInProgress(_)
                | EnuxError::InvalidField { .. }
                | EnuxError::InvalidTransition { .. }
        )
    }

    /// Returns true if this error is related to authentication.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            EnuxError::AuthTokenMissing
                | EnuxError::AuthenticationFailed { .. }
                | EnuxError::ProviderNotImplemented(_)
                | EnuxError::MalformedSession(_)
        )
    }

    /// Returns true if the request could not reach the server.
    pub fn is_network_error(&self) -> bool {
        matches!(self, EnuxError::Network(_))
    }

    /// Returns true if the server rejected the request.
    pub fn is_server_error(&self) -> bool {
        matches!(self, EnuxError::ServerRejected { .. })
    }

    /// HTTP status of a rejected request, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            EnuxError::ServerRejected { status, .. } => Some(*status),
            EnuxError::AuthenticationFailed { status, .. } => *status,
            _ => None,
        }
    }

    /// Returns an error code suitable for logging or external reporting.
    pub fn error_code(&self) -> &'static str {
        match self {
            EnuxError::AuthTokenMissing => "E1001",
            EnuxError::AuthenticationFailed { .. } => "E1002",
            EnuxError::ProviderNotImplemented(_) => "E1003",
            EnuxError::MalformedSession(_) => "E1004",
            EnuxError::FieldRequired { .. } => "E2001",
            EnuxError::SelfFork { .. } => "E2002",
            EnuxError::SelfPullRequest { .. } => "E2003",
            EnuxError::NotPermitted { .. } => "E2004",
            EnuxError::ActionInProgress(_) => "E2005",
            EnuxError::InvalidField { .. } => "E2006",
            EnuxError::InvalidTransition { .. } => "E3001",
            EnuxError::InconsistentMerge { .. } => "E3002",
            EnuxError::Network(_) => "E4001",
            EnuxError::ServerRejected { .. } => "E4002",
            EnuxError::ResponseParse(_) => "E4003",
            EnuxError::ConfigParseError(_) => "E5001",
            EnuxError::InvalidConfigValue { .. } => "E5002",
            EnuxError::Internal(_) => "E9001",
            EnuxError::IoError(_) => "E9002",
            EnuxError::SerializationError(_) => "E9003",
        }
    }

    /// Returns a user-friendly suggestion for how to resolve this error.
    pub fn user_suggestion(&self) -> Option<&'static str> {
        match self {
            EnuxError::AuthTokenMissing => Some("Run 'enux auth sign-in' and try again"),
            EnuxError::ProviderNotImplemented(_) => {
                Some("Sign in with your email and password instead")
            }
            EnuxError::SelfFork { .. } => Some("Edit the playbook directly instead of forking it"),
            EnuxError::SelfPullRequest { .. } => {
                Some("Edit the playbook directly instead of opening a pull request")
            }
            EnuxError::ActionInProgress(_) => {
                Some("Wait for the current action to finish before trying again")
            }
            EnuxError::InvalidTransition { .. } => {
                Some("Only open pull requests can be merged, closed, or declined")
            }
            EnuxError::InconsistentMerge { .. } => {
                Some("Run 'enux prs show' to reload the pull request from the server")
            }
            EnuxError::Network(_) => Some("Check that the Enux API is reachable at ENUX_API_URL"),
            EnuxError::ConfigParseError(_) | EnuxError::InvalidConfigValue { .. } => {
                Some("Check enux.toml and ENUX_* environment variables")
            }
            _ => None,
        }
    }

    /// Record this error for diagnostics. Callers that show the error to the
    /// user themselves get it again only with debug logging on.
    pub fn log(&self) {
        debug!(
            error_code = %self.error_code(),
            precondition = self.is_precondition_error(),
            suggestion = self.user_suggestion(),
            "Request not completed: {}",
            self
        );
    }
}

// ============================================================================
// User-friendly error formatting for CLI
// ============================================================================

/// Format an error for CLI display with its suggestion.
pub struct CliErrorDisplay<'a> {
    error: &'a EnuxError,
    show_suggestion: bool,
}

impl<'a> CliErrorDisplay<'a> {
    pub fn new(error: &'a EnuxError) -> Self {
        Self {
            error,
            show_suggestion: true,
        }
    }

    pub fn without_suggestion(mut self) -> Self {
        self.show_suggestion = false;
        self
    }
}

impl<'a> fmt::Display for CliErrorDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.error)?;

        if self.show_suggestion {
            if let Some(suggestion) = self.error.user_suggestion() {
                writeln!(f)?;
                writeln!(f, "  Suggestion: {}", suggestion)?;
            }
        }

        Ok(())
    }
}
