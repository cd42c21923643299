#![allow(clippy::needless_borrows_for_generic_args, clippy::type_complexity)]

pub mod auth;
pub mod client;
pub mod config;
pub mod diff;
pub mod error;
pub mod models;
pub mod services;
pub mod session;

pub use auth::{AuthClient, AuthError, AuthOutcome, Provider};
pub use client::ApiClient;
pub use config::{
    get_config_dir, get_data_dir, ApiConfig, ConfigLoadError, DisplayConfig, EnuxConfig,
    LoggingConfig, PolicyConfig, SessionConfig,
};
pub use diff::{
    classify_line, render_html, render_side_by_side, render_unified, ApiDiffSource, DiffSource,
    DiffStats, DiffTab, DiffView, DiffViewer, SideBySideView, UnifiedLine, UnifiedLineKind,
};
pub use error::{
    CliErrorDisplay, EnuxError, EnuxResult, MISSING_TOKEN_MESSAGE, NETWORK_ERROR_MESSAGE,
};
pub use models::{
    validate_website, AuthUser, CreatePullRequestRequest, CreatePullRequestResponse, DiffFormat,
    DiffLine, DiffResponse, Fork, ForkResponse, LineKind, ManagePolicy, MergeResponse,
    Notification, NotificationCount, NotificationType, Playbook, PlaybookUploadRequest,
    PlaybookUploadResponse, PlaybookVersion, Profile, ProfileUpdate, PullRequest,
    PullRequestAction, PullRequestList, PullRequestStatus, SearchResult, SideBySideDiff,
    UploadFile,
};
pub use services::{format_relative_time, target_of, NotificationFeed, PullRequestWorkflow};
pub use session::{FileSessionStore, MemorySessionStore, Route, Session, SessionStore};
