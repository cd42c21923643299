use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::diff::SideBySideDiff;
use super::lenient_u32;
use crate::error::{EnuxError, EnuxResult};

/// Lifecycle status of a pull request.
///
/// `Open` is the only state with outgoing transitions; the other three are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PullRequestStatus {
    #[serde(alias = "open")]
    Open,
    #[serde(alias = "merged")]
    Merged,
    #[serde(alias = "closed")]
    Closed,
    #[serde(alias = "declined")]
    Declined,
}

impl std::fmt::Display for PullRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PullRequestStatus::Open => write!(f, "OPEN"),
            PullRequestStatus::Merged => write!(f, "MERGED"),
            PullRequestStatus::Closed => write!(f, "CLOSED"),
            PullRequestStatus::Declined => write!(f, "DECLINED"),
        }
    }
}

/// A user-triggered action that moves a pull request out of `Open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PullRequestAction {
    Merge,
    Close,
    Decline,
}

impl PullRequestAction {
    pub const ALL: [PullRequestAction; 3] = [
        PullRequestAction::Merge,
        PullRequestAction::Close,
        PullRequestAction::Decline,
    ];

    pub fn target_status(&self) -> PullRequestStatus {
        match self {
            PullRequestAction::Merge => PullRequestStatus::Merged,
            PullRequestAction::Close => PullRequestStatus::Closed,
            PullRequestAction::Decline => PullRequestStatus::Declined,
        }
    }
}

impl std::fmt::Display for PullRequestAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PullRequestAction::Merge => write!(f, "merge"),
            PullRequestAction::Close => write!(f, "close"),
            PullRequestAction::Decline => write!(f, "decline"),
        }
    }
}

impl PullRequestStatus {
    pub fn is_open(&self) -> bool {
        matches!(self, PullRequestStatus::Open)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_open()
    }

    /// The status reached by applying `action`, or an error when the current
    /// status has no such transition.
    pub fn transition(self, action: PullRequestAction) -> EnuxResult<PullRequestStatus> {
        match self {
            PullRequestStatus::Open => Ok(action.target_status()),
            from => Err(EnuxError::InvalidTransition { from, action }),
        }
    }
}

/// Who may merge, close, or decline a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManagePolicy {
    /// Only the pull request's author.
    AuthorOnly,
    /// The author or the owner of the target playbook.
    #[default]
    AuthorOrOwner,
}

impl ManagePolicy {
    pub fn allows(&self, user_id: &str, pull_request: &PullRequest) -> bool {
        let is_author = pull_request.author_id.as_deref() == Some(user_id);
        match self {
            ManagePolicy::AuthorOnly => is_author,
            ManagePolicy::AuthorOrOwner => {
                is_author || pull_request.playbook_owner_id.as_deref() == Some(user_id)
            }
        }
    }
}

impl std::str::FromStr for ManagePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "author_only" | "author" => Ok(ManagePolicy::AuthorOnly),
            "author_or_owner" | "owner" => Ok(ManagePolicy::AuthorOrOwner),
            other => Err(format!("Unknown pull request policy: {}", other)),
        }
    }
}

/// A proposed replacement of a playbook's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    pub id: String,
    #[serde(alias = "target_playbook_id")]
    pub playbook_id: String,
    #[serde(default)]
    pub source_playbook_id: Option<String>,
    #[serde(default)]
    pub playbook_title: Option<String>,
    #[serde(default)]
    pub playbook_owner_id: Option<String>,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub author_name: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub old_blog_text: Option<String>,
    #[serde(default)]
    pub new_blog_text: Option<String>,
    #[serde(default)]
    pub base_version_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub base_version_number: Option<u32>,
    #[serde(default)]
    pub new_version_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub new_version_number: Option<u32>,
    #[serde(default)]
    pub unified_diff: Option<String>,
    #[serde(default)]
    pub side_by_side_diff: Option<SideBySideDiff>,
    #[serde(default)]
    pub html_diff: Option<String>,
    #[serde(default)]
    pub additions_count: Option<u32>,
    #[serde(default)]
    pub deletions_count: Option<u32>,
    #[serde(default)]
    pub files_changed_count: Option<u32>,
    pub status: PullRequestStatus,
    #[serde(default)]
    pub merge_message: Option<String>,
    #[serde(default)]
    pub merged_by: Option<String>,
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl PullRequest {
    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }

    /// Apply a successful merge reported by the backend.
    ///
    /// The outcome must name the new version and, when the base version
    /// number is known, move past it. Otherwise `self` is left untouched.
    /// A blank merge message is recorded as none.
    pub fn record_merge(
        &mut self,
        outcome: &MergeResponse,
        merged_by: Option<&str>,
        merge_message: Option<&str>,
        at: DateTime<Utc>,
    ) -> EnuxResult<()> {
        let status = self.status.transition(PullRequestAction::Merge)?;

        let new_version_id = outcome.new_version_id.trim();
        if new_version_id.is_empty() {
            return Err(self.inconsistent_merge("no new version id was returned".to_string()));
        }
        if let Some(base) = self.base_version_number {
            if outcome.version_number <= base {
                return Err(self.inconsistent_merge(format!(
                    "new version {} does not follow base version {}",
                    outcome.version_number, base
                )));
            }
        }

        self.status = status;
        self.merged_at = Some(at);
        self.closed_at = None;
        self.merged_by = merged_by.map(str::to_string);
        self.new_version_id = Some(new_version_id.to_string());
        self.new_version_number = Some(outcome.version_number);
        self.merge_message = merge_message
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string);
        self.updated_at = Some(at);
        Ok(())
    }

    fn inconsistent_merge(&self, message: String) -> EnuxError {
        EnuxError::InconsistentMerge {
            pull_request_id: self.id.clone(),
            message,
        }
    }

    /// Apply the record returned by a close or decline call.
    ///
    /// The returned record must carry the status the action leads to; a
    /// backend answer that would move the pull request anywhere else is
    /// rejected and `self` is left untouched.
    pub fn record_status(
        &mut self,
        action: PullRequestAction,
        updated: PullRequest,
        at: DateTime<Utc>,
    ) -> EnuxResult<()> {
        let expected = self.status.transition(action)?;
        if updated.status != expected {
            return Err(EnuxError::InvalidTransition {
                from: updated.status,
                action,
            });
        }

        *self = PullRequest {
            merged_at: None,
            closed_at: updated.closed_at.or(Some(at)),
            updated_at: updated.updated_at.or(Some(at)),
            ..updated
        };
        Ok(())
    }
}

/// Body of a create-pull-request call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePullRequestRequest {
    pub title: String,
    pub description: String,
    pub new_blog_text: String,
    pub base_version_id: String,
}

impl CreatePullRequestRequest {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        new_blog_text: impl Into<String>,
        base_version_id: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            new_blog_text: new_blog_text.into(),
            base_version_id: base_version_id.into(),
        }
    }

    /// Check the fields the user types. Needs no playbook lookup, so callers
    /// can run it before fetching the target.
    pub fn check_text_fields(&self) -> EnuxResult<()> {
        if self.title.trim().is_empty() {
            return Err(EnuxError::field_required("Title"));
        }
        if self.description.trim().is_empty() {
            return Err(EnuxError::field_required("Description"));
        }
        Ok(())
    }

    /// Check the required fields and return a copy with title and description
    /// trimmed, ready to send.
    pub fn validated(&self) -> EnuxResult<Self> {
        self.check_text_fields()?;

        if self.base_version_id.trim().is_empty() {
            return Err(EnuxError::field_required("Base version"));
        }

        Ok(Self {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            new_blog_text: self.new_blog_text.clone(),
            base_version_id: self.base_version_id.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePullRequestResponse {
    pub pull_request: PullRequest,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequestList {
    #[serde(default)]
    pub pull_requests: Vec<PullRequest>,
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeResponse {
    pub status: String,
    pub new_version_id: String,
    pub version_number: u32,
    #[serde(default)]
    pub message: Option<String>,
}
