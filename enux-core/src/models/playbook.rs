use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::lenient_u32;

/// A versioned business playbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playbook {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "author_id", alias = "user_id")]
    pub owner_id: Option<String>,
    #[serde(default, alias = "visibility")]
    pub stage: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub blog_content: Option<String>,
    #[serde(
        default,
        alias = "version",
        deserialize_with = "lenient_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub version_number: Option<u32>,
    #[serde(default)]
    pub current_version_id: Option<String>,
    #[serde(default)]
    pub forked_from: Option<String>,
    #[serde(default)]
    pub forked_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub forked_version: Option<u32>,
    #[serde(default, alias = "forks")]
    pub forks_count: u64,
    #[serde(default, alias = "stars")]
    pub stars_count: u64,
    #[serde(default, alias = "views")]
    pub views_count: u64,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Playbook {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id.as_deref() == Some(user_id)
    }

    pub fn is_fork(&self) -> bool {
        self.forked_from.is_some()
    }

    pub fn content(&self) -> &str {
        self.blog_content.as_deref().unwrap_or_default()
    }
}

/// Immutable snapshot of a playbook's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybookVersion {
    pub id: String,
    pub playbook_id: String,
    pub version_number: u32,
    #[serde(default)]
    pub parent_version_id: Option<String>,
    #[serde(default, alias = "blog_content")]
    pub content: Option<String>,
    #[serde(default, alias = "commit_message")]
    pub message: Option<String>,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub pull_request_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Record of a user forking a playbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fork {
    #[serde(default)]
    pub id: Option<String>,
    pub source_playbook_id: String,
    #[serde(default)]
    pub forked_playbook_id: Option<String>,
    pub user_id: String,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(alias = "created_at")]
    pub forked_at: DateTime<Utc>,
    #[serde(
        default,
        alias = "version_at_fork",
        deserialize_with = "lenient_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub forked_version: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForkRequest {
    pub playbook_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForkResponse {
    pub status: String,
    pub new_playbook_id: String,
    #[serde(default)]
    pub new_playbook_url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Star, unstar, and view calls all answer with the counter's new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterResponse {
    #[serde(
        alias = "stars_count",
        alias = "views_count",
        alias = "star_count",
        alias = "view_count"
    )]
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub playbook: Playbook,
    pub similarity_score: f64,
}

/// A local file to attach to a playbook upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub path: PathBuf,
    pub content_type: Option<String>,
}

impl UploadFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string())
    }
}

#[derive(Debug, Clone)]
pub struct PlaybookUploadRequest {
    pub title: String,
    pub description: String,
    pub owner_id: String,
    pub blog_content: String,
    pub files: Vec<UploadFile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub size: u64,
    pub file_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybookUploadResponse {
    pub playbook: Playbook,
    #[serde(default)]
    pub files: Vec<UploadedFile>,
    #[serde(default)]
    pub processing_status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
