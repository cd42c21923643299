mod diff;
mod notification;
mod playbook;
mod profile;
mod pull_request;
mod user;

pub use diff::{DiffFormat, DiffLine, DiffResponse, LineKind, SideBySideDiff};
pub use notification::{Notification, NotificationCount, NotificationType};
pub use playbook::{
    CounterResponse, Fork, ForkRequest, ForkResponse, Playbook, PlaybookUploadRequest,
    PlaybookUploadResponse, PlaybookVersion, SearchResult, UploadFile, UploadedFile,
};
pub use profile::{validate_website, Profile, ProfileUpdate, ProfileUpdateRequest};
pub use pull_request::{
    CreatePullRequestRequest, CreatePullRequestResponse, ManagePolicy, MergeResponse, PullRequest,
    PullRequestAction, PullRequestList, PullRequestStatus,
};
pub use user::AuthUser;

use serde::{Deserialize, Deserializer};

/// Version counters arrive as numbers from the versions API and as numeric
/// strings on playbook records.
pub(crate) fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u32),
        Text(String),
    }

    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::Text(s)) => {
            let trimmed = s.trim().trim_start_matches(['v', 'V']);
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<u32>()
                .map(Some)
                .map_err(serde::de::Error::custom)
        }
    }
}
