use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::AuthUser;
use crate::error::{EnuxError, EnuxResult};

/// The signed-in user's profile, as served by `/profiles/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub interests: Option<Vec<String>>,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    pub fn display_name(&self) -> &str {
        match self.full_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => &self.username,
        }
    }
}

/// Editable profile fields. Blank text means "not set".
///
/// Built from the stored profile so fields the user does not touch are sent
/// back unchanged. The avatar is never edited here, only carried over.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub full_name: String,
    pub bio: String,
    pub company: String,
    pub location: String,
    pub website: String,
    pub interests: Vec<String>,
    pub stage: String,
    pub avatar_url: Option<String>,
}

impl ProfileUpdate {
    pub fn from_profile(profile: &Profile) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        Self {
            full_name: text(&profile.full_name),
            bio: text(&profile.bio),
            company: text(&profile.company),
            location: text(&profile.location),
            website: text(&profile.website),
            interests: profile.interests.clone().unwrap_or_default(),
            stage: text(&profile.stage),
            avatar_url: profile.avatar_url.clone(),
        }
    }

    /// Body of the PUT call for `user`. Fails if the website is set but is
    /// not an http(s) URL.
    pub fn to_request(&self, user: &AuthUser) -> EnuxResult<ProfileUpdateRequest> {
        let interests: Vec<String> = self
            .interests
            .iter()
            .map(String::as_str)
            .filter_map(non_blank)
            .collect();

        Ok(ProfileUpdateRequest {
            user_id: user.id.clone(),
            username: user.email.clone(),
            full_name: non_blank(&self.full_name),
            bio: non_blank(&self.bio),
            company: non_blank(&self.company),
            location: non_blank(&self.location),
            website: validate_website(&self.website)?,
            interests: (!interests.is_empty()).then_some(interests),
            stage: non_blank(&self.stage),
            avatar_url: self.avatar_url.as_deref().and_then(non_blank),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileUpdateRequest {
    pub user_id: String,
    pub username: String,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub interests: Option<Vec<String>>,
    pub stage: Option<String>,
    pub avatar_url: Option<String>,
}

/// A blank website is "not set". Anything else must parse as an absolute
/// http or https URL.
pub fn validate_website(raw: &str) -> EnuxResult<Option<String>> {
    let Some(website) = non_blank(raw) else {
        return Ok(None);
    };

    let invalid = || EnuxError::InvalidField {
        field: "website",
        message: format!(
            "'{}' is not a valid URL (e.g., https://example.com)",
            website
        ),
    };
    let url = Url::parse(&website).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid());
    }
    Ok(Some(website))
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
