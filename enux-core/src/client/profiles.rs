use reqwest::Method;
use tracing::info;

use super::ApiClient;
use crate::error::{EnuxError, EnuxResult};
use crate::models::{Profile, ProfileUpdate};
use crate::session::Session;

const PROFILE_PATH: [&str; 2] = ["profiles", "me"];

impl ApiClient {
    pub async fn get_profile(&self, session: &Session) -> EnuxResult<Profile> {
        Self::send_json(self.authorized(session, Method::GET, &PROFILE_PATH)?).await
    }

    /// Save `update` and return the profile as stored afterwards.
    ///
    /// An invalid website is rejected before any request is sent.
    pub async fn update_profile(
        &self,
        session: &Session,
        update: &ProfileUpdate,
    ) -> EnuxResult<Profile> {
        let request = self.authorized(session, Method::PUT, &PROFILE_PATH)?;
        let user = session.user().ok_or(EnuxError::AuthTokenMissing)?;
        let body = update.to_request(user)?;

        Self::send_empty(request.json(&body)).await?;
        info!(user_id = %user.id, "Profile updated");

        self.get_profile(session).await
    }
}
