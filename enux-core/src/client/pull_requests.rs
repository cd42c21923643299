use reqwest::Method;
use tracing::info;

use super::ApiClient;
use crate::error::{EnuxError, EnuxResult};
use crate::models::{
    CreatePullRequestRequest, CreatePullRequestResponse, DiffFormat, DiffResponse, MergeResponse,
    Playbook, PullRequest, PullRequestList,
};
use crate::session::Session;

impl ApiClient {
    /// Open a pull request against `target`.
    ///
    /// Blank title or description and the owner proposing to their own
    /// playbook are rejected before any request is sent.
    pub async fn create_pull_request(
        &self,
        session: &Session,
        target: &Playbook,
        request: &CreatePullRequestRequest,
    ) -> EnuxResult<CreatePullRequestResponse> {
        let body = request.validated()?;

        if let Some(user_id) = session.user_id() {
            if target.is_owned_by(user_id) {
                return Err(EnuxError::SelfPullRequest {
                    playbook_id: target.id.clone(),
                });
            }
        }

        let path = ["pull-requests", "playbooks", target.id.as_str(), "pull-requests"];
        let response: CreatePullRequestResponse =
            Self::send_json(self.authorized(session, Method::POST, &path)?.json(&body)).await?;

        info!(
            pull_request_id = %response.pull_request.id,
            playbook_id = %target.id,
            "Pull request opened"
        );
        Ok(response)
    }

    pub async fn get_pull_requests(
        &self,
        session: &Session,
        playbook_id: &str,
    ) -> EnuxResult<PullRequestList> {
        let path = ["pull-requests", "playbooks", playbook_id, "pull-requests"];
        Self::send_json(self.authorized(session, Method::GET, &path)?).await
    }

    pub async fn get_pull_request(&self, session: &Session, id: &str) -> EnuxResult<PullRequest> {
        let path = ["pull-requests", id];
        Self::send_json(self.authorized(session, Method::GET, &path)?).await
    }

    pub async fn get_pull_request_diff(
        &self,
        session: &Session,
        id: &str,
        format: DiffFormat,
    ) -> EnuxResult<DiffResponse> {
        let path = ["pull-requests", id, "diff"];
        let request = self
            .authorized(session, Method::GET, &path)?
            .query(&[("format", format.as_query())]);
        Self::send_json(request).await
    }

    /// Merge a pull request. A blank message is not sent.
    pub async fn merge_pull_request(
        &self,
        session: &Session,
        id: &str,
        merge_message: Option<&str>,
    ) -> EnuxResult<MergeResponse> {
        let path = ["pull-requests", id, "merge"];
        let mut request = self.authorized(session, Method::POST, &path)?;
        if let Some(message) = merge_message.map(str::trim).filter(|m| !m.is_empty()) {
            request = request.query(&[("merge_message", message)]);
        }

        let response: MergeResponse = Self::send_json(request).await?;
        info!(
            pull_request_id = id,
            new_version_id = %response.new_version_id,
            version_number = response.version_number,
            "Pull request merged"
        );
        Ok(response)
    }

    pub async fn close_pull_request(&self, session: &Session, id: &str) -> EnuxResult<PullRequest> {
        let path = ["pull-requests", id, "close"];
        let pull_request: PullRequest =
            Self::send_json(self.authorized(session, Method::POST, &path)?).await?;
        info!(pull_request_id = id, "Pull request closed");
        Ok(pull_request)
    }

    pub async fn decline_pull_request(
        &self,
        session: &Session,
        id: &str,
    ) -> EnuxResult<PullRequest> {
        let path = ["pull-requests", id, "decline"];
        let pull_request: PullRequest =
            Self::send_json(self.authorized(session, Method::POST, &path)?).await?;
        info!(pull_request_id = id, "Pull request declined");
        Ok(pull_request)
    }
}
