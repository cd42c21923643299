use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::{EnuxError, EnuxResult};
use crate::models::{ManagePolicy, PullRequest, PullRequestAction};
use crate::session::Session;

/// Marks a pull request as busy for as long as it is alive.
struct InFlight<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool, pull_request_id: &str) -> EnuxResult<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| EnuxError::ActionInProgress(pull_request_id.to_string()))?;
        Ok(Self { flag })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Drives one pull request through merge, close, or decline.
///
/// Every action is checked locally first: the user must be allowed by the
/// [`ManagePolicy`], the current status must permit the transition, and no
/// other action may be running. Only then is the request sent.
pub struct PullRequestWorkflow {
    client: ApiClient,
    policy: ManagePolicy,
    pull_request: RwLock<PullRequest>,
    in_flight: AtomicBool,
}

impl PullRequestWorkflow {
    pub fn new(client: ApiClient, pull_request: PullRequest, policy: ManagePolicy) -> Self {
        Self {
            client,
            policy,
            pull_request: RwLock::new(pull_request),
            in_flight: AtomicBool::new(false),
        }
    }

    pub async fn pull_request(&self) -> PullRequest {
        self.pull_request.read().await.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Actions to offer `user_id` right now. Empty while busy, once terminal,
    /// or when the policy does not allow the user to manage the pull request.
    pub async fn available_actions(&self, user_id: Option<&str>) -> Vec<PullRequestAction> {
        if self.is_busy() {
            return Vec::new();
        }

        let pull_request = self.pull_request.read().await;
        match user_id {
            Some(user_id) if pull_request.is_open() && self.policy.allows(user_id, &pull_request) => {
                PullRequestAction::ALL.to_vec()
            }
            _ => Vec::new(),
        }
    }

    pub async fn merge(
        &self,
        session: &Session,
        merge_message: Option<&str>,
    ) -> EnuxResult<PullRequest> {
        self.perform(session, PullRequestAction::Merge, merge_message).await
    }

    pub async fn close(&self, session: &Session) -> EnuxResult<PullRequest> {
        self.perform(session, PullRequestAction::Close, None).await
    }

    pub async fn decline(&self, session: &Session) -> EnuxResult<PullRequest> {
        self.perform(session, PullRequestAction::Decline, None).await
    }

    /// Run `action`. `merge_message` is only sent for merges.
    pub async fn perform(
        &self,
        session: &Session,
        action: PullRequestAction,
        merge_message: Option<&str>,
    ) -> EnuxResult<PullRequest> {
        let (id, user_id) = self.authorize(session, action).await?;
        let _guard = InFlight::acquire(&self.in_flight, &id)?;

        match action {
            PullRequestAction::Merge => {
                let merge_message = merge_message.map(str::trim).filter(|m| !m.is_empty());
                let outcome = self
                    .client
                    .merge_pull_request(session, &id, merge_message)
                    .await?;
                let mut pull_request = self.pull_request.write().await;
                pull_request.record_merge(&outcome, Some(&user_id), merge_message, Utc::now())?;
                Ok(pull_request.clone())
            }
            PullRequestAction::Close | PullRequestAction::Decline => {
                let updated = if action == PullRequestAction::Close {
                    self.client.close_pull_request(session, &id).await?
                } else {
                    self.client.decline_pull_request(session, &id).await?
                };
                let mut pull_request = self.pull_request.write().await;
                pull_request.record_status(action, updated, Utc::now())?;
                Ok(pull_request.clone())
            }
        }
    }

    /// Local checks shared by every action. Returns the pull request id and
    /// the acting user's id.
    async fn authorize(
        &self,
        session: &Session,
        action: PullRequestAction,
    ) -> EnuxResult<(String, String)> {
        session.bearer_token()?;
        let user_id = session
            .user_id()
            .ok_or(EnuxError::AuthTokenMissing)?
            .to_string();

        let pull_request = self.pull_request.read().await;
        if !self.policy.allows(&user_id, &pull_request) {
            return Err(EnuxError::NotPermitted {
                action,
                pull_request_id: pull_request.id.clone(),
            });
        }
        pull_request.status.transition(action)?;

        debug!(pull_request_id = %pull_request.id, action = %action, "Action permitted");
        Ok((pull_request.id.clone(), user_id))
    }
}
