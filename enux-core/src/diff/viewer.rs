use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use super::render::{render_html, render_side_by_side, render_unified, DiffTab, DiffView};
use super::unified::DiffStats;
use crate::client::ApiClient;
use crate::error::EnuxResult;
use crate::models::{DiffFormat, DiffResponse, PullRequest};
use crate::session::Session;

/// Where the viewer gets diff payloads from.
#[async_trait]
pub trait DiffSource: Send + Sync {
    async fn fetch_diff(&self, pull_request_id: &str, format: DiffFormat)
        -> EnuxResult<DiffResponse>;
}

#[async_trait]
impl<T: DiffSource + ?Sized> DiffSource for Arc<T> {
    async fn fetch_diff(
        &self,
        pull_request_id: &str,
        format: DiffFormat,
    ) -> EnuxResult<DiffResponse> {
        (**self).fetch_diff(pull_request_id, format).await
    }
}

/// [`DiffSource`] backed by the REST API.
pub struct ApiDiffSource {
    client: ApiClient,
    session: Session,
}

impl ApiDiffSource {
    pub fn new(client: ApiClient, session: Session) -> Self {
        Self { client, session }
    }
}

#[async_trait]
impl DiffSource for ApiDiffSource {
    async fn fetch_diff(
        &self,
        pull_request_id: &str,
        format: DiffFormat,
    ) -> EnuxResult<DiffResponse> {
        self.client
            .get_pull_request_diff(&self.session, pull_request_id, format)
            .await
    }
}

/// Tabbed view over one pull request's diff.
///
/// The unified text is known up front. Side-by-side and HTML payloads are
/// requested the first time their tab is selected and kept afterwards. A
/// failed request leaves the tab unfetched so the next selection asks again.
pub struct DiffViewer<S> {
    source: S,
    pull_request_id: String,
    unified: String,
    side_by_side: Option<DiffResponse>,
    html: Option<DiffResponse>,
    active: DiffTab,
}

impl<S: DiffSource> DiffViewer<S> {
    pub fn new(source: S, pull_request: &PullRequest) -> Self {
        Self {
            source,
            pull_request_id: pull_request.id.clone(),
            unified: pull_request.unified_diff.clone().unwrap_or_default(),
            side_by_side: None,
            html: None,
            active: DiffTab::Unified,
        }
    }

    /// Replace the cached unified text with a fresh copy from the diff
    /// endpoint, keeping the pull request's copy if the response has none.
    pub async fn load_unified(&mut self) -> EnuxResult<()> {
        let response = self
            .source
            .fetch_diff(&self.pull_request_id, DiffFormat::Unified)
            .await?;
        if let Some(text) = response.unified_diff.filter(|t| !t.is_empty()) {
            self.unified = text;
        }
        Ok(())
    }

    pub fn active_tab(&self) -> DiffTab {
        self.active
    }

    pub fn unified_diff(&self) -> &str {
        &self.unified
    }

    pub fn stats(&self) -> DiffStats {
        DiffStats::from_unified(&self.unified)
    }

    pub fn is_fetched(&self, tab: DiffTab) -> bool {
        match tab {
            DiffTab::Unified => true,
            DiffTab::SideBySide => self.side_by_side.is_some(),
            DiffTab::Html => self.html.is_some(),
        }
    }

    /// Switch to `tab`, fetching its payload if this is the first visit.
    pub async fn select(&mut self, tab: DiffTab) -> DiffView {
        self.active = tab;

        let format = match tab {
            DiffTab::Unified => return self.view(),
            DiffTab::SideBySide => DiffFormat::SideBySide,
            DiffTab::Html => DiffFormat::Html,
        };

        if !self.is_fetched(tab) {
            debug!(pull_request_id = %self.pull_request_id, format = %format, "Fetching diff");
            match self.source.fetch_diff(&self.pull_request_id, format).await {
                Ok(response) => match tab {
                    DiffTab::SideBySide => self.side_by_side = Some(response),
                    DiffTab::Html => self.html = Some(response),
                    DiffTab::Unified => {}
                },
                Err(e) => {
                    warn!(
                        pull_request_id = %self.pull_request_id,
                        format = %format,
                        error_code = e.error_code(),
                        "Failed to fetch diff: {}",
                        e
                    );
                }
            }
        }

        self.view()
    }

    /// Render the active tab from what is already cached.
    pub fn view(&self) -> DiffView {
        match self.active {
            DiffTab::Unified => render_unified(&self.unified),
            DiffTab::SideBySide => render_side_by_side(
                self.side_by_side
                    .as_ref()
                    .and_then(|r| r.side_by_side_diff.as_ref()),
            ),
            DiffTab::Html => render_html(self.html.as_ref().and_then(|r| r.html_diff.as_deref())),
        }
    }
}
