use reqwest::multipart::{Form, Part};
use reqwest::Method;
use tracing::{debug, info};

use super::ApiClient;
use crate::error::{EnuxError, EnuxResult};
use crate::models::{
    CounterResponse, Fork, ForkRequest, ForkResponse, Playbook, PlaybookUploadRequest,
    PlaybookUploadResponse, PlaybookVersion, SearchResult,
};
use crate::session::Session;

impl ApiClient {
    pub async fn get_playbook(&self, session: &Session, id: &str) -> EnuxResult<Playbook> {
        let path = ["playbooks", id];
        Self::send_json(self.authorized(session, Method::GET, &path)?).await
    }

    /// Fork `source` into the signed-in user's account. Forking one's own
    /// playbook is rejected locally.
    pub async fn fork_playbook(
        &self,
        session: &Session,
        source: &Playbook,
    ) -> EnuxResult<ForkResponse> {
        let request = self.authorized(session, Method::POST, &["playbooks", "fork"])?;

        if let Some(user_id) = session.user_id() {
            if source.is_owned_by(user_id) {
                return Err(EnuxError::SelfFork {
                    playbook_id: source.id.clone(),
                });
            }
        }

        let body = ForkRequest {
            playbook_id: source.id.clone(),
        };
        let response: ForkResponse = Self::send_json(request.json(&body)).await?;
        info!(
            source_playbook_id = %source.id,
            new_playbook_id = %response.new_playbook_id,
            "Playbook forked"
        );
        Ok(response)
    }

    pub async fn star_playbook(&self, session: &Session, id: &str) -> EnuxResult<u64> {
        let path = ["playbooks", id, "star"];
        let counter: CounterResponse =
            Self::send_json(self.authorized(session, Method::POST, &path)?).await?;
        Ok(counter.count)
    }

    pub async fn unstar_playbook(&self, session: &Session, id: &str) -> EnuxResult<u64> {
        let path = ["playbooks", id, "star"];
        let counter: CounterResponse =
            Self::send_json(self.authorized(session, Method::DELETE, &path)?).await?;
        Ok(counter.count)
    }

    pub async fn increment_playbook_view(&self, session: &Session, id: &str) -> EnuxResult<u64> {
        let path = ["playbooks", id, "view"];
        let counter: CounterResponse =
            Self::send_json(self.authorized(session, Method::POST, &path)?).await?;
        Ok(counter.count)
    }

    pub async fn get_playbook_forks(&self, session: &Session, id: &str) -> EnuxResult<Vec<Fork>> {
        let path = ["playbooks", id, "forks"];
        Self::send_json(self.authorized(session, Method::GET, &path)?).await
    }

    /// Version history, oldest first.
    pub async fn get_playbook_versions(
        &self,
        session: &Session,
        id: &str,
    ) -> EnuxResult<Vec<PlaybookVersion>> {
        let path = ["playbooks", id, "versions"];
        let mut versions: Vec<PlaybookVersion> =
            Self::send_json(self.authorized(session, Method::GET, &path)?).await?;
        versions.sort_by_key(|v| v.version_number);
        Ok(versions)
    }

    pub async fn search_playbooks(
        &self,
        session: &Session,
        query: &str,
        limit: Option<u32>,
    ) -> EnuxResult<Vec<SearchResult>> {
        let mut request = self
            .authorized(session, Method::GET, &["playbooks", "search", "vector"])?
            .query(&[("query", query)]);
        if let Some(limit) = limit.filter(|l| *l > 0) {
            request = request.query(&[("limit", limit)]);
        }
        Self::send_json(request).await
    }

    /// Create a playbook from text fields plus attached files, sent as
    /// multipart form data.
    pub async fn upload_playbook(
        &self,
        session: &Session,
        upload: &PlaybookUploadRequest,
    ) -> EnuxResult<PlaybookUploadResponse> {
        let request = self.authorized(session, Method::POST, &["playbooks", "upload"])?;

        if upload.title.trim().is_empty() {
            return Err(EnuxError::field_required("Title"));
        }

        let mut form = Form::new()
            .text("title", upload.title.clone())
            .text("description", upload.description.clone())
            .text("owner_id", upload.owner_id.clone())
            .text("blog_content", upload.blog_content.clone());

        for file in &upload.files {
            let bytes = tokio::fs::read(&file.path).await?;
            debug!(file = %file.path.display(), size = bytes.len(), "Attaching file");

            let mut part = Part::bytes(bytes).file_name(file.file_name());
            if let Some(content_type) = &file.content_type {
                part = part.mime_str(content_type).map_err(|e| {
                    EnuxError::Internal(format!("Invalid content type '{}': {}", content_type, e))
                })?;
            }
            form = form.part("files", part);
        }

        let response: PlaybookUploadResponse = Self::send_json(request.multipart(form)).await?;
        info!(playbook_id = %response.playbook.id, "Playbook uploaded");
        Ok(response)
    }
}
