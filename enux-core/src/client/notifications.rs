use reqwest::Method;
use serde::Serialize;

use super::ApiClient;
use crate::error::EnuxResult;
use crate::models::{Notification, NotificationCount};
use crate::session::Session;

#[derive(Debug, Serialize)]
struct MarkReadRequest<'a> {
    notification_ids: &'a [String],
}

impl ApiClient {
    pub async fn get_notifications(
        &self,
        session: &Session,
        limit: Option<u32>,
    ) -> EnuxResult<Vec<Notification>> {
        let mut request =
            self.authorized(session, Method::GET, &["playbooks", "notifications"])?;
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit)]);
        }
        Self::send_json(request).await
    }

    pub async fn get_notification_count(&self, session: &Session) -> EnuxResult<NotificationCount> {
        let path = ["playbooks", "notifications", "count"];
        Self::send_json(self.authorized(session, Method::GET, &path)?).await
    }

    pub async fn mark_notifications_as_read(
        &self,
        session: &Session,
        ids: &[String],
    ) -> EnuxResult<()> {
        let request = self
            .authorized(
                session,
                Method::POST,
                &["playbooks", "notifications", "mark-read"],
            )?
            .json(&MarkReadRequest {
                notification_ids: ids,
            });
        Self::send_empty(request).await
    }

    pub async fn mark_all_notifications_as_read(&self, session: &Session) -> EnuxResult<()> {
        Self::send_empty(self.authorized(
            session,
            Method::POST,
            &["playbooks", "notifications", "mark-all-read"],
        )?)
        .await
    }

    pub async fn delete_notification(&self, session: &Session, id: &str) -> EnuxResult<()> {
        let path = ["playbooks", "notifications", id];
        Self::send_empty(self.authorized(session, Method::DELETE, &path)?).await
    }
}
