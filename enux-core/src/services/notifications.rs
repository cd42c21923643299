use chrono::{DateTime, Utc};
use tracing::warn;

use crate::client::ApiClient;
use crate::error::EnuxResult;
use crate::models::{Notification, NotificationType};
use crate::session::{Route, Session};

/// Cached view of the signed-in user's notifications.
///
/// There is no push channel. The list and unread count are re-polled when the
/// feed is opened and after every mutation.
pub struct NotificationFeed {
    client: ApiClient,
    limit: Option<u32>,
    notifications: Vec<Notification>,
    unread_count: u64,
}

impl NotificationFeed {
    pub fn new(client: ApiClient, limit: Option<u32>) -> Self {
        Self {
            client,
            limit,
            notifications: Vec::new(),
            unread_count: 0,
        }
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn unread_count(&self) -> u64 {
        self.unread_count
    }

    pub async fn open(&mut self, session: &Session) -> EnuxResult<()> {
        self.refresh(session).await
    }

    pub async fn refresh(&mut self, session: &Session) -> EnuxResult<()> {
        self.notifications = self.client.get_notifications(session, self.limit).await?;
        self.unread_count = self.client.get_notification_count(session).await?.unread_count;
        Ok(())
    }

    pub async fn mark_read(&mut self, session: &Session, ids: &[String]) -> EnuxResult<()> {
        self.client.mark_notifications_as_read(session, ids).await?;
        self.refresh_after_mutation(session).await;
        Ok(())
    }

    /// Mark everything read. Does nothing while the feed holds no
    /// notifications.
    pub async fn mark_all_read(&mut self, session: &Session) -> EnuxResult<()> {
        if self.notifications.is_empty() {
            return Ok(());
        }
        self.client.mark_all_notifications_as_read(session).await?;
        self.refresh_after_mutation(session).await;
        Ok(())
    }

    pub async fn delete(&mut self, session: &Session, id: &str) -> EnuxResult<()> {
        self.client.delete_notification(session, id).await?;
        self.refresh_after_mutation(session).await;
        Ok(())
    }

    /// Mark `notification` read and return where it leads.
    pub async fn activate(
        &mut self,
        session: &Session,
        notification: &Notification,
    ) -> EnuxResult<Option<Route>> {
        self.mark_read(session, std::slice::from_ref(&notification.id))
            .await?;
        Ok(target_of(notification))
    }

    async fn refresh_after_mutation(&mut self, session: &Session) {
        if let Err(e) = self.refresh(session).await {
            warn!(error_code = e.error_code(), "Failed to refresh notifications: {}", e);
        }
    }
}

/// Where following a notification should navigate.
pub fn target_of(notification: &Notification) -> Option<Route> {
    match (&notification.kind, &notification.pr_id) {
        (NotificationType::PrCreated, Some(pr_id)) => Some(Route::PullRequest(pr_id.clone())),
        _ => notification.playbook_id.clone().map(Route::Playbook),
    }
}

/// Short age label: `Just now`, `5m ago`, `3h ago`, `2d ago`.
pub fn format_relative_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - at).num_minutes();

    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        format!("{}h ago", minutes / 60)
    } else {
        format!("{}d ago", minutes / 1440)
    }
}
