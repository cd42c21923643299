use enux_core::{
    ApiClient, AuthUser, EnuxError, ManagePolicy, PullRequest, PullRequestAction,
    PullRequestStatus, PullRequestWorkflow, Session,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> ApiClient {
    ApiClient::with_client(reqwest::Client::new(), format!("{}/api/v1", server.uri()))
}

fn signed_in(user_id: &str) -> Session {
    Session::for_user(AuthUser {
        id: user_id.to_string(),
        email: format!("{}@example.com", user_id),
        full_name: String::new(),
        created_at: None,
        access_token: Some("tok".to_string()),
    })
}

fn pull_request_json(status: &str) -> serde_json::Value {
    json!({
        "id": "pr-1",
        "playbook_id": "pb-1",
        "playbook_owner_id": "owner",
        "author_id": "author",
        "title": "Refine ICP",
        "base_version_id": "v8",
        "base_version_number": 8,
        "status": status
    })
}

fn open_pull_request() -> PullRequest {
    serde_json::from_value(pull_request_json("OPEN")).unwrap()
}

fn merge_response() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "status": "success",
        "new_version_id": "v9",
        "version_number": 9,
        "message": "Pull request merged successfully"
    }))
}

#[tokio::test]
async fn test_merge_moves_pull_request_to_merged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/pull-requests/pr-1/merge"))
        .respond_with(merge_response())
        .expect(1)
        .mount(&server)
        .await;

    let workflow =
        PullRequestWorkflow::new(client(&server), open_pull_request(), ManagePolicy::default());
    let session = signed_in("owner");

    let merged = workflow.merge(&session, Some("Looks good")).await.unwrap();

    assert_eq!(merged.status, PullRequestStatus::Merged);
    assert!(merged.merged_at.is_some());
    assert!(merged.closed_at.is_none());
    assert_eq!(merged.new_version_id.as_deref(), Some("v9"));
    assert!(merged.new_version_number.unwrap() > merged.base_version_number.unwrap());
    assert_eq!(merged.merged_by.as_deref(), Some("owner"));
    assert_eq!(merged.merge_message.as_deref(), Some("Looks good"));

    assert!(workflow.available_actions(Some("owner")).await.is_empty());

    let again = workflow.merge(&session, None).await.unwrap_err();
    assert!(matches!(again, EnuxError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_blank_merge_message_is_neither_sent_nor_recorded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/pull-requests/pr-1/merge"))
        .and(query_param_is_missing("merge_message"))
        .respond_with(merge_response())
        .expect(1)
        .mount(&server)
        .await;

    let workflow =
        PullRequestWorkflow::new(client(&server), open_pull_request(), ManagePolicy::default());

    let merged = workflow
        .merge(&signed_in("owner"), Some("   "))
        .await
        .unwrap();

    assert_eq!(merged.status, PullRequestStatus::Merged);
    assert!(merged.merge_message.is_none());
}

#[tokio::test]
async fn test_merge_without_newer_version_leaves_pull_request_open() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/pull-requests/pr-1/merge"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "new_version_id": "",
            "version_number": 3
        })))
        .expect(1)
        .mount(&server)
        .await;

    let workflow =
        PullRequestWorkflow::new(client(&server), open_pull_request(), ManagePolicy::default());

    let err = workflow.merge(&signed_in("owner"), None).await.unwrap_err();

    assert!(matches!(err, EnuxError::InconsistentMerge { .. }));
    let current = workflow.pull_request().await;
    assert_eq!(current.status, PullRequestStatus::Open);
    assert!(current.new_version_id.is_none());
    assert!(!workflow.is_busy());
}

#[tokio::test]
async fn test_concurrent_actions_send_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/pull-requests/pr-1/merge"))
        .respond_with(merge_response().set_delay(Duration::from_millis(200)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/pull-requests/pr-1/decline"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pull_request_json("DECLINED")))
        .expect(0)
        .mount(&server)
        .await;

    let workflow =
        PullRequestWorkflow::new(client(&server), open_pull_request(), ManagePolicy::default());
    let session = signed_in("owner");

    let (merge, decline) = tokio::join!(workflow.merge(&session, None), workflow.decline(&session));

    assert!(merge.is_ok());
    assert!(matches!(decline, Err(EnuxError::ActionInProgress(_))));
    assert!(!workflow.is_busy());
    assert_eq!(workflow.pull_request().await.status, PullRequestStatus::Merged);
}

#[tokio::test]
async fn test_close_applies_returned_record() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/pull-requests/pr-1/close"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pull_request_json("CLOSED")))
        .expect(1)
        .mount(&server)
        .await;

    let workflow =
        PullRequestWorkflow::new(client(&server), open_pull_request(), ManagePolicy::AuthorOnly);

    let closed = workflow.close(&signed_in("author")).await.unwrap();
    assert_eq!(closed.status, PullRequestStatus::Closed);
    assert!(closed.closed_at.is_some());
    assert!(closed.merged_at.is_none());
}

#[tokio::test]
async fn test_unexpected_status_in_response_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/pull-requests/pr-1/decline"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pull_request_json("OPEN")))
        .expect(1)
        .mount(&server)
        .await;

    let workflow =
        PullRequestWorkflow::new(client(&server), open_pull_request(), ManagePolicy::default());

    let err = workflow
        .perform(&signed_in("owner"), PullRequestAction::Decline, None)
        .await
        .unwrap_err();
    assert!(matches!(err, EnuxError::InvalidTransition { .. }));
    assert_eq!(workflow.pull_request().await.status, PullRequestStatus::Open);
}

#[tokio::test]
async fn test_failed_action_releases_guard() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/pull-requests/pr-1/merge"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "detail": "Merge conflict" })),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/pull-requests/pr-1/merge"))
        .respond_with(merge_response())
        .expect(1)
        .mount(&server)
        .await;

    let workflow =
        PullRequestWorkflow::new(client(&server), open_pull_request(), ManagePolicy::default());
    let session = signed_in("author");

    let err = workflow.merge(&session, None).await.unwrap_err();
    assert_eq!(err.to_string(), "[E4002] Merge conflict");
    assert!(!workflow.is_busy());
    assert_eq!(workflow.available_actions(Some("author")).await.len(), 3);

    let merged = workflow.merge(&session, None).await.unwrap();
    assert_eq!(merged.status, PullRequestStatus::Merged);
}

#[tokio::test]
async fn test_stranger_cannot_manage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(merge_response())
        .expect(0)
        .mount(&server)
        .await;

    let workflow =
        PullRequestWorkflow::new(client(&server), open_pull_request(), ManagePolicy::default());

    let err = workflow
        .merge(&signed_in("stranger"), None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EnuxError::NotPermitted {
            action: PullRequestAction::Merge,
            ..
        }
    ));
}
