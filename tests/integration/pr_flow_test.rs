use serde_json::json;
use std::path::Path;
use std::process::Output;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn run_enux(args: &[&str], server: &MockServer, session_path: &Path) -> Output {
    tokio::process::Command::new(env!("CARGO_BIN_EXE_enux"))
        .args(args)
        .env_remove("RUST_LOG")
        .env("ENUX_LOG_LEVEL", "warn")
        .env("ENUX_DISPLAY__COLOR", "false")
        .env("ENUX_API_URL", format!("{}/api/v1", server.uri()))
        .env("ENUX_SESSION_PATH", session_path)
        .output()
        .await
        .expect("Failed to execute enux command")
}

fn write_session(dir: &Path, user_id: &str) -> std::path::PathBuf {
    let session = dir.join("session.json");
    std::fs::write(
        &session,
        json!({
            "id": user_id,
            "email": format!("{}@example.com", user_id),
            "full_name": user_id,
            "access_token": "tok"
        })
        .to_string(),
    )
    .unwrap();
    session
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn pull_request_json(status: &str, with_owner: bool) -> serde_json::Value {
    let mut pr = json!({
        "id": "pr-1",
        "playbook_id": "pb-1",
        "author_id": "author",
        "title": "Refine ICP",
        "description": "Tighter ideal customer profile",
        "base_version_id": "v8",
        "base_version_number": 8,
        "unified_diff": "--- a\n+++ b\n@@ -1 +1 @@\n-old\n+new",
        "additions_count": 1,
        "deletions_count": 1,
        "status": status
    });
    if with_owner {
        pr["playbook_owner_id"] = json!("owner");
    }
    pr
}

async fn mount_pull_request(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/v1/pull-requests/pr-1"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

mod auth_flow_tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_in_then_whoami() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "u-1",
                "email": "ada@example.com",
                "full_name": "Ada Lovelace",
                "jwt": "jwt-abc"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let session = dir.path().join("nested").join("session.json");

        let output = run_enux(
            &["auth", "sign-in", "-e", "ada@example.com", "-p", "hunter22"],
            &server,
            &session,
        )
        .await;
        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert!(stdout(&output).contains("/onboarding"));
        assert!(session.exists());

        let output = run_enux(&["auth", "whoami"], &server, &session).await;
        assert!(stdout(&output).contains("Ada Lovelace"));
    }

    #[tokio::test]
    async fn test_rejected_sign_in_reports_server_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/login"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({ "detail": "Incorrect email or password" })),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let session = dir.path().join("session.json");

        let output = run_enux(
            &["auth", "sign-in", "-e", "ada@example.com", "-p", "wrong"],
            &server,
            &session,
        )
        .await;

        assert!(!output.status.success());
        assert!(stderr(&output).contains("Incorrect email or password"));
        assert!(!session.exists());
    }
}

mod pull_request_flow_tests {
    use super::*;

    #[tokio::test]
    async fn test_owner_merges_with_message() {
        let server = MockServer::start().await;
        mount_pull_request(&server, pull_request_json("OPEN", true)).await;
        Mock::given(method("POST"))
            .and(path("/api/v1/pull-requests/pr-1/merge"))
            .and(query_param("merge_message", "Ship it"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "new_version_id": "v9",
                "version_number": 9
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let session = write_session(dir.path(), "owner");

        let output = run_enux(&["prs", "merge", "pr-1", "-m", "Ship it"], &server, &session).await;
        let out = stdout(&output);

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert!(out.contains("Merged pull request"));
        assert!(out.contains("MERGED"));
        assert!(out.contains("v9"));
    }

    #[tokio::test]
    async fn test_stranger_is_refused_before_any_request() {
        let server = MockServer::start().await;
        mount_pull_request(&server, pull_request_json("OPEN", true)).await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let session = write_session(dir.path(), "stranger");

        let output = run_enux(&["prs", "decline", "pr-1"], &server, &session).await;

        assert!(!output.status.success());
        assert!(stderr(&output).contains("[E2004]"), "stderr: {}", stderr(&output));
    }

    #[tokio::test]
    async fn test_terminal_pull_request_cannot_be_closed() {
        let server = MockServer::start().await;
        mount_pull_request(&server, pull_request_json("MERGED", true)).await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let session = write_session(dir.path(), "author");

        let output = run_enux(&["prs", "close", "pr-1"], &server, &session).await;

        assert!(!output.status.success());
        assert!(stderr(&output).contains("[E3001]"), "stderr: {}", stderr(&output));
    }

    #[tokio::test]
    async fn test_create_with_blank_description_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "pb-1",
                "title": "Outbound Playbook",
                "owner_id": "owner"
            })))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let session = write_session(dir.path(), "author");

        let output = run_enux(
            &["prs", "create", "pb-1", "-t", "Title", "-d", "  ", "--content", "x"],
            &server,
            &session,
        )
        .await;

        assert!(!output.status.success());
        assert!(
            stderr(&output).contains("Description required"),
            "stderr: {}",
            stderr(&output)
        );
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failure_is_reported_once_without_color() {
        let server = MockServer::start().await;
        mount_pull_request(&server, pull_request_json("MERGED", true)).await;

        let dir = tempfile::tempdir().unwrap();
        let session = write_session(dir.path(), "owner");

        let output = run_enux(&["prs", "close", "pr-1"], &server, &session).await;
        let err = stderr(&output);

        assert!(!output.status.success());
        assert_eq!(err.matches("[E3001]").count(), 1, "stderr: {}", err);
        assert!(!err.contains("WARN"), "stderr: {}", err);
        assert!(!err.contains('\u{1b}'), "stderr: {}", err);
    }

    #[tokio::test]
    async fn test_show_lists_actions_by_name() {
        let server = MockServer::start().await;
        mount_pull_request(&server, pull_request_json("OPEN", true)).await;

        let dir = tempfile::tempdir().unwrap();
        let session = write_session(dir.path(), "author");

        let output = run_enux(&["prs", "show", "pr-1"], &server, &session).await;

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert!(stdout(&output).contains("Actions: merge, close, decline"));
    }

    #[tokio::test]
    async fn test_show_resolves_owner_from_playbook() {
        let server = MockServer::start().await;
        mount_pull_request(&server, pull_request_json("OPEN", false)).await;
        Mock::given(method("GET"))
            .and(path("/api/v1/playbooks/pb-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "pb-1",
                "title": "Outbound Playbook",
                "owner_id": "owner"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let session = write_session(dir.path(), "owner");

        let output = run_enux(&["prs", "show", "pr-1", "--format", "json"], &server, &session).await;
        assert!(output.status.success(), "stderr: {}", stderr(&output));

        let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(
            value["available_actions"],
            json!(["merge", "close", "decline"])
        );
        assert_eq!(value["pull_request"]["playbook_owner_id"], "owner");
    }

    #[tokio::test]
    async fn test_side_by_side_diff_is_fetched() {
        let server = MockServer::start().await;
        mount_pull_request(&server, pull_request_json("OPEN", true)).await;
        Mock::given(method("GET"))
            .and(path("/api/v1/pull-requests/pr-1/diff"))
            .and(query_param("format", "side-by-side"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "format": "side-by-side",
                "side_by_side_diff": {
                    "old_lines": [{ "line": 1, "content": "old", "type": "deleted" }],
                    "new_lines": [{ "line": 1, "content": "new", "type": "added" }]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let session = write_session(dir.path(), "reader");

        let output = run_enux(
            &["prs", "diff", "pr-1", "--view", "side-by-side"],
            &server,
            &session,
        )
        .await;
        let out = stdout(&output);

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert!(out.contains("+1"));
        assert!(out.contains("old"));
        assert!(out.contains("new"));
    }

    #[tokio::test]
    async fn test_missing_html_diff_shows_placeholder() {
        let server = MockServer::start().await;
        mount_pull_request(&server, pull_request_json("OPEN", true)).await;
        Mock::given(method("GET"))
            .and(path("/api/v1/pull-requests/pr-1/diff"))
            .and(query_param("format", "html"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "format": "html" })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let session = write_session(dir.path(), "reader");

        let output = run_enux(&["prs", "diff", "pr-1", "--view", "html"], &server, &session).await;

        assert!(output.status.success());
        assert!(stdout(&output).contains("HTML diff not available"));
    }
}

mod profile_flow_tests {
    use super::*;

    fn profile_json() -> serde_json::Value {
        json!({
            "id": "p-1",
            "username": "ada@example.com",
            "full_name": "Ada Lovelace",
            "company": "Analytical Engines",
            "interests": ["analytics"],
            "avatar_url": "https://cdn.example.com/ada.png"
        })
    }

    #[tokio::test]
    async fn test_update_keeps_untouched_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/profiles/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile_json()))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/v1/profiles/me"))
            .and(body_json(json!({
                "user_id": "ada",
                "username": "ada@example.com",
                "full_name": "Ada Lovelace",
                "bio": null,
                "company": "Analytical Engines",
                "location": null,
                "website": "https://ada.dev",
                "interests": ["analytics"],
                "stage": "seed",
                "avatar_url": "https://cdn.example.com/ada.png"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let session = dir.path().join("session.json");
        std::fs::write(
            &session,
            r#"{"id":"ada","email":"ada@example.com","access_token":"tok"}"#,
        )
        .unwrap();

        let output = run_enux(
            &["profile", "update", "--website", "https://ada.dev", "--stage", "seed"],
            &server,
            &session,
        )
        .await;

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert!(stdout(&output).contains("Profile updated"));
    }

    #[tokio::test]
    async fn test_invalid_website_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile_json()))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let session = write_session(dir.path(), "ada");

        let output = run_enux(
            &["profile", "update", "--website", "ada dot dev"],
            &server,
            &session,
        )
        .await;

        assert!(!output.status.success());
        assert!(stderr(&output).contains("[E2006]"), "stderr: {}", stderr(&output));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}

mod notification_flow_tests {
    use super::*;

    async fn mount_feed(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/api/v1/playbooks/notifications"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "id": "n-1",
                    "type": "pr_created",
                    "title": "New pull request",
                    "message": "author opened 'Refine ICP'",
                    "playbook_id": "pb-1",
                    "pr_id": "pr-1",
                    "is_read": false,
                    "created_at": "2026-10-01T10:00:00Z"
                }
            ])))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/playbooks/notifications/count"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "unread_count": 1,
                "total_count": 3
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_list_as_json_uses_configured_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/playbooks/notifications"))
            .and(query_param("limit", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/playbooks/notifications/count"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "unread_count": 0 })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let session = write_session(dir.path(), "owner");

        let output = run_enux(
            &["notifications", "list", "--limit", "5", "--format", "json"],
            &server,
            &session,
        )
        .await;
        assert!(output.status.success(), "stderr: {}", stderr(&output));

        let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(value["unread_count"], 0);
        assert_eq!(value["notifications"], json!([]));
    }

    #[tokio::test]
    async fn test_open_marks_read_and_prints_route() {
        let server = MockServer::start().await;
        mount_feed(&server).await;
        Mock::given(method("POST"))
            .and(path("/api/v1/playbooks/notifications/mark-read"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let session = write_session(dir.path(), "owner");

        let output = run_enux(&["notifications", "open", "n-1"], &server, &session).await;

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert!(stdout(&output).contains("/pull-request/pr-1"));
    }

    #[tokio::test]
    async fn test_read_all_posts_once() {
        let server = MockServer::start().await;
        mount_feed(&server).await;
        Mock::given(method("POST"))
            .and(path("/api/v1/playbooks/notifications/mark-all-read"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let session = write_session(dir.path(), "owner");

        let output = run_enux(&["notifications", "read-all"], &server, &session).await;

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert!(stdout(&output).contains("All notifications marked as read"));
    }
}
