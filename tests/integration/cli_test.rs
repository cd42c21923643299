use std::path::Path;
use std::process::{Command, Output};

const UNREACHABLE_API: &str = "http://127.0.0.1:1/api/v1";

fn run_enux_with_env(args: &[&str], env_vars: Vec<(&str, &str)>) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_enux"));
    cmd.args(args)
        .env_remove("RUST_LOG")
        .env("ENUX_LOG_LEVEL", "warn")
        .env("ENUX_DISPLAY__COLOR", "false");
    for (key, value) in env_vars {
        cmd.env(key, value);
    }
    cmd.output().expect("Failed to execute enux command")
}

fn run_enux(args: &[&str], session_path: &Path) -> Output {
    run_enux_with_env(
        args,
        vec![
            ("ENUX_API_URL", UNREACHABLE_API),
            ("ENUX_SESSION_PATH", session_path.to_str().unwrap()),
        ],
    )
}

fn output_to_string(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr_to_string(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

mod version_command_tests {
    use super::*;

    #[test]
    fn test_version_command_basic() {
        let output = run_enux_with_env(&["version"], vec![]);
        let stdout = output_to_string(&output);

        assert!(output.status.success(), "version command should succeed");
        assert!(stdout.contains("enux"), "output should contain 'enux'");
        assert!(
            stdout.contains(env!("CARGO_PKG_VERSION")),
            "output should contain version number"
        );
    }

    #[test]
    fn test_version_command_detailed() {
        let output = run_enux_with_env(&["version", "--detailed"], vec![]);
        let stdout = output_to_string(&output);

        assert!(output.status.success(), "version --detailed should succeed");
        assert!(stdout.contains("License"), "output should contain 'License'");
        assert!(stdout.contains("Apache-2.0"), "output should contain license type");
        assert!(
            stdout.contains("DECLINED"),
            "output should list pull request states"
        );
    }

    #[test]
    fn test_version_ignores_broken_config() {
        let output = run_enux_with_env(&["version"], vec![("ENUX_API_URL", "ftp://nowhere")]);
        assert!(output.status.success(), "version should not need a valid config");
    }
}

mod help_command_tests {
    use super::*;

    #[test]
    fn test_help_lists_command_groups() {
        let output = run_enux_with_env(&["--help"], vec![]);
        let stdout = output_to_string(&output);

        assert!(output.status.success(), "--help should succeed");
        assert!(stdout.contains("Enux"), "help should mention Enux");
        for command in ["auth", "profile", "playbooks", "prs", "notifications", "version"] {
            assert!(stdout.contains(command), "help should mention {}", command);
        }
    }

    #[test]
    fn test_prs_help_lists_lifecycle_actions() {
        let output = run_enux_with_env(&["prs", "--help"], vec![]);
        let stdout = output_to_string(&output);

        assert!(output.status.success(), "prs --help should succeed");
        for command in ["list", "show", "create", "diff", "merge", "close", "decline"] {
            assert!(stdout.contains(command), "prs help should mention {}", command);
        }
    }

    #[test]
    fn test_playbooks_help_lists_actions() {
        let output = run_enux_with_env(&["playbooks", "--help"], vec![]);
        let stdout = output_to_string(&output);

        assert!(output.status.success(), "playbooks --help should succeed");
        for command in ["fork", "star", "unstar", "forks", "versions", "search", "upload"] {
            assert!(
                stdout.contains(command),
                "playbooks help should mention {}",
                command
            );
        }
    }
}

mod error_handling_tests {
    use super::*;

    #[test]
    fn test_invalid_command() {
        let output = run_enux_with_env(&["invalid-command"], vec![]);
        assert!(!output.status.success(), "invalid command should fail");
    }

    #[test]
    fn test_unknown_diff_view_is_rejected() {
        let output = run_enux_with_env(&["prs", "diff", "pr-1", "--view", "split"], vec![]);
        let stderr = stderr_to_string(&output);

        assert!(!output.status.success());
        assert!(stderr.contains("side-by-side"), "should list the valid views");
    }

    #[test]
    fn test_invalid_api_url_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let session = dir.path().join("session.json");
        let output = run_enux_with_env(
            &["auth", "whoami"],
            vec![
                ("ENUX_API_URL", "ftp://nowhere"),
                ("ENUX_SESSION_PATH", session.to_str().unwrap()),
            ],
        );
        let stderr = stderr_to_string(&output);

        assert!(!output.status.success());
        assert!(stderr.contains("api.base_url"), "stderr: {}", stderr);
    }
}

mod session_tests {
    use super::*;

    #[test]
    fn test_whoami_without_session() {
        let dir = tempfile::tempdir().unwrap();
        let output = run_enux(&["auth", "whoami"], &dir.path().join("session.json"));

        assert!(output.status.success());
        assert!(output_to_string(&output).contains("Not signed in."));
    }

    #[test]
    fn test_whoami_reads_stored_session() {
        let dir = tempfile::tempdir().unwrap();
        let session = dir.path().join("session.json");
        std::fs::write(
            &session,
            r#"{"id":"u-1","email":"ada@example.com","full_name":"Ada Lovelace","token":"jwt"}"#,
        )
        .unwrap();

        let output = run_enux(&["auth", "whoami", "--format", "json"], &session);
        let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

        assert!(output.status.success());
        assert_eq!(value["signed_in"], true);
        assert_eq!(value["user"]["full_name"], "Ada Lovelace");
    }

    #[test]
    fn test_malformed_session_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let session = dir.path().join("session.json");
        std::fs::write(&session, "{not json").unwrap();

        let output = run_enux(&["auth", "whoami"], &session);

        assert!(output.status.success());
        assert!(output_to_string(&output).contains("Not signed in."));
        assert!(!session.exists(), "malformed session should be removed");
    }

    #[test]
    fn test_guest_cannot_call_authenticated_endpoints() {
        let dir = tempfile::tempdir().unwrap();
        let session = dir.path().join("session.json");
        std::fs::write(
            &session,
            r#"{"id":"u-1","email":"ada@example.com","access_token":"jwt"}"#,
        )
        .unwrap();

        let output = run_enux(&["--guest", "prs", "show", "pr-1"], &session);
        let stderr = stderr_to_string(&output);

        assert!(!output.status.success());
        assert!(stderr.contains("[E1001]"), "stderr: {}", stderr);
        assert!(stderr.contains("Authentication token not found. Please sign in again."));
        assert!(!stderr.contains("Network error"), "no request should be sent");
    }

    #[test]
    fn test_provider_sign_in_is_not_available() {
        let dir = tempfile::tempdir().unwrap();
        let output = run_enux(
            &["auth", "provider", "github"],
            &dir.path().join("session.json"),
        );
        let stderr = stderr_to_string(&output);

        assert!(!output.status.success());
        assert!(stderr.contains("github authentication is not yet implemented"));
    }

    #[test]
    fn test_sign_out_removes_session_file() {
        let dir = tempfile::tempdir().unwrap();
        let session = dir.path().join("session.json");
        std::fs::write(
            &session,
            r#"{"id":"u-1","email":"ada@example.com","access_token":"jwt"}"#,
        )
        .unwrap();

        let output = run_enux(&["auth", "sign-out"], &session);

        assert!(output.status.success());
        assert!(!session.exists());
    }
}
