//! Integration tests for the stats and broadcast subcommands.

use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

fn write_credentials(home: &Path, token: &str) {
    fs::write(
        home.join("credentials.json"),
        serde_json::json!({
            "token": token,
            "user": {"id": 1, "login": "root", "displayName": "Root", "role": "owner"}
        })
        .to_string(),
    )
    .unwrap();
}

#[tokio::test]
async fn test_stats_prints_counters() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    write_credentials(home.path(), "tok-1");

    Mock::given(method("GET"))
        .and(path("/stats"))
        .and(header("X-Auth-Token", "tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "totalUsers": 128, "newUsersToday": 4, "messagesToday": 310,
            "commandsToday": 42, "activeSessions": 9, "blockedUsers": 2,
            "topCommands": [{"name": "/start", "count": 30}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("botdeck")
        .env("BOTDECK_HOME", home.path())
        .env("BOTDECK_API_URL", server.uri())
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("total users:     128"))
        .stdout(predicate::str::contains("/start"));
}

#[tokio::test]
async fn test_stats_requires_sign_in() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;

    cargo_bin_cmd!("botdeck")
        .env("BOTDECK_HOME", home.path())
        .env("BOTDECK_API_URL", server.uri())
        .arg("stats")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not signed in"));
}

#[tokio::test]
async fn test_stats_expired_session_discards_credentials() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    write_credentials(home.path(), "stale");

    Mock::given(method("GET"))
        .and(path("/stats"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({"error": "Session expired"})),
        )
        .mount(&server)
        .await;

    cargo_bin_cmd!("botdeck")
        .env("BOTDECK_HOME", home.path())
        .env("BOTDECK_API_URL", server.uri())
        .arg("stats")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Session expired"));

    assert!(!home.path().join("credentials.json").exists());
}

#[tokio::test]
async fn test_stats_server_error_keeps_credentials() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    write_credentials(home.path(), "tok-1");

    Mock::given(method("GET"))
        .and(path("/stats"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    cargo_bin_cmd!("botdeck")
        .env("BOTDECK_HOME", home.path())
        .env("BOTDECK_API_URL", server.uri())
        .arg("stats")
        .assert()
        .failure();

    assert!(home.path().join("credentials.json").exists());
}

#[tokio::test]
async fn test_broadcast_send_prints_receipt() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    write_credentials(home.path(), "tok-1");

    Mock::given(method("POST"))
        .and(path("/broadcast"))
        .and(header("X-Auth-Token", "tok-1"))
        .and(body_json(serde_json::json!({"text": "maintenance at noon"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "broadcastId": 7, "sentCount": 120, "failedCount": 3, "status": "completed"
        })))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("botdeck")
        .env("BOTDECK_HOME", home.path())
        .env("BOTDECK_API_URL", server.uri())
        .args(["broadcast", "send", "maintenance at noon"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sent 120, failed 3"));
}

#[tokio::test]
async fn test_broadcast_list_shows_history() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    write_credentials(home.path(), "tok-1");

    Mock::given(method("GET"))
        .and(path("/broadcast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "broadcasts": [{
                "id": 7, "text": "hello all", "sentCount": 100,
                "failedCount": 0, "status": "completed",
                "createdAt": "2026-03-01T12:00:00Z"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("botdeck")
        .env("BOTDECK_HOME", home.path())
        .env("BOTDECK_API_URL", server.uri())
        .args(["broadcast", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hello all"))
        .stdout(predicate::str::contains("sent 100"));
}

#[tokio::test]
async fn test_broadcast_send_rejects_empty_text() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    write_credentials(home.path(), "tok-1");

    Mock::given(method("POST"))
        .and(path("/broadcast"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    cargo_bin_cmd!("botdeck")
        .env("BOTDECK_HOME", home.path())
        .env("BOTDECK_API_URL", server.uri())
        .args(["broadcast", "send", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must not be empty"));
}
