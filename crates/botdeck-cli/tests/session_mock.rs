//! Integration tests for the session subcommands against a mock API.

use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

fn user_json(login: &str, role: &str) -> serde_json::Value {
    serde_json::json!({
        "id": 1, "login": login, "displayName": login, "role": role
    })
}

async fn mount_setup(server: &MockServer, has_owner: bool) {
    Mock::given(method("GET"))
        .and(path("/auth"))
        .and(query_param("action", "setup"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"hasOwner": has_owner})),
        )
        .mount(server)
        .await;
}

fn write_credentials(home: &Path, token: &str) {
    fs::write(
        home.join("credentials.json"),
        serde_json::json!({
            "token": token,
            "user": user_json("root", "owner")
        })
        .to_string(),
    )
    .unwrap();
}

#[tokio::test]
async fn test_login_stores_credentials() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_setup(&server, true).await;

    Mock::given(method("POST"))
        .and(path("/auth"))
        .and(query_param("action", "login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token": "tok-1", "user": user_json("root", "owner")
        })))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("botdeck")
        .env("BOTDECK_HOME", home.path())
        .env("BOTDECK_API_URL", server.uri())
        .args(["login", "root", "--password", "secret1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed in as root (owner)"));

    let stored = fs::read_to_string(home.path().join("credentials.json")).unwrap();
    assert!(stored.contains("tok-1"));

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(home.path().join("credentials.json"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

#[tokio::test]
async fn test_login_rejects_short_password_without_network() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_setup(&server, true).await;

    Mock::given(method("POST"))
        .and(path("/auth"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    cargo_bin_cmd!("botdeck")
        .env("BOTDECK_HOME", home.path())
        .env("BOTDECK_API_URL", server.uri())
        .args(["login", "root", "--password", "short"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 6 characters"));

    assert!(!home.path().join("credentials.json").exists());
}

#[tokio::test]
async fn test_whoami_reports_stored_session() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    write_credentials(home.path(), "tok-1");

    Mock::given(method("GET"))
        .and(path("/auth"))
        .and(query_param("action", "me"))
        .and(header("X-Auth-Token", "tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "user": user_json("root", "owner")
        })))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("botdeck")
        .env("BOTDECK_HOME", home.path())
        .env("BOTDECK_API_URL", server.uri())
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("login:        root"))
        .stdout(predicate::str::contains("role:         owner"));
}

#[tokio::test]
async fn test_whoami_fails_when_not_signed_in() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth"))
        .and(query_param("action", "setup"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"hasOwner": true})),
        )
        .mount(&server)
        .await;

    cargo_bin_cmd!("botdeck")
        .env("BOTDECK_HOME", home.path())
        .env("BOTDECK_API_URL", server.uri())
        .arg("whoami")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not signed in"));
}

#[tokio::test]
async fn test_logout_clears_credentials_despite_server_error() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    write_credentials(home.path(), "tok-1");

    Mock::given(method("POST"))
        .and(path("/auth"))
        .and(query_param("action", "logout"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("botdeck")
        .env("BOTDECK_HOME", home.path())
        .env("BOTDECK_API_URL", server.uri())
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed out."));

    assert!(!home.path().join("credentials.json").exists());
}

#[tokio::test]
async fn test_setup_registers_owner() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_setup(&server, false).await;

    Mock::given(method("POST"))
        .and(path("/auth"))
        .and(query_param("action", "register_owner"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token": "tok-new", "user": user_json("root", "owner")
        })))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("botdeck")
        .env("BOTDECK_HOME", home.path())
        .env("BOTDECK_API_URL", server.uri())
        .args(["setup", "root", "--password", "secret1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Owner account created."));

    let stored = fs::read_to_string(home.path().join("credentials.json")).unwrap();
    assert!(stored.contains("tok-new"));
}

#[tokio::test]
async fn test_setup_refused_when_owner_exists() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_setup(&server, true).await;

    Mock::given(method("POST"))
        .and(path("/auth"))
        .and(query_param("action", "register_owner"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    cargo_bin_cmd!("botdeck")
        .env("BOTDECK_HOME", home.path())
        .env("BOTDECK_API_URL", server.uri())
        .args(["setup", "root", "--password", "secret1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("An owner account already exists"));
}

#[tokio::test]
async fn test_login_refused_while_signed_in() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    write_credentials(home.path(), "tok-live");

    Mock::given(method("GET"))
        .and(path("/auth"))
        .and(query_param("action", "me"))
        .and(header("X-Auth-Token", "tok-live"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "user": user_json("root", "owner")
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth"))
        .and(query_param("action", "login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    cargo_bin_cmd!("botdeck")
        .env("BOTDECK_HOME", home.path())
        .env("BOTDECK_API_URL", server.uri())
        .args(["login", "root", "--password", "secret1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Already signed in"));
}
