//! End-to-end CLI tests driving the compiled binary against a mock
//! endpoint.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod support;
use support::{RPC_PATH, mount_token_page, rpc_response};

fn notebridge() -> Command {
    Command::cargo_bin("notebridge").expect("binary builds")
}

#[test]
fn test_help_lists_subcommands() {
    notebridge()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("notebooks"))
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("push"));
}

#[test]
fn test_unknown_flag_fails() {
    notebridge()
        .args(["auth", "--definitely-not-a-flag"])
        .assert()
        .failure();
}

#[test]
fn test_export_requires_category() {
    notebridge()
        .args(["export", "some-notebook-id"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--category"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_auth_fails_cleanly_when_not_signed_in() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>anonymous</html>"))
        .mount(&server)
        .await;

    let uri = server.uri();
    tokio::task::spawn_blocking(move || {
        notebridge()
            .args(["auth", "--base-url", &uri, "--quiet"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("not signed in"));
    })
    .await
    .expect("spawn_blocking joins");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_notebooks_list_prints_names() {
    let server = MockServer::start().await;
    mount_token_page(&server).await;
    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .and(query_param("rpcids", "wXbhsf"))
        .respond_with(ResponseTemplate::new(200).set_body_string(rpc_response(
            "wXbhsf",
            &json!([[["Biology Notes", null, "3f2c8a1e-9b4d-4e6f-8a2b-1c5d7e9f0a3b"]]]),
        )))
        .mount(&server)
        .await;

    let uri = server.uri();
    tokio::task::spawn_blocking(move || {
        notebridge()
            .args(["notebooks", "list", "--base-url", &uri, "--quiet"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Biology Notes"));
    })
    .await
    .expect("spawn_blocking joins");
}
