//! End-to-end tests of the beacon binary against a mock service.
//!
//! Each test spawns the real binary with BEACON_API_URL pointed at a
//! wiremock server, so request construction, identifier resolution and the
//! transcoders are exercised together across the process boundary.

use assert_cmd::Command;
use predicates::prelude::*;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WS_ID: &str = "5b218778-e7a5-4d73-8187-f10824047715";
const DS_ID: &str = "e9a1041e-3dd5-42d6-b4f5-0d114b6dfb7e";

fn beacon(server: &MockServer) -> Command {
    let mut cmd = Command::cargo_bin("beacon").unwrap();
    cmd.env("BEACON_API_URL", server.uri())
        .env("BEACON_TOKEN", "test-token");
    cmd
}

async fn mount_workspaces(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/workspaces"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [{"id": WS_ID, "name": "Sales"}]
        })))
        .mount(server)
        .await;
}

async fn mount_datasets(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("/workspaces/{WS_ID}/datasets")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [{"id": DS_ID, "name": "Numbers"}]
        })))
        .mount(server)
        .await;
}

#[test]
fn help_lists_the_command_groups() {
    Command::cargo_bin("beacon")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("workspace")
                .and(predicate::str::contains("dataset"))
                .and(predicate::str::contains("report"))
                .and(predicate::str::contains("rest")),
        );
}

#[test]
fn missing_token_fails_before_any_request() {
    Command::cargo_bin("beacon")
        .unwrap()
        .env("BEACON_API_URL", "http://localhost:1")
        .env_remove("BEACON_TOKEN")
        .args(["workspace", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no access token"));
}

#[tokio::test(flavor = "multi_thread")]
async fn workspace_list_renders_pretty_json_rows() {
    let server = MockServer::start().await;
    mount_workspaces(&server).await;

    beacon(&server)
        .args(["workspace", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"Sales\""));
}

#[tokio::test(flavor = "multi_thread")]
async fn workspace_list_renders_csv_rows() {
    let server = MockServer::start().await;
    mount_workspaces(&server).await;

    beacon(&server)
        .args(["workspace", "list", "--output", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("id,name").and(predicate::str::contains("'Sales'")));
}

#[tokio::test(flavor = "multi_thread")]
async fn workspace_show_resolves_names_to_ids() {
    let server = MockServer::start().await;
    mount_workspaces(&server).await;
    Mock::given(method("GET"))
        .and(path(format!("/workspaces/{WS_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": WS_ID, "name": "Sales", "isReadOnly": false
        })))
        .mount(&server)
        .await;

    beacon(&server)
        .args(["workspace", "show", "Sales"])
        .assert()
        .success()
        .stdout(predicate::str::contains(WS_ID));
}

#[tokio::test(flavor = "multi_thread")]
async fn dataset_query_streams_one_json_array() {
    let server = MockServer::start().await;
    mount_workspaces(&server).await;
    mount_datasets(&server).await;
    Mock::given(method("POST"))
        .and(path(format!("/workspaces/{WS_ID}/datasets/{DS_ID}/query")))
        .and(body_partial_json(serde_json::json!({"query": "EVALUATE t"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("[\n{\"a\":1}\n{\"a\":2}\n]\n"),
        )
        .mount(&server)
        .await;

    beacon(&server)
        .args(["dataset", "query", "Numbers", "EVALUATE t", "--workspace", "Sales"])
        .assert()
        .success()
        .stdout("[{\"a\":1},{\"a\":2}]");
}

#[tokio::test(flavor = "multi_thread")]
async fn dataset_query_with_none_output_stays_silent() {
    let server = MockServer::start().await;
    mount_workspaces(&server).await;
    mount_datasets(&server).await;
    Mock::given(method("POST"))
        .and(path(format!("/workspaces/{WS_ID}/datasets/{DS_ID}/query")))
        .respond_with(ResponseTemplate::new(200).set_body_string("[\n{\"a\":1}\n]\n"))
        .expect(1)
        .mount(&server)
        .await;

    beacon(&server)
        .args([
            "dataset", "query", "Numbers", "EVALUATE t",
            "--workspace", "Sales", "--output", "none",
        ])
        .assert()
        .success()
        .stdout("");
}

#[tokio::test(flavor = "multi_thread")]
async fn output_file_receives_the_rendered_bytes() {
    let server = MockServer::start().await;
    mount_workspaces(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("workspaces.csv");

    beacon(&server)
        .args(["workspace", "list", "--output", "csv", "--output-file"])
        .arg(&out)
        .assert()
        .success()
        .stdout("");

    let written = std::fs::read_to_string(&out).unwrap();
    assert_eq!(written, format!("id,name\n'{WS_ID}','Sales'"));
}

#[tokio::test(flavor = "multi_thread")]
async fn query_flag_projects_the_result() {
    let server = MockServer::start().await;
    mount_workspaces(&server).await;

    beacon(&server)
        .args(["workspace", "list", "--query", "[?name=='Sales'].name"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sales").and(predicate::str::contains(WS_ID).not()));
}

#[tokio::test(flavor = "multi_thread")]
async fn rest_escape_hatch_hits_arbitrary_paths() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/capacity/usage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "used": 12, "limit": 100
        })))
        .mount(&server)
        .await;

    beacon(&server)
        .args(["rest", "capacity/usage"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"used\": 12"));
}

#[tokio::test(flavor = "multi_thread")]
async fn rest_rejects_unknown_methods() {
    let server = MockServer::start().await;
    beacon(&server)
        .args(["rest", "anything", "--method", "brew"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported method"));
}

#[tokio::test(flavor = "multi_thread")]
async fn service_errors_surface_with_status_and_detail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/workspaces"))
        .respond_with(ResponseTemplate::new(403).set_body_string("token expired"))
        .mount(&server)
        .await;

    beacon(&server)
        .args(["workspace", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("403").and(predicate::str::contains("token expired")));
}
