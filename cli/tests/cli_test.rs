use assert_cmd::Command;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn env_file(dir: &TempDir, hostname: &str) -> String {
    let path = dir.path().join("env.yaml");
    std::fs::write(
        &path,
        format!(
            "kiali_hostname: {}\nmesh_bookinfo_namespace: bookinfo\nrequest_timeout_secs: 5\n",
            hostname
        ),
    )
    .unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn help() {
    let mut cmd = Command::cargo_bin("meshtest").unwrap();
    cmd.arg("--help");
    let output = cmd.assert().success().get_output().stdout.clone();
    let help = String::from_utf8(output).unwrap();
    for subcommand in ["methods", "call", "apply", "delete", "wait-badge", "cleanup"] {
        assert!(help.contains(subcommand), "{}", subcommand);
    }
}

#[test]
fn methods() {
    let mut cmd = Command::cargo_bin("meshtest").unwrap();
    cmd.arg("methods");
    let output = cmd.assert().success().get_output().stdout.clone();
    let methods = String::from_utf8(output).unwrap();
    assert!(methods.contains("namespaceHealth"));
    assert!(methods
        .contains("/api/namespaces/{namespace}/applications/{app}/versions/{version}/graph"));
    assert!(!methods.contains("api/api"));
}

#[test]
fn unknown_method() {
    let mut cmd = Command::cargo_bin("meshtest").unwrap();
    cmd.args(&["call", "notAMethod"]);
    cmd.assert().failure();
}

#[test]
fn missing_env_file() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.yaml");
    let mut cmd = Command::cargo_bin("meshtest").unwrap();
    cmd.args(&[
        "--env-file",
        missing.to_str().unwrap(),
        "call",
        "getStatus",
    ]);
    cmd.assert().failure();
}

#[test]
fn badge_bounds_conflict() {
    let mut cmd = Command::cargo_bin("meshtest").unwrap();
    cmd.args(&["wait-badge", "hasCB", "--at-least", "1", "--at-most", "2"]);
    cmd.assert().failure();
}

#[test]
fn badge_interval_must_be_positive() {
    let mut cmd = Command::cargo_bin("meshtest").unwrap();
    cmd.args(&["wait-badge", "hasCB", "--interval", "0"]);
    let output = cmd.assert().failure().get_output().stderr.clone();
    assert!(String::from_utf8(output).unwrap().contains("--interval"));
}

#[test]
fn cleanup_requires_a_directory() {
    let dir = TempDir::new().unwrap();
    let env = env_file(&dir, "localhost:20001");
    let mut cmd = Command::cargo_bin("meshtest").unwrap();
    cmd.args(&[
        "--env-file",
        &env,
        "cleanup",
        "--assets",
        Path::new("/no/such/assets").to_str().unwrap(),
    ]);
    cmd.assert().failure();
}

#[tokio::test(flavor = "multi_thread")]
async fn call_prints_the_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/namespaces/bookinfo/health"))
        .and(query_param("type", "app"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"productpage": {}})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/namespaces/invalid/health"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let env = env_file(&dir, &server.uri());

    let mut cmd = Command::cargo_bin("meshtest").unwrap();
    cmd.args(&[
        "--env-file",
        &env,
        "call",
        "namespaceHealth",
        "--path",
        "namespace=bookinfo",
        "--param",
        "type=app",
    ]);
    let output = cmd.assert().success().get_output().stdout.clone();
    assert!(String::from_utf8(output).unwrap().contains("productpage"));

    let mut cmd = Command::cargo_bin("meshtest").unwrap();
    cmd.args(&[
        "--env-file",
        &env,
        "call",
        "namespaceHealth",
        "--path",
        "namespace=invalid",
    ]);
    cmd.assert().failure();
}
