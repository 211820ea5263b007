use assert_cmd::Command;
use assert_cmd::cargo;
use mockito::{Matcher, Server};
use predicates::prelude::*;

/// A command isolated from the caller's TRANSFER_* settings, pointed at `url`.
fn bank_xfer(url: &str) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("bank-xfer"));
    for key in [
        "TRANSFER_API_URL",
        "TRANSFER_TIMEOUT",
        "TRANSFER_MAX_RETRIES",
        "TRANSFER_BACKOFF_FACTOR",
        "TRANSFER_USERNAME",
        "TRANSFER_PASSWORD",
    ] {
        cmd.env_remove(key);
    }
    cmd.env("TRANSFER_BACKOFF_FACTOR", "0").arg("--api-url").arg(url);
    cmd
}

#[test]
fn test_end_to_end_transfer() {
    let mut server = Server::new();
    let url = server.url();

    let mock = server
        .mock("POST", "/transfer")
        .match_header(
            "user-agent",
            Matcher::Regex("^bank-xfer/".to_string()),
        )
        .match_body(Matcher::Json(serde_json::json!({
            "fromAccount": "ACC1000",
            "toAccount": "ACC1001",
            "amount": 100.0
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"transactionId":"tx-42","status":"SUCCESS","message":"Transfer completed","fromAccount":"ACC1000","toAccount":"ACC1001","amount":100}"#,
        )
        .expect(1)
        .create();

    bank_xfer(&url)
        .args(["transfer", "--from", "ACC1000", "--to", "ACC1001", "--amount", "100"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Transaction ID: tx-42"));

    mock.assert();
}

#[test]
fn test_invalid_transfer_never_reaches_api() {
    let mut server = Server::new();
    let url = server.url();

    let mock = server.mock("POST", "/transfer").expect(0).create();

    bank_xfer(&url)
        .args(["transfer", "--from", "ACC1000", "--to", "ACC1000", "--amount", "-5"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Cannot transfer to the same account"))
        .stdout(predicate::str::contains("amount: must be positive"));

    mock.assert();
}

#[test]
fn test_transient_failure_is_retried() {
    let mut server = Server::new();
    let url = server.url();

    let unavailable = server
        .mock("POST", "/transfer")
        .with_status(503)
        .expect(2)
        .create();
    let ok = server
        .mock("POST", "/transfer")
        .with_status(200)
        .with_body(
            r#"{"transactionId":"tx-7","status":"SUCCESS","fromAccount":"ACC1000","toAccount":"ACC1001","amount":1}"#,
        )
        .expect(1)
        .create();

    bank_xfer(&url)
        .args(["transfer", "--from", "ACC1000", "--to", "ACC1001", "--amount", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tx-7"));

    unavailable.assert();
    ok.assert();
}

#[test]
fn test_invalid_setting_fails_fast() {
    bank_xfer("http://127.0.0.1:1")
        .args(["--max-retries=lots", "accounts"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--max-retries"));
}

#[test]
fn test_interactive_reads_stdin() {
    let mut server = Server::new();
    let url = server.url();

    let mock = server
        .mock("POST", "/transfer")
        .with_status(200)
        .with_body(
            r#"{"transactionId":"tx-9","status":"SUCCESS","fromAccount":"ACC1000","toAccount":"ACC1001","amount":5}"#,
        )
        .expect(1)
        .create();

    bank_xfer(&url)
        .arg("interactive")
        .write_stdin("ACC1000\nACC1001\n5\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("tx-9"))
        .stdout(predicate::str::contains(
            "Thank you for using the Money Transfer System!",
        ));

    mock.assert();
}
