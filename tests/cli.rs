use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SCRUBBED_ENV: &[&str] = &[
    "REGION",
    "PROJECT_ID",
    "VAULT_EMAILS",
    "SMTP_USER",
    "SMTP_PASS",
    "SMTP_FROM",
    "IAM_ENDPOINT",
    "CBR_ENDPOINT",
    "REPORT_OUTPUT_DIR",
    "HUAWEI_CLOUD_USERNAME",
    "HUAWEI_CLOUD_PASSWORD",
    "HUAWEI_CLOUD_DOMAIN_NAME",
    "HTTP_PROXY",
    "http_proxy",
    "HTTPS_PROXY",
    "https_proxy",
    "ALL_PROXY",
    "all_proxy",
    "RUST_LOG",
    "LOG_FORMAT",
];

fn cbr_report() -> Command {
    let mut cmd = Command::cargo_bin("cbr-report").unwrap();
    for key in SCRUBBED_ENV {
        cmd.env_remove(key);
    }
    cmd
}

/// Base URL of a local port nothing listens on
fn closed_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

#[test]
fn window_for_given_day() {
    cbr_report()
        .args(["window", "--date", "2024-03-14"])
        .assert()
        .success()
        .stdout(predicate::str::contains("start:    2024-03-13T21:00:00Z"))
        .stdout(predicate::str::contains("end:      2024-03-14T20:59:00Z"))
        .stdout(predicate::str::contains("date tag: 2024-03-14"));
}

#[test]
fn window_rejects_bad_date() {
    cbr_report()
        .args(["window", "--date", "14/03/2024"])
        .assert()
        .failure();
}

#[test]
fn run_requires_region() {
    cbr_report()
        .args(["run", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--region"));
}

#[test]
fn run_without_smtp_credentials_fails() {
    let dir = TempDir::new().unwrap();
    cbr_report()
        .args(["run", "--region", "tr-west-1", "--project-id", "p-123"])
        .env("REPORT_OUTPUT_DIR", dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("SMTP_USER"));
}

#[test]
fn run_without_user_data_fails() {
    let dir = TempDir::new().unwrap();
    cbr_report()
        .args(["run", "--dry-run", "--region", "tr-west-1", "--project-id", "p-123"])
        .env("IAM_ENDPOINT", closed_endpoint())
        .env("REPORT_OUTPUT_DIR", dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("HUAWEI_CLOUD_USERNAME"));
}

#[test]
fn run_fails_when_identity_service_unreachable() {
    let dir = TempDir::new().unwrap();
    cbr_report()
        .args([
            "--log-format",
            "json",
            "run",
            "--dry-run",
            "--date",
            "2024-03-14",
            "--region",
            "tr-west-1",
            "--project-id",
            "p-123",
        ])
        .env("IAM_ENDPOINT", closed_endpoint())
        .env("CBR_ENDPOINT", closed_endpoint())
        .env("VAULT_EMAILS", r#"{"v1": ["a@x.com"]}"#)
        .env("REPORT_OUTPUT_DIR", dir.path())
        .env("HUAWEI_CLOUD_USERNAME", "user")
        .env("HUAWEI_CLOUD_PASSWORD", "secret")
        .env("HUAWEI_CLOUD_DOMAIN_NAME", "domain")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Authentication error"))
        .stderr(predicate::str::contains("secret").not());

    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
