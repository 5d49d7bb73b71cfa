//! Smoke tests for the `sigscan` binary.

use std::path::Path;
use std::process::{Command, Output};

const RULES: &str = r#"
plugins:
  - endpoints: ["/server-status"]
    checks:
      - name: apache-status
        status_code: 200
        match: ["Apache Server Status"]
        severity: high
        description: Apache status page exposed
        remediation: Restrict /server-status
"#;

fn sigscan(args: &[&str]) -> Output {
    sigscan_with_log(args, Some("off"))
}

fn sigscan_with_log(args: &[&str], rust_log: Option<&str>) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_sigscan"));
    cmd.args(args)
        .env_remove("SIGSCAN_RULES")
        .env_remove("SIGSCAN_SEVERITY");
    match rust_log {
        Some(filter) => cmd.env("RUST_LOG", filter),
        None => cmd.env_remove("RUST_LOG"),
    };
    cmd.output().expect("failed to run sigscan")
}

fn write(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_lint_valid_file() {
    let dir = tempfile::tempdir().unwrap();
    let rules = write(dir.path(), "rules.yaml", RULES);

    let out = sigscan(&["lint", &rules, "--output", "json"]);
    assert!(out.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(summary["valid"], true);
    assert_eq!(summary["checks"], 1);
    assert_eq!(summary["by_severity"]["high"], 1);
}

#[test]
fn test_lint_invalid_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let rules = write(
        dir.path(),
        "rules.yaml",
        &RULES.replace("severity: high", "severity: \"\""),
    );

    let out = sigscan(&["lint", &rules]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stdout).contains("missing or empty severity"));
}

#[test]
fn test_list_json_rows() {
    let dir = tempfile::tempdir().unwrap();
    let rules = write(dir.path(), "rules.yaml", RULES);

    let out = sigscan(&["list", &rules, "--severity", "high", "--output", "json"]);
    assert!(out.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(rows[0]["check_name"], "apache-status");
    assert_eq!(rows[0]["endpoints"][0], "/server-status");
}

#[test]
fn test_match_reports_findings() {
    let dir = tempfile::tempdir().unwrap();
    let rules = write(dir.path(), "rules.yaml", RULES);
    let resp = write(
        dir.path(),
        "resp.json",
        r#"{"status_code": 200, "body": "<h1>Apache Server Status for host</h1>"}"#,
    );

    let out = sigscan(&[
        "match",
        &rules,
        &resp,
        "--endpoint",
        "/server-status",
        "--output",
        "json",
    ]);
    assert_eq!(out.status.code(), Some(1));

    let findings: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(findings[0]["check"], "apache-status");
    assert_eq!(findings[0]["remediation"], "Restrict /server-status");
}

#[test]
fn test_match_without_findings_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let rules = write(dir.path(), "rules.yaml", RULES);
    let resp = write(dir.path(), "resp.yaml", "status_code: 403\nbody: Forbidden\n");

    let out = sigscan(&["match", &rules, &resp, "--endpoint", "/server-status"]);
    assert!(out.status.success());
}

#[test]
fn test_missing_rules_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.yaml");

    let out = sigscan(&["list", &missing.to_string_lossy()]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("path of signatures file is not valid"));
}

#[test]
fn test_match_load_error_exit_code_differs_from_findings() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.yaml");
    let resp = write(dir.path(), "resp.json", r#"{"status_code": 200}"#);

    let out = sigscan(&["match", &missing.to_string_lossy(), &resp]);
    assert_eq!(out.status.code(), Some(2));

    let rules = write(dir.path(), "rules.yaml", RULES);
    let bad_resp = write(dir.path(), "bad.json", "not json");
    let out = sigscan(&["match", &rules, &bad_resp]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn test_rust_log_off_silences_logging() {
    let dir = tempfile::tempdir().unwrap();
    let rules = write(dir.path(), "rules.yaml", RULES);

    let out = sigscan_with_log(&["lint", &rules], Some("off"));
    assert!(out.status.success());
    assert!(out.stderr.is_empty(), "{}", String::from_utf8_lossy(&out.stderr));

    // --verbose re-enables the library on top of RUST_LOG.
    let out = sigscan_with_log(&["lint", &rules, "--verbose"], Some("off"));
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Loaded signatures"));
}

#[test]
fn test_default_log_level_is_info() {
    let dir = tempfile::tempdir().unwrap();
    let rules = write(dir.path(), "rules.yaml", RULES);

    let out = sigscan_with_log(&["lint", &rules], None);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Loaded signatures"));

    let out = sigscan_with_log(&["lint", &rules], Some("warn"));
    assert!(out.stderr.is_empty(), "{}", String::from_utf8_lossy(&out.stderr));

    let invalid = write(
        dir.path(),
        "invalid.yaml",
        &RULES.replace("severity: high", "severity: bogus"),
    );
    let out = sigscan_with_log(&["lint", &invalid], Some("debug"));
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("DEBUG"));
}
