use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use std::fs;
use std::io::Write;
use tempfile::NamedTempFile;

const SCENARIO: &str =
    "%ASA-4-106023: Deny tcp\n%ASA-6-302013: Built\naccess-list acl_in permitted tcp\n";

fn log_file(contents: &str) -> NamedTempFile {
    let mut tmpfile = tempfile::Builder::new().suffix(".log").tempfile().unwrap();
    write!(tmpfile, "{contents}").unwrap();
    tmpfile
}

fn analyzer() -> Command {
    Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap()
}

#[test]
fn test_severity_command() {
    let log = log_file(SCENARIO);
    analyzer()
        .arg("--log")
        .arg(log.path())
        .args(["severity", "--level", "4"])
        .assert()
        .success()
        .stdout("%ASA-4-106023: Deny tcp\n");

    analyzer()
        .arg("--log")
        .arg(log.path())
        .args(["severity", "--level", "informational"])
        .assert()
        .success()
        .stdout("%ASA-6-302013: Built\n");
}

#[test]
fn test_severity_out_of_range_rejected() {
    let log = log_file(SCENARIO);
    analyzer()
        .arg("--log")
        .arg(log.path())
        .args(["severity", "--level", "9"])
        .assert()
        .failure()
        .stderr(contains("out of range"));
}

#[test]
fn test_search_command() {
    let log = log_file(SCENARIO);
    analyzer()
        .arg("--log")
        .arg(log.path())
        .args(["search", "--pattern", "permitted"])
        .assert()
        .success()
        .stdout("access-list acl_in permitted tcp\n");
}

#[test]
fn test_search_uses_default_pattern() {
    let log = log_file(SCENARIO);
    analyzer()
        .arg("--log")
        .arg(log.path())
        .arg("search")
        .assert()
        .success()
        .stdout("access-list acl_in permitted tcp\n");
}

#[test]
fn test_deny_rate_command() {
    let log = log_file(SCENARIO);
    analyzer()
        .arg("--log")
        .arg(log.path())
        .arg("deny-rate")
        .assert()
        .success()
        .stdout(
            "Total connections (permitted + Deny): 2\n\
             Denied connections (Deny): 1\n\
             Denied connection rate: 50.00%\n",
        );
}

#[test]
fn test_empty_log() {
    let log = log_file("");
    analyzer()
        .arg("--log")
        .arg(log.path())
        .arg("deny-rate")
        .assert()
        .success()
        .stdout("No connections detected.\n");

    analyzer()
        .arg("--log")
        .arg(log.path())
        .args(["page", "--no-pause"])
        .assert()
        .success()
        .stdout("");
}

#[test]
fn test_page_command_without_pause() {
    let log = log_file(SCENARIO);
    analyzer()
        .arg("--log")
        .arg(log.path())
        .args(["page", "--page-size", "2", "--no-pause"])
        .assert()
        .success()
        .stdout(contains("Page 1/2").and(contains("Page 2/2")))
        .stdout(contains("Press Enter").not());
}

#[test]
fn test_page_command_waits_for_enter() {
    let log = log_file(SCENARIO);
    analyzer()
        .arg("--log")
        .arg(log.path())
        .args(["page", "--page-size", "2"])
        .write_stdin("\n")
        .assert()
        .success()
        .stdout(contains("Press Enter to continue..."))
        .stdout(contains("Page 2/2"));
}

#[test]
fn test_page_command_stops_at_end_of_input() {
    let log = log_file(SCENARIO);
    analyzer()
        .arg("--log")
        .arg(log.path())
        .args(["page", "--page-size", "1"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(contains("Page 1/3"))
        .stdout(contains("Page 2/3").not());
}

#[test]
fn test_page_size_zero_rejected() {
    let log = log_file(SCENARIO);
    analyzer()
        .arg("--log")
        .arg(log.path())
        .args(["page", "--page-size", "0"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("page size must be greater than zero"));
}

#[test]
fn test_missing_log_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    analyzer()
        .arg("--log")
        .arg(dir.path().join("missing.log"))
        .arg("deny-rate")
        .assert()
        .failure()
        .code(1)
        .stderr(contains("cannot open"));
}

#[test]
fn test_no_log_file_given_fails() {
    analyzer()
        .arg("deny-rate")
        .assert()
        .failure()
        .code(1)
        .stderr(contains("No log file given"));
}

#[test]
fn test_strict_decoding_fails_on_invalid_utf8() {
    let mut tmpfile = tempfile::Builder::new().suffix(".log").tempfile().unwrap();
    tmpfile.write_all(b"Deny tcp\nDeny \xff udp\n").unwrap();

    analyzer()
        .arg("--log")
        .arg(tmpfile.path())
        .args(["search", "--pattern", "Deny"])
        .assert()
        .success()
        .stdout("Deny tcp\nDeny  udp\n");

    analyzer()
        .arg("--log")
        .arg(tmpfile.path())
        .args(["--decoding", "strict", "search", "--pattern", "Deny"])
        .assert()
        .failure()
        .stderr(contains("invalid UTF-8").and(contains("line 2")));
}

#[test]
fn test_json_export_to_file() {
    let log = log_file(SCENARIO);
    let dir = tempfile::tempdir().unwrap();

    let json_path = dir.path().join("severity.json");
    analyzer()
        .arg("--log")
        .arg(log.path())
        .args(["severity", "--level", "4", "--format", "json", "--output"])
        .arg(&json_path)
        .assert()
        .success()
        .stderr(contains("Export successful"));
    let v: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(v["filter"]["severity"], 4);
    assert_eq!(v["count"], 1);
    assert_eq!(v["lines"][0], "%ASA-4-106023: Deny tcp");

    let rate_path = dir.path().join("rate.json");
    analyzer()
        .arg("--log")
        .arg(log.path())
        .args(["deny-rate", "--format", "json", "--output"])
        .arg(&rate_path)
        .assert()
        .success();
    let v: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&rate_path).unwrap()).unwrap();
    assert_eq!(v["total"], 2);
    assert_eq!(v["permitted"], 1);
    assert_eq!(v["denied"], 1);
    assert_eq!(v["deny_percentage"], 50.0);
}

#[test]
fn test_all_command_with_profile() {
    let log = log_file(SCENARIO);
    let mut profile = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    write!(
        profile,
        "log_path: '{}'\npage_size: 2\nseverity: 6\nsearch_pattern: Deny\n",
        log.path().display()
    )
    .unwrap();

    analyzer()
        .arg("--profile")
        .arg(profile.path())
        .args(["all", "--no-pause"])
        .assert()
        .success()
        .stdout(contains("=== Paged display ==="))
        .stdout(contains("Page 2/2"))
        .stdout(contains("=== Severity 6 messages ===\n%ASA-6-302013: Built\n"))
        .stdout(contains("=== Search: 'Deny' ===\n%ASA-4-106023: Deny tcp\n"))
        .stdout(contains("=== Denied connection analysis ===\n"))
        .stdout(contains("Denied connection rate: 50.00%"));
}

#[test]
fn test_invalid_profile_fails() {
    let log = log_file(SCENARIO);
    let mut profile = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(profile, r#"{{"page_size": 0}}"#).unwrap();

    analyzer()
        .arg("--profile")
        .arg(profile.path())
        .arg("--log")
        .arg(log.path())
        .arg("deny-rate")
        .assert()
        .failure()
        .stderr(contains("page_size must be greater than zero"));
}

fn profile_file(yaml: &str) -> NamedTempFile {
    let mut profile = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    write!(profile, "{yaml}").unwrap();
    profile
}

#[test]
fn test_deny_rate_text_and_json_agree() {
    let mut contents = String::from("%ASA-4-106023: Deny tcp\n");
    for _ in 0..31 {
        contents.push_str("access-list acl_in permitted tcp\n");
    }
    let log = log_file(&contents);
    analyzer()
        .arg("--log")
        .arg(log.path())
        .arg("deny-rate")
        .assert()
        .success()
        .stdout(contains("Denied connection rate: 3.12%"));

    let output = analyzer()
        .arg("--log")
        .arg(log.path())
        .args(["deny-rate", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["deny_percentage"], 3.12);
}

#[test]
fn test_failed_scan_keeps_existing_report() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.log");

    let json_path = dir.path().join("report.json");
    fs::write(&json_path, "previous report\n").unwrap();
    analyzer()
        .arg("--log")
        .arg(&missing)
        .args(["deny-rate", "--format", "json", "--output"])
        .arg(&json_path)
        .assert()
        .failure()
        .code(1)
        .stderr(contains("cannot open"));
    assert_eq!(fs::read_to_string(&json_path).unwrap(), "previous report\n");

    let text_path = dir.path().join("report.txt");
    fs::write(&text_path, "previous report\n").unwrap();
    analyzer()
        .arg("--log")
        .arg(&missing)
        .args(["search", "--pattern", "Deny", "--output"])
        .arg(&text_path)
        .assert()
        .failure()
        .code(1);
    assert_eq!(fs::read_to_string(&text_path).unwrap(), "previous report\n");
}

#[test]
fn test_text_report_to_file() {
    let log = log_file(SCENARIO);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("warnings.txt");
    fs::write(&path, "previous report\n").unwrap();
    analyzer()
        .arg("--log")
        .arg(log.path())
        .args(["severity", "--level", "4", "--output"])
        .arg(&path)
        .assert()
        .success()
        .stdout("");
    assert_eq!(fs::read_to_string(&path).unwrap(), "%ASA-4-106023: Deny tcp\n");
}

#[test]
fn test_decoding_flag_overrides_profile() {
    let mut tmpfile = tempfile::Builder::new().suffix(".log").tempfile().unwrap();
    tmpfile.write_all(b"Deny tcp\nDeny \xff udp\n").unwrap();
    let profile = profile_file(&format!(
        "log_path: '{}'\ndecoding: skip\n",
        tmpfile.path().display()
    ));

    analyzer()
        .arg("--profile")
        .arg(profile.path())
        .args(["search", "--pattern", "Deny"])
        .assert()
        .success()
        .stdout("Deny tcp\nDeny  udp\n");

    analyzer()
        .arg("--profile")
        .arg(profile.path())
        .args(["--decoding", "strict", "search", "--pattern", "Deny"])
        .assert()
        .failure()
        .stderr(contains("invalid UTF-8"));
}

#[test]
fn test_log_flag_overrides_profile() {
    let profile_log = log_file(SCENARIO);
    let flag_log = log_file("%ASA-4-106023: Deny udp from the flag log\n");
    let profile = profile_file(&format!("log_path: '{}'\n", profile_log.path().display()));

    analyzer()
        .arg("--profile")
        .arg(profile.path())
        .arg("--log")
        .arg(flag_log.path())
        .args(["severity", "--level", "4"])
        .assert()
        .success()
        .stdout("%ASA-4-106023: Deny udp from the flag log\n");
}

#[test]
fn test_pattern_flag_overrides_profile() {
    let log = log_file(SCENARIO);
    let profile = profile_file(&format!(
        "log_path: '{}'\nsearch_pattern: Deny\n",
        log.path().display()
    ));

    analyzer()
        .arg("--profile")
        .arg(profile.path())
        .arg("search")
        .assert()
        .success()
        .stdout("%ASA-4-106023: Deny tcp\n");

    analyzer()
        .arg("--profile")
        .arg(profile.path())
        .args(["search", "--pattern", "Built"])
        .assert()
        .success()
        .stdout("%ASA-6-302013: Built\n");
}

#[test]
fn test_quiet_suppresses_info_logs() {
    let log = log_file(SCENARIO);
    analyzer()
        .arg("--log")
        .arg(log.path())
        .args(["search", "--pattern", "Deny"])
        .assert()
        .success()
        .stderr(contains("Found 1 line(s)"));

    analyzer()
        .arg("--quiet")
        .arg("--log")
        .arg(log.path())
        .args(["search", "--pattern", "Deny"])
        .assert()
        .success()
        .stdout("%ASA-4-106023: Deny tcp\n")
        .stderr(contains("Found").not().and(contains("Analyzing").not()));
}
