//! E2E reporting surface: stats, departments, filters and workbook export.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

fn jd_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("jd"));
    cmd.current_dir(dir);
    cmd.env("JD_DATA_DIR", dir.join("data"));
    cmd.env("XDG_CONFIG_HOME", dir.join("config"));
    cmd.env("HOME", dir);
    cmd.env("JD_LOG", "error");
    cmd.env_remove("FORMAT");
    cmd.env_remove("JD_PASSWORD");
    cmd
}

fn json_stdout(dir: &Path, args: &[&str]) -> Value {
    let output = jd_cmd(dir)
        .args(args)
        .arg("--json")
        .output()
        .expect("jd should not crash");
    assert!(
        output.status.success(),
        "jd {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("--json should produce valid JSON")
}

fn ids(list: &Value) -> Vec<String> {
    list.as_array()
        .expect("array")
        .iter()
        .filter_map(|r| r["id"].as_str().map(str::to_string))
        .collect()
}

#[test]
fn stats_over_seed_data() {
    let dir = TempDir::new().expect("tempdir");
    let stats = json_stdout(dir.path(), &["stats"]);
    assert_eq!(stats["requests"]["total"], 3);
    assert_eq!(stats["requests"]["pending"], 1);
    assert_eq!(stats["requests"]["inProgress"], 1);
    assert_eq!(stats["requests"]["completed"], 1);

    let departments = stats["departments"].as_array().expect("array");
    assert_eq!(departments.len(), 10);
    assert_eq!(departments[0]["department"], "Water Supply");
    assert_eq!(departments[0]["count"], 1);
    assert_eq!(departments[9]["department"], "Administration");
    assert_eq!(departments[9]["count"], 0);
}

#[test]
fn stats_follow_status_changes() {
    let dir = TempDir::new().expect("tempdir");
    json_stdout(dir.path(), &["login", "qwerty", "--password", "password123"]);
    json_stdout(dir.path(), &["status", "1", "completed"]);

    let stats = json_stdout(dir.path(), &["stats"]);
    assert_eq!(stats["requests"]["pending"], 0);
    assert_eq!(stats["requests"]["completed"], 2);
}

#[test]
fn departments_are_fixed_and_ordered() {
    let dir = TempDir::new().expect("tempdir");
    let departments = json_stdout(dir.path(), &["departments"]);
    let names: Vec<&str> = departments
        .as_array()
        .expect("array")
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(
        names,
        [
            "Water Supply",
            "Electricity",
            "Health",
            "Education",
            "Sanitation",
            "Public Works",
            "Transportation",
            "Housing",
            "Finance",
            "Administration",
        ]
    );
    assert!(!dir.path().join("data").exists());
}

#[test]
fn list_filters_combine() {
    let dir = TempDir::new().expect("tempdir");
    assert_eq!(
        ids(&json_stdout(dir.path(), &["list", "--status", "pending"])),
        ["1"]
    );
    assert_eq!(
        ids(&json_stdout(dir.path(), &["list", "--department", "Health"])),
        ["3"]
    );
    assert_eq!(
        ids(&json_stdout(
            dir.path(),
            &["list", "--department", "Health", "--status", "completed"]
        )),
        Vec::<String>::new()
    );
    assert_eq!(
        ids(&json_stdout(dir.path(), &["list", "--search", "STREET LIGHT"])),
        ["2"]
    );
}

#[test]
fn department_filter_is_case_sensitive() {
    let dir = TempDir::new().expect("tempdir");
    let list = json_stdout(dir.path(), &["list", "--department", "health"]);
    assert_eq!(list, serde_json::json!([]));
}

#[test]
fn export_writes_default_file_in_cwd() {
    let dir = TempDir::new().expect("tempdir");
    let out = json_stdout(dir.path(), &["export"]);
    assert_eq!(out["users"], 1);
    assert_eq!(out["requests"], 3);

    let path = dir.path().join("JD_Modern_Solutions_Data.xlsx");
    let bytes = std::fs::read(&path).expect("workbook written");
    assert!(bytes.starts_with(b"PK"));
    assert!(!dir.path().join("data/jd_requests.json").exists());
}

#[test]
fn export_to_explicit_path_and_directory() {
    let dir = TempDir::new().expect("tempdir");
    let target = dir.path().join("snapshot.xlsx");
    json_stdout(
        dir.path(),
        &["export", "--output", target.to_str().expect("utf8 path")],
    );
    assert!(target.exists());

    let sub = dir.path().join("reports");
    std::fs::create_dir(&sub).expect("mkdir");
    json_stdout(
        dir.path(),
        &["export", "--output", sub.to_str().expect("utf8 path")],
    );
    assert!(sub.join("JD_Modern_Solutions_Data.xlsx").exists());
}

#[test]
fn export_file_name_comes_from_data_config() {
    let dir = TempDir::new().expect("tempdir");
    let data = dir.path().join("data");
    std::fs::create_dir_all(&data).expect("mkdir");
    std::fs::write(
        data.join("config.toml"),
        "[export]\nfile_name = \"jd-backup.xlsx\"\n",
    )
    .expect("write config");

    json_stdout(dir.path(), &["export"]);
    assert!(dir.path().join("jd-backup.xlsx").exists());
}

#[test]
fn malformed_data_config_fails_with_code() {
    let dir = TempDir::new().expect("tempdir");
    let data = dir.path().join("data");
    std::fs::create_dir_all(&data).expect("mkdir");
    std::fs::write(data.join("config.toml"), "[export\n").expect("write config");

    jd_cmd(dir.path())
        .args(["list", "--json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E1002"));
}

#[test]
fn data_dir_flag_overrides_environment() {
    let dir = TempDir::new().expect("tempdir");
    let other = dir.path().join("other");
    json_stdout(
        dir.path(),
        &[
            "login",
            "qwerty",
            "--password",
            "password123",
            "--data-dir",
            other.to_str().expect("utf8 path"),
        ],
    );
    assert!(other.join("current_user.json").exists());
    assert!(!dir.path().join("data/current_user.json").exists());
}

#[test]
fn format_env_selects_json() {
    let dir = TempDir::new().expect("tempdir");
    let output = jd_cmd(dir.path())
        .env("FORMAT", "json")
        .args(["stats"])
        .output()
        .expect("jd should not crash");
    assert!(output.status.success());
    let stats: Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(stats["requests"]["total"], 3);
}

#[test]
fn completions_generate_script() {
    let dir = TempDir::new().expect("tempdir");
    jd_cmd(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("jd"));
}
