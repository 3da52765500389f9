use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::{TempDir, tempdir};

/// Isolated workspace: its own database and an empty explicit config, so the
/// developer's global config and environment never leak in.
struct Workspace {
    dir: TempDir,
    db: PathBuf,
    config: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        let db = dir.path().join("data").join("competency.db");
        let config = dir.path().join("config.toml");
        std::fs::write(&config, "").unwrap();
        Self { dir, db, config }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("competency").unwrap();
        cmd.current_dir(self.dir.path())
            .env_remove("COMPETENCY_ROBOT")
            .env_remove("COMPETENCY_DATABASE_PATH")
            .env_remove("COMPETENCY_PASS_SCORE")
            .env_remove("COMPETENCY_COOLDOWN_HOURS")
            .env_remove("COMPETENCY_RESOURCE_BASE_URL")
            .env_remove("COMPETENCY_CONFIG")
            .env_remove("RUST_LOG")
            .arg("--config")
            .arg(&self.config)
            .arg("--db")
            .arg(&self.db);
        cmd
    }

    /// Run in robot mode and parse stdout, asserting success.
    fn robot_ok(&self, args: &[&str]) -> Value {
        let output = self.cmd().arg("--robot").args(args).output().unwrap();
        assert!(
            output.status.success(),
            "{args:?} failed: {}",
            String::from_utf8_lossy(&output.stdout)
        );
        let json: Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(json["status"], "ok");
        json["data"].clone()
    }

    /// Run in robot mode expecting failure; returns the structured error.
    fn robot_err(&self, args: &[&str]) -> Value {
        let output = self.cmd().arg("--robot").args(args).output().unwrap();
        assert!(!output.status.success(), "{args:?} unexpectedly succeeded");
        let json: Value = serde_json::from_slice(&output.stdout).unwrap();
        json["status"]["error"].clone()
    }

    fn db_path(&self) -> &Path {
        &self.db
    }
}

/// Junior and mid backend roles, Rust required at 3 for mid, one question.
/// Returns (question id, correct option id, wrong option id).
fn seed_catalog(ws: &Workspace) -> (String, String, String) {
    ws.robot_ok(&["role", "add", "--id", "jr", "--title", "Junior Backend Engineer", "--level", "junior"]);
    ws.robot_ok(&["role", "add", "--id", "mid", "--title", "Mid-Level Backend Engineer", "--level", "mid"]);
    ws.robot_ok(&["skill", "add", "--id", "rust", "--name", "Rust", "--category", "technical"]);
    ws.robot_ok(&["role", "require", "mid", "rust", "--level", "3"]);

    let data = ws.robot_ok(&[
        "question", "add", "rust", "--text", "Which keyword moves ownership into a closure?",
        "--option", "move", "--option", "ref", "--option", "static", "--correct", "1",
    ]);
    let question = &data["question"];
    let options = question["options"].as_array().unwrap();
    let correct = options.iter().find(|o| o["is_correct"] == true).unwrap();
    let wrong = options.iter().find(|o| o["is_correct"] == false).unwrap();
    (
        question["id"].as_str().unwrap().to_string(),
        correct["id"].as_str().unwrap().to_string(),
        wrong["id"].as_str().unwrap().to_string(),
    )
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("competency").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("competency").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_init_creates_database() {
    let ws = Workspace::new();
    let data = ws.robot_ok(&["init"]);
    assert_eq!(data["schema_version"], 1);
    assert!(ws.db_path().exists());
}

#[test]
fn test_human_stats_output() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Employees"))
        .stdout(predicate::str::contains("Pending promotions"));
}

#[test]
fn test_unknown_employee_is_structured_error() {
    let ws = Workspace::new();
    let error = ws.robot_err(&["assess", "status", "ghost"]);
    assert_eq!(error["code"], "EMPLOYEE_NOT_FOUND");
    assert_eq!(error["numeric_code"], 101);
    assert_eq!(error["category"], "directory");
}

#[test]
fn test_human_error_goes_to_stderr() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["role", "add", "--title", "Boss", "--level", "principal"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid role level"));
}

#[test]
fn test_employee_without_role_cannot_assess() {
    let ws = Workspace::new();
    ws.robot_ok(&["employee", "add", "--id", "e1", "--name", "Ada Lovelace", "--email", "ada@example.com"]);
    let error = ws.robot_err(&["assess", "status", "e1"]);
    assert_eq!(error["code"], "NO_ACTIVE_ROLE");
}

#[test]
fn test_full_promotion_workflow() {
    let ws = Workspace::new();
    let (question_id, correct_id, wrong_id) = seed_catalog(&ws);

    ws.robot_ok(&["employee", "add", "--id", "e1", "--name", "Ada Lovelace", "--email", "ada@example.com"]);
    ws.robot_ok(&["employee", "assign", "e1", "jr"]);

    let status = ws.robot_ok(&["assess", "status", "e1"]);
    assert_eq!(status["assessment"]["target"]["id"], "mid");
    assert_eq!(status["assessment"]["gate"]["gate"], "open");
    assert_eq!(status["assessment"]["requirements"][0]["current_rating"], 1);

    // Tests stay closed until the self-assessment passes.
    let tests = ws.robot_ok(&["test", "list", "e1"]);
    assert_eq!(tests["tests"]["gate"]["gate"], "locked");
    assert_eq!(tests["tests"]["gate"]["reason"], "assessment_needed");

    // Failing installs a learning path and locks the assessment.
    let failed = ws.robot_ok(&["assess", "submit", "e1", "--rating", "rust=2"]);
    assert_eq!(failed["submission"]["evaluation"]["status"], "failed");
    let items = failed["submission"]["learning_items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Mastering Rust");
    let item_id = items[0]["id"].as_str().unwrap().to_string();

    let locked = ws.robot_err(&["assess", "submit", "e1", "--rating", "rust=5"]);
    assert_eq!(locked["code"], "WORKFLOW_LOCKED");

    let early = ws.robot_err(&["learn", "complete", "e1"]);
    assert_eq!(early["code"], "VALIDATION_FAILED");

    let path = ws.robot_ok(&["learn", "done", "e1", &item_id]);
    assert_eq!(path["learning_path"]["all_completed"], true);
    let completed = ws.robot_ok(&["learn", "complete", "e1"]);
    assert_eq!(completed["completion"]["items_completed"], 1);

    // Reopened; a passing submission opens the tests.
    let passed = ws.robot_ok(&["assess", "submit", "e1", "--rating", "rust=4"]);
    assert_eq!(passed["submission"]["evaluation"]["status"], "passed");

    let tests = ws.robot_ok(&["test", "list", "e1"]);
    assert_eq!(tests["tests"]["gate"]["gate"], "open");
    assert_eq!(tests["tests"]["skills"][0]["state"]["state"], "not_attempted");

    let session = ws.robot_ok(&["test", "start", "e1", "rust", "--seed", "3"]);
    let options = session["test"]["questions"][0]["options"].as_array().unwrap();
    assert_eq!(options.len(), 3);
    assert!(options.iter().all(|o| o.get("is_correct").is_none()));

    // A wrong answer scores 0 and starts the cooldown.
    let answer = format!("{question_id}={wrong_id}");
    let attempt = ws.robot_ok(&["test", "submit", "e1", "rust", "--answer", &answer]);
    assert_eq!(attempt["attempt"]["attempt"]["score"], 0);
    assert_eq!(attempt["attempt"]["next_state"]["state"], "cooldown");

    let answer = format!("{question_id}={correct_id}");
    let blocked = ws.robot_err(&["test", "submit", "e1", "rust", "--answer", &answer]);
    assert_eq!(blocked["code"], "ATTEMPT_NOT_ALLOWED");

    let promotion = ws.robot_ok(&["promote", "status", "e1"]);
    assert_eq!(promotion["promotion"]["eligibility"]["evaluation"]["eligible"], false);
    let refused = ws.robot_err(&["promote", "request", "e1", "mid"]);
    assert_eq!(refused["code"], "VALIDATION_FAILED");

    let stats = ws.robot_ok(&["stats"]);
    assert_eq!(stats["stats"]["employees"], 1);
    assert_eq!(stats["stats"]["roles"], 2);
    assert_eq!(stats["stats"]["passed_tests"], 0);
}

#[test]
fn test_promotion_request_and_approval() {
    let ws = Workspace::new();
    let (question_id, correct_id, _) = seed_catalog(&ws);
    ws.robot_ok(&["employee", "add", "--id", "e1", "--name", "Grace Hopper", "--email", "grace@example.com"]);
    ws.robot_ok(&["employee", "assign", "e1", "jr"]);
    ws.robot_ok(&["assess", "submit", "e1", "--rating", "rust=3"]);

    let answer = format!("{question_id}={correct_id}");
    let attempt = ws.robot_ok(&["test", "submit", "e1", "rust", "--answer", &answer]);
    assert_eq!(attempt["attempt"]["attempt"]["score"], 100);
    assert_eq!(attempt["attempt"]["attempt"]["passed"], true);

    let request = ws.robot_ok(&["promote", "request", "e1", "mid"]);
    let request_id = request["request"]["id"].as_str().unwrap().to_string();
    assert_eq!(request["request"]["status"], "pending");

    let duplicate = ws.robot_err(&["promote", "request", "e1", "mid"]);
    assert_eq!(duplicate["code"], "VALIDATION_FAILED");

    let pending = ws.robot_ok(&["promote", "pending"]);
    assert_eq!(pending["count"], 1);

    let review = ws.robot_ok(&["promote", "review", &request_id]);
    assert_eq!(review["review"]["requested_role"]["id"], "mid");
    assert_eq!(review["review"]["eligibility"]["evaluation"]["passed_count"], 1);

    let approved = ws.robot_ok(&["promote", "approve", &request_id]);
    assert_eq!(approved["review"]["review"]["status"], "approved");
    assert_eq!(approved["review"]["assignment"]["role_id"], "mid");

    let again = ws.robot_err(&["promote", "reject", &request_id]);
    assert_eq!(again["code"], "VALIDATION_FAILED");

    let employees = ws.robot_ok(&["employee", "list"]);
    assert_eq!(employees["employees"][0]["role"]["id"], "mid");

    let stats = ws.robot_ok(&["stats"]);
    assert_eq!(stats["stats"]["pending_promotions"], 0);
    assert_eq!(stats["stats"]["passed_tests"], 1);
}

#[test]
fn test_role_show_reports_next_role() {
    let ws = Workspace::new();
    seed_catalog(&ws);
    let show = ws.robot_ok(&["role", "show", "jr"]);
    assert_eq!(show["next_role"]["id"], "mid");
    assert_eq!(show["family"], "Backend Engineer");

    let show = ws.robot_ok(&["role", "show", "mid"]);
    assert!(show["next_role"].is_null());
    assert_eq!(show["requirements"][0]["testable"], true);

    let removed = ws.robot_ok(&["role", "unrequire", "mid", "rust"]);
    assert_eq!(removed["removed"], true);
}

#[test]
fn test_robot_config_without_flag() {
    let ws = Workspace::new();
    std::fs::write(&ws.config, "[robot]\nenabled = true\nformat = \"compact\"\ninclude_metadata = false\n").unwrap();
    let output = ws.cmd().arg("stats").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim().lines().count(), 1);
    let json: Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(json["status"], "ok");
    assert!(json.get("timestamp").is_none());
}

#[test]
fn test_robot_config_renders_errors_without_flag() {
    let ws = Workspace::new();
    std::fs::write(&ws.config, "[robot]\nenabled = true\nformat = \"compact\"\ninclude_metadata = false\n").unwrap();
    let output = ws.cmd().args(["assess", "status", "ghost"]).output().unwrap();
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim().lines().count(), 1);
    let json: Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(json["status"]["error"]["code"], "EMPLOYEE_NOT_FOUND");
    assert!(json.get("timestamp").is_none());
    assert!(json.get("version").is_none());
    assert!(!String::from_utf8_lossy(&output.stderr).contains("Error:"));
}
