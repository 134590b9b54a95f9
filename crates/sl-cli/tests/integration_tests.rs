//! Integration tests for the `ladder` binary
//!
//! Every test points `--database` at a temp directory so the fixture project
//! is never written to.

use sl_core::{CatalogWarning, Config, Version};
use std::path::{Path, PathBuf};
use std::process::Command;

const SAMPLE_PROJECT: &str = "tests/fixtures/sample_project";

/// Path to the compiled ladder binary
fn ladder_bin() -> String {
    env!("CARGO_BIN_EXE_ladder").to_string()
}

/// Run `ladder` with `args` and return (stdout, stderr, exit code).
fn run_ladder(args: &[&str]) -> (String, String, i32) {
    run_ladder_in(Path::new("."), args)
}

fn run_ladder_in(dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(ladder_bin())
        .current_dir(dir)
        .env_remove("SL_DATABASE")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to execute ladder with args {:?}: {}", args, e));
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

/// Temp directory plus the database path inside it.
fn temp_database() -> (tempfile::TempDir, String) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.duckdb");
    (dir, path.display().to_string())
}

/// Run a command against the sample project with the given database.
fn sample(db: &str, args: &[&str]) -> (String, String, i32) {
    let mut full = vec!["-p", SAMPLE_PROJECT, "--database", db];
    full.extend_from_slice(args);
    run_ladder(&full)
}

fn sample_json(db: &str, args: &[&str]) -> serde_json::Value {
    let (stdout, stderr, code) = sample(db, args);
    assert_eq!(code, 0, "ladder {args:?} failed: {stderr}");
    serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("invalid JSON from {args:?}: {e}\n{stdout}"))
}

// ── Config ─────────────────────────────────────────────────────────────

#[test]
fn test_load_sample_project() {
    let config = Config::load_from_dir(Path::new(SAMPLE_PROJECT)).unwrap();
    assert_eq!(config.name, "sample_project");
    assert_eq!(config.version_option, "sample_schema_version");
    assert!(!config.auto_upgrade);

    let (catalog, warnings) = config.build_catalog().unwrap();
    assert_eq!(catalog.latest(), Some(Version::new(1, 2, 0)));
    // 1.1.0 backfills in a second step that needs no undo
    assert_eq!(
        warnings,
        vec![CatalogWarning::RollbackShapeMismatch {
            version: Version::new(1, 1, 0),
            steps: 2,
            rollback: 1,
        }]
    );
}

#[test]
fn test_validate_sample_project() {
    let (stdout, stderr, code) = run_ladder(&["-p", SAMPLE_PROJECT, "validate"]);
    assert_eq!(code, 0, "validate failed: {stderr}");
    assert!(stdout.contains("3 migration(s) declared"));
    assert!(stdout.contains("Validation passed with 1 warning(s)"));
}

// ── Status / plan / upgrade / rollback ─────────────────────────────────

#[test]
fn test_status_on_fresh_database() {
    let (_dir, db) = temp_database();
    let status = sample_json(&db, &["status", "--json"]);

    assert_eq!(status["project"], "sample_project");
    assert_eq!(status["installed"], "0.0.0");
    assert_eq!(status["latest"], "1.2.0");
    assert_eq!(status["update_available"], true);
    assert_eq!(status["pending"].as_array().unwrap().len(), 3);
}

#[test]
fn test_plan_does_not_change_state() {
    let (_dir, db) = temp_database();

    let (stdout, stderr, code) = sample(&db, &["plan"]);
    assert_eq!(code, 0, "plan failed: {stderr}");
    assert!(stdout.contains("upgrade 0.0.0 -> 1.2.0"));
    assert!(stdout.contains("create_orders"));
    assert!(stdout.contains("5 step(s), 0 unresolved"));

    let status = sample_json(&db, &["status", "--json"]);
    assert_eq!(status["installed"], "0.0.0");
}

#[test]
fn test_upgrade_then_status_and_log() {
    let (_dir, db) = temp_database();

    let (stdout, stderr, code) = sample(&db, &["upgrade"]);
    assert_eq!(code, 0, "upgrade failed: {stderr}");
    assert!(stdout.contains("0.0.0 -> 1.2.0"));

    let status = sample_json(&db, &["status", "--json"]);
    assert_eq!(status["installed"], "1.2.0");
    assert_eq!(status["update_available"], false);

    let (stdout, _, code) = sample(&db, &["upgrade"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("up to date at 1.2.0"));

    let log = sample_json(&db, &["log", "--json"]);
    let entries = log.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["direction"], "upgrade");
    assert_eq!(entries[0]["status"], "success");
    assert_eq!(entries[0]["to_version"], "1.2.0");
}

#[test]
fn test_upgrade_to_intermediate_version() {
    let (_dir, db) = temp_database();

    let (_, stderr, code) = sample(&db, &["upgrade", "--to", "1.1.0"]);
    assert_eq!(code, 0, "upgrade failed: {stderr}");

    let status = sample_json(&db, &["status", "--json"]);
    assert_eq!(status["installed"], "1.1.0");
    assert_eq!(status["pending"], serde_json::json!(["1.2.0"]));
}

#[test]
fn test_rollback_after_upgrade() {
    let (_dir, db) = temp_database();
    let (_, stderr, code) = sample(&db, &["upgrade"]);
    assert_eq!(code, 0, "upgrade failed: {stderr}");

    let (stdout, stderr, code) = sample(&db, &["rollback", "--to", "1.0.0"]);
    assert_eq!(code, 0, "rollback failed: {stderr}");
    assert!(stdout.contains("drop_order_totals"));
    assert!(stdout.contains("drop_order_status"));

    let status = sample_json(&db, &["status", "--json"]);
    assert_eq!(status["installed"], "1.0.0");

    let log = sample_json(&db, &["log", "--json", "--limit", "1"]);
    let entries = log.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["direction"], "rollback");
    assert_eq!(entries[0]["from_version"], "1.2.0");
}

#[test]
fn test_rollback_above_installed_is_rejected() {
    let (_dir, db) = temp_database();
    let (_, stderr, code) = sample(&db, &["rollback", "--to", "1.0.0"]);
    assert_eq!(code, 2);
    assert!(stderr.contains("SL001"), "unexpected stderr: {stderr}");
}

#[test]
fn test_upgrade_beyond_catalog_is_rejected() {
    let (_dir, db) = temp_database();
    let (_, stderr, code) = sample(&db, &["upgrade", "--to", "9.0.0"]);
    assert_eq!(code, 2);
    assert!(stderr.contains("latest known migration is 1.2.0"));

    let status = sample_json(&db, &["status", "--json"]);
    assert_eq!(status["installed"], "0.0.0");
}

// ── Projects written on the fly ────────────────────────────────────────

fn write_project(dir: &Path, yaml: &str) -> PathBuf {
    let project = dir.join("project");
    std::fs::create_dir_all(&project).unwrap();
    std::fs::write(project.join("stepladder.yml"), yaml).unwrap();
    project
}

#[test]
fn test_failing_step_exits_with_one_and_keeps_version() {
    let dir = tempfile::tempdir().unwrap();
    let project = write_project(
        dir.path(),
        r#"
name: broken
database:
  path: broken.duckdb
migrations:
  - version: "1.0.0"
    steps: [create_things, bad_step]
steps:
  create_things: CREATE TABLE things (id INTEGER);
  bad_step: SELECT * FROM table_that_does_not_exist;
"#,
    );
    let project = project.display().to_string();

    let (_, stderr, code) = run_ladder(&["-p", &project, "upgrade"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("SL002"), "unexpected stderr: {stderr}");
    assert!(stderr.contains("failed step: bad_step"));

    let (stdout, _, code) =
        run_ladder(&["-p", &project, "--no-auto-upgrade", "status", "--json"]);
    assert_eq!(code, 0);
    let status: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(status["installed"], "0.0.0");
}

#[test]
fn test_validate_reports_undefined_steps() {
    let dir = tempfile::tempdir().unwrap();
    let project = write_project(
        dir.path(),
        r#"
name: incomplete
migrations:
  - version: "1.0.0"
    steps: [defined, missing]
steps:
  defined: CREATE TABLE t (id INTEGER);
  orphan: DROP TABLE t;
"#,
    );
    let project = project.display().to_string();

    let (stdout, _, code) = run_ladder(&["-p", &project, "validate"]);
    assert_eq!(code, 1);
    assert!(stdout.contains("undefined step 'missing'"));
    assert!(stdout.contains("Step 'orphan' is defined but never referenced"));
}

#[test]
fn test_auto_upgrade_runs_on_status() {
    let dir = tempfile::tempdir().unwrap();
    let project = write_project(
        dir.path(),
        r#"
name: auto
database:
  path: auto.duckdb
auto_upgrade: true
migrations:
  - version: "2.1.0"
    steps: [create_t]
steps:
  create_t: CREATE TABLE t (id INTEGER);
"#,
    );
    let project = project.display().to_string();

    let (stdout, _, code) = run_ladder(&["-p", &project, "--no-auto-upgrade", "status"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Installed:       0.0.0"));

    let (stdout, stderr, code) = run_ladder(&["-p", &project, "status"]);
    assert_eq!(code, 0);
    assert!(stderr.contains("Automatically upgraded schema 0.0.0 -> 2.1.0"));
    assert!(stdout.contains("Installed:       2.1.0"));
}

#[test]
fn test_init_creates_valid_project() {
    let dir = tempfile::tempdir().unwrap();

    let (stdout, stderr, code) = run_ladder_in(dir.path(), &["init", "my_schema"]);
    assert_eq!(code, 0, "init failed: {stderr}");
    assert!(stdout.contains("Created stepladder.yml"));

    let config = Config::load_from_dir(&dir.path().join("my_schema")).unwrap();
    assert_eq!(config.name, "my_schema");
    assert_eq!(config.migrations.len(), 1);

    let (_, _, code) = run_ladder_in(dir.path(), &["init", "my_schema"]);
    assert_ne!(code, 0, "init into an existing directory should fail");
}

#[test]
fn test_init_rejects_path_like_names() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_ladder_in(dir.path(), &["init", "../escape"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Invalid project name"));
}
