use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn course_ingest_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("course-ingest");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let files_dir = root.join("files");
    fs::create_dir_all(&files_dir).unwrap();
    fs::write(
        files_dir.join("rust_ownership-notes.txt"),
        vec!["ownership"; 3200].join(" "),
    )
    .unwrap();
    fs::write(files_dir.join("tiny.txt"), "too short").unwrap();
    fs::write(files_dir.join("slides.pptx"), "not supported").unwrap();

    let config_content = format!(
        r#"[db]
path = "{}/data/courses.sqlite"

[model]
provider = "disabled"

[logging]
level = "warn"
"#,
        root.display()
    );

    let config_path = config_dir.join("course-ingest.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_cli(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = course_ingest_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run course-ingest binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn file_arg(config_path: &Path, name: &str) -> String {
    let root = config_path.parent().unwrap().parent().unwrap();
    root.join("files").join(name).to_str().unwrap().to_string()
}

fn course_id_from(stdout: &str) -> String {
    stdout
        .lines()
        .find_map(|l| l.trim().strip_prefix("course_id: "))
        .unwrap_or_else(|| panic!("no course_id in output: {}", stdout))
        .to_string()
}

#[test]
fn test_init_is_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_cli(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));

    let (_, _, success) = run_cli(&config_path, &["init"]);
    assert!(success, "second init failed (not idempotent)");
}

#[test]
fn test_ingest_and_browse() {
    let (_tmp, config_path) = setup_test_env();
    run_cli(&config_path, &["init"]);

    let file = file_arg(&config_path, "rust_ownership-notes.txt");
    let (stdout, stderr, success) =
        run_cli(&config_path, &["ingest", &file, "--user", "alice"]);
    assert!(success, "ingest failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("title: Rust ownership notes"));
    assert!(stdout.contains("chapters: 3"));
    assert!(stdout.contains("words: 3200"));
    assert!(stdout.contains("reading time: 16 min"));
    let course_id = course_id_from(&stdout);

    let (stdout, _, success) = run_cli(&config_path, &["courses", "--user", "alice"]);
    assert!(success);
    assert!(stdout.contains(&course_id));

    let (stdout, _, _) = run_cli(&config_path, &["courses", "--user", "bob"]);
    assert!(stdout.contains("No courses"));

    let (stdout, stderr, success) = run_cli(&config_path, &["course", &course_id]);
    assert!(success, "course failed: {}", stderr);
    assert!(stdout.contains("--- Chapters (3) ---"));
    assert!(stdout.contains("Chapter 2"));
    assert!(stdout.contains("uploader:     alice"));
}

#[test]
fn test_dry_run_writes_nothing() {
    let (_tmp, config_path) = setup_test_env();
    run_cli(&config_path, &["init"]);

    let file = file_arg(&config_path, "rust_ownership-notes.txt");
    let (stdout, stderr, success) =
        run_cli(&config_path, &["ingest", &file, "--user", "alice", "--dry-run"]);
    assert!(success, "dry run failed: {}", stderr);
    assert!(stdout.contains("(dry-run)"));
    assert!(stdout.contains("chapters: 3"));

    let (stdout, _, _) = run_cli(&config_path, &["courses", "--user", "alice"]);
    assert!(stdout.contains("No courses"));
}

#[test]
fn test_rejected_uploads_fail_the_command() {
    let (_tmp, config_path) = setup_test_env();
    run_cli(&config_path, &["init"]);

    let (_, stderr, success) =
        run_cli(&config_path, &["ingest", &file_arg(&config_path, "slides.pptx")]);
    assert!(!success);
    assert!(stderr.contains("Unsupported"), "stderr: {}", stderr);

    let (_, _, success) = run_cli(&config_path, &["ingest", &file_arg(&config_path, "tiny.txt")]);
    assert!(!success);
}

#[test]
fn test_unknown_course_fails() {
    let (_tmp, config_path) = setup_test_env();
    run_cli(&config_path, &["init"]);

    let (_, stderr, success) = run_cli(&config_path, &["course", "does-not-exist"]);
    assert!(!success);
    assert!(stderr.contains("course not found"));
}

#[test]
fn test_invalid_provider_rejected() {
    let (tmp, _) = setup_test_env();
    let bad = tmp.path().join("config").join("bad.toml");
    fs::write(
        &bad,
        "[db]\npath = \"./x.sqlite\"\n\n[model]\nprovider = \"carrier-pigeon\"\n",
    )
    .unwrap();

    let (_, stderr, success) = run_cli(&bad, &["init"]);
    assert!(!success);
    assert!(stderr.contains("Unknown model provider"));
}
