// End-to-end tests for the vrun binary.

use std::path::Path;
use std::process::{Command, Output};

fn vrun(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_vrun"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run vrun")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn project(config: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("vrun.toml"), config).unwrap();
    dir
}

#[test]
fn cli_help_displays_correctly() {
    let output = Command::new(env!("CARGO_BIN_EXE_vrun"))
        .arg("--help")
        .output()
        .expect("failed to run vrun --help");

    assert!(output.status.success());
    let stdout = stdout(&output);
    assert!(stdout.contains("run"));
    assert!(stdout.contains("config"));
}

#[test]
fn long_version_includes_revision() {
    let dir = tempfile::tempdir().unwrap();
    let output = vrun(dir.path(), &["--version"]);
    assert!(output.status.success());
    let stdout = stdout(&output);
    let line = stdout.trim_end();
    assert!(line.starts_with(&format!("vrun {} (", env!("CARGO_PKG_VERSION"))), "{line}");
    assert!(line.ends_with(')') && !line.ends_with("()"), "{line}");
}

#[test]
fn run_help_shows_option_flags() {
    let dir = tempfile::tempdir().unwrap();
    let output = vrun(dir.path(), &["run", "--help"]);
    assert!(output.status.success());
    let stdout = stdout(&output);
    for flag in ["--shard", "--inspect-brk", "--pool", "--coverage-provider", "--merge-reports"] {
        assert!(stdout.contains(flag), "missing {flag}");
    }
}

#[test]
fn shard_with_watch_fails_before_banner() {
    let dir = tempfile::tempdir().unwrap();
    let output = vrun(dir.path(), &["run", "--watch", "--shard", "1/2"]);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stderr(&output).trim_end(),
        "Error: You cannot use --shard option with enabled watch"
    );
    assert!(!stdout(&output).contains("RUN"));
}

#[test]
fn inspect_with_browser_prints_both_blocks() {
    let dir = project(
        "[test]\nfileParallelism = false\n\n[test.browser]\nenabled = true\nprovider = \"webdriverio\"\nname = \"chrome\"\n",
    );
    let output = vrun(dir.path(), &["run", "--inspect"]);

    assert_eq!(output.status.code(), Some(1));
    let expected = "\
Error: --inspect does not work with
{
  \"browser\": {
    \"provider\": \"webdriverio\",
    \"name\": \"chrome\"
  }
}

Use either:
{
  \"browser\": {
    \"provider\": \"playwright\",
    \"name\": \"chromium\"
  }
}

...or disable --inspect
";
    assert!(stderr(&output).starts_with(expected), "{}", stderr(&output));
}

#[test]
fn reports_directory_equal_to_root_is_rejected() {
    let dir = project("[test.coverage]\nenabled = true\nreportsDirectory = \".\"\nclean = false\n");
    let root = dir.path().canonicalize().unwrap();
    let output = vrun(dir.path(), &["run"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains(&format!(
        "Error: You cannot set \"coverage.reportsDirectory\" as {}. Coverage provider needs to be able to remove this directory before test run",
        root.display()
    )));
    assert!(root.join("vrun.toml").exists());
}

#[test]
fn thresholds_fail_after_run_with_error_prefix() {
    let dir = project(
        "[test.coverage]\nenabled = true\nprovider = \"istanbul\"\n\n[test.coverage.thresholds]\nlines = 100\nfunctions = 100\nstatements = 100\nbranches = 100\n",
    );
    let output = vrun(dir.path(), &["run"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains(" RUN  v"));
    let errors: Vec<_> = stderr(&output)
        .lines()
        .filter(|line| line.starts_with("ERROR: "))
        .map(str::to_string)
        .collect();
    assert_eq!(
        errors,
        [
            "ERROR: Coverage for lines (0%) does not meet global threshold (100%)",
            "ERROR: Coverage for functions (0%) does not meet global threshold (100%)",
            "ERROR: Coverage for statements (0%) does not meet global threshold (100%)",
            "ERROR: Coverage for branches (0%) does not meet global threshold (100%)",
        ]
    );
}

#[test]
fn custom_provider_load_failure_comes_after_banner() {
    let dir = project(
        "[test.coverage]\nenabled = true\nprovider = \"custom\"\ncustomProviderModule = \"./custom-provider.toml\"\n",
    );
    let root = dir.path().canonicalize().unwrap();
    let output = vrun(dir.path(), &["run"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains(&format!(" RUN  v{} {}", env!("CARGO_PKG_VERSION"), root.display())));
    assert!(stderr(&output).contains(&format!(
        "Error: Failed to load custom CoverageProviderModule from {}",
        root.join("custom-provider.toml").display()
    )));
}

#[test]
fn auto_update_without_thresholds_table() {
    let dir = project("[test.coverage]\nenabled = true\n");
    let output = vrun(dir.path(), &["run", "--coverage-thresholds-auto-update"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains(
        "Error: Unable to parse thresholds from configuration file: Expected config.test.coverage.thresholds to be an object"
    ));
}

#[test]
fn fake_next_tick_in_forks_pool() {
    let dir = tempfile::tempdir().unwrap();
    let rejected = vrun(dir.path(), &["run", "--fake-timers", "nextTick"]);
    assert_eq!(rejected.status.code(), Some(1));
    assert!(stderr(&rejected).contains("is not supported in node:child_process"));

    let accepted = vrun(dir.path(), &["run", "--fake-timers", "nextTick", "--pool", "threads"]);
    assert_eq!(accepted.status.code(), Some(0));
}

#[test]
fn merge_reports_with_watch() {
    let dir = tempfile::tempdir().unwrap();
    let output = vrun(dir.path(), &["run", "--watch", "--merge-reports", "blobs"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Error: Cannot merge reports with --watch enabled"));
}

#[test]
fn config_validate_json_reports_kind() {
    let dir = project("[test]\nwatch = true\nshard = \"1/2\"\n");
    let output = vrun(dir.path(), &["config", "validate", "--format", "json"]);

    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["valid"], false);
    assert_eq!(json["error"]["kind"], "ShardError");
}

#[cfg(unix)]
#[test]
fn test_command_exit_code_is_propagated() {
    let dir = tempfile::tempdir().unwrap();
    let output = vrun(dir.path(), &["run", "--", "sh", "-c", "exit 3"]);
    assert_eq!(output.status.code(), Some(3));
}

#[cfg(unix)]
#[test]
fn passing_run_raises_thresholds_in_place() {
    let dir = project(
        "[test.coverage]\nenabled = true\nprovider = \"istanbul\"\n\n[test.coverage.thresholds]\nautoUpdate = true\nlines = 50 # keep\n",
    );
    let summary = r#"{"total":{"lines":{"total":4,"covered":3,"skipped":0,"pct":75},"functions":{"total":1,"covered":1,"skipped":0,"pct":100},"statements":{"total":4,"covered":3,"skipped":0,"pct":75},"branches":{"total":0,"covered":0,"skipped":0,"pct":"Unknown"}}}"#;
    let output = Command::new(env!("CARGO_BIN_EXE_vrun"))
        .args([
            "run",
            "--",
            "sh",
            "-c",
            "printf '%s' \"$SUMMARY\" > \"$VRUN_COVERAGE_DIR/coverage-summary.json\"",
        ])
        .current_dir(dir.path())
        .env("SUMMARY", summary)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run vrun");

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    let updated = std::fs::read_to_string(dir.path().join("vrun.toml")).unwrap();
    assert!(updated.contains("lines = 75 # keep"), "{updated}");
}
