use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

/// Run the binary with an isolated config directory.
fn dupelink(args: &[&str], config_home: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dupelink"))
        .args(args)
        .env("XDG_CONFIG_HOME", config_home)
        .env("NO_COLOR", "true")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn test_missing_root_exits_2() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope");

    let out = dupelink(&[missing.to_str().unwrap()], dir.path());

    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("[DL002] Error: Root directory not found"));
}

#[test]
fn test_file_root_exits_2() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("file.txt");
    fs::write(&file, "x").unwrap();

    let out = dupelink(&[file.to_str().unwrap()], dir.path());

    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn test_argument_errors_exit_1() {
    let dir = tempdir().unwrap();

    assert_eq!(dupelink(&[], dir.path()).status.code(), Some(1));
    assert_eq!(dupelink(&["/a", "/b"], dir.path()).status.code(), Some(1));
    assert_eq!(
        dupelink(&["--no-such-flag", "/a"], dir.path()).status.code(),
        Some(1)
    );
    assert_eq!(
        dupelink(&["--min-size", "lots", "/a"], dir.path()).status.code(),
        Some(1)
    );
}

#[test]
fn test_help_and_version_exit_0() {
    let dir = tempdir().unwrap();

    let help = dupelink(&["--help"], dir.path());
    assert_eq!(help.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&help.stdout).contains("Usage"));

    let version = dupelink(&["--version"], dir.path());
    assert_eq!(version.status.code(), Some(0));
}

#[test]
fn test_bad_config_file_exits_1() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("bad.toml");
    fs::write(&config, "progress_interval = 0\n").unwrap();

    let out = dupelink(
        &["--config", config.to_str().unwrap(), dir.path().to_str().unwrap()],
        dir.path(),
    );

    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("[DL001]"));
}

#[cfg(unix)]
#[test]
fn test_run_prints_summary_and_exits_0() {
    use std::os::unix::fs::MetadataExt;

    let config_home = tempdir().unwrap();
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "hello").unwrap();
    fs::write(dir.path().join("b.txt"), "hello").unwrap();

    let out = dupelink(&["-q", dir.path().to_str().unwrap()], config_home.path());

    assert_eq!(out.status.code(), Some(0));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Summary"));
    assert!(stderr.contains("Duplicates:         1"));
    assert_eq!(
        fs::metadata(dir.path().join("a.txt")).unwrap().ino(),
        fs::metadata(dir.path().join("b.txt")).unwrap().ino()
    );
}

#[test]
fn test_json_summary_on_stdout() {
    let config_home = tempdir().unwrap();
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "hello").unwrap();
    fs::write(dir.path().join("b.txt"), "hello").unwrap();

    let out = dupelink(
        &["--json", "--dry-run", "-q", dir.path().to_str().unwrap()],
        config_home.path(),
    );

    assert_eq!(out.status.code(), Some(0));
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value["dry_run"], true);
    assert_eq!(value["exit_code_name"], "DL000");
    assert_eq!(value["stats"]["files_processed"], 2);
}

#[test]
fn test_progress_lines_are_logged() {
    let config_home = tempdir().unwrap();
    let dir = tempdir().unwrap();
    for i in 0..4 {
        fs::write(dir.path().join(format!("{}.txt", i)), format!("{}", i)).unwrap();
    }

    let out = dupelink(
        &["--progress-interval", "2", dir.path().to_str().unwrap()],
        config_home.path(),
    );

    let stderr = String::from_utf8_lossy(&out.stderr);
    assert_eq!(stderr.matches("Processed 2 files").count(), 1);
    assert_eq!(stderr.matches("Processed 4 files").count(), 1);
}

#[test]
fn test_unwritable_summary_still_exits_0() {
    use std::process::Stdio;

    let config_home = tempdir().unwrap();
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "hello").unwrap();

    // Close the read end of stdout so the JSON summary cannot be written.
    let mut child = Command::new(env!("CARGO_BIN_EXE_dupelink"))
        .args(["--json", "-q", dir.path().to_str().unwrap()])
        .env("XDG_CONFIG_HOME", config_home.path())
        .env("NO_COLOR", "true")
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    drop(child.stdout.take());

    assert_eq!(child.wait().unwrap().code(), Some(0));
}
