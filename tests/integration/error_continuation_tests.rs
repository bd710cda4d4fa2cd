#![cfg(unix)]

use dupelink::dedup::{Classification, DedupConfig, Deduplicator, SkipReason};
use dupelink::scanner::ScanError;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn quiet() -> DedupConfig {
    DedupConfig::default().with_progress_interval(0)
}

#[test]
fn test_vanished_path_is_skipped_and_run_continues() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    fs::write(&a, "hello").unwrap();
    fs::write(&b, "hello").unwrap();

    let mut dedup = Deduplicator::new(quiet());
    let stats = dedup.run(vec![
        Ok(a.clone()),
        Ok(dir.path().join("vanished.txt")),
        Ok(b.clone()),
    ]);

    assert_eq!(stats.files_processed, 3);
    assert_eq!(stats.stat_errors, 1);
    assert_eq!(stats.duplicates_relinked, 1);
}

#[test]
fn test_enumeration_errors_are_counted() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.txt");
    fs::write(&a, "hello").unwrap();

    let mut dedup = Deduplicator::new(quiet());
    let stats = dedup.run(vec![
        Err(ScanError::PermissionDenied(PathBuf::from("/locked"))),
        Ok(a),
        Err(ScanError::NotFound(PathBuf::from("/gone"))),
    ]);

    assert_eq!(stats.scan_errors, 2);
    assert_eq!(stats.files_processed, 1);
    assert_eq!(stats.new_content, 1);
    assert_eq!(stats.skipped(), 2);
}

#[test]
fn test_directory_path_is_a_stat_skip() {
    let dir = tempdir().unwrap();
    let mut dedup = Deduplicator::new(quiet());

    assert_eq!(
        dedup.process(dir.path()),
        Classification::Skipped(SkipReason::Stat)
    );
}

#[test]
fn test_symlink_path_is_a_stat_skip() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.txt");
    let link = dir.path().join("link.txt");
    fs::write(&a, "hello").unwrap();
    std::os::unix::fs::symlink(&a, &link).unwrap();

    let mut dedup = Deduplicator::new(quiet());
    dedup.process(&a);

    assert_eq!(
        dedup.process(&link),
        Classification::Skipped(SkipReason::Stat)
    );
    assert!(fs::symlink_metadata(&link)
        .unwrap()
        .file_type()
        .is_symlink());
}
