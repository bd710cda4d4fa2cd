#![cfg(unix)]

use dupelink::dedup::{DedupConfig, Deduplicator};
use dupelink::scanner::{Walker, WalkerConfig};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn run(root: &Path, walker_config: WalkerConfig) -> dupelink::dedup::RunStats {
    let walker = Walker::new(root, walker_config);
    let mut dedup = Deduplicator::new(DedupConfig::default().with_progress_interval(0));
    dedup.run(walker.walk())
}

fn populate(root: &Path) {
    fs::create_dir_all(root.join("photos/2024")).unwrap();
    fs::create_dir_all(root.join(".cache")).unwrap();
    fs::create_dir_all(root.join("build")).unwrap();
    fs::write(root.join("photos/a.jpg"), "jpeg-bytes").unwrap();
    fs::write(root.join("photos/2024/a-copy.jpg"), "jpeg-bytes").unwrap();
    fs::write(root.join(".cache/a.jpg"), "jpeg-bytes").unwrap();
    fs::write(root.join("build/a.jpg"), "jpeg-bytes").unwrap();
    fs::write(root.join("empty1"), "").unwrap();
    fs::write(root.join("empty2"), "").unwrap();
}

#[test]
fn test_nested_tree_is_fully_walked() {
    let dir = tempdir().unwrap();
    populate(dir.path());

    let stats = run(dir.path(), WalkerConfig::default());

    assert_eq!(stats.files_processed, 6);
    assert_eq!(stats.new_content, 2);
    assert_eq!(stats.duplicates_relinked, 4);
}

#[test]
fn test_min_size_leaves_empty_files_alone() {
    let dir = tempdir().unwrap();
    populate(dir.path());

    let stats = run(dir.path(), WalkerConfig::default().with_min_size(Some(1)));

    assert_eq!(stats.files_processed, 4);
    assert_eq!(stats.duplicates_relinked, 3);
}

#[test]
fn test_hidden_and_ignored_trees_are_excluded() {
    let dir = tempdir().unwrap();
    populate(dir.path());

    let config = WalkerConfig::default()
        .with_skip_hidden(true)
        .with_ignore_patterns(vec!["build/".to_string(), "empty*".to_string()]);
    let stats = run(dir.path(), config);

    assert_eq!(stats.files_processed, 2);
    assert_eq!(stats.duplicates_relinked, 1);
    assert_eq!(
        fs::metadata(dir.path().join("build/a.jpg")).unwrap().len(),
        10
    );
}

#[test]
fn test_relative_root_yields_absolute_paths() {
    let walker = Walker::new(Path::new("."), WalkerConfig::default());
    assert!(walker.root().is_absolute());
}
