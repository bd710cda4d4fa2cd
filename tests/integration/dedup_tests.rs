#![cfg(unix)]

use dupelink::dedup::{Classification, DedupConfig, Deduplicator, RunStats};
use dupelink::scanner::{Walker, WalkerConfig};
use std::collections::HashSet;
use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn ino(path: &Path) -> u64 {
    fs::metadata(path).unwrap().ino()
}

fn config() -> DedupConfig {
    DedupConfig::default().with_progress_interval(0)
}

fn run_tree(root: &Path, config: DedupConfig) -> RunStats {
    let walker = Walker::new(root, WalkerConfig::default());
    Deduplicator::new(config).run(walker.walk())
}

/// Every regular file under `root`, with its inode and content.
fn snapshot(root: &Path) -> Vec<(PathBuf, u64, Vec<u8>)> {
    let walker = Walker::new(root, WalkerConfig::default());
    walker
        .walk()
        .map(|p| {
            let p = p.unwrap();
            let i = ino(&p);
            let c = fs::read(&p).unwrap();
            (p, i, c)
        })
        .collect()
}

#[test]
fn test_two_copies_become_one_inode() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    fs::write(&a, "hello").unwrap();
    fs::write(&b, "hello").unwrap();

    let stats = run_tree(dir.path(), config());

    assert_eq!(ino(&a), ino(&b));
    assert_eq!(fs::read_to_string(&b).unwrap(), "hello");
    assert_eq!(stats.files_processed, 2);
    assert_eq!(stats.new_content, 1);
    assert_eq!(stats.duplicates_relinked, 1);
    assert_eq!(stats.bytes_reclaimed, 5);
}

#[test]
fn test_existing_hardlink_is_left_alone() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    fs::write(&a, "hello").unwrap();
    fs::hard_link(&a, &b).unwrap();
    let before = fs::metadata(&b).unwrap().ctime_nsec();

    let stats = run_tree(dir.path(), config());

    assert_eq!(stats.real_hardlinks, 1);
    assert_eq!(stats.relinked(), 0);
    assert_eq!(fs::metadata(&b).unwrap().nlink(), 2);
    assert_eq!(fs::metadata(&b).unwrap().ctime_nsec(), before);
}

#[test]
fn test_hardlinked_pair_plus_copy() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    let c = dir.path().join("c.txt");
    fs::write(&a, "x").unwrap();
    fs::hard_link(&a, &b).unwrap();
    fs::write(&c, "x").unwrap();
    let canonical = ino(&a);

    let mut dedup = Deduplicator::new(config());
    assert_eq!(dedup.process(&a), Classification::NewContent);
    assert_eq!(dedup.process(&b), Classification::RealHardlink);
    assert_eq!(
        dedup.process(&c),
        Classification::Duplicate {
            canonical: a.clone(),
            reclaimed: 1
        }
    );

    assert_eq!(ino(&c), canonical);
    assert_eq!(fs::metadata(&a).unwrap().nlink(), 3);
}

#[test]
fn test_enumeration_order_picks_survivor() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    let c = dir.path().join("c.txt");
    fs::write(&a, "x").unwrap();
    fs::hard_link(&a, &b).unwrap();
    fs::write(&c, "x").unwrap();
    let survivor = ino(&c);

    let mut dedup = Deduplicator::new(config());
    let stats = dedup.run(vec![Ok(c.clone()), Ok(a.clone()), Ok(b.clone())]);

    // c came first, so its inode survives; a is a duplicate and b an orphan.
    assert_eq!(stats.new_content, 1);
    assert_eq!(stats.duplicates_relinked, 1);
    assert_eq!(stats.orphans_relinked, 1);
    assert_eq!(ino(&a), survivor);
    assert_eq!(ino(&b), survivor);
    assert_eq!(fs::metadata(&c).unwrap().nlink(), 3);
}

#[test]
fn test_second_run_changes_nothing() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("a.txt"), "alpha").unwrap();
    fs::write(dir.path().join("b.txt"), "alpha").unwrap();
    fs::write(dir.path().join("sub/c.txt"), "alpha").unwrap();
    fs::write(dir.path().join("sub/d.txt"), "beta").unwrap();
    fs::write(dir.path().join("e.txt"), "beta").unwrap();

    let first = run_tree(dir.path(), config());
    assert_eq!(first.duplicates_relinked, 3);
    let after_first = snapshot(dir.path());

    let second = run_tree(dir.path(), config());
    assert_eq!(second.relinked(), 0);
    assert_eq!(second.new_content, 2);
    assert_eq!(second.real_hardlinks, 3);
    assert_eq!(snapshot(dir.path()), after_first);
}

#[test]
fn test_equal_content_ends_on_one_inode() {
    let dir = tempdir().unwrap();
    let contents = ["one", "two", "one", "three", "two", "one", ""];
    for (i, content) in contents.iter().enumerate() {
        fs::write(dir.path().join(format!("f{}.bin", i)), content).unwrap();
    }
    // A pre-existing hardlink inside a content group.
    fs::hard_link(dir.path().join("f3.bin"), dir.path().join("g3.bin")).unwrap();

    run_tree(dir.path(), config());

    let snap = snapshot(dir.path());
    for (_, i1, c1) in &snap {
        for (_, i2, c2) in &snap {
            assert_eq!(c1 == c2, i1 == i2);
        }
    }
    let inodes: HashSet<u64> = snap.iter().map(|(_, i, _)| *i).collect();
    assert_eq!(inodes.len(), 4);
}

#[test]
fn test_dry_run_counts_without_touching() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "hello").unwrap();
    fs::write(dir.path().join("b.txt"), "hello").unwrap();
    fs::write(dir.path().join("c.txt"), "other").unwrap();
    let before = snapshot(dir.path());

    let dry = run_tree(dir.path(), config().with_dry_run(true));
    assert_eq!(snapshot(dir.path()), before);

    let real = run_tree(dir.path(), config());
    assert_eq!(dry.new_content, real.new_content);
    assert_eq!(dry.duplicates_relinked, real.duplicates_relinked);
    assert_eq!(dry.bytes_reclaimed, real.bytes_reclaimed);
}

#[test]
fn test_dry_run_still_resolves_orphans_without_hashing() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    let c = dir.path().join("c.txt");
    fs::write(&a, "x").unwrap();
    fs::hard_link(&a, &b).unwrap();
    fs::write(&c, "x").unwrap();

    let mut dedup = Deduplicator::new(config().with_dry_run(true));
    let stats = dedup.run(vec![Ok(c.clone()), Ok(a.clone()), Ok(b.clone())]);

    assert_eq!(stats.duplicates_relinked, 1);
    assert_eq!(stats.orphans_relinked, 1);
    assert_ne!(ino(&a), ino(&c));
    assert_eq!(ino(&a), ino(&b));
}

#[test]
fn test_verify_mode_relinks_true_duplicates() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.bin");
    let b = dir.path().join("b.bin");
    let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
    fs::write(&a, &data).unwrap();
    fs::write(&b, &data).unwrap();

    let stats = run_tree(dir.path(), config().with_verify(true));

    assert_eq!(stats.duplicates_relinked, 1);
    assert_eq!(stats.verify_mismatches, 0);
    assert_eq!(ino(&a), ino(&b));
}

#[test]
fn test_atomic_strategy_relinks() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    fs::write(&a, "hello").unwrap();
    fs::write(&b, "hello").unwrap();

    let stats = run_tree(
        dir.path(),
        config().with_strategy(dupelink::actions::LinkStrategy::LinkThenRename),
    );

    assert_eq!(stats.duplicates_relinked, 1);
    assert_eq!(ino(&a), ino(&b));
    // No temporary names are left behind.
    let names: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(names.len(), 2);
}

#[test]
fn test_empty_files_are_deduplicated() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.empty");
    let b = dir.path().join("b.empty");
    fs::write(&a, "").unwrap();
    fs::write(&b, "").unwrap();

    let stats = run_tree(dir.path(), config());

    assert_eq!(stats.duplicates_relinked, 1);
    assert_eq!(stats.bytes_reclaimed, 0);
    assert_eq!(ino(&a), ino(&b));
}
