use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

use launch_index::{Freshness, ProgramIndex, Settings, SnapshotStore};

const SCAN_TIMEOUT: Duration = Duration::from_secs(10);

fn test_settings(programs_root: &Path, snapshot_dir: &Path) -> Settings {
    Settings {
        program_roots: vec![programs_root.to_path_buf()],
        program_suffixes: vec!["sh".into()],
        path_dirs: Vec::new(),
        enable_program_dirs: true,
        enable_path_dirs: false,
        snapshot_dir: snapshot_dir.to_path_buf(),
    }
}

fn create_program(root: &Path, relative: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, "#!/bin/sh\n").unwrap();
    path
}

#[test]
fn start_moves_the_index_from_stale_to_fresh() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("programs");
    create_program(&root, "Notepad.sh");
    create_program(&root, "Word.sh");

    let index = ProgramIndex::new(test_settings(&root, &tmp.path().join("snap"))).unwrap();
    assert_eq!(index.freshness(), Freshness::Stale);
    assert!(index.current().is_empty());

    index.start().unwrap();
    assert!(index.wait_for_scan(SCAN_TIMEOUT));

    assert_eq!(index.freshness(), Freshness::Fresh);
    assert_eq!(index.current().len(), 2);
}

#[test]
fn query_returns_only_matching_entries() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("programs");
    create_program(&root, "Notepad.sh");
    create_program(&root, "Word.sh");

    let index = ProgramIndex::new(test_settings(&root, &tmp.path().join("snap"))).unwrap();
    index.start().unwrap();
    assert!(index.wait_for_scan(SCAN_TIMEOUT));

    let hits = index.query("note");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].entry.name, "Notepad");
    assert!(hits[0].score.total > 0);

    assert!(index.query("xyz123").is_empty());
    assert!(index.query("").is_empty());
}

#[test]
fn snapshots_round_trip_through_save_and_preload() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("programs");
    let snap = tmp.path().join("snap");
    create_program(&root, "Alpha.sh");
    create_program(&root, "Beta.sh");

    let settings = test_settings(&root, &snap);
    let index = ProgramIndex::new(settings.clone()).unwrap();
    index.start().unwrap();
    assert!(index.wait_for_scan(SCAN_TIMEOUT));
    let scanned = index.current();
    index.save().unwrap();

    // A second process starting cold should see the same repository from the
    // snapshot alone.
    let store = SnapshotStore::new(snap);
    let preloaded = store.load("programs");
    assert_eq!(preloaded, *scanned);
}

#[test]
fn corrupt_snapshot_is_a_cold_start_not_an_error() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("programs");
    let snap = tmp.path().join("snap");
    create_program(&root, "Alpha.sh");

    fs::create_dir_all(&snap).unwrap();
    fs::write(snap.join("programs.idx"), b"garbage garbage garbage").unwrap();

    let index = ProgramIndex::new(test_settings(&root, &snap)).unwrap();
    index.start().unwrap();
    assert!(index.wait_for_scan(SCAN_TIMEOUT));

    // The corrupt snapshot was ignored and the scan rebuilt the repository.
    assert_eq!(index.current().len(), 1);
}

#[test]
fn save_failure_is_reported_not_fatal() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("programs");
    create_program(&root, "Alpha.sh");

    // snapshot_dir collides with an existing file, so create_dir_all fails
    let blocked = tmp.path().join("blocked");
    fs::write(&blocked, b"").unwrap();

    let index = ProgramIndex::new(test_settings(&root, &blocked)).unwrap();
    index.start().unwrap();
    assert!(index.wait_for_scan(SCAN_TIMEOUT));

    assert!(index.save().is_err());
    // The index itself keeps serving.
    assert_eq!(index.current().len(), 1);
}

#[test]
fn old_repository_serves_until_the_new_one_is_ready() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("programs");
    create_program(&root, "One.sh");
    create_program(&root, "Two.sh");

    let index = ProgramIndex::new(test_settings(&root, &tmp.path().join("snap"))).unwrap();
    index.start().unwrap();
    assert!(index.wait_for_scan(SCAN_TIMEOUT));

    // Grab the pre-rescan generation, then grow the tree and reindex.
    let before = index.current();
    assert_eq!(before.len(), 2);

    create_program(&root, "Three.sh");
    index.reindex().unwrap();
    assert!(index.wait_for_scan(SCAN_TIMEOUT));

    // The held generation is untouched; the active one is the new scan.
    assert_eq!(before.len(), 2);
    assert_eq!(index.current().len(), 3);
    assert_eq!(index.freshness(), Freshness::Fresh);
}

#[test]
fn queries_racing_a_reindex_observe_exactly_one_generation() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("programs");
    create_program(&root, "One.sh");
    create_program(&root, "Two.sh");

    let index = ProgramIndex::new(test_settings(&root, &tmp.path().join("snap"))).unwrap();
    index.start().unwrap();
    assert!(index.wait_for_scan(SCAN_TIMEOUT));

    create_program(&root, "Three.sh");

    std::thread::scope(|s| {
        let readers: Vec<_> = (0..4)
            .map(|_| {
                s.spawn(|| {
                    let mut observed = Vec::new();
                    for _ in 0..200 {
                        observed.push(index.current().len());
                    }
                    observed
                })
            })
            .collect();

        index.reindex().unwrap();

        for reader in readers {
            for len in reader.join().unwrap() {
                assert!(
                    len == 2 || len == 3,
                    "observed a repository that is neither generation: {len}"
                );
            }
        }
    });

    assert!(index.wait_for_scan(SCAN_TIMEOUT));
    assert_eq!(index.current().len(), 3);
}

#[test]
fn shutdown_saves_and_joins() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("programs");
    let snap = tmp.path().join("snap");
    create_program(&root, "Alpha.sh");

    let index = ProgramIndex::new(test_settings(&root, &snap)).unwrap();
    index.start().unwrap();
    assert!(index.wait_for_scan(SCAN_TIMEOUT));
    index.shutdown().unwrap();

    assert!(!index.is_scanning());
    let store = SnapshotStore::new(snap);
    assert_eq!(store.load("programs").len(), 1);
}

#[test]
fn reindex_while_scanning_is_a_no_op() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("programs");
    create_program(&root, "Alpha.sh");

    let index = ProgramIndex::new(test_settings(&root, &tmp.path().join("snap"))).unwrap();
    index.start().unwrap();
    // Issuing more reindexes while the first may still be running must not
    // error or deadlock.
    index.reindex().unwrap();
    index.reindex().unwrap();

    assert!(index.wait_for_scan(SCAN_TIMEOUT));
    assert_eq!(index.current().len(), 1);
}
