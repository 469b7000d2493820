//! Queries racing index and remove calls

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use aim_index::{ChangeFeed, ChangeNotification};

use crate::helpers::test_utils::{file_names, manager, manager_with_batch, write_file};

#[test]
fn test_queries_during_updates_see_consistent_files() {
    let temp_dir = TempDir::new().unwrap();
    let anchor = write_file(temp_dir.path(), "anchor.csv", "shared steady");
    let churn: Vec<PathBuf> = (0..4)
        .map(|i| write_file(temp_dir.path(), &format!("churn{}.log", i), "shared volatile"))
        .collect();

    let manager = manager();
    manager.index(&anchor);

    let done = Arc::new(AtomicBool::new(false));

    let writers: Vec<_> = churn
        .iter()
        .cloned()
        .map(|path| {
            let manager = Arc::clone(&manager);
            thread::spawn(move || {
                for _ in 0..200 {
                    manager.index(&path);
                    manager.remove(&path);
                }
                manager.index(&path);
            })
        })
        .collect();

    let allowed: HashSet<PathBuf> = churn.iter().cloned().chain([anchor.clone()]).collect();
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let manager = Arc::clone(&manager);
            let done = Arc::clone(&done);
            let anchor = anchor.clone();
            let allowed = allowed.clone();
            thread::spawn(move || {
                let mut rounds = 0;
                while !done.load(Ordering::Acquire) || rounds < 10 {
                    let shared = manager.query("shared");
                    assert!(shared.contains(&anchor));
                    assert!(shared.iter().all(|p| allowed.contains(p)));

                    assert_eq!(manager.query("steady"), vec![anchor.clone()]);
                    assert!(!manager.query("volatile").contains(&anchor));
                    rounds += 1;
                }
            })
        })
        .collect();

    for writer in writers {
        writer.join().unwrap();
    }
    done.store(true, Ordering::Release);
    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(manager.query("volatile").len(), churn.len());
    assert_eq!(manager.query("shared").len(), churn.len() + 1);
}

#[test]
fn test_same_path_writers_do_not_leave_mixed_state() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(temp_dir.path(), "contested.log", "first\nsecond");

    let manager = manager();
    let workers: Vec<_> = (0..8)
        .map(|i| {
            let manager = Arc::clone(&manager);
            let path = path.clone();
            thread::spawn(move || {
                for _ in 0..100 {
                    if i % 2 == 0 {
                        manager.index(&path);
                    } else {
                        manager.remove(&path);
                    }
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    // Either fully present or fully absent, never half of each index
    let by_content = manager.query("second");
    let by_name = manager.query("contested");
    assert_eq!(by_content, by_name);

    manager.index(&path);
    assert_eq!(manager.lines_for(&path, "second"), Some(vec![2]));
    assert_eq!(manager.stats().files_with_content, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_build_and_feed_converge() {
    let temp_dir = TempDir::new().unwrap();
    let paths: Vec<PathBuf> = (0..40)
        .map(|i| write_file(temp_dir.path(), &format!("f{}.csv", i), format!("row {}", i)))
        .collect();

    let manager = manager_with_batch(5, 3);
    let (tx, rx) = mpsc::channel(8);
    let feed = tokio::spawn(ChangeFeed::new(manager.clone()).run(rx, CancellationToken::new()));

    let build = {
        let manager = manager.clone();
        let root = temp_dir.path().to_path_buf();
        tokio::spawn(async move { manager.build(root, CancellationToken::new()).await })
    };

    for (i, path) in paths.iter().enumerate() {
        fs::write(path, format!("row {} edited", i)).unwrap();
        tx.send(ChangeNotification::changed(path)).await.unwrap();
    }
    drop(tx);

    build.await.unwrap().unwrap();
    feed.await.unwrap();

    assert_eq!(manager.query("edited").len(), paths.len());
    assert_eq!(manager.query("row").len(), paths.len());
    assert_eq!(file_names(&manager.query("f17")), vec!["f17.csv"]);
    assert_eq!(manager.stats().files_with_content, paths.len());
}

#[test]
fn test_cancel_mid_build_keeps_partial_index() {
    const FILES: usize = 1000;

    let temp_dir = TempDir::new().unwrap();
    for i in 0..FILES {
        write_file(temp_dir.path(), &format!("d{}/f{}.log", i % 10, i), "bulk");
    }

    let manager = manager_with_batch(1, 1);
    let cancel = CancellationToken::new();
    let build = {
        let manager = Arc::clone(&manager);
        let root = temp_dir.path().to_path_buf();
        let cancel = cancel.clone();
        thread::spawn(move || manager.build_blocking(&root, &cancel))
    };

    // Cancel as soon as the first batch has landed
    while manager.stats().files_with_content == 0 && !build.is_finished() {
        thread::yield_now();
    }
    cancel.cancel();

    let report = build.join().unwrap();

    assert!(report.cancelled);
    assert!(report.files_seen >= 1);
    assert!(report.files_seen < FILES);
    // Whatever made it in before cancellation stays queryable
    assert_eq!(manager.query("bulk").len(), report.indexed);
}
