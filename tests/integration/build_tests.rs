//! Integration tests for the initial build

use aim_index::{IndexError, IndexOutcome};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use crate::helpers::test_utils::{
    file_names, manager, manager_with_batch, utf16_le_with_bom, write_file,
};

#[tokio::test]
async fn test_build_indexes_contents_and_names() {
    let temp_dir = TempDir::new().unwrap();
    write_file(temp_dir.path(), "a.csv", "error code 42");
    write_file(temp_dir.path(), "b.log", "42 retries");

    let manager = manager();
    let report = manager
        .build(temp_dir.path(), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.files_seen, 2);
    assert_eq!(report.indexed, 2);
    assert!(!report.cancelled);

    assert_eq!(file_names(&manager.query("42")), vec!["a.csv", "b.log"]);
    assert_eq!(file_names(&manager.query("error")), vec!["a.csv"]);
    assert_eq!(file_names(&manager.query("error 42")), vec!["a.csv"]);
    assert_eq!(file_names(&manager.query("RETRIES")), vec!["b.log"]);
    assert!(manager.query("error retries").is_empty());
}

#[tokio::test]
async fn test_build_name_indexes_txt_files() {
    let temp_dir = TempDir::new().unwrap();
    write_file(temp_dir.path(), "meeting-notes.txt", "confidential agenda");
    write_file(temp_dir.path(), "data.csv", "agenda");

    let manager = manager();
    let report = manager
        .build(temp_dir.path(), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.indexed, 1);
    assert_eq!(report.name_only, 1);

    assert_eq!(file_names(&manager.query("notes")), vec!["meeting-notes.txt"]);
    assert!(manager.query("confidential").is_empty());
    // Only the csv has the word in its contents
    assert_eq!(file_names(&manager.query("agenda")), vec!["data.csv"]);
}

#[tokio::test]
async fn test_build_matches_base_name_tokens() {
    let temp_dir = TempDir::new().unwrap();
    write_file(temp_dir.path(), "Report_2024.csv", "quarterly totals");

    let manager = manager();
    manager
        .build(temp_dir.path(), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(file_names(&manager.query("report")), vec!["Report_2024.csv"]);
    assert_eq!(
        file_names(&manager.query("2024 totals")),
        vec!["Report_2024.csv"]
    );
    // The extension is not part of the base name
    assert!(manager.query("csv").is_empty());
}

#[tokio::test]
async fn test_build_skips_ignored_and_ineligible_files() {
    let temp_dir = TempDir::new().unwrap();
    write_file(temp_dir.path(), "keep/kept.log", "needle");
    write_file(temp_dir.path(), ".git/objects/packed.log", "needle");
    write_file(temp_dir.path(), "image.png", "needle");
    write_file(temp_dir.path(), "script.rs", "needle");

    let manager = manager();
    let report = manager
        .build(temp_dir.path(), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.files_seen, 1);
    assert_eq!(file_names(&manager.query("needle")), vec!["kept.log"]);
}

#[tokio::test]
async fn test_build_walks_nested_directories_in_batches() {
    let temp_dir = TempDir::new().unwrap();
    for i in 0..25 {
        write_file(
            temp_dir.path(),
            &format!("level{}/deeper/file{}.log", i % 3, i),
            format!("common line\nunique{}\n", i),
        );
    }

    let manager = manager_with_batch(4, 2);
    let report = manager
        .build(temp_dir.path(), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.files_seen, 25);
    assert_eq!(report.indexed, 25);
    assert_eq!(manager.query("common").len(), 25);
    assert_eq!(file_names(&manager.query("unique7")), vec!["file7.log"]);
    assert_eq!(manager.stats().files_with_content, 25);
}

#[tokio::test]
async fn test_build_decodes_utf16_with_bom() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(
        temp_dir.path(),
        "export.csv",
        utf16_le_with_bom("name,status\r\nwidget,shipped\r\n"),
    );

    let manager = manager();
    manager
        .build(temp_dir.path(), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(file_names(&manager.query("shipped widget")), vec!["export.csv"]);
    assert_eq!(manager.lines_for(&path, "shipped"), Some(vec![2]));
}

#[tokio::test]
async fn test_build_handles_empty_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(temp_dir.path(), "empty.log", "");

    let manager = manager();
    let report = manager
        .build(temp_dir.path(), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.indexed, 1);
    assert_eq!(manager.index(&path), IndexOutcome::Indexed { lines: 0, tokens: 0 });
    assert_eq!(file_names(&manager.query("empty")), vec!["empty.log"]);
}

#[tokio::test]
async fn test_rebuild_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    write_file(temp_dir.path(), "a.csv", "alpha beta");
    write_file(temp_dir.path(), "b.log", "beta gamma");
    write_file(temp_dir.path(), "c.txt", "ignored contents");

    let manager = manager();
    manager
        .build(temp_dir.path(), CancellationToken::new())
        .await
        .unwrap();
    let first_stats = manager.stats();
    let first_beta = manager.query("beta");

    manager
        .build(temp_dir.path(), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(manager.stats(), first_stats);
    assert_eq!(manager.query("beta"), first_beta);
    assert_eq!(file_names(&manager.query("c")), vec!["c.txt"]);
}

#[tokio::test]
async fn test_build_missing_root_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let manager = manager();

    let err = manager
        .build(temp_dir.path().join("nope"), CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, IndexError::RootUnreadable { .. }));
    assert!(err.to_string().contains("nope"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_build_skips_unreadable_subdirectory() {
    use std::fs;
    use std::os::unix::fs::{MetadataExt, PermissionsExt};

    let temp_dir = TempDir::new().unwrap();
    // Permission bits do not stop root
    if fs::metadata(temp_dir.path()).unwrap().uid() == 0 {
        return;
    }

    write_file(temp_dir.path(), "readable.csv", "visible row");
    write_file(temp_dir.path(), "sibling/nested.log", "visible row");
    let locked = temp_dir.path().join("locked");
    write_file(&locked, "hidden.csv", "visible row");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    let manager = manager();
    let result = manager
        .build(temp_dir.path(), CancellationToken::new())
        .await;

    // Restore access so the temp dir can be cleaned up
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    let report = result.unwrap();
    assert!(report.skipped_entries >= 1);
    assert!(!report.cancelled);
    assert_eq!(
        file_names(&manager.query("visible")),
        vec!["nested.log", "readable.csv"]
    );
}
