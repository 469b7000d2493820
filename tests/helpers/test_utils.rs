use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use aim_index::config::IndexerConfig;
use aim_index::IndexManager;

/// Write `content` to `root/rel`, creating parent directories
pub fn write_file(root: &Path, rel: &str, content: impl AsRef<[u8]>) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    fs::write(&path, content).expect("Failed to write test file");
    path
}

/// UTF-16 LE bytes with a byte order mark
pub fn utf16_le_with_bom(text: &str) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xFE];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    bytes
}

/// File names of `paths`, sorted
pub fn file_names(paths: &[PathBuf]) -> Vec<String> {
    let mut names: Vec<String> = paths
        .iter()
        .map(|p| {
            p.file_name()
                .expect("result path has a file name")
                .to_string_lossy()
                .to_string()
        })
        .collect();
    names.sort();
    names
}

/// Manager with default rules, shared the way the CLI shares it
pub fn manager() -> Arc<IndexManager> {
    Arc::new(IndexManager::new(IndexerConfig::default()))
}

/// Manager with a small batch so builds exercise several parallel batches
pub fn manager_with_batch(batch_size: usize, threads: usize) -> Arc<IndexManager> {
    let config = IndexerConfig {
        batch_size,
        parallel_threads: Some(threads),
        ..Default::default()
    };
    Arc::new(IndexManager::new(config))
}
