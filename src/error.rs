use std::path::PathBuf;

/// Errors surfaced by the index layer.
///
/// Per-file failures during `index` never show up here; they are reported
/// through [`crate::index::IndexOutcome`] instead.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("Root directory is not readable: {}: {source}", path.display())]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Watch error: {0}")]
    Watch(String),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, IndexError>;
