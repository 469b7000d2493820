//! Change notifications consumed by the change feed

use std::fmt;
use std::path::PathBuf;

/// A filesystem change reported by the watch layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeNotification {
    Created(PathBuf),
    Changed(PathBuf),
    Deleted(PathBuf),
    /// Treated as delete-then-create; contents may have changed too
    Renamed { from: PathBuf, to: PathBuf },
    /// The watch layer hit a problem; the feed logs it and keeps going
    Error(String),
}

impl ChangeNotification {
    pub fn created(path: impl Into<PathBuf>) -> Self {
        ChangeNotification::Created(path.into())
    }

    pub fn changed(path: impl Into<PathBuf>) -> Self {
        ChangeNotification::Changed(path.into())
    }

    pub fn deleted(path: impl Into<PathBuf>) -> Self {
        ChangeNotification::Deleted(path.into())
    }

    pub fn renamed(from: impl Into<PathBuf>, to: impl Into<PathBuf>) -> Self {
        ChangeNotification::Renamed {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn kind(&self) -> ChangeKind {
        match self {
            ChangeNotification::Created(_) => ChangeKind::Created,
            ChangeNotification::Changed(_) => ChangeKind::Changed,
            ChangeNotification::Deleted(_) => ChangeKind::Deleted,
            ChangeNotification::Renamed { .. } => ChangeKind::Renamed,
            ChangeNotification::Error(_) => ChangeKind::Error,
        }
    }
}

/// Discriminant of a [`ChangeNotification`], for logging and stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Created,
    Changed,
    Deleted,
    Renamed,
    Error,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Created => write!(f, "created"),
            ChangeKind::Changed => write!(f, "changed"),
            ChangeKind::Deleted => write!(f, "deleted"),
            ChangeKind::Renamed => write!(f, "renamed"),
            ChangeKind::Error => write!(f, "error"),
        }
    }
}
