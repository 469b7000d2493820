use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// A file path compared case-insensitively.
///
/// Hashing and equality use the case-folded form; the path spelling that was
/// first observed is kept for display and for query results.
#[derive(Debug, Clone)]
pub struct PathKey {
    path: PathBuf,
    folded: String,
}

impl PathKey {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let folded = path.to_string_lossy().to_lowercase();
        Self { path, folded }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }

    /// The case-folded spelling used for comparisons
    pub fn folded(&self) -> &str {
        &self.folded
    }
}

impl PartialEq for PathKey {
    fn eq(&self, other: &Self) -> bool {
        self.folded == other.folded
    }
}

impl Eq for PathKey {}

impl Hash for PathKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.folded.hash(state);
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

impl From<&Path> for PathKey {
    fn from(path: &Path) -> Self {
        Self::new(path)
    }
}
