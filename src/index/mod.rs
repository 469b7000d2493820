//! In-memory search index
//!
//! Two inverted indices live side by side:
//!
//! - [`ContentIndex`] - per-file token -> line postings, keyed by path
//! - [`NameIndex`] - token -> paths whose base name contains the token
//!
//! [`IndexManager`] owns both and is the only way to change them.

pub mod content;
pub mod manager;
pub mod name;
pub mod outcome;
pub mod path_key;

pub use content::{ContentEntry, ContentIndex};
pub use manager::{IndexManager, IndexStats};
pub use name::NameIndex;
pub use outcome::{BuildReport, FailureStage, IndexFailure, IndexOutcome};
pub use path_key::PathKey;
