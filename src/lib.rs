//! Live search index for a watched folder.
//!
//! - [`tokenizer`] - text to lower-cased ASCII alphanumeric tokens
//! - [`index`] - content and name indices behind [`IndexManager`]
//! - [`indexer`] - eligibility rules, directory walking, text decoding
//! - [`watcher`] - change notifications, the change feed, and a notify-based producer

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod index;
pub mod indexer;
pub mod logging;
pub mod metrics;
pub mod tokenizer;
pub mod watcher;

pub use config::Config;
pub use error::{IndexError, Result};
pub use index::{BuildReport, IndexManager, IndexOutcome, IndexStats};
pub use watcher::{ChangeFeed, ChangeNotification, FeedStats};
