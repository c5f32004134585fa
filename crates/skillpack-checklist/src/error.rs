//! Error types for checklist loading and evaluation

use std::path::PathBuf;
use thiserror::Error;

/// Checklist errors
#[derive(Debug, Error)]
pub enum ChecklistError {
    /// Ruleset file could not be read
    #[error("Failed to read ruleset {path:?}: {source}")]
    Read {
        /// Ruleset file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// File extension is not toml, yaml, yml or json
    #[error("Unsupported ruleset format for {0:?} (expected .toml, .yaml, .yml or .json)")]
    UnsupportedFormat(PathBuf),

    /// Ruleset content failed to deserialize
    #[error("Failed to parse ruleset {path:?}: {reason}")]
    Parse {
        /// Ruleset file
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// A rule pattern is not a valid regex
    #[error("Rule '{rule}' has an invalid pattern: {source}")]
    InvalidPattern {
        /// Rule ID
        rule: String,
        /// Regex compile error
        #[source]
        source: regex::Error,
    },
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, ChecklistError>;
