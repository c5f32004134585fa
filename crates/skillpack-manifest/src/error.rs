//! Error types for manifest loading and reference resolution

use std::path::PathBuf;
use thiserror::Error;

/// Manifest errors
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Directory has no SKILL.md
    #[error("SKILL.md not found in {0:?}")]
    NotFound(PathBuf),

    /// File could not be read
    #[error("Failed to read {path:?}: {source}")]
    Read {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Frontmatter missing or malformed
    #[error("Invalid frontmatter in {path:?}: {reason}")]
    Frontmatter {
        /// Manifest file
        path: PathBuf,
        /// Failure reason
        reason: String,
    },

    /// Metadata failed validation
    #[error("Invalid skill metadata: {0}")]
    InvalidMetadata(String),

    /// Skill not registered
    #[error("Skill '{0}' not found")]
    SkillNotFound(String),

    /// Reference path is absolute or escapes the skill directory
    #[error("Reference path '{path}' in skill '{skill}' is not a relative path inside the skill")]
    UnsafePath {
        /// Skill name
        skill: String,
        /// Offending path
        path: String,
    },

    /// Reference path is not listed in the routing table
    #[error("Reference '{path}' is not listed in the routing table of skill '{skill}'")]
    UnknownReference {
        /// Skill name
        skill: String,
        /// Requested path
        path: String,
    },
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, ManifestError>;
