//! `SkillPack` Manifest Loader
//!
//! Loads skill manifests (SKILL.md) and routes situations to reference documents
//! using progressive disclosure.
//!
//! ## Features
//!
//! - YAML frontmatter for manifest metadata (name, description, triggers, modes)
//! - Routing tables parsed from the manifest body (situation -> reference file)
//! - Multiple skills directories (personal, project, configured)
//! - Keyword routing with whole-word, case-insensitive matching
//!
//! ## Architecture
//!
//! Phase 1 (Discovery): At startup, load name, description and routing table from each SKILL.md
//! Phase 2 (Activation): When a situation triggers a skill, load the full SKILL.md body
//! Phase 3 (Execution): Load the reference documents the situation routes to

#![deny(unsafe_code, dead_code, unused_imports, unused_variables, missing_docs)]

pub mod error;
pub mod manifest;
pub mod registry;
pub mod routing;

pub use error::ManifestError;
pub use manifest::{ManifestMetadata, SkillManifest, MANIFEST_FILE};
pub use registry::SkillsRegistry;
pub use routing::ReferenceIndex;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{ManifestError, ReferenceIndex, SkillManifest, SkillsRegistry};
}
