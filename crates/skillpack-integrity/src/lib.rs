//! `SkillPack` Integrity Checks
//!
//! Documentation-integrity checks for skill packs:
//!
//! - every routing-table path resolves to an existing file inside the skill
//! - routing tables survive a render/parse round trip
//! - rule IDs are unique within a checklist
//! - category weights sum to 100
//!
//! Checks never fail; they collect [`Issue`]s into an [`IntegrityReport`].

#![deny(unsafe_code, dead_code, unused_imports, unused_variables, missing_docs)]

pub mod checks;
pub mod report;

pub use checks::{check_all, check_manifest, check_ruleset};
pub use report::{IntegrityReport, Issue, IssueKind, IssueLevel};
