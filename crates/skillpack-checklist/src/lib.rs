//! `SkillPack` Checklist Evaluator
//!
//! Evaluates source text against declarative rule checklists and computes a
//! weighted score.
//!
//! ## Scoring
//!
//! - Every category starts at 100
//! - Each finding deducts fixed points by severity (critical 20, warning 8, suggestion 2)
//! - The overall score combines categories by their weights
//! - Rules written for a newer platform than the target are demoted one severity step

#![deny(unsafe_code, dead_code, unused_imports, unused_variables, missing_docs)]

pub mod error;
pub mod evaluator;
pub mod ruleset;
pub mod scoring;

pub use error::ChecklistError;
pub use evaluator::{Evaluation, Evaluator};
pub use ruleset::{Penalties, RuleSet};
pub use scoring::CategoryScore;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{ChecklistError, Evaluation, Evaluator, RuleSet};
}
