//! SkillPack Types - Core types shared by the skill pack tooling
//!
//! This module defines the data model for manifests, references and rule checklists.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Routing Types
// ============================================================================

/// A single row of a manifest routing table: situation keyword(s) -> reference file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceRef {
    /// Situation cell as authored (may hold several comma-separated keywords)
    pub situation: String,
    /// Path relative to the skill directory
    pub path: String,
}

impl ReferenceRef {
    pub fn new(situation: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            situation: situation.into(),
            path: path.into(),
        }
    }

    /// Individual keywords listed in the situation cell
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.situation
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

/// A reference document loaded on demand
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceDocument {
    pub path: String,
    pub content: String,
    pub approximate_word_count: usize,
}

impl ReferenceDocument {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        let approximate_word_count = content.split_whitespace().count();
        Self {
            path: path.into(),
            content,
            approximate_word_count,
        }
    }
}

// ============================================================================
// Checklist Types
// ============================================================================

/// Rule severity, ordered from most to least severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Suggestion,
}

impl Severity {
    /// One step less severe; suggestions stay suggestions
    pub fn demote(self) -> Self {
        match self {
            Severity::Critical => Severity::Warning,
            Severity::Warning | Severity::Suggestion => Severity::Suggestion,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Warning => "warning",
            Severity::Suggestion => "suggestion",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a severity name is not recognised
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown severity '{0}' (expected critical, warning or suggestion)")]
pub struct ParseSeverityError(pub String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" => Ok(Severity::Critical),
            "warning" => Ok(Severity::Warning),
            "suggestion" => Ok(Severity::Suggestion),
            other => Err(ParseSeverityError(other.to_string())),
        }
    }
}

/// A scoring category and its share of the overall score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryWeight {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub weight: u32,
}

impl CategoryWeight {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// A declarative checklist rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleEntry {
    pub id: String,
    pub category: String,
    pub description: String,
    pub severity: Severity,
    /// Minimum platform version the rule is written for (0 = always applicable)
    #[serde(default, alias = "min_version")]
    pub applicable_version_floor: u32,
    /// Regex flagging a violation; rules without one are reviewed by hand
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub remediation: Option<String>,
}

impl RuleEntry {
    /// Severity after applying the version floor against a target version
    pub fn effective_severity(&self, target_version: Option<u32>) -> Severity {
        match target_version {
            Some(target) if self.applicable_version_floor > target => self.severity.demote(),
            _ => self.severity,
        }
    }
}

/// A rule violation found in source text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub rule_id: String,
    pub category: String,
    /// Severity after version-floor demotion
    pub severity: Severity,
    pub original_severity: Severity,
    pub description: String,
    /// 1-based line number
    pub line: usize,
    pub excerpt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl Finding {
    pub fn is_demoted(&self) -> bool {
        self.severity != self.original_severity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_demote() {
        assert_eq!(Severity::Critical.demote(), Severity::Warning);
        assert_eq!(Severity::Warning.demote(), Severity::Suggestion);
        assert_eq!(Severity::Suggestion.demote(), Severity::Suggestion);
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!("Critical".parse::<Severity>(), Ok(Severity::Critical));
        assert_eq!(" warning ".parse::<Severity>(), Ok(Severity::Warning));
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn test_effective_severity_version_floor() {
        let rule = RuleEntry {
            id: "SUI-001".to_string(),
            category: "state".to_string(),
            description: "Prefer @Observable".to_string(),
            severity: Severity::Critical,
            applicable_version_floor: 17,
            pattern: None,
            remediation: None,
        };

        assert_eq!(rule.effective_severity(Some(17)), Severity::Critical);
        assert_eq!(rule.effective_severity(Some(18)), Severity::Critical);
        assert_eq!(rule.effective_severity(Some(16)), Severity::Warning);
        assert_eq!(rule.effective_severity(None), Severity::Critical);
    }

    #[test]
    fn test_reference_keywords() {
        let r = ReferenceRef::new("state, bindings ,", "references/state.md");
        let keywords: Vec<_> = r.keywords().collect();
        assert_eq!(keywords, vec!["state", "bindings"]);
    }

    #[test]
    fn test_reference_document_word_count() {
        let doc = ReferenceDocument::new("references/a.md", "# Title\n\nTwo  words\tand more\n");
        assert_eq!(doc.approximate_word_count, 6);
    }

    #[test]
    fn test_rule_deserialize_min_version_alias() {
        let rule: RuleEntry = serde_json::from_str(
            r#"{"id":"X-1","category":"a","description":"d","severity":"warning","min_version":15}"#,
        )
        .unwrap();
        assert_eq!(rule.applicable_version_floor, 15);
        assert_eq!(rule.severity, Severity::Warning);
        assert!(rule.pattern.is_none());
    }
}
