//! Rule sets: categories, weights, penalties and rules
//!
//! A rule set is authored as TOML, YAML or JSON:
//!
//! ```toml
//! name = "swiftui-review"
//! target_version = 17
//!
//! [[categories]]
//! id = "state"
//! weight = 40
//!
//! [[rules]]
//! id = "SUI-001"
//! category = "state"
//! severity = "critical"
//! applicable_version_floor = 17
//! description = "Use @Observable instead of ObservableObject"
//! pattern = '\bObservableObject\b'
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use skillpack_types::{CategoryWeight, RuleEntry, Severity};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{ChecklistError, Result};

/// Points deducted from a category per finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Penalties {
    /// Deduction per critical finding
    #[serde(default = "default_critical")]
    pub critical: u32,
    /// Deduction per warning finding
    #[serde(default = "default_warning")]
    pub warning: u32,
    /// Deduction per suggestion finding
    #[serde(default = "default_suggestion")]
    pub suggestion: u32,
}

fn default_critical() -> u32 {
    20
}

fn default_warning() -> u32 {
    8
}

fn default_suggestion() -> u32 {
    2
}

impl Default for Penalties {
    fn default() -> Self {
        Self {
            critical: default_critical(),
            warning: default_warning(),
            suggestion: default_suggestion(),
        }
    }
}

impl Penalties {
    /// Deduction for one finding of `severity`
    #[must_use]
    pub fn for_severity(&self, severity: Severity) -> u32 {
        match severity {
            Severity::Critical => self.critical,
            Severity::Warning => self.warning,
            Severity::Suggestion => self.suggestion,
        }
    }
}

/// A named checklist of rules with category weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Checklist name
    pub name: String,
    /// What the checklist covers
    #[serde(default)]
    pub description: Option<String>,
    /// Platform version evaluated against when the caller gives none
    #[serde(default)]
    pub target_version: Option<u32>,
    /// Scoring categories; weights are expected to sum to 100
    #[serde(default)]
    pub categories: Vec<CategoryWeight>,
    /// Checklist rules
    #[serde(default)]
    pub rules: Vec<RuleEntry>,
    /// Per-severity deductions
    #[serde(default)]
    pub penalties: Penalties,
}

impl RuleSet {
    /// Load a rule set, choosing the parser from the file extension
    pub fn load(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| ChecklistError::UnsupportedFormat(path.to_path_buf()))?;

        let content = fs::read_to_string(path).map_err(|source| ChecklistError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let parsed = match extension.as_str() {
            "toml" => toml::from_str(&content).map_err(|e| e.to_string()),
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(|e| e.to_string()),
            "json" => serde_json::from_str(&content).map_err(|e| e.to_string()),
            _ => return Err(ChecklistError::UnsupportedFormat(path.to_path_buf())),
        };

        let ruleset: Self = parsed.map_err(|reason| ChecklistError::Parse {
            path: path.to_path_buf(),
            reason,
        })?;

        debug!(
            "Loaded ruleset '{}' with {} rules in {} categories from {:?}",
            ruleset.name,
            ruleset.rules.len(),
            ruleset.categories.len(),
            path
        );

        Ok(ruleset)
    }

    /// Parse a rule set from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ChecklistError::Parse {
            path: "<inline>".into(),
            reason: e.to_string(),
        })
    }

    /// Look up a category by ID
    #[must_use]
    pub fn category(&self, id: &str) -> Option<&CategoryWeight> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Look up a rule by ID
    #[must_use]
    pub fn rule(&self, id: &str) -> Option<&RuleEntry> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Sum of all category weights
    #[must_use]
    pub fn weight_total(&self) -> u32 {
        self.categories.iter().map(|c| c.weight).sum()
    }

    /// Rule IDs that appear more than once, in first-seen order
    #[must_use]
    pub fn duplicate_rule_ids(&self) -> Vec<&str> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for rule in &self.rules {
            *counts.entry(rule.id.as_str()).or_default() += 1;
        }

        let mut reported = HashSet::new();
        self.rules
            .iter()
            .map(|r| r.id.as_str())
            .filter(|id| counts.get(id).copied().unwrap_or(0) > 1 && reported.insert(*id))
            .collect()
    }

    /// Rules whose pattern fails to compile, with the compiler message
    #[must_use]
    pub fn invalid_patterns(&self) -> Vec<(&RuleEntry, String)> {
        self.rules
            .iter()
            .filter_map(|rule| {
                let pattern = rule.pattern.as_deref()?;
                Regex::new(pattern).err().map(|e| (rule, e.to_string()))
            })
            .collect()
    }

    /// Rules whose category is not declared in `categories`
    #[must_use]
    pub fn rules_with_unknown_category(&self) -> Vec<&RuleEntry> {
        if self.categories.is_empty() {
            return Vec::new();
        }
        self.rules
            .iter()
            .filter(|r| self.category(&r.category).is_none())
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const TOML: &str = r#"
name = "swiftui-review"
target_version = 16

[[categories]]
id = "state"
name = "State management"
weight = 60

[[categories]]
id = "layout"
weight = 40

[[rules]]
id = "SUI-001"
category = "state"
severity = "critical"
applicable_version_floor = 17
description = "Use @Observable instead of ObservableObject"
pattern = '\bObservableObject\b'

[[rules]]
id = "SUI-002"
category = "layout"
severity = "suggestion"
description = "Prefer ViewThatFits over GeometryReader"

[[rules]]
id = "SUI-001"
category = "navigation"
severity = "warning"
description = "Duplicate"
"#;

    #[test]
    fn test_parse_toml() {
        let rs = RuleSet::from_toml_str(TOML).unwrap();
        assert_eq!(rs.name, "swiftui-review");
        assert_eq!(rs.target_version, Some(16));
        assert_eq!(rs.rules.len(), 3);
        assert_eq!(rs.rules[0].applicable_version_floor, 17);
        assert_eq!(rs.rules[1].applicable_version_floor, 0);
        assert_eq!(rs.penalties, Penalties::default());
        assert_eq!(rs.category("state").unwrap().display_name(), "State management");
        assert_eq!(rs.category("layout").unwrap().display_name(), "layout");
    }

    #[test]
    fn test_weight_total_and_duplicates() {
        let rs = RuleSet::from_toml_str(TOML).unwrap();
        assert_eq!(rs.weight_total(), 100);
        assert_eq!(rs.duplicate_rule_ids(), vec!["SUI-001"]);

        let unknown = rs.rules_with_unknown_category();
        assert_eq!(unknown.len(), 1);
        assert_eq!(unknown[0].category, "navigation");
        assert!(rs.invalid_patterns().is_empty());
    }

    #[test]
    fn test_invalid_patterns() {
        let rs = RuleSet::from_toml_str(
            "name = \"x\"\n[[rules]]\nid = \"A\"\ncategory = \"c\"\nseverity = \"warning\"\ndescription = \"d\"\npattern = \"[a-\"\n",
        )
        .unwrap();
        let invalid = rs.invalid_patterns();
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid[0].0.id, "A");
    }

    #[test]
    fn test_penalty_override() {
        let rs = RuleSet::from_toml_str("name = \"x\"\n[penalties]\ncritical = 30\n").unwrap();
        assert_eq!(rs.penalties.for_severity(Severity::Critical), 30);
        assert_eq!(rs.penalties.for_severity(Severity::Warning), 8);
        assert_eq!(rs.penalties.for_severity(Severity::Suggestion), 2);
    }

    #[test]
    fn test_load_by_extension() {
        let tmp = TempDir::new().unwrap();

        let yaml = tmp.path().join("rules.yaml");
        fs::write(
            &yaml,
            "name: web-ui\ncategories:\n  - id: color\n    weight: 100\nrules:\n  - id: WEB-1\n    category: color\n    severity: warning\n    description: Use design tokens\n    pattern: '#[0-9a-fA-F]{6}'\n",
        )
        .unwrap();
        let rs = RuleSet::load(&yaml).unwrap();
        assert_eq!(rs.rules[0].severity, Severity::Warning);

        let json = tmp.path().join("rules.json");
        fs::write(&json, r#"{"name":"j","rules":[]}"#).unwrap();
        assert_eq!(RuleSet::load(&json).unwrap().name, "j");

        let txt = tmp.path().join("rules.txt");
        fs::write(&txt, "name = 'x'").unwrap();
        assert!(matches!(
            RuleSet::load(&txt),
            Err(ChecklistError::UnsupportedFormat(_))
        ));

        let broken = tmp.path().join("broken.toml");
        fs::write(&broken, "name = ").unwrap();
        assert!(matches!(
            RuleSet::load(&broken),
            Err(ChecklistError::Parse { .. })
        ));
    }
}
