//! Integrity issues and the report that collects them

use serde::Serialize;
use std::fmt;

/// How serious an issue is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueLevel {
    /// Breaks routing or scoring
    Error,
    /// Worth fixing, nothing breaks
    Warning,
}

impl fmt::Display for IssueLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueLevel::Error => f.write_str("error"),
            IssueLevel::Warning => f.write_str("warning"),
        }
    }
}

/// What kind of integrity problem was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Routing table points to a file that does not exist
    MissingReference,
    /// Routing table path is absolute or leaves the skill directory
    UnsafeReferencePath,
    /// Same keyword listed on more than one routing row
    DuplicateSituation,
    /// Rendering and re-parsing the routing table changes it
    RoutingRoundTrip,
    /// File under references/ that no routing row points to
    OrphanReference,
    /// Rule ID used more than once in a checklist
    DuplicateRuleId,
    /// Category weights do not sum to 100
    WeightSum,
    /// Rule refers to an undeclared category
    UnknownCategory,
    /// Rule pattern is not a valid regex
    InvalidPattern,
    /// Checklist has no rules
    EmptyRuleSet,
}

impl IssueKind {
    /// Default level for this kind
    #[must_use]
    pub fn level(self) -> IssueLevel {
        match self {
            IssueKind::DuplicateSituation | IssueKind::OrphanReference | IssueKind::EmptyRuleSet => {
                IssueLevel::Warning
            }
            _ => IssueLevel::Error,
        }
    }
}

/// A single integrity problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// Error or warning
    pub level: IssueLevel,
    /// Problem category
    pub kind: IssueKind,
    /// Skill or ruleset the issue belongs to
    pub subject: String,
    /// Human-readable explanation
    pub message: String,
}

impl Issue {
    /// Create an issue at the kind's default level
    pub fn new(kind: IssueKind, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: kind.level(),
            kind,
            subject: subject.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.level, self.subject, self.message)
    }
}

/// Collected results of an integrity run
#[derive(Debug, Clone, Default, Serialize)]
pub struct IntegrityReport {
    /// Number of manifests inspected
    pub manifests_checked: usize,
    /// Number of rule sets inspected
    pub rulesets_checked: usize,
    /// All issues, errors first
    pub issues: Vec<Issue>,
}

impl IntegrityReport {
    /// Empty report
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append issues found for one manifest
    pub fn add_manifest(&mut self, issues: Vec<Issue>) {
        self.manifests_checked += 1;
        self.issues.extend(issues);
        self.sort();
    }

    /// Append issues found for one rule set
    pub fn add_ruleset(&mut self, issues: Vec<Issue>) {
        self.rulesets_checked += 1;
        self.issues.extend(issues);
        self.sort();
    }

    fn sort(&mut self) {
        // stable: keeps discovery order within a level
        self.issues.sort_by_key(|i| i.level);
    }

    /// Number of error-level issues
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.level == IssueLevel::Error)
            .count()
    }

    /// Number of warning-level issues
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.level == IssueLevel::Warning)
            .count()
    }

    /// Whether any error was found
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }
}
