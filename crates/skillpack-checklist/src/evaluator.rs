//! Static rule evaluation over source text

use regex::Regex;
use serde::Serialize;
use skillpack_types::{Finding, RuleEntry, Severity};
use tracing::{debug, info, warn};

use crate::error::{ChecklistError, Result};
use crate::ruleset::RuleSet;
use crate::scoring::{grade, overall_score, score_categories, CategoryScore};

/// Longest excerpt kept per finding, in characters
const MAX_EXCERPT_CHARS: usize = 120;

/// Result of evaluating one source text against a rule set
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    /// Rule set name
    pub ruleset: String,
    /// Version used for severity demotion
    pub target_version: Option<u32>,
    /// Findings ordered by line, then rule order
    pub findings: Vec<Finding>,
    /// Per-category scores
    pub category_scores: Vec<CategoryScore>,
    /// Weighted overall score
    pub score: f64,
    /// Letter grade of `score`
    pub grade: char,
    /// Rules without a pattern, left for manual review
    pub manual_rules: Vec<String>,
    /// Rules that fired but whose category is not declared, so they do not affect the score
    pub unscored_rules: Vec<String>,
}

impl Evaluation {
    /// Number of findings with the given effective severity
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.findings.iter().filter(|f| f.severity == severity).count()
    }

    /// Whether any finding is critical after demotion
    #[must_use]
    pub fn has_critical(&self) -> bool {
        self.count(Severity::Critical) > 0
    }
}

/// Evaluates source text against rule sets
///
/// Patterns are matched line by line; each matching line yields one finding
/// per rule.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    target_version: Option<u32>,
}

impl Evaluator {
    /// Evaluator that uses each rule set's own target version
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the target version used for severity demotion
    #[must_use]
    pub fn with_target_version(mut self, version: u32) -> Self {
        self.target_version = Some(version);
        self
    }

    /// Evaluate `source` and compute findings and scores
    pub fn evaluate(&self, source: &str, ruleset: &RuleSet) -> Result<Evaluation> {
        let target_version = self.target_version.or(ruleset.target_version);
        let compiled = compile_rules(ruleset)?;

        let manual_rules: Vec<String> = ruleset
            .rules
            .iter()
            .filter(|r| r.pattern.is_none())
            .map(|r| r.id.clone())
            .collect();

        let mut findings = Vec::new();
        for (index, line) in source.lines().enumerate() {
            for (rule, regex) in &compiled {
                if regex.is_match(line) {
                    findings.push(to_finding(rule, index + 1, line, target_version));
                }
            }
        }

        let demoted = findings.iter().filter(|f| f.is_demoted()).count();
        if demoted > 0 {
            debug!(
                "Demoted {} findings below version floor (target {:?})",
                demoted, target_version
            );
        }

        let unscored_rules = unscored_rules(&findings, ruleset);
        if !unscored_rules.is_empty() {
            warn!(
                "Ruleset '{}': findings of {} are in undeclared categories and do not affect the score",
                ruleset.name,
                unscored_rules.join(", ")
            );
        }

        let category_scores = score_categories(&findings, &ruleset.categories, &ruleset.penalties);
        let score = overall_score(&category_scores);

        info!(
            "Evaluated ruleset '{}': {} findings, score {:.1}",
            ruleset.name,
            findings.len(),
            score
        );

        Ok(Evaluation {
            ruleset: ruleset.name.clone(),
            target_version,
            findings,
            category_scores,
            score,
            grade: grade(score),
            manual_rules,
            unscored_rules,
        })
    }
}

/// Compile every rule that carries a pattern
pub(crate) fn compile_rules(ruleset: &RuleSet) -> Result<Vec<(&RuleEntry, Regex)>> {
    ruleset
        .rules
        .iter()
        .filter_map(|rule| rule.pattern.as_deref().map(|p| (rule, p)))
        .map(|(rule, pattern)| {
            Regex::new(pattern)
                .map(|regex| (rule, regex))
                .map_err(|source| ChecklistError::InvalidPattern {
                    rule: rule.id.clone(),
                    source,
                })
        })
        .collect()
}

/// IDs of rules with findings outside the declared categories, in first-hit order
fn unscored_rules(findings: &[Finding], ruleset: &RuleSet) -> Vec<String> {
    if ruleset.categories.is_empty() {
        return Vec::new();
    }

    let mut ids: Vec<String> = Vec::new();
    for finding in findings {
        if ruleset.category(&finding.category).is_none() && !ids.contains(&finding.rule_id) {
            ids.push(finding.rule_id.clone());
        }
    }
    ids
}

fn to_finding(rule: &RuleEntry, line: usize, text: &str, target_version: Option<u32>) -> Finding {
    Finding {
        rule_id: rule.id.clone(),
        category: rule.category.clone(),
        severity: rule.effective_severity(target_version),
        original_severity: rule.severity,
        description: rule.description.clone(),
        line,
        excerpt: excerpt(text),
        remediation: rule.remediation.clone(),
    }
}

fn excerpt(line: &str) -> String {
    let trimmed = line.trim();
    if trimmed.chars().count() <= MAX_EXCERPT_CHARS {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(MAX_EXCERPT_CHARS).collect();
        format!("{}...", cut)
    }
}
