//! Checks for manifests and rule sets

use skillpack_checklist::RuleSet;
use skillpack_manifest::manifest::is_contained_path;
use skillpack_manifest::{ReferenceIndex, SkillManifest, SkillsRegistry};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

use crate::report::{IntegrityReport, Issue, IssueKind};

/// Directory scanned for unreferenced files
const REFERENCES_DIR: &str = "references";
/// Required sum of category weights
const WEIGHT_TOTAL: u32 = 100;

/// Check every manifest in a registry and every given rule set
pub fn check_all(registry: &SkillsRegistry, rulesets: &[RuleSet]) -> IntegrityReport {
    let mut report = IntegrityReport::new();

    for skill in registry.skills() {
        report.add_manifest(check_manifest(skill));
    }

    for ruleset in rulesets {
        report.add_ruleset(check_ruleset(ruleset));
    }

    debug!(
        "Integrity check: {} manifests, {} rulesets, {} errors, {} warnings",
        report.manifests_checked,
        report.rulesets_checked,
        report.error_count(),
        report.warning_count()
    );

    report
}

/// Check one manifest's routing table against the files on disk
pub fn check_manifest(skill: &SkillManifest) -> Vec<Issue> {
    let name = skill.name();
    let index = &skill.reference_index;
    let mut issues = Vec::new();

    for entry in index.entries() {
        if !is_contained_path(&entry.path) {
            issues.push(Issue::new(
                IssueKind::UnsafeReferencePath,
                name,
                format!("'{}' must be a relative path inside the skill", entry.path),
            ));
            continue;
        }

        if !skill.path.join(&entry.path).is_file() {
            issues.push(Issue::new(
                IssueKind::MissingReference,
                name,
                format!(
                    "'{}' (situation '{}') does not exist",
                    entry.path, entry.situation
                ),
            ));
        }
    }

    issues.extend(duplicate_situations(name, index));

    if ReferenceIndex::parse(&index.render()) != *index {
        issues.push(Issue::new(
            IssueKind::RoutingRoundTrip,
            name,
            "routing table changes when rendered and parsed again (check for '|' or backticks in cells)",
        ));
    }

    issues.extend(orphan_references(skill));

    issues
}

/// Check one rule set for duplicate IDs, weights, categories and patterns
pub fn check_ruleset(ruleset: &RuleSet) -> Vec<Issue> {
    let name = ruleset.name.as_str();
    let mut issues = Vec::new();

    if ruleset.rules.is_empty() {
        issues.push(Issue::new(IssueKind::EmptyRuleSet, name, "ruleset has no rules"));
    }

    for id in ruleset.duplicate_rule_ids() {
        issues.push(Issue::new(
            IssueKind::DuplicateRuleId,
            name,
            format!("rule ID '{}' is used more than once", id),
        ));
    }

    if !ruleset.categories.is_empty() && ruleset.weight_total() != WEIGHT_TOTAL {
        issues.push(Issue::new(
            IssueKind::WeightSum,
            name,
            format!(
                "category weights sum to {}, expected {}",
                ruleset.weight_total(),
                WEIGHT_TOTAL
            ),
        ));
    }

    for rule in ruleset.rules_with_unknown_category() {
        issues.push(Issue::new(
            IssueKind::UnknownCategory,
            name,
            format!("rule '{}' uses undeclared category '{}'", rule.id, rule.category),
        ));
    }

    for (rule, error) in ruleset.invalid_patterns() {
        issues.push(Issue::new(
            IssueKind::InvalidPattern,
            name,
            format!("rule '{}' pattern does not compile: {}", rule.id, error),
        ));
    }

    issues
}

fn duplicate_situations(name: &str, index: &ReferenceIndex) -> Vec<Issue> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    let mut reported = HashSet::new();
    let mut issues = Vec::new();

    for entry in index.entries() {
        for keyword in entry.keywords() {
            let key = keyword.to_lowercase();
            match seen.get(&key) {
                Some(first) if reported.insert(key.clone()) => {
                    issues.push(Issue::new(
                        IssueKind::DuplicateSituation,
                        name,
                        format!(
                            "keyword '{}' routes to both '{}' and '{}'",
                            keyword, first, entry.path
                        ),
                    ));
                }
                Some(_) => {}
                None => {
                    seen.insert(key, entry.path.as_str());
                }
            }
        }
    }

    issues
}

fn orphan_references(skill: &SkillManifest) -> Vec<Issue> {
    let dir = skill.path.join(REFERENCES_DIR);
    if !dir.is_dir() {
        return Vec::new();
    }

    let mut orphans: Vec<String> = WalkDir::new(&dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| relative_slash_path(&skill.path, e.path()))
        .filter(|rel| !skill.reference_index.contains_path(rel))
        .collect();
    orphans.sort();

    orphans
        .into_iter()
        .map(|rel| {
            Issue::new(
                IssueKind::OrphanReference,
                skill.name(),
                format!("'{}' is not listed in the routing table", rel),
            )
        })
        .collect()
}

/// Path of `file` relative to `base`, joined with '/'
fn relative_slash_path(base: &Path, file: &Path) -> Option<String> {
    let rel = file.strip_prefix(base).ok()?;
    let parts: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillpack_types::{CategoryWeight, RuleEntry, Severity};
    use std::fs;
    use tempfile::TempDir;

    fn skill_with_table(table: &str) -> (TempDir, SkillManifest) {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("ui-refactor");
        fs::create_dir_all(dir.join("references")).unwrap();
        fs::write(
            dir.join("SKILL.md"),
            format!(
                "---\nname: ui-refactor\ndescription: Refactor web UI\n---\n\n{}",
                table
            ),
        )
        .unwrap();
        fs::write(dir.join("references/tokens.md"), "tokens").unwrap();
        fs::write(dir.join("references/unused.md"), "unused").unwrap();
        let skill = SkillManifest::metadata_from_dir(&dir).unwrap();
        (tmp, skill)
    }

    fn kinds(issues: &[Issue]) -> Vec<IssueKind> {
        issues.iter().map(|i| i.kind).collect()
    }

    #[test]
    fn test_manifest_issues() {
        let (_tmp, skill) = skill_with_table(
            "| Situation | Reference |\n|---|---|\n| tokens, colors | references/tokens.md |\n| colors | references/missing.md |\n| escape | ../outside.md |\n",
        );

        let issues = check_manifest(&skill);
        assert_eq!(
            kinds(&issues),
            vec![
                IssueKind::MissingReference,
                IssueKind::UnsafeReferencePath,
                IssueKind::DuplicateSituation,
                IssueKind::OrphanReference,
            ]
        );
        assert!(issues[3].message.contains("references/unused.md"));
    }

    #[test]
    fn test_clean_manifest() {
        let (_tmp, skill) = skill_with_table(
            "| Situation | Reference |\n|---|---|\n| tokens | `references/tokens.md` |\n| leftovers | [u](references/unused.md) |\n",
        );
        assert!(check_manifest(&skill).is_empty());
    }

    #[test]
    fn test_current_dir_paths_are_not_orphans() {
        let (_tmp, skill) = skill_with_table(
            "| Situation | Reference |\n|---|---|\n| tokens | ./references/tokens.md |\n| leftovers | ./references/unused.md |\n",
        );
        assert!(check_manifest(&skill).is_empty());
    }

    fn rule(id: &str, category: &str, pattern: Option<&str>) -> RuleEntry {
        RuleEntry {
            id: id.to_string(),
            category: category.to_string(),
            description: "d".to_string(),
            severity: Severity::Warning,
            applicable_version_floor: 0,
            pattern: pattern.map(str::to_string),
            remediation: None,
        }
    }

    fn ruleset(rules: Vec<RuleEntry>, weights: &[(&str, u32)]) -> RuleSet {
        RuleSet {
            name: "web-ui".to_string(),
            description: None,
            target_version: None,
            categories: weights
                .iter()
                .map(|(id, weight)| CategoryWeight {
                    id: (*id).to_string(),
                    name: None,
                    weight: *weight,
                })
                .collect(),
            rules,
            penalties: Default::default(),
        }
    }

    #[test]
    fn test_ruleset_issues() {
        let rs = ruleset(
            vec![
                rule("W-1", "color", Some("#[0-9a-f]{6}")),
                rule("W-1", "spacing", None),
                rule("W-2", "typography", Some("(")),
            ],
            &[("color", 50), ("spacing", 40)],
        );

        assert_eq!(
            kinds(&check_ruleset(&rs)),
            vec![
                IssueKind::DuplicateRuleId,
                IssueKind::WeightSum,
                IssueKind::UnknownCategory,
                IssueKind::InvalidPattern,
            ]
        );
    }

    #[test]
    fn test_clean_ruleset_and_empty_warning() {
        let rs = ruleset(vec![rule("W-1", "color", None)], &[("color", 100)]);
        assert!(check_ruleset(&rs).is_empty());

        let empty = ruleset(Vec::new(), &[]);
        let issues = check_ruleset(&empty);
        assert_eq!(kinds(&issues), vec![IssueKind::EmptyRuleSet]);
        assert_eq!(issues[0].level, crate::report::IssueLevel::Warning);
    }
}
