use crate::cli::Command;
use crate::config::{expand_home, Config};
use anyhow::{Context, Result};
use serde::Serialize;
use skillpack_checklist::{Evaluation, Evaluator, RuleSet};
use skillpack_integrity::IntegrityReport;
use skillpack_manifest::{SkillManifest, SkillsRegistry};
use skillpack_types::{ReferenceDocument, ReferenceRef, Severity};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Skill pack service - runs one CLI command against the configured skills
pub struct SkillPackService {
    config: Config,
    extra_dirs: Vec<PathBuf>,
    json: bool,
}

#[derive(Serialize)]
struct SkillSummary<'a> {
    name: &'a str,
    description: &'a str,
    triggers: &'a [String],
    modes: &'a [String],
    routes: &'a [ReferenceRef],
    path: &'a Path,
}

impl<'a> From<&'a SkillManifest> for SkillSummary<'a> {
    fn from(skill: &'a SkillManifest) -> Self {
        Self {
            name: skill.name(),
            description: skill.description(),
            triggers: &skill.metadata.triggers,
            modes: &skill.metadata.modes,
            routes: skill.reference_index.entries(),
            path: &skill.path,
        }
    }
}

#[derive(Serialize)]
struct Activation<'a> {
    skill: &'a str,
    references: Vec<&'a ReferenceRef>,
}

#[derive(Serialize)]
struct FileEvaluation<'a> {
    file: &'a Path,
    #[serde(flatten)]
    evaluation: &'a Evaluation,
}

impl SkillPackService {
    /// Create a new service
    pub fn new(config: Config, extra_dirs: Vec<PathBuf>, json: bool) -> Self {
        Self {
            config,
            extra_dirs,
            json,
        }
    }

    /// Run a command; `Ok(false)` means the command completed but reported failure
    pub fn run(self, command: Command) -> Result<bool> {
        match command {
            Command::List => self.list(),
            Command::Show { skill } => self.show(&skill),
            Command::Prompt => self.prompt(),
            Command::Activate { situation } => self.activate(&situation.join(" ")),
            Command::Resolve {
                skill,
                situation,
                load,
            } => self.resolve(&skill, &situation.join(" "), load),
            Command::Evaluate {
                rules,
                target_version,
                min_score,
                files,
            } => self.evaluate(&rules, target_version, min_score, &files),
            Command::Check { rules } => self.check(&rules),
        }
    }

    /// Discover skills from configured and command-line directories (Phase 1)
    fn registry(&self) -> Result<SkillsRegistry> {
        let mut registry = SkillsRegistry::new();

        for dir in self.config.skill_directories() {
            registry = registry.add_directory(dir);
        }
        for dir in &self.extra_dirs {
            registry = registry.add_directory(dir.clone());
        }

        registry.discover().context("Failed to discover skills")?;
        info!("Discovered {} skills", registry.len());
        Ok(registry)
    }

    fn list(&self) -> Result<bool> {
        let registry = self.registry()?;
        let skills = registry.skills();

        if self.json {
            let summaries: Vec<SkillSummary> = skills.into_iter().map(Into::into).collect();
            print_json(&summaries)?;
            return Ok(true);
        }

        if skills.is_empty() {
            println!("No skills found");
            return Ok(true);
        }

        for skill in skills {
            println!(
                "{} ({} references)\n    {}",
                skill.name(),
                skill.reference_index.len(),
                skill.description()
            );
        }
        Ok(true)
    }

    fn show(&self, name: &str) -> Result<bool> {
        let mut registry = self.registry()?;
        let skill = registry.load_skill(name)?;

        if self.json {
            print_json(&SkillSummary::from(skill))?;
            return Ok(true);
        }

        println!("name:        {}", skill.name());
        println!("description: {}", skill.description());
        println!("path:        {}", skill.path.display());
        if !skill.metadata.triggers.is_empty() {
            println!("triggers:    {}", skill.metadata.triggers.join(", "));
        }
        if !skill.metadata.modes.is_empty() {
            println!("modes:       {}", skill.metadata.modes.join(", "));
        }
        println!();
        if skill.reference_index.is_empty() {
            println!("(no routing table)");
        } else {
            print!("{}", skill.reference_index.render());
        }
        Ok(true)
    }

    fn prompt(&self) -> Result<bool> {
        let registry = self.registry()?;
        println!("{}", registry.generate_system_prompt().trim());
        Ok(true)
    }

    fn activate(&self, situation: &str) -> Result<bool> {
        let registry = self.registry()?;
        let activations: Vec<Activation> = registry
            .activate(situation)
            .into_iter()
            .map(|skill| Activation {
                skill: skill.name(),
                references: skill.resolve(situation),
            })
            .collect();

        if self.json {
            print_json(&activations)?;
            return Ok(true);
        }

        if activations.is_empty() {
            println!("No skill is triggered by this situation");
        }
        for activation in &activations {
            println!("{}", activation.skill);
            for reference in &activation.references {
                println!("    {} -> {}", reference.situation, reference.path);
            }
        }
        Ok(true)
    }

    fn resolve(&self, name: &str, situation: &str, load: bool) -> Result<bool> {
        let mut registry = self.registry()?;

        if !load {
            let refs = registry.resolve(name, situation)?;
            if self.json {
                print_json(&refs)?;
            } else if refs.is_empty() {
                println!("No reference matches this situation");
            } else {
                for reference in refs {
                    println!("{}\t{}", reference.path, reference.situation);
                }
            }
            return Ok(true);
        }

        let paths: Vec<String> = registry
            .resolve(name, situation)?
            .into_iter()
            .map(|r| r.path.clone())
            .collect();

        let mut documents: Vec<ReferenceDocument> = Vec::with_capacity(paths.len());
        for path in &paths {
            let doc = registry
                .load_reference(name, path)
                .with_context(|| format!("Failed to load reference {}", path))?;
            documents.push(doc.clone());
        }

        if self.json {
            print_json(&documents)?;
            return Ok(true);
        }

        for doc in &documents {
            println!(
                "===== {} (~{} words) =====",
                doc.path, doc.approximate_word_count
            );
            println!("{}", doc.content.trim_end());
            println!();
        }
        Ok(true)
    }

    fn evaluate(
        &self,
        rules: &Path,
        target_version: Option<u32>,
        min_score: Option<f64>,
        files: &[PathBuf],
    ) -> Result<bool> {
        let ruleset = RuleSet::load(rules)?;

        let mut evaluator = Evaluator::new();
        if let Some(version) = target_version.or(self.config.checklist.target_version) {
            evaluator = evaluator.with_target_version(version);
        }

        let mut results = Vec::with_capacity(files.len());
        for file in files {
            let source = fs::read_to_string(file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            results.push((file.as_path(), evaluator.evaluate(&source, &ruleset)?));
        }

        let passed = match min_score {
            Some(min) => results.iter().all(|(_, eval)| eval.score >= min),
            None => true,
        };

        if self.json {
            let out: Vec<FileEvaluation> = results
                .iter()
                .map(|(file, evaluation)| FileEvaluation {
                    file: *file,
                    evaluation,
                })
                .collect();
            print_json(&out)?;
            return Ok(passed);
        }

        for (file, eval) in &results {
            print_evaluation(file, eval);
        }

        if !passed {
            warn!("At least one file scored below the minimum");
        }
        Ok(passed)
    }

    fn check(&self, rules: &[PathBuf]) -> Result<bool> {
        let registry = self.registry()?;

        let paths: Vec<PathBuf> = if rules.is_empty() {
            self.config
                .checklist
                .rulesets
                .iter()
                .map(|p| expand_home(p))
                .collect()
        } else {
            rules.to_vec()
        };

        let rulesets = paths
            .iter()
            .map(|p| RuleSet::load(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let report = skillpack_integrity::check_all(&registry, &rulesets);

        if self.json {
            print_json(&report)?;
        } else {
            print_report(&report);
        }

        Ok(!report.has_errors())
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_evaluation(file: &Path, eval: &Evaluation) {
    println!(
        "{}: {} score {:.1} ({}) - {} critical, {} warning, {} suggestion",
        file.display(),
        eval.ruleset,
        eval.score,
        eval.grade,
        eval.count(Severity::Critical),
        eval.count(Severity::Warning),
        eval.count(Severity::Suggestion)
    );

    for finding in &eval.findings {
        let demoted = if finding.is_demoted() {
            format!(" (was {})", finding.original_severity)
        } else {
            String::new()
        };
        println!(
            "  {}:{} [{}{}] {} {}",
            file.display(),
            finding.line,
            finding.severity,
            demoted,
            finding.rule_id,
            finding.description
        );
        println!("      {}", finding.excerpt);
        if let Some(fix) = &finding.remediation {
            println!("      fix: {}", fix);
        }
    }

    for category in &eval.category_scores {
        println!(
            "  {:<24} {:>3}/100  weight {:>3}  findings {}",
            category.name, category.score, category.weight, category.findings
        );
    }

    if !eval.manual_rules.is_empty() {
        println!("  manual review: {}", eval.manual_rules.join(", "));
    }

    if !eval.unscored_rules.is_empty() {
        println!("  unscored (undeclared category): {}", eval.unscored_rules.join(", "));
    }
}

fn print_report(report: &IntegrityReport) {
    for issue in &report.issues {
        println!("{}", issue);
    }
    println!(
        "Checked {} skills and {} rulesets: {} errors, {} warnings",
        report.manifests_checked,
        report.rulesets_checked,
        report.error_count(),
        report.warning_count()
    );
}
