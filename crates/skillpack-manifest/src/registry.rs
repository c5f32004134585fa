//! Skills registry for managing multiple manifests
//!
//! Implements progressive disclosure:
//! - Phase 1: Scan directories and load metadata plus routing tables only
//! - Phase 2: Load the full manifest body on demand
//! - Phase 3: Load individual reference documents when a situation routes to them

use skillpack_types::{ReferenceDocument, ReferenceRef};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{ManifestError, Result};
use crate::manifest::SkillManifest;

/// Registry of all discovered skill manifests
pub struct SkillsRegistry {
    /// All discovered skills (metadata only initially)
    skills: HashMap<String, SkillManifest>,
    /// Skills directories to scan
    directories: Vec<PathBuf>,
}

impl SkillsRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            skills: HashMap::new(),
            directories: Vec::new(),
        }
    }

    /// Add a skills directory to scan
    pub fn add_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.directories.push(dir.into());
        self
    }

    /// Scan all configured directories and discover skills (Phase 1: Discovery)
    ///
    /// Later directories override earlier ones when two skills share a name.
    pub fn discover(&mut self) -> Result<()> {
        info!(
            "Starting skills discovery in {} directories",
            self.directories.len()
        );

        let directories = self.directories.clone();

        for dir in &directories {
            if !dir.exists() {
                debug!("Skills directory does not exist: {:?}", dir);
                continue;
            }

            if !dir.is_dir() {
                warn!("Skills path is not a directory: {:?}", dir);
                continue;
            }

            self.scan_directory(dir)?;
        }

        info!("Discovered {} skills", self.skills.len());
        Ok(())
    }

    /// Scan a single directory for skills
    fn scan_directory(&mut self, dir: &Path) -> Result<()> {
        let entries = std::fs::read_dir(dir).map_err(|source| ManifestError::Read {
            path: dir.to_path_buf(),
            source,
        })?;

        for entry in entries {
            let entry = entry.map_err(|source| ManifestError::Read {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();

            if !path.is_dir() {
                continue;
            }

            match SkillManifest::metadata_from_dir(&path) {
                Ok(skill) => {
                    let name = skill.name().to_string();
                    debug!(
                        "Discovered skill: {} at {:?} ({} routes)",
                        name,
                        path,
                        skill.reference_index.len()
                    );
                    if let Some(previous) = self.skills.insert(name.clone(), skill) {
                        debug!("Skill {} overrides {:?}", name, previous.path);
                    }
                }
                Err(e) => {
                    debug!("Skipping {:?}: {}", path, e);
                }
            }
        }

        Ok(())
    }

    /// Get a skill by name (returns metadata only if not yet loaded)
    pub fn get(&self, name: &str) -> Option<&SkillManifest> {
        self.skills.get(name)
    }

    /// Load full content for a specific skill (Phase 2: Activation)
    pub fn load_skill(&mut self, name: &str) -> Result<&SkillManifest> {
        let skill = self
            .skills
            .get_mut(name)
            .ok_or_else(|| ManifestError::SkillNotFound(name.to_string()))?;

        skill.load_content()?;
        Ok(skill)
    }

    /// Skills whose name or trigger phrases occur in `situation`, sorted by name
    pub fn activate(&self, situation: &str) -> Vec<&SkillManifest> {
        let mut matched: Vec<_> = self
            .skills
            .values()
            .filter(|skill| skill.is_triggered_by(situation))
            .collect();
        matched.sort_by_key(|s| s.name());
        debug!("Situation activated {} skills", matched.len());
        matched
    }

    /// Route a situation to the references of one skill
    pub fn resolve(&self, name: &str, situation: &str) -> Result<Vec<&ReferenceRef>> {
        let skill = self
            .get(name)
            .ok_or_else(|| ManifestError::SkillNotFound(name.to_string()))?;
        Ok(skill.resolve(situation))
    }

    /// Load one reference document of a skill (Phase 3: Execution)
    pub fn load_reference(&mut self, name: &str, rel_path: &str) -> Result<&ReferenceDocument> {
        let skill = self
            .skills
            .get_mut(name)
            .ok_or_else(|| ManifestError::SkillNotFound(name.to_string()))?;
        skill.load_reference(rel_path)
    }

    /// All skills sorted by name
    pub fn skills(&self) -> Vec<&SkillManifest> {
        let mut sorted: Vec<_> = self.skills.values().collect();
        sorted.sort_by_key(|s| s.name());
        sorted
    }

    /// Get number of skills
    pub fn len(&self) -> usize {
        self.skills.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Generate skills list for LLM system prompt
    /// Format:
    /// Available skills (load a skill when its triggers match the task):
    /// - skill-name: Description of what this skill does and when to use it
    /// - another-skill: Another description...
    pub fn generate_system_prompt(&self) -> String {
        if self.skills.is_empty() {
            return String::new();
        }

        let mut prompt =
            String::from("\n\nAvailable skills (load a skill when its triggers match the task):\n");

        for skill in self.skills() {
            prompt.push_str(&skill.to_summary());
            prompt.push('\n');
        }

        prompt
    }

    /// Generate a concise skills list for embedding in tool descriptions
    pub fn generate_skills_list(&self) -> String {
        if self.skills.is_empty() {
            return "No skills available".to_string();
        }

        self.skills()
            .iter()
            .map(|skill| format!("{}: {}", skill.name(), skill.description()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for SkillsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_skill(root: &Path, name: &str, description: &str, triggers: &str, table: &str) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("SKILL.md"),
            format!(
                "---\nname: {}\ndescription: {}\ntriggers: {}\n---\n\n# {}\n\n{}",
                name, description, triggers, name, table
            ),
        )
        .unwrap();
    }

    fn fixture() -> TempDir {
        let tmp = TempDir::new().unwrap();
        write_skill(
            tmp.path(),
            "swiftui-review",
            "Review SwiftUI views",
            "[swiftui]",
            "| Situation | Reference |\n|---|---|\n| state | references/state.md |\n",
        );
        write_skill(
            tmp.path(),
            "web-refactor",
            "Refactor web UI",
            "[css, tailwind]",
            "| Situation | File |\n|---|---|\n| tokens, colors | references/tokens.md |\n",
        );
        // Not a skill: invalid name
        write_skill(tmp.path(), "Bad_Name", "x", "[]", "");
        // Not a skill: no manifest
        fs::create_dir_all(tmp.path().join("empty")).unwrap();
        tmp
    }

    #[test]
    fn test_registry_new() {
        let registry = SkillsRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_discover_skips_invalid() {
        let tmp = fixture();
        let mut registry = SkillsRegistry::new()
            .add_directory(tmp.path())
            .add_directory(tmp.path().join("missing"));
        registry.discover().unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.get("swiftui-review").is_some());
        assert!(registry.get("web-refactor").is_some());
        assert!(registry.get("swiftui-review").unwrap().content.is_none());
    }

    #[test]
    fn test_later_directory_wins() {
        let shared = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        write_skill(shared.path(), "web-refactor", "Shared copy", "[css]", "");
        write_skill(project.path(), "web-refactor", "Project copy", "[css]", "");

        let mut registry = SkillsRegistry::new()
            .add_directory(shared.path())
            .add_directory(project.path());
        registry.discover().unwrap();

        assert_eq!(registry.len(), 1);
        let skill = registry.get("web-refactor").unwrap();
        assert_eq!(skill.description(), "Project copy");
        assert!(skill.path.starts_with(project.path()));
    }

    #[test]
    fn test_activate_and_resolve() {
        let tmp = fixture();
        let mut registry = SkillsRegistry::new().add_directory(tmp.path());
        registry.discover().unwrap();

        let active = registry.activate("Tidy up the Tailwind classes and CSS colors");
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name(), "web-refactor");

        let refs = registry
            .resolve("web-refactor", "Tidy up the Tailwind classes and CSS colors")
            .unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].path, "references/tokens.md");

        assert!(matches!(
            registry.resolve("unknown", "anything"),
            Err(ManifestError::SkillNotFound(_))
        ));
    }

    #[test]
    fn test_load_skill_and_reference() {
        let tmp = fixture();
        let refs = tmp.path().join("swiftui-review/references");
        fs::create_dir_all(&refs).unwrap();
        fs::write(refs.join("state.md"), "Use @State for local values").unwrap();

        let mut registry = SkillsRegistry::new().add_directory(tmp.path());
        registry.discover().unwrap();

        let skill = registry.load_skill("swiftui-review").unwrap();
        assert!(skill.content.as_deref().unwrap().contains("# swiftui-review"));

        let doc = registry
            .load_reference("swiftui-review", "references/state.md")
            .unwrap();
        assert_eq!(doc.approximate_word_count, 5);
    }

    #[test]
    fn test_generate_system_prompt_sorted() {
        let tmp = fixture();
        let mut registry = SkillsRegistry::new().add_directory(tmp.path());
        registry.discover().unwrap();

        let prompt = registry.generate_system_prompt();
        let swift = prompt.find("- swiftui-review: Review SwiftUI views").unwrap();
        let web = prompt.find("- web-refactor: Refactor web UI").unwrap();
        assert!(swift < web);

        assert_eq!(
            registry.generate_skills_list(),
            "swiftui-review: Review SwiftUI views, web-refactor: Refactor web UI"
        );
    }

    #[test]
    fn test_generate_system_prompt_empty() {
        let registry = SkillsRegistry::new();
        let prompt = registry.generate_system_prompt();
        assert!(prompt.is_empty());
    }

    #[test]
    fn test_generate_skills_list_empty() {
        let registry = SkillsRegistry::new();
        let list = registry.generate_skills_list();
        assert_eq!(list, "No skills available");
    }
}
