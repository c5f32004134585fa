//! Skill manifest definition and parsing
//!
//! Each skill is a folder containing SKILL.md with YAML frontmatter and a
//! markdown body holding the routing table.

use regex::Regex;
use serde::Deserialize;
use skillpack_types::{ReferenceDocument, ReferenceRef};
use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{ManifestError, Result};
use crate::routing::{matches_phrase, ReferenceIndex};

/// Manifest file name inside a skill directory
pub const MANIFEST_FILE: &str = "SKILL.md";
/// Maximum recommended name length
const MAX_NAME_LENGTH: usize = 64;
/// Maximum recommended description length
const MAX_DESCRIPTION_LENGTH: usize = 1024;

/// Manifest metadata extracted from YAML frontmatter
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestMetadata {
    /// Skill name (lowercase letters/numbers/hyphens only)
    pub name: String,
    /// What the skill covers and when to use it
    pub description: String,
    /// Phrases that activate the skill
    #[serde(default, alias = "trigger_phrases")]
    pub triggers: Vec<String>,
    /// Operational modes (e.g. review, refactor)
    #[serde(default)]
    pub modes: Vec<String>,
}

/// A skill manifest with lazily loaded body and references
#[derive(Debug, Clone)]
pub struct SkillManifest {
    /// Frontmatter metadata
    pub metadata: ManifestMetadata,
    /// Full path to the skill directory
    pub path: PathBuf,
    /// Routing table parsed from the body
    pub reference_index: ReferenceIndex,
    /// Full SKILL.md body (loaded on demand)
    pub content: Option<String>,
    references: HashMap<String, ReferenceDocument>,
}

impl SkillManifest {
    /// Load a manifest from a directory, keeping the body
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let (metadata, body) = read_manifest(dir)?;
        let reference_index = ReferenceIndex::parse(&body);

        Ok(Self {
            metadata,
            path: dir.to_path_buf(),
            reference_index,
            content: Some(body),
            references: HashMap::new(),
        })
    }

    /// Load only metadata and routing table from a directory (Phase 1: Discovery)
    pub fn metadata_from_dir(dir: &Path) -> Result<Self> {
        let (metadata, body) = read_manifest(dir)?;
        let reference_index = ReferenceIndex::parse(&body);

        Ok(Self {
            metadata,
            path: dir.to_path_buf(),
            reference_index,
            content: None, // Don't keep the body yet
            references: HashMap::new(),
        })
    }

    /// Load full body if not already loaded (Phase 2: Activation)
    pub fn load_content(&mut self) -> Result<&str> {
        if self.content.is_none() {
            let (_, body) = read_manifest(&self.path)?;
            self.content = Some(body);
        }
        Ok(self.content.as_deref().unwrap_or_default())
    }

    /// Load a reference document listed in the routing table (Phase 3: Execution)
    pub fn load_reference(&mut self, rel_path: &str) -> Result<&ReferenceDocument> {
        if !self.reference_index.contains_path(rel_path) {
            return Err(ManifestError::UnknownReference {
                skill: self.name().to_string(),
                path: rel_path.to_string(),
            });
        }

        if !self.references.contains_key(rel_path) {
            let file = self.reference_file(rel_path)?;
            let content = fs::read_to_string(&file).map_err(|source| ManifestError::Read {
                path: file.clone(),
                source,
            })?;
            let doc = ReferenceDocument::new(rel_path, content);
            debug!(
                "Loaded reference {} for skill {} (~{} words)",
                rel_path,
                self.name(),
                doc.approximate_word_count
            );
            self.references.insert(rel_path.to_string(), doc);
        }

        self.references
            .get(rel_path)
            .ok_or_else(|| ManifestError::UnknownReference {
                skill: self.name().to_string(),
                path: rel_path.to_string(),
            })
    }

    /// Whether a reference has already been loaded
    pub fn is_reference_loaded(&self, rel_path: &str) -> bool {
        self.references.contains_key(rel_path)
    }

    /// Absolute location of a routed reference, rejecting paths outside the skill
    pub fn reference_file(&self, rel_path: &str) -> Result<PathBuf> {
        if !is_contained_path(rel_path) {
            return Err(ManifestError::UnsafePath {
                skill: self.name().to_string(),
                path: rel_path.to_string(),
            });
        }
        Ok(self.path.join(rel_path))
    }

    /// Routing entries whose keywords occur in `situation`
    pub fn resolve(&self, situation: &str) -> Vec<&ReferenceRef> {
        self.reference_index.resolve(situation)
    }

    /// Whether the skill's name or any trigger phrase occurs in `situation`
    pub fn is_triggered_by(&self, situation: &str) -> bool {
        matches_phrase(situation, &self.metadata.name.replace('-', " "))
            || self
                .metadata
                .triggers
                .iter()
                .any(|trigger| matches_phrase(situation, trigger))
    }

    /// Get the skill name
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Get the skill description
    pub fn description(&self) -> &str {
        &self.metadata.description
    }

    /// Generate a concise summary for LLM system prompt
    /// Format: "- {name}: {description}"
    pub fn to_summary(&self) -> String {
        format!("- {}: {}", self.metadata.name, self.metadata.description)
    }
}

/// True for relative paths made only of normal components
pub fn is_contained_path(rel_path: &str) -> bool {
    let path = Path::new(rel_path);
    !rel_path.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

fn read_manifest(dir: &Path) -> Result<(ManifestMetadata, String)> {
    let manifest_file = dir.join(MANIFEST_FILE);

    if !manifest_file.exists() {
        return Err(ManifestError::NotFound(dir.to_path_buf()));
    }

    let content = fs::read_to_string(&manifest_file).map_err(|source| ManifestError::Read {
        path: manifest_file.clone(),
        source,
    })?;

    let (metadata, body) =
        parse_manifest_content(&content).map_err(|reason| ManifestError::Frontmatter {
            path: manifest_file.clone(),
            reason,
        })?;

    validate_metadata(&metadata)?;

    Ok((metadata, body))
}

/// Parse manifest content to extract frontmatter metadata and body
fn parse_manifest_content(content: &str) -> std::result::Result<(ManifestMetadata, String), String> {
    let content = content.trim_start_matches('\u{feff}');

    let frontmatter_re = Regex::new(r"^---[ \t]*\r?\n([\s\S]*?)\r?\n---[ \t]*(?:\r?\n([\s\S]*))?$")
        .map_err(|e| format!("Failed to compile regex: {}", e))?;

    let captures = frontmatter_re
        .captures(content)
        .ok_or_else(|| "No valid YAML frontmatter found".to_string())?;

    let yaml_str = captures
        .get(1)
        .ok_or_else(|| "Failed to extract frontmatter".to_string())?
        .as_str();

    let body = captures.get(2).map(|m| m.as_str()).unwrap_or("");

    let metadata: ManifestMetadata =
        serde_yaml::from_str(yaml_str).map_err(|e| format!("Failed to parse YAML: {}", e))?;

    Ok((metadata, body.to_string()))
}

/// Validate manifest metadata
fn validate_metadata(metadata: &ManifestMetadata) -> Result<()> {
    if metadata.name.is_empty() {
        return Err(ManifestError::InvalidMetadata(
            "Skill name cannot be empty".to_string(),
        ));
    }

    if metadata.name.len() > MAX_NAME_LENGTH {
        warn!(
            "Skill name '{}' exceeds {} characters (was {}), may be truncated",
            metadata.name,
            MAX_NAME_LENGTH,
            metadata.name.len()
        );
    }

    // Name should be lowercase letters, numbers, and hyphens only
    let name_re = Regex::new(r"^[a-z0-9-]+$").map_err(|e| {
        ManifestError::InvalidMetadata(format!("Failed to compile name validation regex: {}", e))
    })?;

    if !name_re.is_match(&metadata.name) {
        return Err(ManifestError::InvalidMetadata(format!(
            "Skill name '{}' must contain only lowercase letters, numbers, and hyphens",
            metadata.name
        )));
    }

    if metadata.description.trim().is_empty() {
        return Err(ManifestError::InvalidMetadata(format!(
            "Skill '{}' description cannot be empty",
            metadata.name
        )));
    }

    if metadata.description.len() > MAX_DESCRIPTION_LENGTH {
        warn!(
            "Skill '{}' description exceeds {} characters (was {}), may be truncated",
            metadata.name,
            MAX_DESCRIPTION_LENGTH,
            metadata.description.len()
        );
    }

    Ok(())
}
