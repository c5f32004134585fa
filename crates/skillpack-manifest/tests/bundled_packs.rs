//! Progressive disclosure over the bundled skill packs

use skillpack_manifest::SkillsRegistry;
use std::path::PathBuf;

fn packs_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../packs")
}

fn registry() -> SkillsRegistry {
    let mut registry = SkillsRegistry::new().add_directory(packs_dir());
    registry.discover().expect("Failed to discover bundled packs");
    registry
}

#[test]
fn test_discovers_bundled_packs() {
    let registry = registry();
    let names: Vec<_> = registry.skills().iter().map(|s| s.name().to_string()).collect();
    assert_eq!(names, vec!["research-api", "swiftui-review", "web-ui-refactor"]);

    // Phase 1 keeps only metadata and routing tables
    assert!(registry.skills().iter().all(|s| s.content.is_none()));

    let web = registry.get("web-ui-refactor").unwrap();
    assert_eq!(web.metadata.triggers.len(), 4);
    assert_eq!(web.reference_index.len(), 3, "fenced table is not a routing table");
}

#[test]
fn test_activation_by_trigger_phrase() {
    let registry = registry();

    let active: Vec<_> = registry
        .activate("Please review my view, the SwiftUI list stutters while scrolling")
        .iter()
        .map(|s| s.name().to_string())
        .collect();
    assert_eq!(active, vec!["swiftui-review"]);

    assert!(registry.activate("write a haiku").is_empty());
}

#[test]
fn test_resolve_and_load_references() {
    let mut registry = registry();
    let situation = "the SwiftUI list stutters while scrolling and the sheet binding resets";

    let paths: Vec<String> = registry
        .resolve("swiftui-review", situation)
        .unwrap()
        .into_iter()
        .map(|r| r.path.clone())
        .collect();
    assert_eq!(
        paths,
        vec![
            "references/state.md",
            "references/navigation.md",
            "references/performance.md",
        ]
    );

    let doc = registry
        .load_reference("swiftui-review", "references/performance.md")
        .unwrap();
    assert!(doc.content.contains("LazyVStack"));
    assert!(doc.approximate_word_count > 10);

    let skill = registry.get("swiftui-review").unwrap();
    assert!(skill.is_reference_loaded("references/performance.md"));
    assert!(!skill.is_reference_loaded("references/state.md"));
}

#[test]
fn test_markdown_link_routes() {
    let registry = registry();
    let refs = registry
        .resolve("web-ui-refactor", "unify the font and text size on cards")
        .unwrap();
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].path, "references/tokens.md");
}
