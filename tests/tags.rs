//! Tag Tooling Integration Tests
//!
//! Analysis, validation and exports over a catalog loaded from disk.

use curator::catalog::ResourceFile;
use curator::tags::{
    analyze, export, render_tree, suggest, validate, ExportFormat, TagHierarchy, TagIssueKind,
};
use tempfile::TempDir;

const CATALOG: &str = r#"resources:
  - name: PyTorch
    url: https://pytorch.org
    description: Deep learning framework
    tags: [libraries/python/ml, tools/training]
  - name: JAX
    url: https://github.com/google/jax
    description: Autograd and XLA
    tags: [tools/training, libraries/python/ml]
  - name: Papers With Code
    url: https://paperswithcode.com
    description: Papers and benchmarks
    tags: [web-resources/papers]
  - name: Blog Roll
    url: https://example.org/blogs
    description: Assorted blogs
    tags: [web_resources/blogs, Bad/Tag, tools//double]
  - title: Untagged Notes
    url: https://example.org/notes
    description: No tags yet
"#;

fn load() -> (TempDir, ResourceFile) {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("resources.yml");
    std::fs::write(&path, CATALOG).unwrap();
    let catalog = ResourceFile::load(&path).unwrap();
    (temp, catalog)
}

#[test]
fn test_analysis_over_catalog() {
    let (_temp, catalog) = load();
    let analysis = analyze(&catalog.resources);

    assert_eq!(analysis.total_resources, 5);
    assert_eq!(analysis.resources_without_tags, 1);
    assert_eq!(analysis.untagged_resources, vec!["Untagged Notes"]);
    assert_eq!(analysis.tag_usage[0], ("libraries/python/ml".to_string(), 2));
    assert_eq!(analysis.tag_usage[1], ("tools/training".to_string(), 2));
    assert_eq!(analysis.category_usage[0], ("tools".to_string(), 3));

    // Same pair in a different order is one combination
    assert_eq!(analysis.common_combinations[0].count, 2);
    assert_eq!(
        analysis.common_combinations[0].tags,
        vec!["libraries/python/ml", "tools/training"]
    );
}

#[test]
fn test_suggestions_flag_naming_pairs() {
    let (_temp, catalog) = load();
    let suggestions = suggest(&analyze(&catalog.resources));

    assert!(suggestions.contains(&"Potential naming inconsistencies:".to_string()));
    let pairs: Vec<&String> = suggestions.iter().filter(|s| s.contains(" vs ")).collect();
    assert_eq!(pairs.len(), 1);
    assert!(pairs[0].contains("web-resources") && pairs[0].contains("web_resources"));
    assert!(suggestions.contains(&"  - Untagged Notes".to_string()));
}

#[test]
fn test_validation_issues() {
    let (_temp, catalog) = load();
    let issues = validate(&catalog.resources);

    assert!(issues.iter().all(|i| i.resource == "Blog Roll"));

    let bad: Vec<_> = issues.iter().filter(|i| i.tag == "Bad/Tag").collect();
    assert_eq!(bad.len(), 1);
    assert_eq!(bad[0].kind, TagIssueKind::InvalidFormat);

    let double: Vec<TagIssueKind> = issues
        .iter()
        .filter(|i| i.tag == "tools//double")
        .map(|i| i.kind)
        .collect();
    assert_eq!(double, vec![TagIssueKind::InvalidFormat, TagIssueKind::DoubleSlash]);

    assert!(issues.iter().any(|i| i.tag == "web_resources/blogs"));
}

#[test]
fn test_hierarchy_and_tree() {
    let (_temp, catalog) = load();

    let hierarchy = TagHierarchy::build(&catalog.resources);
    let json = serde_json::to_value(&hierarchy).unwrap();
    let ml = json["libraries"]["python"]["ml"].as_array().unwrap();
    assert_eq!(ml.len(), 2);

    let tree = render_tree(&catalog.resources);
    assert!(tree.starts_with("Bad\n└── Tag\nlibraries\n└── python\n    └── ml\n"));
    assert!(tree.contains("tools\n├── double\n└── training"));
}

#[test]
fn test_exports() {
    let (_temp, catalog) = load();
    let analysis = analyze(&catalog.resources);

    let csv = export(&analysis, ExportFormat::Csv).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("Tag,Usage Count,Category"));
    assert_eq!(lines.next(), Some("libraries/python/ml,2,libraries"));

    let json: serde_json::Value =
        serde_json::from_str(&export(&analysis, ExportFormat::Json).unwrap()).unwrap();
    assert_eq!(json["total_resources"], 5);
    assert_eq!(json["tag_usage"]["tools/training"], 2);

    assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
    assert!("xml".parse::<ExportFormat>().is_err());
}
