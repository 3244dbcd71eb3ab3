//! URL Index Integration Tests
//!
//! Persistence, rebuild and staleness of the duplicate index.

use curator::catalog::{append_resources, Resource};
use curator::index::{find_duplicates, normalize_url, UrlIndex};
use tempfile::TempDir;

const CATALOG: &str = r#"resources:
  - name: PyTorch
    url: https://pytorch.org
    description: Tensors and dynamic neural networks
    tags: [libraries/python/ml]
  - name: Transformers
    url: https://github.com/huggingface/transformers
    description: State-of-the-art NLP
    tags: [libraries/python/nlp, tools/models]
  - title: Notes Without URL
    description: Has no link
    tags: [tutorials]
"#;

fn setup() -> (TempDir, std::path::PathBuf, std::path::PathBuf) {
    let temp = TempDir::new().unwrap();
    let catalog = temp.path().join("resources.yml");
    std::fs::write(&catalog, CATALOG).unwrap();
    let index = temp.path().join(".curator").join("url_index.json");
    (temp, catalog, index)
}

#[test]
fn test_rebuild_counts_resources_with_urls() {
    let (_temp, catalog, index_path) = setup();

    let mut index = UrlIndex::new(&index_path);
    let count = index.rebuild_from_resources(&catalog).unwrap();

    assert_eq!(count, 2);
    assert!(index_path.exists());

    let entry = index.check_duplicate("www.pytorch.org/").unwrap();
    assert_eq!(entry.name, "PyTorch");
    assert_eq!(entry.original_url, "https://pytorch.org");
    assert!(entry.added_date.is_none());
}

#[test]
fn test_index_survives_reopen() {
    let (_temp, _catalog, index_path) = setup();

    let mut index = UrlIndex::open(&index_path);
    assert!(index.is_empty());

    let tags = vec!["datasets/images".to_string()];
    assert!(index.add_url("https://www.kaggle.com/", "Kaggle", &tags).unwrap());
    assert!(!index.add_url("HTTP://KAGGLE.COM", "Kaggle again", &[]).unwrap());

    let reopened = UrlIndex::open(&index_path);
    assert_eq!(reopened.len(), 1);
    let entry = reopened.check_duplicate("kaggle.com").unwrap();
    assert_eq!(entry.name, "Kaggle");
    assert_eq!(entry.tags, tags);
    assert!(entry.added_date.is_some());
}

#[test]
fn test_remove_url() {
    let (_temp, catalog, index_path) = setup();

    let mut index = UrlIndex::new(&index_path);
    index.rebuild_from_resources(&catalog).unwrap();

    assert!(index.remove_url("https://pytorch.org/").unwrap());
    assert!(!index.remove_url("https://pytorch.org/").unwrap());

    let reopened = UrlIndex::open(&index_path);
    assert_eq!(reopened.len(), 1);
    assert!(reopened.check_duplicate("pytorch.org").is_none());
}

#[test]
fn test_stale_after_catalog_change() {
    let (_temp, catalog, index_path) = setup();

    let mut index = UrlIndex::new(&index_path);
    index.rebuild_from_resources(&catalog).unwrap();
    assert!(!index.is_stale(&catalog).unwrap());

    append_resources(
        &catalog,
        vec![Resource::new("JAX", "https://github.com/google/jax", "Autograd and XLA")
            .with_tag("libraries/python/ml")],
    )
    .unwrap();

    let reopened = UrlIndex::open(&index_path);
    assert!(reopened.is_stale(&catalog).unwrap());
}

#[test]
fn test_legacy_flat_format_loads() {
    let (_temp, _catalog, index_path) = setup();
    std::fs::create_dir_all(index_path.parent().unwrap()).unwrap();
    std::fs::write(
        &index_path,
        r#"{
  "https://pytorch.org/": {
    "name": "PyTorch",
    "original_url": "https://pytorch.org",
    "tags": ["libraries/python/ml"],
    "added_date": "2024-01-15T10:30:00Z"
  }
}"#,
    )
    .unwrap();

    let index = UrlIndex::open(&index_path);
    assert_eq!(index.len(), 1);
    assert!(index.check_duplicate("pytorch.org").is_some());
}

#[test]
fn test_corrupt_index_is_empty() {
    let (_temp, _catalog, index_path) = setup();
    std::fs::create_dir_all(index_path.parent().unwrap()).unwrap();
    std::fs::write(&index_path, "{ not json").unwrap();

    let index = UrlIndex::open(&index_path);
    assert!(index.is_empty());
}

#[test]
fn test_stats_and_tags() {
    let (_temp, catalog, index_path) = setup();

    let mut index = UrlIndex::new(&index_path);
    index.rebuild_from_resources(&catalog).unwrap();

    let stats = index.stats();
    assert_eq!(stats.total_urls, 2);
    assert_eq!(stats.total_domains, 2);
    assert_eq!(stats.total_tags, 3);
    assert_eq!(stats.top_domains[0], ("github.com".to_string(), 1));

    let tags: Vec<String> = index.all_tags().into_iter().collect();
    assert_eq!(
        tags,
        vec!["libraries/python/ml", "libraries/python/nlp", "tools/models"]
    );
}

#[test]
fn test_similar_urls_ranked() {
    let (_temp, catalog, index_path) = setup();

    let mut index = UrlIndex::new(&index_path);
    index.rebuild_from_resources(&catalog).unwrap();

    let hits = index.search_similar_urls("github.com/huggingface/transformer", 0.8);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].entry.name, "Transformers");
    assert!(hits[0].similarity > 0.9);

    assert!(index.search_similar_urls("https://example.com", 0.8).is_empty());
}

#[test]
fn test_duplicates_inside_catalog() {
    let resources = vec![
        Resource::new("A", "https://pytorch.org", "first"),
        Resource::new("B", "https://example.com", "other"),
        Resource::new("C", "http://www.pytorch.org/", "second"),
    ];

    let groups = find_duplicates(&resources);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].normalized, normalize_url("pytorch.org"));
    assert_eq!(groups[0].members, vec![0, 2]);
}
