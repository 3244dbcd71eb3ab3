//! Resource entries and the catalog file that holds them.
//!
//! The catalog is a single YAML document with a top-level `resources` list.
//! Keys this crate does not know about are carried through untouched so a
//! rewrite never drops data.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Structural problems in a catalog document
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("YAML root must be a mapping")]
    RootNotMapping,

    #[error("YAML must contain a 'resources' key")]
    MissingResources,

    #[error("'resources' must be a list")]
    ResourcesNotList,

    #[error("Resource {0} must be a mapping")]
    EntryNotMapping(usize),

    #[error("Resource {0} must have either 'name' or 'title'")]
    EntryWithoutName(usize),
}

/// A single cataloged entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default, deserialize_with = "scalar_string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Older entries use `title` instead of `name`
    #[serde(default, deserialize_with = "scalar_string", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "scalar_string", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, deserialize_with = "scalar_string", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Older entries use `summary` instead of `description`
    #[serde(default, deserialize_with = "scalar_string", skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, deserialize_with = "scalar_strings")]
    pub tags: Vec<String>,

    /// Any other keys present on the entry
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Resource {
    /// Create a resource with the four canonical fields
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            url: Some(url.into()),
            description: Some(description.into()),
            ..Default::default()
        }
    }

    /// Add a tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Add multiple tags
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Name shown in rendered output
    pub fn display_name(&self) -> &str {
        self.name_or_title().unwrap_or("Unnamed Resource")
    }

    /// Name used in reports and the URL index
    pub fn label(&self) -> &str {
        self.name_or_title().unwrap_or("Unknown")
    }

    /// Description shown in rendered output
    pub fn display_description(&self) -> &str {
        non_empty(&self.description)
            .or_else(|| non_empty(&self.summary))
            .unwrap_or("No description available")
    }

    /// URL or the empty string
    pub fn url_str(&self) -> &str {
        self.url.as_deref().unwrap_or("")
    }

    /// Lowercased display name, used as the sort key inside a category
    pub fn sort_key(&self) -> String {
        self.name_or_title().unwrap_or("").to_lowercase()
    }

    fn name_or_title(&self) -> Option<&str> {
        non_empty(&self.name).or_else(|| non_empty(&self.title))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Text of a YAML scalar; `name: 1984` is a name, not an error
fn scalar_text(value: Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Tagged(tagged) => scalar_text(tagged.value),
        Value::Null => Err("expected text, found null".to_string()),
        Value::Sequence(_) => Err("expected text, found a list".to_string()),
        Value::Mapping(_) => Err("expected text, found a mapping".to_string()),
    }
}

fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        value => scalar_text(value).map(Some).map_err(D::Error::custom),
    }
}

fn scalar_strings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(items) => items
            .into_iter()
            .map(|item| scalar_text(item).map_err(D::Error::custom))
            .collect(),
        _ => Err(D::Error::custom("'tags' must be a list")),
    }
}

/// The whole catalog document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceFile {
    #[serde(default)]
    pub resources: Vec<Resource>,

    /// Other top-level keys
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ResourceFile {
    /// Load and validate a catalog file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read resources file: {}", path.display()))?;

        Self::from_yaml(&content)
            .with_context(|| format!("Invalid resources file: {}", path.display()))
    }

    /// Parse and validate catalog YAML
    pub fn from_yaml(content: &str) -> Result<Self> {
        let raw: Value =
            serde_yaml::from_str(content).context("Failed to parse resources YAML")?;

        validate_structure(&raw)?;

        let Value::Mapping(mut root) = raw else {
            return Err(CatalogError::RootNotMapping.into());
        };
        let entries = match root.remove("resources") {
            Some(Value::Sequence(entries)) => entries,
            _ => return Err(CatalogError::ResourcesNotList.into()),
        };

        let resources = entries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| {
                serde_yaml::from_value::<Resource>(entry)
                    .with_context(|| format!("Failed to decode resource {}", i))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut file: ResourceFile =
            serde_yaml::from_value(Value::Mapping(root)).context("Failed to decode resources")?;
        file.resources = resources;
        Ok(file)
    }

    /// Serialize back to YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize resources")
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Check the shape of a raw catalog document.
///
/// Entries without a `url` only produce a warning; the generator still
/// renders them with an empty link.
pub fn validate_structure(raw: &Value) -> Result<(), CatalogError> {
    let root = raw.as_mapping().ok_or(CatalogError::RootNotMapping)?;

    let resources = root
        .get(&Value::from("resources"))
        .ok_or(CatalogError::MissingResources)?;

    let entries = resources
        .as_sequence()
        .ok_or(CatalogError::ResourcesNotList)?;

    for (i, entry) in entries.iter().enumerate() {
        let map = entry.as_mapping().ok_or(CatalogError::EntryNotMapping(i))?;

        let has_name = ["name", "title"]
            .iter()
            .any(|key| map.contains_key(&Value::from(*key)));
        if !has_name {
            return Err(CatalogError::EntryWithoutName(i));
        }

        if !map.contains_key(&Value::from("url")) {
            tracing::warn!("Resource {} missing 'url' field", i);
        }
    }

    Ok(())
}

/// SHA256 of a file's bytes, hex encoded
pub fn file_digest(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
title: AI Resources
resources:
  - name: PyTorch
    url: https://pytorch.org
    description: Deep learning framework
    tags: [libraries/python/ml]
    stars: 80000
  - title: Attention Is All You Need
    url: https://arxiv.org/abs/1706.03762
    summary: The transformer paper
    tags: [papers/nlp]
"#;

    #[test]
    fn test_load_sample() {
        let file = ResourceFile::from_yaml(SAMPLE).unwrap();
        assert_eq!(file.len(), 2);
        assert_eq!(file.resources[0].display_name(), "PyTorch");
        assert_eq!(file.resources[1].display_name(), "Attention Is All You Need");
        assert_eq!(
            file.resources[1].display_description(),
            "The transformer paper"
        );
    }

    #[test]
    fn test_unknown_keys_survive_roundtrip() {
        let file = ResourceFile::from_yaml(SAMPLE).unwrap();
        let yaml = file.to_yaml().unwrap();

        assert!(yaml.contains("stars: 80000"));
        assert!(yaml.contains("title: AI Resources"));
    }

    #[test]
    fn test_display_fallbacks() {
        let resource = Resource::default();
        assert_eq!(resource.display_name(), "Unnamed Resource");
        assert_eq!(resource.label(), "Unknown");
        assert_eq!(resource.display_description(), "No description available");
        assert_eq!(resource.url_str(), "");
    }

    #[test]
    fn test_structure_errors() {
        let cases = [
            ("- a\n- b\n", CatalogError::RootNotMapping),
            ("other: 1\n", CatalogError::MissingResources),
            ("resources: nope\n", CatalogError::ResourcesNotList),
            ("resources:\n  - just a string\n", CatalogError::EntryNotMapping(0)),
            (
                "resources:\n  - name: ok\n  - url: https://x.org\n",
                CatalogError::EntryWithoutName(1),
            ),
        ];

        for (yaml, expected) in cases {
            let raw: serde_yaml::Value = serde_yaml::from_str(yaml).unwrap();
            assert_eq!(validate_structure(&raw), Err(expected), "input: {}", yaml);
        }
    }

    #[test]
    fn test_missing_url_is_not_fatal() {
        let file = ResourceFile::from_yaml("resources:\n  - name: Offline\n").unwrap();
        assert_eq!(file.resources[0].url, None);
    }

    #[test]
    fn test_numeric_scalars_read_as_text() {
        let yaml = r#"resources:
  - name: 1984
    url: https://example.org/1984
    description: 2024
    tags: [books, 42]
  - title: true
    summary: ~
"#;
        let file = ResourceFile::from_yaml(yaml).unwrap();

        assert_eq!(file.resources[0].label(), "1984");
        assert_eq!(file.resources[0].display_description(), "2024");
        assert_eq!(file.resources[0].tags, vec!["books", "42"]);
        assert_eq!(file.resources[1].label(), "true");
        assert_eq!(file.resources[1].summary, None);
    }

    #[test]
    fn test_bad_field_names_the_entry() {
        let yaml = "resources:\n  - name: Fine\n  - name: [not, text]\n";
        let err = ResourceFile::from_yaml(yaml).unwrap_err();

        assert!(format!("{:#}", err).contains("resource 1"));
        assert!(format!("{:#}", err).contains("found a list"));
    }
}
