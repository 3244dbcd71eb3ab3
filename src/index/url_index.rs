//! Persisted lookup index of normalized URLs.
//!
//! Stored as pretty JSON next to the catalog. The index remembers the digest
//! of the catalog it was last synced with so stale indexes can be detected.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::normalize::{normalize_url, url_host};
use crate::catalog::{file_digest, write_atomic, Resource, ResourceFile};

/// Current on-disk format version
pub const INDEX_VERSION: u32 = 1;

/// Information kept for each indexed URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub name: String,

    /// URL as it was entered
    pub original_url: String,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Set when the resource was added through curator; kept across rebuilds
    #[serde(default)]
    pub added_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct IndexDocument {
    version: u32,

    #[serde(default)]
    source_digest: Option<String>,

    urls: BTreeMap<String, IndexEntry>,
}

/// Either the current document or the older flat `url -> entry` map
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredIndex {
    Current(IndexDocument),
    Legacy(BTreeMap<String, IndexEntry>),
}

/// A fuzzy match from `search_similar_urls`
#[derive(Debug, Clone)]
pub struct SimilarUrl<'a> {
    pub url: &'a str,
    pub entry: &'a IndexEntry,
    pub similarity: f64,
}

/// Summary numbers for `curator index stats`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndexStats {
    pub total_urls: usize,
    pub total_domains: usize,
    pub total_tags: usize,
    pub top_domains: Vec<(String, usize)>,
}

/// Catalog entries that normalize to the same URL
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateGroup {
    pub normalized: String,

    /// Indices into the resource list, in catalog order
    pub members: Vec<usize>,
}

/// URL index backed by a JSON file
#[derive(Debug)]
pub struct UrlIndex {
    path: PathBuf,
    entries: BTreeMap<String, IndexEntry>,
    source_digest: Option<String>,
}

impl UrlIndex {
    /// Create an empty index that will be saved to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
            source_digest: None,
        }
    }

    /// Load the index; a missing or unreadable file yields an empty index
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let mut index = Self::new(path);

        if !index.path.exists() {
            return index;
        }

        let loaded = std::fs::read_to_string(&index.path)
            .context("Failed to read URL index")
            .and_then(|content| {
                serde_json::from_str::<StoredIndex>(&content).context("Failed to parse URL index")
            });

        match loaded {
            Ok(StoredIndex::Current(doc)) => {
                index.entries = doc.urls;
                index.source_digest = doc.source_digest;
            }
            Ok(StoredIndex::Legacy(entries)) => {
                tracing::debug!("Loaded legacy URL index format");
                index.entries = entries;
            }
            Err(e) => {
                tracing::warn!("Could not load URL index {}: {:#}", index.path.display(), e);
            }
        }

        index
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Save the index to disk
    pub fn save(&self) -> Result<()> {
        let doc = IndexDocument {
            version: INDEX_VERSION,
            source_digest: self.source_digest.clone(),
            urls: self.entries.clone(),
        };
        let json = serde_json::to_string_pretty(&doc).context("Failed to serialize URL index")?;

        write_atomic(&self.path, &json)
            .with_context(|| format!("Failed to save URL index: {}", self.path.display()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(normalized_url, entry)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&String, &IndexEntry)> {
        self.entries.iter()
    }

    /// Insert without saving. Returns false if the URL is already indexed.
    pub fn insert(&mut self, url: &str, name: &str, tags: &[String]) -> bool {
        let key = normalize_url(url);
        if self.entries.contains_key(&key) {
            return false;
        }

        self.entries.insert(
            key,
            IndexEntry {
                name: name.to_string(),
                original_url: url.to_string(),
                tags: tags.to_vec(),
                added_date: Some(Utc::now()),
            },
        );
        true
    }

    /// Add a URL and save. Returns false if it is a duplicate.
    pub fn add_url(&mut self, url: &str, name: &str, tags: &[String]) -> Result<bool> {
        if !self.insert(url, name, tags) {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Existing entry for a URL, if any
    pub fn check_duplicate(&self, url: &str) -> Option<&IndexEntry> {
        self.entries.get(&normalize_url(url))
    }

    /// Remove a URL and save. Returns false if it was not indexed.
    pub fn remove_url(&mut self, url: &str) -> Result<bool> {
        if self.entries.remove(&normalize_url(url)).is_none() {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Replace the index contents with the given resources.
    ///
    /// Returns the number of resources that had a URL. Later entries win
    /// when two resources normalize to the same URL.
    /// Entries that were already indexed keep their `added_date`.
    pub fn rebuild_from(&mut self, resources: &[Resource]) -> usize {
        let previous = std::mem::take(&mut self.entries);

        let mut count = 0;
        for resource in resources {
            let Some(url) = resource.url.as_deref().filter(|u| !u.is_empty()) else {
                continue;
            };

            let key = normalize_url(url);
            let added_date = previous.get(&key).and_then(|e| e.added_date);
            self.entries.insert(
                key,
                IndexEntry {
                    name: resource.label().to_string(),
                    original_url: url.to_string(),
                    tags: resource.tags.clone(),
                    added_date,
                },
            );
            count += 1;
        }

        count
    }

    /// Rebuild from a catalog file, record its digest and save
    pub fn rebuild_from_resources(&mut self, resources_file: &Path) -> Result<usize> {
        let file = ResourceFile::load(resources_file)?;
        let count = self.rebuild_from(&file.resources);
        self.record_source(resources_file)?;
        self.save()?;
        Ok(count)
    }

    /// Remember the catalog digest the index now reflects (not saved)
    pub fn record_source(&mut self, resources_file: &Path) -> Result<()> {
        self.source_digest = Some(file_digest(resources_file)?);
        Ok(())
    }

    /// True when the catalog changed since the index was last synced.
    ///
    /// An index that never recorded a digest (new, or written by an older
    /// version) cannot vouch for the catalog and is always stale.
    pub fn is_stale(&self, resources_file: &Path) -> Result<bool> {
        match &self.source_digest {
            Some(recorded) => Ok(*recorded != file_digest(resources_file)?),
            None => Ok(true),
        }
    }

    /// Rebuild in memory from the catalog when the index is stale.
    ///
    /// Returns true when a rebuild happened; the caller decides whether to
    /// save. A missing catalog leaves the index untouched.
    pub fn sync_with(&mut self, resources_file: &Path) -> Result<bool> {
        if !resources_file.exists() || !self.is_stale(resources_file)? {
            return Ok(false);
        }

        tracing::info!(
            "URL index does not match {}, rebuilding",
            resources_file.display()
        );
        let file = ResourceFile::load(resources_file)?;
        self.rebuild_from(&file.resources);
        self.record_source(resources_file)?;
        Ok(true)
    }

    /// Every tag across indexed entries
    pub fn all_tags(&self) -> BTreeSet<String> {
        self.entries
            .values()
            .flat_map(|e| e.tags.iter().cloned())
            .collect()
    }

    /// Indexed URLs whose similarity to `url` is at least `threshold`,
    /// best match first
    pub fn search_similar_urls(&self, url: &str, threshold: f64) -> Vec<SimilarUrl<'_>> {
        let normalized = normalize_url(url);

        let mut similar: Vec<SimilarUrl<'_>> = self
            .entries
            .iter()
            .filter_map(|(indexed, entry)| {
                let similarity = strsim::normalized_levenshtein(&normalized, indexed);
                (similarity >= threshold).then_some(SimilarUrl {
                    url: indexed.as_str(),
                    entry,
                    similarity,
                })
            })
            .collect();

        similar.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        similar
    }

    /// Totals plus the ten most common domains
    pub fn stats(&self) -> IndexStats {
        let mut domains: HashMap<String, usize> = HashMap::new();
        for entry in self.entries.values() {
            if let Some(host) = url_host(&entry.original_url) {
                *domains.entry(host).or_default() += 1;
            }
        }

        let total_domains = domains.len();
        let mut top_domains: Vec<(String, usize)> = domains.into_iter().collect();
        top_domains.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_domains.truncate(10);

        IndexStats {
            total_urls: self.entries.len(),
            total_domains,
            total_tags: self.all_tags().len(),
            top_domains,
        }
    }
}

/// Group catalog entries that share a normalized URL
pub fn find_duplicates(resources: &[Resource]) -> Vec<DuplicateGroup> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<usize>> = HashMap::new();

    for (i, resource) in resources.iter().enumerate() {
        let Some(url) = resource.url.as_deref().filter(|u| !u.trim().is_empty()) else {
            continue;
        };

        let key = normalize_url(url);
        let members = groups.entry(key.clone()).or_default();
        if members.is_empty() {
            order.push(key);
        }
        members.push(i);
    }

    order
        .into_iter()
        .filter_map(|normalized| {
            let members = groups.remove(&normalized)?;
            (members.len() > 1).then_some(DuplicateGroup {
                normalized,
                members,
            })
        })
        .collect()
}
