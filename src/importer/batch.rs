//! Batch import of resources from YAML files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_yaml::Value;

use crate::catalog::{append_resources, write_atomic, Resource, ResourceFile};
use crate::index::{normalize_url, UrlIndex};

use super::entry::{raw_name, validate_entry};
use super::prompt::{confirm, Prompter};

/// What to do with an entry whose URL is already known
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    #[default]
    Skip,
    /// Ask for each duplicate, defaulting to skip
    Ask,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    pub policy: DuplicatePolicy,
    /// Validate and report without writing
    pub dry_run: bool,
}

/// An incoming entry matched an existing one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicatePair {
    pub new_name: String,
    pub existing_name: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    pub total: usize,
    pub added: usize,
    pub skipped_duplicates: usize,
    pub errors: Vec<String>,
    pub duplicates: Vec<DuplicatePair>,
    /// Entries that passed validation and duplicate handling
    pub accepted: Vec<Resource>,
    pub dry_run: bool,
}

impl ImportReport {
    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Summary lines for the end of a run
    pub fn summary(&self) -> Vec<String> {
        let mut lines = vec![
            "=".repeat(60),
            "📊 BATCH IMPORT SUMMARY".to_string(),
            "=".repeat(60),
            format!("Total resources processed: {}", self.total),
            format!("Successfully added: {}", self.added),
            format!("Skipped duplicates: {}", self.skipped_duplicates),
            format!("Errors: {}", self.errors.len()),
        ];

        if !self.duplicates.is_empty() {
            lines.push(String::new());
            lines.push("🔍 Duplicates found:".to_string());
            for dup in &self.duplicates {
                lines.push(format!("   - {} -> {}", dup.new_name, dup.existing_name));
            }
        }

        if self.dry_run && !self.accepted.is_empty() {
            lines.push(String::new());
            lines.push(format!("🔍 DRY RUN: Would add {} resources", self.accepted.len()));
        }

        lines
    }
}

/// Entries of a batch document: a mapping with `resources`, or a bare list
fn batch_entries(doc: Value) -> Result<Vec<Value>, String> {
    match doc {
        Value::Mapping(mut map) => match map.remove("resources") {
            Some(Value::Sequence(entries)) => Ok(entries),
            Some(Value::Null) => Ok(Vec::new()),
            Some(_) => Err("'resources' must be a list".to_string()),
            None => Err("YAML file must contain a 'resources' key or be a list of resources".to_string()),
        },
        Value::Sequence(entries) => Ok(entries),
        _ => Err("YAML file must contain either a list of resources or a dict with 'resources' key".to_string()),
    }
}

/// Expand file arguments; arguments with glob characters are patterns
pub fn expand_inputs(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.contains(['*', '?', '[']) {
            let mut matched: Vec<PathBuf> = glob::glob(input)
                .with_context(|| format!("Invalid glob pattern: {}", input))?
                .filter_map(|entry| entry.ok())
                .filter(|p| p.is_file())
                .collect();
            if matched.is_empty() {
                tracing::warn!("No files match {}", input);
            }
            matched.sort();
            files.extend(matched);
        } else {
            files.push(PathBuf::from(input));
        }
    }

    files.dedup();
    Ok(files)
}

pub struct BatchImporter {
    resources_path: PathBuf,
    index: UrlIndex,
}

impl BatchImporter {
    pub fn new(resources_path: impl Into<PathBuf>, index: UrlIndex) -> Self {
        Self {
            resources_path: resources_path.into(),
            index,
        }
    }

    pub fn index(&self) -> &UrlIndex {
        &self.index
    }

    /// Import one batch file
    pub fn import(
        &mut self,
        file: &Path,
        options: ImportOptions,
        prompter: &mut dyn Prompter,
    ) -> Result<ImportReport> {
        self.import_files(&[file.to_path_buf()], options, prompter)
    }

    /// Import several batch files as one batch
    pub fn import_files(
        &mut self,
        files: &[PathBuf],
        options: ImportOptions,
        prompter: &mut dyn Prompter,
    ) -> Result<ImportReport> {
        let mut report = ImportReport {
            dry_run: options.dry_run,
            ..ImportReport::default()
        };
        if options.dry_run {
            prompter.say("🔍 DRY RUN MODE - No changes will be made");
        }

        // Only saved on a real write, so a dry run leaves the index file alone
        self.index.sync_with(&self.resources_path)?;

        // normalized URL → name, for duplicates inside this batch
        let mut seen: HashMap<String, String> = HashMap::new();

        for file in files {
            self.process_file(file, options, prompter, &mut seen, &mut report)?;
        }

        if !report.errors.is_empty() {
            prompter.say("");
            prompter.say(&format!("❌ {} errors found:", report.errors.len()));
            for error in &report.errors {
                prompter.say(&format!("   {}", error));
            }
        }

        if !options.dry_run && !report.accepted.is_empty() {
            let total = self.write(&report.accepted)?;
            report.added = report.accepted.len();
            prompter.say("");
            prompter.say(&format!("✅ Successfully added {} resources", report.added));
            prompter.say(&format!("📁 Total resources in collection: {}", total));
        }

        for line in report.summary() {
            prompter.say(&line);
        }

        Ok(report)
    }

    fn process_file(
        &self,
        file: &Path,
        options: ImportOptions,
        prompter: &mut dyn Prompter,
        seen: &mut HashMap<String, String>,
        report: &mut ImportReport,
    ) -> Result<()> {
        prompter.say("");
        prompter.say(&format!("📁 Processing batch file: {}", file.display()));

        if !file.exists() {
            report.errors.push(format!("Batch file not found: {}", file.display()));
            return Ok(());
        }

        let doc = std::fs::read_to_string(file)
            .map_err(anyhow::Error::from)
            .and_then(|content| serde_yaml::from_str::<Value>(&content).map_err(anyhow::Error::from));
        let doc = match doc {
            Ok(doc) => doc,
            Err(e) => {
                report.errors.push(format!("{}: Failed to load YAML file: {}", file.display(), e));
                return Ok(());
            }
        };

        let entries = match batch_entries(doc) {
            Ok(entries) if entries.is_empty() => {
                report.errors.push(format!("{}: No resources found in file", file.display()));
                return Ok(());
            }
            Ok(entries) => entries,
            Err(e) => {
                report.errors.push(format!("{}: {}", file.display(), e));
                return Ok(());
            }
        };

        prompter.say(&format!("📊 Found {} resources to process", entries.len()));
        let count = entries.len();

        for (i, raw) in entries.iter().enumerate() {
            let position = i + 1;
            report.total += 1;
            prompter.say(&format!("[{}/{}] Processing: {}", position, count, raw_name(raw)));

            let resource = match validate_entry(raw) {
                Ok(resource) => resource,
                Err(e) => {
                    let error = format!("Resource {} ({}): {}", position, raw_name(raw), e);
                    prompter.say(&format!("❌ {}", error));
                    report.errors.push(error);
                    continue;
                }
            };

            let url = resource.url_str().to_string();
            let normalized = normalize_url(&url);
            let existing = self
                .index
                .check_duplicate(&url)
                .map(|entry| (entry.name.clone(), entry.original_url.clone()))
                .or_else(|| seen.get(&normalized).map(|name| (name.clone(), url.clone())));

            if let Some((existing_name, existing_url)) = existing {
                report.duplicates.push(DuplicatePair {
                    new_name: resource.label().to_string(),
                    existing_name: existing_name.clone(),
                    url: url.clone(),
                });

                let keep = match options.policy {
                    DuplicatePolicy::Skip => false,
                    DuplicatePolicy::Ask => {
                        prompter.say("🔍 DUPLICATE DETECTED:");
                        prompter.say(&format!("   New: {} - {}", resource.label(), url));
                        prompter.say(&format!("   Existing: {} - {}", existing_name, existing_url));
                        confirm(prompter, "   Add anyway?", false)?
                    }
                };

                if !keep {
                    report.skipped_duplicates += 1;
                    prompter.say(&format!("⚠️  Skipping duplicate URL: {}", url));
                    prompter.say(&format!("   Existing: {}", existing_name));
                    continue;
                }
            }

            prompter.say(&format!("✅ Valid resource: {}", resource.label()));
            seen.insert(normalized, resource.label().to_string());
            report.accepted.push(resource);
        }

        Ok(())
    }

    fn write(&mut self, resources: &[Resource]) -> Result<usize> {
        let total = append_resources(&self.resources_path, resources.to_vec())?;

        for resource in resources {
            self.index
                .insert(resource.url_str(), resource.label(), &resource.tags);
        }
        self.index.record_source(&self.resources_path)?;
        self.index.save()?;

        Ok(total)
    }
}

/// Write an example batch file showing the expected format
pub fn write_sample_batch(path: &Path) -> Result<()> {
    let sample = ResourceFile {
        resources: vec![
            Resource::new(
                "Example AI Tool",
                "https://example.com/ai-tool",
                "An example AI tool for demonstration purposes",
            )
            .with_tags(["tools/example", "tutorials/demo"]),
            Resource::new(
                "Another Example",
                "https://github.com/example/repo",
                "Another example resource",
            )
            .with_tags(["libraries/python/ml", "tools/development"]),
        ],
        ..ResourceFile::default()
    };

    write_atomic(path, &sample.to_yaml()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_entries_shapes() {
        let mapping: Value = serde_yaml::from_str("resources:\n  - name: a\n").unwrap();
        assert_eq!(batch_entries(mapping).unwrap().len(), 1);

        let list: Value = serde_yaml::from_str("- name: a\n- name: b\n").unwrap();
        assert_eq!(batch_entries(list).unwrap().len(), 2);

        let other: Value = serde_yaml::from_str("items: []\n").unwrap();
        assert!(batch_entries(other).is_err());

        let scalar: Value = serde_yaml::from_str("just text").unwrap();
        assert!(batch_entries(scalar).is_err());
    }

    #[test]
    fn test_summary_lines() {
        let report = ImportReport {
            total: 3,
            added: 1,
            skipped_duplicates: 1,
            errors: vec!["bad".to_string()],
            duplicates: vec![DuplicatePair {
                new_name: "New".to_string(),
                existing_name: "Old".to_string(),
                url: "https://x.org".to_string(),
            }],
            ..ImportReport::default()
        };

        let lines = report.summary();
        assert!(lines.contains(&"Total resources processed: 3".to_string()));
        assert!(lines.contains(&"Errors: 1".to_string()));
        assert!(lines.contains(&"   - New -> Old".to_string()));
        assert!(!report.success());
    }
}
