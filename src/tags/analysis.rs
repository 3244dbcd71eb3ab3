//! Tag usage statistics, improvement hints and exports.

use std::collections::HashMap;
use std::str::FromStr;

use anyhow::Result;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::catalog::Resource;

/// A tag set shared by several resources
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCombination {
    pub tags: Vec<String>,
    pub count: usize,
}

/// Result of [`analyze`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TagAnalysis {
    pub total_resources: usize,
    pub total_unique_tags: usize,
    pub resources_without_tags: usize,

    /// Most used first
    #[serde(serialize_with = "ordered_counts")]
    pub tag_usage: Vec<(String, usize)>,

    /// Usage of the first tag segment, most used first
    #[serde(serialize_with = "ordered_counts")]
    pub category_usage: Vec<(String, usize)>,

    /// Top ten multi-tag sets
    pub common_combinations: Vec<TagCombination>,

    pub untagged_resources: Vec<String>,
}

/// Write `(key, count)` pairs as a JSON object, keeping their order
fn ordered_counts<S: Serializer>(counts: &[(String, usize)], serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(counts.len()))?;
    for (key, count) in counts {
        map.serialize_entry(key, count)?;
    }
    map.end()
}

/// First segment of a tag
pub fn tag_category(tag: &str) -> &str {
    tag.split('/').next().unwrap_or(tag)
}

fn ranked(counts: HashMap<String, usize>) -> Vec<(String, usize)> {
    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}

/// Count tag, category and combination usage across the catalog
pub fn analyze(resources: &[Resource]) -> TagAnalysis {
    let mut tag_usage: HashMap<String, usize> = HashMap::new();
    let mut category_usage: HashMap<String, usize> = HashMap::new();
    let mut combinations: HashMap<Vec<String>, usize> = HashMap::new();
    let mut untagged = Vec::new();

    for resource in resources {
        if resource.tags.is_empty() {
            untagged.push(resource.label().to_string());
            continue;
        }

        for tag in &resource.tags {
            *tag_usage.entry(tag.clone()).or_default() += 1;
            *category_usage
                .entry(tag_category(tag).to_string())
                .or_default() += 1;
        }

        if resource.tags.len() > 1 {
            let mut combo = resource.tags.clone();
            combo.sort();
            *combinations.entry(combo).or_default() += 1;
        }
    }

    let mut common_combinations: Vec<TagCombination> = combinations
        .into_iter()
        .map(|(tags, count)| TagCombination { tags, count })
        .collect();
    common_combinations.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tags.cmp(&b.tags)));
    common_combinations.truncate(10);

    TagAnalysis {
        total_resources: resources.len(),
        total_unique_tags: tag_usage.len(),
        resources_without_tags: untagged.len(),
        tag_usage: ranked(tag_usage),
        category_usage: ranked(category_usage),
        common_combinations,
        untagged_resources: untagged,
    }
}

/// Human-readable hints for tidying the tag vocabulary
pub fn suggest(analysis: &TagAnalysis) -> Vec<String> {
    let mut suggestions = Vec::new();

    let singletons: Vec<&str> = analysis
        .tag_usage
        .iter()
        .filter(|(_, count)| *count == 1)
        .map(|(tag, _)| tag.as_str())
        .collect();
    if !singletons.is_empty() {
        suggestions.push(format!(
            "Consider consolidating {} tags used only once:",
            singletons.len()
        ));
        suggestions.extend(singletons.iter().take(10).map(|tag| format!("  - {}", tag)));
    }

    if analysis.resources_without_tags > 0 {
        suggestions.push(format!(
            "{} resources have no tags:",
            analysis.resources_without_tags
        ));
        suggestions.extend(
            analysis
                .untagged_resources
                .iter()
                .take(5)
                .map(|name| format!("  - {}", name)),
        );
    }

    let categories: Vec<&str> = analysis
        .category_usage
        .iter()
        .map(|(c, _)| c.as_str())
        .collect();
    let squash = |s: &str| s.replace(['-', '_'], "");

    let mut naming_issues = Vec::new();
    for (i, a) in categories.iter().enumerate() {
        for b in &categories[i + 1..] {
            if squash(*a) == squash(*b) {
                naming_issues.push(format!("  - {} vs {}", a, b));
            }
        }
    }
    if !naming_issues.is_empty() {
        suggestions.push("Potential naming inconsistencies:".to_string());
        suggestions.extend(naming_issues);
    }

    suggestions
}

/// Export formats for `tags export`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            _ => anyhow::bail!("Unknown export format: {}", s),
        }
    }
}

/// Render the analysis in the requested format
pub fn export(analysis: &TagAnalysis, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(analysis)?),
        ExportFormat::Csv => Ok(export_csv(analysis)),
    }
}

fn export_csv(analysis: &TagAnalysis) -> String {
    let mut out = String::from("Tag,Usage Count,Category\n");

    for (tag, count) in &analysis.tag_usage {
        let category = if tag.contains('/') {
            tag_category(tag)
        } else {
            "misc"
        };
        out.push_str(&format!("{},{},{}\n", csv_field(tag), count, csv_field(category)));
    }

    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
