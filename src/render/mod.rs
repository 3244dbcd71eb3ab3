//! README, static site and JSON generation.
//!
//! [`Generator::run`] is the whole `generate` command:
//! catalog → tag tree → `docs/resources.json`, `docs/index.html` and the
//! AUTO block of README.md.

pub mod badges;
pub mod html;
pub mod markdown;
pub mod readme;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;

use crate::catalog::{write_atomic, CategoriesView, Resource, ResourceFile, TagTree};
use crate::config::{GenerateSettings, ReadmeStyle, ResolvedConfig, SiteSettings};

pub use badges::{badges, Badge};
pub use html::{escape_html, render_html, render_page, truncate};
pub use markdown::render_markdown;
pub use readme::{render_readme_summary, splice_readme, ReadmeError, END_MARKER, START_MARKER};

/// Emoji shown next to a category name
pub fn category_icon(category: &str) -> &'static str {
    match category.to_lowercase().as_str() {
        "tools" => "🛠️",
        "libraries" => "📚",
        "papers" => "📄",
        "datasets" => "📊",
        "tutorials" => "🎓",
        "community" => "👥",
        "web-resources" => "🌐",
        "frameworks" => "🏗️",
        "models" => "🤖",
        "apis" => "🔌",
        _ => "📁",
    }
}

/// `web-resources` → `Web Resources`; a letter after a non-letter is upper-cased
pub fn title_case(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut prev_alpha = false;

    for c in segment.replace('-', " ").chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }

    out
}

/// HTML id for a category title
pub fn anchor(title: &str) -> String {
    title
        .to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Pretty JSON of the category tree for the site's scripts
pub fn render_web_json(tree: &TagTree, resources: &[Resource]) -> Result<String> {
    serde_json::to_string_pretty(&CategoriesView(tree.with_resources(resources)))
        .context("Failed to serialize resource tree")
}

/// Inputs and outputs of a generation run
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub resources: PathBuf,
    pub readme: PathBuf,
    pub docs: PathBuf,
    pub site: SiteSettings,
    pub settings: GenerateSettings,
}

impl GenerateOptions {
    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self {
            resources: config.resources.clone(),
            readme: config.readme.clone(),
            docs: config.docs.clone(),
            site: config.site.clone(),
            settings: config.generate.clone(),
        }
    }
}

/// What a run produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateReport {
    pub total_resources: usize,
    pub categories: usize,
    /// Files written, empty when the catalog had nothing to render
    pub written: Vec<PathBuf>,
}

impl GenerateReport {
    pub fn is_empty(&self) -> bool {
        self.written.is_empty()
    }
}

pub struct Generator {
    options: GenerateOptions,
}

impl Generator {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Load the catalog and write every output
    pub fn run(&self) -> Result<GenerateReport> {
        let opts = &self.options;

        ensure_exists(&opts.resources, "Resources file")?;
        ensure_exists(&opts.readme, "README file")?;

        let catalog = ResourceFile::load(&opts.resources)?;
        let tree = TagTree::build(&catalog.resources);

        if tree.is_empty() {
            tracing::warn!("No valid resources found in {}", opts.resources.display());
            return Ok(GenerateReport::default());
        }

        // Splice first so a README without markers leaves every file untouched
        let readme = std::fs::read_to_string(&opts.readme)
            .with_context(|| format!("Failed to read {}", opts.readme.display()))?;
        let block = match opts.settings.readme_style {
            ReadmeStyle::Summary => render_readme_summary(&tree, &opts.site, Utc::now()),
            ReadmeStyle::Full => {
                render_markdown(&tree, &catalog.resources, opts.settings.max_depth)
            }
        };
        let readme = splice_readme(&readme, &block)
            .with_context(|| format!("Cannot update {}", opts.readme.display()))?;

        let json_path = opts.docs.join("resources.json");
        write_atomic(&json_path, &render_web_json(&tree, &catalog.resources)?)?;

        let page_path = opts.docs.join("index.html");
        let page = render_page(
            &tree,
            &catalog.resources,
            &opts.site,
            opts.settings.max_depth,
            opts.settings.description_limit,
        );
        write_atomic(&page_path, &page)?;

        write_atomic(&opts.readme, &readme)?;

        let report = GenerateReport {
            total_resources: tree.count_items(),
            categories: tree.children.len(),
            written: vec![json_path, page_path, opts.readme.clone()],
        };
        tracing::info!(
            "Generated content for {} resources across {} categories",
            report.total_resources,
            report.categories
        );

        Ok(report)
    }
}

fn ensure_exists(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("{} not found: {}", what, path.display());
    }
    Ok(())
}
