//! The generated block inside README.md.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::catalog::TagTree;
use crate::config::SiteSettings;

use super::title_case;

pub const START_MARKER: &str = "<!-- START AUTO -->";
pub const END_MARKER: &str = "<!-- END AUTO -->";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReadmeError {
    #[error("README must contain <!-- START AUTO --> and <!-- END AUTO --> markers")]
    MissingMarkers,
}

/// Replace everything between the AUTO markers with `content`
pub fn splice_readme(readme: &str, content: &str) -> Result<String, ReadmeError> {
    let (before, rest) = readme
        .split_once(START_MARKER)
        .ok_or(ReadmeError::MissingMarkers)?;
    let (_, after) = rest
        .split_once(END_MARKER)
        .ok_or(ReadmeError::MissingMarkers)?;

    Ok(format!(
        "{}{}\n{}\n{}{}",
        before, START_MARKER, content, END_MARKER, after
    ))
}

/// Short overview pointing readers at the generated site
pub fn render_readme_summary(
    tree: &TagTree,
    site: &SiteSettings,
    generated_at: DateTime<Utc>,
) -> String {
    let total = tree.count_items();
    let category_count = tree.children.len();

    let mut highlights: Vec<String> = tree
        .children
        .iter()
        .take(5)
        .map(|(name, node)| format!("**{}** ({})", title_case(name), node.count_items()))
        .collect();
    if category_count > 5 {
        if let Some(last) = highlights.last_mut() {
            last.push_str("...");
        }
    }

    let mut out = Vec::new();
    out.push(format!(
        "<!-- Generated on {} by curator -->",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push(String::new());
    out.push(format!("## 🌐 {}", site.title));
    out.push(String::new());

    if let Some(pages) = &site.pages_url {
        out.push(format!(
            "**[👆 Explore all {} resources →]({})**",
            total, pages
        ));
        out.push(String::new());
    }

    out.push(format!(
        "This repository contains a curated collection of **{} resources** across **{} categories**, including:",
        total, category_count
    ));
    out.push(String::new());
    out.push(highlights.join(" • "));
    out.push(String::new());
    out.push("### ✨ Features".to_string());
    out.push(String::new());
    out.push("- 🔍 **Real-time search** across all resources".to_string());
    out.push("- 📱 **Responsive design** for all devices".to_string());
    out.push("- 📊 **Live GitHub data** (stars, last commit)".to_string());
    out.push("- ⌨️ **Keyboard shortcuts** (`Ctrl+K` to search)".to_string());
    out.push("- 🌙 **Dark mode** support".to_string());

    let mut links = Vec::new();
    if let Some(pages) = &site.pages_url {
        links.push(format!(
            "- **[🌐 Browse Resources]({})** - Interactive web interface",
            pages
        ));
    }
    if let Some(repo) = &site.repo_url {
        let repo = repo.trim_end_matches('/');
        links.push(format!(
            "- **[🐛 Report Issues]({}/issues)** - Help us improve",
            repo
        ));
        links.push(format!(
            "- **[⭐ Star this repository]({}/stargazers)**",
            repo
        ));
    }
    if !links.is_empty() {
        out.push(String::new());
        out.push("### 🚀 Quick Access".to_string());
        out.push(String::new());
        out.extend(links);
    }

    out.push(String::new());
    out.push("---".to_string());
    out.push(String::new());
    out.push(format!(
        "*Automatically updated from `resources.yml` • Last updated: {}*",
        generated_at.format("%B %d, %Y")
    ));

    out.join("\n")
}
