//! Tag management subcommands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};

use crate::catalog::ResourceFile;
use crate::config::ResolvedConfig;
use crate::tags::{analyze, export, render_tree, suggest, validate, ExportFormat, TagHierarchy};

#[derive(Subcommand, Debug)]
pub enum TagsCommands {
    /// Show tag usage statistics
    Analyze,

    /// Suggest tag cleanups
    Suggest,

    /// Print the tag hierarchy as JSON
    Hierarchy,

    /// Print the tag paths as a tree
    Tree,

    /// Check every tag against the format rules
    Validate,

    /// Export tag usage
    Export {
        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: FormatArg,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Export format argument
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Json,
    Csv,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => ExportFormat::Json,
            FormatArg::Csv => ExportFormat::Csv,
        }
    }
}

pub async fn execute(command: TagsCommands, cfg: &ResolvedConfig) -> Result<()> {
    let catalog = ResourceFile::load(&cfg.resources)?;
    let resources = &catalog.resources;

    match command {
        TagsCommands::Analyze => {
            let analysis = analyze(resources);

            println!("📊 TAG ANALYSIS");
            println!("{}", "=".repeat(50));
            println!("Total resources: {}", analysis.total_resources);
            println!("Unique tags: {}", analysis.total_unique_tags);
            println!("Resources without tags: {}", analysis.resources_without_tags);

            println!();
            println!("🏷️  Top categories:");
            for (category, count) in analysis.category_usage.iter().take(10) {
                println!("   {:<30} {}", category, count);
            }

            println!();
            println!("🔖 Most used tags:");
            for (tag, count) in analysis.tag_usage.iter().take(15) {
                println!("   {:<40} {}", tag, count);
            }

            if !analysis.common_combinations.is_empty() {
                println!();
                println!("🔗 Common combinations:");
                for combo in &analysis.common_combinations {
                    println!("   {} × {}", combo.count, combo.tags.join(" + "));
                }
            }
        }

        TagsCommands::Suggest => {
            let suggestions = suggest(&analyze(resources));
            if suggestions.is_empty() {
                println!("✅ No suggestions, tags look tidy");
            } else {
                println!("💡 TAG SUGGESTIONS");
                println!("{}", "=".repeat(50));
                for line in &suggestions {
                    println!("{}", line);
                }
            }
        }

        TagsCommands::Hierarchy => {
            let hierarchy = TagHierarchy::build(resources);
            println!("{}", serde_json::to_string_pretty(&hierarchy)?);
        }

        TagsCommands::Tree => {
            println!("🌳 TAG TREE");
            println!("{}", "=".repeat(50));
            println!("{}", render_tree(resources).trim_end());
        }

        TagsCommands::Validate => {
            let issues = validate(resources);
            if issues.is_empty() {
                println!("✅ All tags are valid");
            } else {
                println!("❌ Found {} tag issues:", issues.len());
                for issue in &issues {
                    println!("   {}", issue);
                }
                std::process::exit(1);
            }
        }

        TagsCommands::Export { format, output } => {
            let content = export(&analyze(resources), format.into())?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &content)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    eprintln!("✅ Exported tag data to {}", path.display());
                }
                None => println!("{}", content.trim_end()),
            }
        }
    }

    Ok(())
}
