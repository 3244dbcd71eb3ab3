//! URL index subcommands.

use anyhow::Result;
use clap::Subcommand;

use crate::catalog::ResourceFile;
use crate::config::ResolvedConfig;
use crate::index::{find_duplicates, normalize_url, UrlIndex};

#[derive(Subcommand, Debug)]
pub enum IndexCommands {
    /// Rebuild the index from the catalog
    Rebuild,

    /// Check whether a URL is already in the catalog
    Check {
        /// URL to look up
        url: String,
    },

    /// Show index statistics
    Stats,

    /// List indexed URLs similar to the given one
    Similar {
        /// URL to compare against
        url: String,

        /// Minimum similarity between 0 and 1 (defaults to config)
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// List catalog entries that share a URL
    Duplicates,
}

pub async fn execute(command: IndexCommands, cfg: &ResolvedConfig) -> Result<()> {
    match command {
        IndexCommands::Rebuild => rebuild(cfg),
        IndexCommands::Check { url } => check(cfg, &url),
        IndexCommands::Stats => stats(cfg),
        IndexCommands::Similar { url, threshold } => {
            similar(cfg, &url, threshold.unwrap_or(cfg.similarity_threshold))
        }
        IndexCommands::Duplicates => duplicates(cfg),
    }
}

/// Open the index, rebuilding it first if it no longer matches the catalog
fn open_index(cfg: &ResolvedConfig) -> Result<UrlIndex> {
    let mut index = UrlIndex::open(&cfg.index);
    if index.sync_with(&cfg.resources)? {
        tracing::warn!("URL index was out of date; rebuilt from {}", cfg.resources.display());
        index.save()?;
    }
    Ok(index)
}

fn rebuild(cfg: &ResolvedConfig) -> Result<()> {
    // Opened rather than created so known added dates survive
    let mut index = UrlIndex::open(&cfg.index);
    let count = index.rebuild_from_resources(&cfg.resources)?;
    eprintln!("✅ Rebuilt index with {} URLs", count);
    eprintln!("   Saved to {}", cfg.index.display());
    Ok(())
}

fn check(cfg: &ResolvedConfig, url: &str) -> Result<()> {
    let index = open_index(cfg)?;

    if let Some(entry) = index.check_duplicate(url) {
        println!("❌ Duplicate URL found:");
        println!("   Name: {}", entry.name);
        println!("   URL: {}", entry.original_url);
        println!("   Tags: {}", entry.tags.join(", "));
        std::process::exit(1);
    }

    println!("✅ URL is unique: {}", normalize_url(url));

    let similar = index.search_similar_urls(url, cfg.similarity_threshold);
    if !similar.is_empty() {
        println!();
        println!("🔍 Similar URLs:");
        for hit in similar.iter().take(5) {
            println!("   {:.2}  {} ({})", hit.similarity, hit.entry.original_url, hit.entry.name);
        }
    }

    Ok(())
}

fn stats(cfg: &ResolvedConfig) -> Result<()> {
    let index = open_index(cfg)?;
    let stats = index.stats();

    println!("📊 URL Index Statistics:");
    println!("   Total URLs: {}", stats.total_urls);
    println!("   Unique domains: {}", stats.total_domains);
    println!("   Unique tags: {}", stats.total_tags);

    if !stats.top_domains.is_empty() {
        println!();
        println!("🌐 Top domains:");
        for (domain, count) in &stats.top_domains {
            println!("   {:<40} {}", domain, count);
        }
    }

    Ok(())
}

fn similar(cfg: &ResolvedConfig, url: &str, threshold: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        anyhow::bail!("Threshold must be between 0 and 1, got {}", threshold);
    }

    let index = open_index(cfg)?;
    let hits = index.search_similar_urls(url, threshold);

    if hits.is_empty() {
        println!("No URLs with similarity ≥ {:.2}", threshold);
        return Ok(());
    }

    println!("🔍 {} similar URLs:", hits.len());
    for hit in &hits {
        println!("   {:.2}  {}", hit.similarity, hit.url);
        println!("         {} - {}", hit.entry.name, hit.entry.original_url);
    }

    Ok(())
}

fn duplicates(cfg: &ResolvedConfig) -> Result<()> {
    let catalog = ResourceFile::load(&cfg.resources)?;
    let groups = find_duplicates(&catalog.resources);

    if groups.is_empty() {
        println!("✅ No duplicate URLs in {}", cfg.resources.display());
        return Ok(());
    }

    println!("🔍 {} URLs appear more than once:", groups.len());
    for group in &groups {
        println!();
        println!("   {}", group.normalized);
        for &i in &group.members {
            let resource = &catalog.resources[i];
            println!("     #{:<4} {} ({})", i + 1, resource.label(), resource.url_str());
        }
    }

    Ok(())
}
