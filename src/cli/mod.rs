//! Command-line interface for curator.
//!
//! Provides commands for generating the README and static site, managing
//! the URL index and tag vocabulary, adding and importing resources, and
//! checking links.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::catalog::ResourceFile;
use crate::config::{self, ResolvedConfig};
use crate::importer::{
    expand_inputs, write_sample_batch, AddOutcome, BatchImporter, DuplicatePolicy,
    ImportOptions, ResourceAdder, ResourceDraft, TerminalPrompter,
};
use crate::index::UrlIndex;
use crate::links::{dead_links_yaml, scan, HttpProbe, LinkProbe};
use crate::render::{GenerateOptions, Generator};
use crate::watch::CatalogWatcher;

pub mod index;
pub mod tags;

/// curator - catalog manager for curated resource lists
#[derive(Parser, Debug)]
#[command(name = "curator")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Catalog file (overrides config and CURATOR_RESOURCES)
    #[arg(long, global = true)]
    pub resources_file: Option<PathBuf>,

    /// URL index file (overrides config and CURATOR_INDEX)
    #[arg(long, global = true)]
    pub index_file: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Regenerate README block, docs/index.html and docs/resources.json
    Generate {
        /// README with AUTO markers
        #[arg(long)]
        readme_file: Option<PathBuf>,

        /// Output directory for the site
        #[arg(long)]
        docs_dir: Option<PathBuf>,

        /// Scan for dead links after generating
        #[arg(long)]
        check_links: bool,
    },

    /// Regenerate whenever the catalog changes
    Watch {
        /// Debounce interval in milliseconds
        #[arg(long, default_value = "1000")]
        debounce_ms: u64,
    },

    /// Manage the URL index
    Index {
        #[command(subcommand)]
        command: index::IndexCommands,
    },

    /// Analyze and validate tags
    Tags {
        #[command(subcommand)]
        command: tags::TagsCommands,
    },

    /// Add one resource interactively
    Add {
        /// Resource URL
        #[arg(long)]
        url: Option<String>,

        /// Display name
        #[arg(long)]
        name: Option<String>,

        /// Short description
        #[arg(long)]
        description: Option<String>,

        /// Tag to apply (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Skip all prompts
        #[arg(short, long)]
        yes: bool,

        /// Don't check that the URL responds
        #[arg(long)]
        no_probe: bool,
    },

    /// Import resources from batch YAML files
    Import {
        /// Batch files or glob patterns
        #[arg(required = true)]
        files: Vec<String>,

        /// Ask before skipping each duplicate
        #[arg(short, long)]
        interactive: bool,

        /// Validate without changing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Write an example batch file
    Sample {
        /// Where to write it
        path: PathBuf,
    },

    /// Find dead links in the catalog
    Links {
        /// Concurrent requests
        #[arg(long)]
        concurrency: Option<usize>,

        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Show resolved configuration
    Config,
}

impl Cli {
    /// Global configuration with this invocation's flags applied
    pub fn resolve_config(&self) -> Result<ResolvedConfig> {
        let mut cfg = config::config()?.clone();
        if let Some(path) = &self.resources_file {
            cfg.resources = path.clone();
        }
        if let Some(path) = &self.index_file {
            cfg.index = path.clone();
        }
        Ok(cfg)
    }

    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let cfg = self.resolve_config()?;

        match self.command {
            Commands::Generate {
                readme_file,
                docs_dir,
                check_links,
            } => generate(&cfg, readme_file, docs_dir, check_links).await,
            Commands::Watch { debounce_ms } => watch(&cfg, debounce_ms).await,
            Commands::Index { command } => index::execute(command, &cfg).await,
            Commands::Tags { command } => tags::execute(command, &cfg).await,
            Commands::Add {
                url,
                name,
                description,
                tags,
                yes,
                no_probe,
            } => {
                let draft = ResourceDraft {
                    url,
                    name,
                    description,
                    tags,
                };
                add_resource(&cfg, draft, yes, no_probe).await
            }
            Commands::Import {
                files,
                interactive,
                dry_run,
            } => import_batch(&cfg, &files, interactive, dry_run).await,
            Commands::Sample { path } => create_sample(&path),
            Commands::Links {
                concurrency,
                timeout,
            } => check_links(&cfg, concurrency, timeout).await,
            Commands::Config => show_config(&cfg),
        }
    }
}

/// Regenerate all outputs
async fn generate(
    cfg: &ResolvedConfig,
    readme_file: Option<PathBuf>,
    docs_dir: Option<PathBuf>,
    with_links: bool,
) -> Result<()> {
    let mut options = GenerateOptions::from_config(cfg);
    if let Some(readme) = readme_file {
        options.readme = readme;
    }
    if let Some(docs) = docs_dir {
        options.docs = docs;
    }

    let readme = options.readme.clone();
    let report = Generator::new(options).run()?;
    if report.is_empty() {
        eprintln!("⚠️  No valid resources found, nothing written");
        return Ok(());
    }

    eprintln!("✅ README updated: {}", readme.display());
    for path in &report.written {
        eprintln!("   wrote {}", path.display());
    }
    eprintln!(
        "📊 Generated content for {} resources across {} categories",
        report.total_resources, report.categories
    );

    if with_links {
        check_links(cfg, None, None).await?;
    }

    Ok(())
}

/// Regenerate on every catalog change until Ctrl+C
async fn watch(cfg: &ResolvedConfig, debounce_ms: u64) -> Result<()> {
    let options = GenerateOptions::from_config(cfg);

    match Generator::new(options.clone()).run() {
        Ok(report) => eprintln!(
            "✅ Initial generation: {} resources across {} categories",
            report.total_resources, report.categories
        ),
        Err(e) => eprintln!("⚠️  Initial generation failed: {:#}", e),
    }

    let watcher = CatalogWatcher::new(options).with_debounce(Duration::from_millis(debounce_ms));
    let (mut events, handle) = watcher.watch().await?;

    eprintln!("👀 Watching {} (Ctrl+C to stop)", cfg.resources.display());

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                match event.outcome {
                    Ok(report) => eprintln!(
                        "🔄 [{}] Regenerated {} resources across {} categories",
                        event.at.format("%H:%M:%S"),
                        report.total_resources,
                        report.categories
                    ),
                    Err(e) => eprintln!("❌ [{}] Regeneration failed: {}", event.at.format("%H:%M:%S"), e),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                eprintln!("\nStopping watcher...");
                break;
            }
        }
    }

    handle.stop().await
}

/// Interactive add
async fn add_resource(cfg: &ResolvedConfig, draft: ResourceDraft, yes: bool, no_probe: bool) -> Result<()> {
    let index = UrlIndex::open(&cfg.index);
    let mut adder = ResourceAdder::new(&cfg.resources, index).assume_yes(yes);

    if !no_probe {
        let timeout = Duration::from_secs(cfg.links.timeout_seconds * 2);
        let probe: Arc<dyn LinkProbe> = Arc::new(HttpProbe::without_redirects(timeout)?);
        adder = adder.with_probe(probe);
    }

    let mut prompter = TerminalPrompter;
    match adder.run(draft, &mut prompter).await? {
        AddOutcome::Added { .. } => {
            eprintln!("\n💡 Don't forget to run: curator generate");
            Ok(())
        }
        AddOutcome::Cancelled(reason) => {
            eprintln!("❌ Cancelled: {}", reason);
            std::process::exit(1);
        }
    }
}

/// Batch import
async fn import_batch(cfg: &ResolvedConfig, inputs: &[String], interactive: bool, dry_run: bool) -> Result<()> {
    let files = expand_inputs(inputs)?;
    if files.is_empty() {
        anyhow::bail!("No batch files matched");
    }

    let index = UrlIndex::open(&cfg.index);
    let mut importer = BatchImporter::new(&cfg.resources, index);
    let options = ImportOptions {
        policy: if interactive {
            DuplicatePolicy::Ask
        } else {
            DuplicatePolicy::Skip
        },
        dry_run,
    };

    eprintln!("🚀 Starting batch import from {} file(s)", files.len());
    let mut prompter = TerminalPrompter;
    let report = importer.import_files(&files, options, &mut prompter)?;

    if report.added > 0 {
        eprintln!("\n💡 Don't forget to run: curator generate");
    }
    if !report.success() {
        std::process::exit(1);
    }

    Ok(())
}

fn create_sample(path: &Path) -> Result<()> {
    write_sample_batch(path)?;
    eprintln!("✅ Sample batch file created: {}", path.display());
    Ok(())
}

/// Probe every catalog URL and print dead links as YAML
async fn check_links(cfg: &ResolvedConfig, concurrency: Option<usize>, timeout: Option<u64>) -> Result<()> {
    let catalog = ResourceFile::load(&cfg.resources)?;
    let concurrency = concurrency.unwrap_or(cfg.links.concurrency);
    let timeout = Duration::from_secs(timeout.unwrap_or(cfg.links.timeout_seconds));

    eprintln!(
        "🔗 Checking {} links ({} at a time)...",
        catalog.len(),
        concurrency
    );

    let probe: Arc<dyn LinkProbe> = Arc::new(HttpProbe::new(timeout)?);
    let dead = scan(&catalog.resources, probe, concurrency).await;

    println!("{}", dead_links_yaml(&dead)?);

    if dead.is_empty() {
        eprintln!("✅ No dead links found");
        Ok(())
    } else {
        eprintln!("❌ {} dead links found", dead.len());
        std::process::exit(1);
    }
}

/// Show the resolved configuration (for debugging)
fn show_config(cfg: &ResolvedConfig) -> Result<()> {
    println!("Curator Configuration");
    println!("{}", "=".repeat(50));
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Paths:");
    println!("  Root:      {}", cfg.root.display());
    println!("  Resources: {}", cfg.resources.display());
    println!("  README:    {}", cfg.readme.display());
    println!("  Docs:      {}", cfg.docs.display());
    println!("  Index:     {}", cfg.index.display());
    println!();
    println!("Site:");
    println!("  Title:     {}", cfg.site.title);
    println!("  Pages URL: {}", cfg.site.pages_url.as_deref().unwrap_or("(not set)"));
    println!("  Repo URL:  {}", cfg.site.repo_url.as_deref().unwrap_or("(not set)"));
    println!();
    println!("Generate:");
    println!("  README style:      {}", cfg.generate.readme_style);
    println!("  Max depth:         {}", cfg.generate.max_depth);
    println!("  Description limit: {}", cfg.generate.description_limit);
    println!();
    println!("Links:");
    println!("  Timeout:     {}s", cfg.links.timeout_seconds);
    println!("  Concurrency: {}", cfg.links.concurrency);
    println!();
    println!("Index:");
    println!("  Similarity threshold: {}", cfg.similarity_threshold);

    Ok(())
}
