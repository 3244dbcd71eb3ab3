//! curator - catalog manager for curated resource lists
//!
//! Keeps a single YAML catalog of links (tools, papers, datasets,
//! tutorials) and turns it into a README section, a searchable static page
//! and a JSON dump, with maintenance tooling around it.
//!
//! # Modules
//!
//! - `catalog`: The resource file, locked atomic writes, the tag tree
//! - `index`: URL normalization and the persisted duplicate index
//! - `tags`: Tag analysis, hierarchy views and format validation
//! - `render`: README / HTML / JSON generation
//! - `importer`: Interactive add and batch import
//! - `links`: Concurrent dead-link scanning
//! - `watch`: Regenerate on catalog changes
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Regenerate README, docs/index.html and docs/resources.json
//! curator generate
//!
//! # Add a resource interactively
//! curator add --url https://github.com/pytorch/pytorch
//!
//! # Import a batch file, skipping duplicates
//! curator import new-resources.yml
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod importer;
pub mod index;
pub mod links;
pub mod render;
pub mod tags;
pub mod watch;

// Re-export main types at crate root for convenience
pub use catalog::{Resource, ResourceFile, TagTree};
pub use config::ResolvedConfig;
pub use importer::{BatchImporter, ImportReport, ResourceAdder};
pub use index::{normalize_url, UrlIndex};
pub use links::{DeadLink, HttpProbe, LinkProbe};
pub use render::{GenerateOptions, GenerateReport, Generator};
pub use watch::CatalogWatcher;
