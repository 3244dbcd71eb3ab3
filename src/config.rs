//! Configuration for curator.
//!
//! Configuration sources (highest priority first):
//! 1. Command-line flags (applied by the CLI on top of the resolved config)
//! 2. Environment variables (CURATOR_RESOURCES, CURATOR_INDEX, CURATOR_DOCS)
//! 3. Project config file (.curator/config.yaml)
//! 4. User config file (<config dir>/curator/config.yaml)
//! 5. Defaults (paths relative to the current directory)
//!
//! Config file discovery:
//! - Searches the current directory and parents for .curator/config.yaml
//! - Paths in a project config file are relative to the project root
//!   (the directory containing .curator/)

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

pub const CONFIG_DIR: &str = ".curator";
pub const CONFIG_FILE: &str = "config.yaml";

/// Invalid configuration values
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("similarity_threshold must be between 0 and 1, got {0}")]
    InvalidThreshold(f64),

    #[error("links.concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("generate.description_limit must be at least 4, got {0}")]
    DescriptionLimitTooSmall(usize),

    #[error("Unknown readme style: {0}")]
    UnknownReadmeStyle(String),
}

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub site: Option<SiteConfig>,
    #[serde(default)]
    pub generate: Option<GenerateConfig>,
    #[serde(default)]
    pub links: Option<LinksConfig>,
    #[serde(default)]
    pub index: Option<IndexConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Catalog file (relative to project root)
    pub resources: Option<String>,
    /// README with AUTO markers
    pub readme: Option<String>,
    /// Output directory for the static site
    pub docs: Option<String>,
    /// URL index JSON file
    pub index: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteConfig {
    pub title: Option<String>,
    pub pages_url: Option<String>,
    pub repo_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateConfig {
    pub readme_style: Option<String>,
    pub max_depth: Option<usize>,
    pub description_limit: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinksConfig {
    pub timeout_seconds: Option<u64>,
    pub concurrency: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexConfig {
    pub similarity_threshold: Option<f64>,
}

/// What the generator writes between the README markers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadmeStyle {
    /// Counts plus a link to the published site
    Summary,
    /// The complete categorized markdown listing
    Full,
}

impl FromStr for ReadmeStyle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "summary" => Ok(ReadmeStyle::Summary),
            "full" => Ok(ReadmeStyle::Full),
            _ => Err(ConfigError::UnknownReadmeStyle(s.to_string())),
        }
    }
}

impl std::fmt::Display for ReadmeStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadmeStyle::Summary => write!(f, "summary"),
            ReadmeStyle::Full => write!(f, "full"),
        }
    }
}

/// Site metadata used in generated pages
#[derive(Debug, Clone, PartialEq)]
pub struct SiteSettings {
    pub title: String,
    pub pages_url: Option<String>,
    pub repo_url: Option<String>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            title: "AI Resources".to_string(),
            pages_url: None,
            repo_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateSettings {
    pub readme_style: ReadmeStyle,
    pub max_depth: usize,
    pub description_limit: usize,
}

impl Default for GenerateSettings {
    fn default() -> Self {
        Self {
            readme_style: ReadmeStyle::Summary,
            max_depth: 3,
            description_limit: 150,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkSettings {
    pub timeout_seconds: u64,
    pub concurrency: usize,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: 5,
            concurrency: 8,
        }
    }
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Directory relative paths were resolved against
    pub root: PathBuf,
    pub resources: PathBuf,
    pub readme: PathBuf,
    pub docs: PathBuf,
    pub index: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    pub site: SiteSettings,
    pub generate: GenerateSettings,
    pub links: LinkSettings,
    pub similarity_threshold: f64,
}

impl ResolvedConfig {
    /// Built-in defaults rooted at `root`
    pub fn defaults_at(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            resources: root.join("resources.yml"),
            readme: root.join("README.md"),
            docs: root.join("docs"),
            index: root.join(CONFIG_DIR).join("url_index.json"),
            config_file: None,
            site: SiteSettings::default(),
            generate: GenerateSettings::default(),
            links: LinkSettings::default(),
            similarity_threshold: 0.8,
        }
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(ConfigError::InvalidThreshold(self.similarity_threshold));
        }
        if self.links.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.generate.description_limit < 4 {
            return Err(ConfigError::DescriptionLimitTooSmall(
                self.generate.description_limit,
            ));
        }
        Ok(())
    }
}

/// Find config file by searching `start` and its parents
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_DIR).join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// User-level config file, if present
fn user_config_file() -> Option<PathBuf> {
    let path = dirs::config_dir()?.join("curator").join(CONFIG_FILE);
    path.exists().then_some(path)
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to `base`
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

/// Merge a parsed config file over the defaults
fn apply_file(config: &mut ResolvedConfig, file: ConfigFile, base: &Path) -> Result<()> {
    if let Some(p) = file.paths.resources {
        config.resources = resolve_path(base, &p);
    }
    if let Some(p) = file.paths.readme {
        config.readme = resolve_path(base, &p);
    }
    if let Some(p) = file.paths.docs {
        config.docs = resolve_path(base, &p);
    }
    if let Some(p) = file.paths.index {
        config.index = resolve_path(base, &p);
    }

    if let Some(site) = file.site {
        if let Some(title) = site.title {
            config.site.title = title;
        }
        config.site.pages_url = site.pages_url.or(config.site.pages_url.take());
        config.site.repo_url = site.repo_url.or(config.site.repo_url.take());
    }

    if let Some(generate) = file.generate {
        if let Some(style) = generate.readme_style {
            config.generate.readme_style = style.parse()?;
        }
        if let Some(depth) = generate.max_depth {
            config.generate.max_depth = depth;
        }
        if let Some(limit) = generate.description_limit {
            config.generate.description_limit = limit;
        }
    }

    if let Some(links) = file.links {
        if let Some(timeout) = links.timeout_seconds {
            config.links.timeout_seconds = timeout;
        }
        if let Some(concurrency) = links.concurrency {
            config.links.concurrency = concurrency;
        }
    }

    if let Some(threshold) = file.index.and_then(|i| i.similarity_threshold) {
        config.similarity_threshold = threshold;
    }

    Ok(())
}

/// Resolve configuration starting the config search at `start`.
/// `user_file` is applied before the project file; `env` looks up
/// environment variables.
fn resolve_config(
    start: &Path,
    user_file: Option<PathBuf>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ResolvedConfig> {
    let project_file = find_config_file(start);

    // Project root is the parent of .curator/
    let root = project_file
        .as_deref()
        .and_then(|p| p.parent())
        .and_then(|p| p.parent())
        .unwrap_or(start)
        .to_path_buf();

    let mut config = ResolvedConfig::defaults_at(&root);

    if let Some(user_path) = user_file {
        apply_file(&mut config, load_config_file(&user_path)?, &root)?;
        config.config_file = Some(user_path);
    }
    if let Some(config_path) = project_file {
        apply_file(&mut config, load_config_file(&config_path)?, &root)?;
        config.config_file = Some(config_path);
    }

    if let Some(p) = env("CURATOR_RESOURCES") {
        config.resources = PathBuf::from(p);
    }
    if let Some(p) = env("CURATOR_INDEX") {
        config.index = PathBuf::from(p);
    }
    if let Some(p) = env("CURATOR_DOCS") {
        config.docs = PathBuf::from(p);
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration for a given working directory
pub fn load_config_from(start: &Path) -> Result<ResolvedConfig> {
    resolve_config(start, user_config_file(), |key| std::env::var(key).ok())
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    load_config_from(&cwd)
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn write_config(root: &Path, body: &str) -> PathBuf {
        let dir = root.join(CONFIG_DIR);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE);
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{}", body).unwrap();
        path
    }

    #[test]
    fn test_defaults_at_root() {
        let config = ResolvedConfig::defaults_at(Path::new("/project"));

        assert_eq!(config.resources, PathBuf::from("/project/resources.yml"));
        assert_eq!(config.readme, PathBuf::from("/project/README.md"));
        assert_eq!(config.docs, PathBuf::from("/project/docs"));
        assert_eq!(
            config.index,
            PathBuf::from("/project/.curator/url_index.json")
        );
        assert_eq!(config.generate.max_depth, 3);
        assert_eq!(config.links.concurrency, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let path = write_config(
            temp.path(),
            r#"
version: "1.0"
paths:
  resources: data/resources.yml
  docs: site
site:
  title: My Hub
  pages_url: https://example.github.io/hub/
generate:
  readme_style: full
  description_limit: 80
links:
  concurrency: 2
index:
  similarity_threshold: 0.9
"#,
        );

        let file = load_config_file(&path).unwrap();
        assert_eq!(file.version.as_deref(), Some("1.0"));
        assert_eq!(file.paths.resources.as_deref(), Some("data/resources.yml"));
        assert_eq!(file.links.unwrap().concurrency, Some(2));
    }

    #[test]
    fn test_discovery_from_subdirectory() {
        let temp = TempDir::new().unwrap();
        write_config(
            temp.path(),
            "paths:\n  resources: data/resources.yml\ngenerate:\n  readme_style: full\n",
        );
        let nested = temp.path().join("scripts").join("deep");
        std::fs::create_dir_all(&nested).unwrap();

        let config = resolve_config(&nested, None, no_env).unwrap();

        assert_eq!(config.root, temp.path());
        assert_eq!(config.resources, temp.path().join("data/resources.yml"));
        assert_eq!(config.readme, temp.path().join("README.md"));
        assert_eq!(config.generate.readme_style, ReadmeStyle::Full);
        assert!(config.config_file.is_some());
    }

    #[test]
    fn test_env_overrides_file() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), "paths:\n  index: idx.json\n");

        let config = resolve_config(temp.path(), None, |key| {
            (key == "CURATOR_INDEX").then(|| "/tmp/other.json".to_string())
        })
        .unwrap();

        assert_eq!(config.index, PathBuf::from("/tmp/other.json"));
    }

    #[test]
    fn test_user_file_under_project_file() {
        let user_dir = TempDir::new().unwrap();
        let user_file = user_dir.path().join(CONFIG_FILE);
        std::fs::write(
            &user_file,
            "site:\n  title: From User\n  repo_url: https://github.com/me/list\nlinks:\n  concurrency: 3\n",
        )
        .unwrap();

        // User settings alone
        let bare = TempDir::new().unwrap();
        let config = resolve_config(bare.path(), Some(user_file.clone()), no_env).unwrap();
        assert_eq!(config.site.title, "From User");
        assert_eq!(config.links.concurrency, 3);
        assert_eq!(config.config_file.as_deref(), Some(user_file.as_path()));

        // Project values win, unset ones fall through to the user file
        let project = TempDir::new().unwrap();
        let project_file = write_config(project.path(), "site:\n  title: Project Hub\n");
        let config = resolve_config(project.path(), Some(user_file), no_env).unwrap();
        assert_eq!(config.site.title, "Project Hub");
        assert_eq!(config.site.repo_url.as_deref(), Some("https://github.com/me/list"));
        assert_eq!(config.links.concurrency, 3);
        assert_eq!(config.config_file, Some(project_file));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), "index:\n  similarity_threshold: 1.5\n");
        assert!(resolve_config(temp.path(), None, no_env).is_err());

        let temp = TempDir::new().unwrap();
        write_config(temp.path(), "generate:\n  readme_style: fancy\n");
        assert!(resolve_config(temp.path(), None, no_env).is_err());
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/project");

        assert_eq!(
            resolve_path(&base, "./subdir"),
            PathBuf::from("/home/user/project/./subdir")
        );
        assert_eq!(
            resolve_path(&base, "/absolute/path"),
            PathBuf::from("/absolute/path")
        );
    }

    #[test]
    fn test_readme_style_parse() {
        assert_eq!("Summary".parse::<ReadmeStyle>().unwrap(), ReadmeStyle::Summary);
        assert_eq!("full".parse::<ReadmeStyle>().unwrap(), ReadmeStyle::Full);
        assert!("other".parse::<ReadmeStyle>().is_err());
    }
}
