//! Dead-link scanning.
//!
//! Probing goes through [`LinkProbe`] so scans can run against an
//! in-memory probe in tests; [`HttpProbe`] is the real HEAD-request client.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::ser::Serializer;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::catalog::Resource;

/// Reports the HTTP status of a URL
#[async_trait]
pub trait LinkProbe: Send + Sync {
    /// Status code, or `None` when the URL could not be reached
    async fn probe(&self, url: &str) -> Option<u16>;
}

/// HEAD requests over reqwest
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    /// Probe that follows redirects and reports the final status
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::build(timeout, reqwest::redirect::Policy::default())
    }

    /// Probe that reports 3xx responses as-is
    pub fn without_redirects(timeout: Duration) -> Result<Self> {
        Self::build(timeout, reqwest::redirect::Policy::none())
    }

    fn build(timeout: Duration, policy: reqwest::redirect::Policy) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(policy)
            .user_agent(concat!("curator/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl LinkProbe for HttpProbe {
    async fn probe(&self, url: &str) -> Option<u16> {
        match self.client.head(url).send().await {
            Ok(response) => Some(response.status().as_u16()),
            Err(e) => {
                tracing::debug!("HEAD {} failed: {}", url, e);
                None
            }
        }
    }
}

/// Outcome recorded for a dead link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    Code(u16),
    /// Unreachable, or no URL to probe
    Error,
}

impl Serialize for LinkStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LinkStatus::Code(code) => serializer.serialize_u16(*code),
            LinkStatus::Error => serializer.serialize_str("error"),
        }
    }
}

impl std::fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkStatus::Code(code) => write!(f, "{}", code),
            LinkStatus::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeadLink {
    pub name: String,
    pub url: String,
    pub status: LinkStatus,
}

/// Dead when unreachable or answered with 4xx/5xx
pub fn is_dead(status: Option<u16>) -> bool {
    match status {
        None => true,
        Some(code) => (400..600).contains(&code),
    }
}

/// Probe every resource URL, at most `concurrency` at a time.
/// Results keep catalog order.
pub async fn scan(
    resources: &[Resource],
    probe: Arc<dyn LinkProbe>,
    concurrency: usize,
) -> Vec<DeadLink> {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut slots: Vec<Option<DeadLink>> = vec![None; resources.len()];
    let mut join_set = JoinSet::new();

    for (i, resource) in resources.iter().enumerate() {
        let name = resource.label().to_string();
        let url = resource.url_str().trim().to_string();

        if url.is_empty() {
            tracing::warn!("Resource '{}' has no URL", name);
            slots[i] = Some(DeadLink {
                name,
                url,
                status: LinkStatus::Error,
            });
            continue;
        }

        let probe = Arc::clone(&probe);
        let semaphore = Arc::clone(&semaphore);
        join_set.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            let status = probe.probe(&url).await;
            (i, name, url, status)
        });
    }

    while let Some(joined) = join_set.join_next().await {
        let (i, name, url, status) = match joined {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Link probe task failed: {}", e);
                continue;
            }
        };

        if is_dead(status) {
            let status = status.map_or(LinkStatus::Error, LinkStatus::Code);
            tracing::warn!("Dead link: {} ({})", url, status);
            slots[i] = Some(DeadLink { name, url, status });
        }
    }

    slots.into_iter().flatten().collect()
}

#[derive(Serialize)]
struct DeadLinkReport<'a> {
    dead_links: &'a [DeadLink],
}

/// `dead_links:` YAML document
pub fn dead_links_yaml(dead: &[DeadLink]) -> Result<String> {
    serde_yaml::to_string(&DeadLinkReport { dead_links: dead })
        .context("Failed to serialize dead links")
}
