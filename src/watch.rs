//! Catalog file watcher.
//!
//! Watches the directory holding the catalog and regenerates all outputs
//! when the catalog's contents change.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebounceEventResult};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::catalog::file_digest;
use crate::render::{GenerateOptions, GenerateReport, Generator};

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Catalog file does not exist: {0}")]
    CatalogNotFound(PathBuf),

    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
}

/// Emitted after each regeneration attempt
#[derive(Debug, Clone)]
pub struct RegenerateEvent {
    pub digest: String,
    pub at: DateTime<Utc>,
    pub outcome: Result<GenerateReport, String>,
}

/// Remembers the last seen catalog digest
#[derive(Debug, Clone)]
pub struct ChangeTracker {
    path: PathBuf,
    last_digest: Option<String>,
}

impl ChangeTracker {
    /// Start from the file's current contents
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let last_digest = file_digest(&path).ok();
        Self { path, last_digest }
    }

    /// New digest if the contents differ from the last call.
    /// A missing or unreadable file counts as unchanged.
    pub fn changed(&mut self) -> Option<String> {
        let digest = file_digest(&self.path).ok()?;
        if self.last_digest.as_deref() == Some(digest.as_str()) {
            return None;
        }
        self.last_digest = Some(digest.clone());
        Some(digest)
    }

    /// Whether a watcher event path refers to the tracked file
    pub fn is_tracked(&self, event_path: &Path) -> bool {
        event_path.file_name().is_some() && event_path.file_name() == self.path.file_name()
    }
}

pub struct CatalogWatcher {
    options: GenerateOptions,
    debounce: Duration,
}

impl CatalogWatcher {
    pub fn new(options: GenerateOptions) -> Self {
        Self {
            options,
            debounce: Duration::from_secs(1),
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Start watching; events arrive on the returned channel until stopped.
    ///
    /// The directory watch is registered before this returns, so any later
    /// write to the catalog is seen.
    pub async fn watch(&self) -> Result<(mpsc::Receiver<RegenerateEvent>, WatchHandle)> {
        if !self.options.resources.exists() {
            return Err(WatchError::CatalogNotFound(self.options.resources.clone()).into());
        }

        let tracker = ChangeTracker::new(&self.options.resources);
        let watch_dir = match self.options.resources.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (tx, rx) = std::sync::mpsc::channel();
        let mut debouncer = new_debouncer(self.debounce, tx).map_err(WatchError::from)?;
        debouncer
            .watcher()
            .watch(&watch_dir, RecursiveMode::NonRecursive)
            .map_err(WatchError::from)?;

        tracing::info!("Watching {} for changes", self.options.resources.display());

        let (event_tx, event_rx) = mpsc::channel::<RegenerateEvent>(16);
        let (stop_tx, mut stop_rx) = mpsc::channel::<()>(1);
        let options = self.options.clone();

        let handle = tokio::spawn(async move {
            // Dropping the debouncer ends the watch
            let _debouncer = debouncer;
            run_watcher(options, tracker, rx, event_tx, &mut stop_rx).await;
        });

        Ok((
            event_rx,
            WatchHandle {
                stop_tx,
                task: handle,
            },
        ))
    }
}

/// Handle to control the watcher
pub struct WatchHandle {
    stop_tx: mpsc::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl WatchHandle {
    /// Stop the watcher
    pub async fn stop(self) -> Result<()> {
        let _ = self.stop_tx.send(()).await;
        self.task.await?;
        Ok(())
    }
}

async fn run_watcher(
    options: GenerateOptions,
    mut tracker: ChangeTracker,
    rx: std::sync::mpsc::Receiver<DebounceEventResult>,
    event_tx: mpsc::Sender<RegenerateEvent>,
    stop_rx: &mut mpsc::Receiver<()>,
) {
    loop {
        if stop_rx.try_recv().is_ok() {
            tracing::info!("Watcher stopping...");
            break;
        }

        match rx.recv_timeout(Duration::from_millis(500)) {
            Ok(Ok(events)) => {
                if !events.iter().any(|event| tracker.is_tracked(&event.path)) {
                    continue;
                }

                let Some(digest) = tracker.changed() else {
                    tracing::debug!("Catalog touched but contents unchanged");
                    continue;
                };

                tracing::info!("Catalog changed, regenerating");
                let outcome = Generator::new(options.clone())
                    .run()
                    .map_err(|e| format!("{:#}", e));
                if let Err(e) = &outcome {
                    tracing::warn!("Regeneration failed: {}", e);
                }

                let event = RegenerateEvent {
                    digest,
                    at: Utc::now(),
                    outcome,
                };
                if event_tx.send(event).await.is_err() {
                    tracing::debug!("Event receiver dropped");
                }
            }
            Ok(Err(e)) => {
                tracing::warn!("Watcher error: {:?}", e);
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {}
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => {
                tracing::error!("Watcher channel disconnected");
                break;
            }
        }

        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}
