//! File-system watching for hosts without an editor to report changes.

use crate::error::{CddaError, Result};
use crate::host::ExcludeFilter;
use crate::model::{ChangeKind, DocumentId, FileChange};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const DEBOUNCE_INTERVAL: Duration = Duration::from_millis(500);

struct FsWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::UnboundedReceiver<notify::Result<Event>>,
}

impl FsWatcher {
    fn new(root: &Path) -> notify::Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default(),
        )?;
        watcher.watch(root, RecursiveMode::Recursive)?;
        Ok(Self {
            _watcher: watcher,
            rx,
        })
    }

    async fn next_event_async(&mut self) -> Option<Event> {
        loop {
            match self.rx.recv().await? {
                Ok(event) => return Some(event),
                Err(e) => tracing::warn!("File watcher error: {}", e),
            }
        }
    }
}

fn is_relevant_path(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

fn accepts(filter: &ExcludeFilter, path: &Path) -> bool {
    is_relevant_path(path) && !filter.is_excluded(path)
}

/// Fold a burst of raw events into one change per path.
fn settle(pending: &HashMap<PathBuf, ChangeKind>) -> Vec<FileChange> {
    pending
        .iter()
        .filter_map(|(path, kind)| {
            let kind = if !path.exists() {
                ChangeKind::Deleted
            } else if *kind == ChangeKind::Created {
                ChangeKind::Created
            } else {
                ChangeKind::Modified
            };
            DocumentId::from_file_path(path)
                .ok()
                .map(|id| FileChange::new(id, kind))
        })
        .collect()
}

/// Watch `root` recursively and forward debounced `.json` changes outside
/// the `exclude` patterns.
///
/// The watcher task ends when `cancel` fires or the receiver is dropped.
pub fn spawn_fs_watcher(
    root: PathBuf,
    exclude: &[String],
    changes: mpsc::UnboundedSender<FileChange>,
    cancel: CancellationToken,
) -> Result<()> {
    let filter = ExcludeFilter::new(&root, exclude)?;
    let mut watcher = FsWatcher::new(&root).map_err(|e| CddaError::Internal(e.to_string()))?;

    tokio::spawn(async move {
        tracing::info!("Started watching {}", root.display());
        let mut pending: HashMap<PathBuf, ChangeKind> = HashMap::new();

        'watch: loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                event = watcher.next_event_async() => {
                    let Some(event) = event else { break };
                    let kind = match event.kind {
                        EventKind::Create(_) => ChangeKind::Created,
                        EventKind::Remove(_) => ChangeKind::Deleted,
                        EventKind::Access(_) => continue,
                        _ => ChangeKind::Modified,
                    };
                    for path in event.paths {
                        if accepts(&filter, &path) {
                            let entry = pending.entry(path).or_insert(kind);
                            // A create followed by writes is still a create.
                            if *entry != ChangeKind::Created {
                                *entry = kind;
                            }
                        }
                    }
                }
                _ = tokio::time::sleep(DEBOUNCE_INTERVAL), if !pending.is_empty() => {
                    let settled = settle(&pending);
                    pending.clear();
                    tracing::info!("Detected changes in {} files", settled.len());
                    for change in settled {
                        if changes.send(change).is_err() {
                            break 'watch;
                        }
                    }
                }
            }
        }
        tracing::info!("File watcher task ended for {}", root.display());
    });

    Ok(())
}
