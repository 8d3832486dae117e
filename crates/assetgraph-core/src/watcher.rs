//! # Change Watcher
//!
//! Background filesystem observers, one per tracked root directory. Watcher
//! threads never touch the graph: they only translate raw notify events and
//! append them to a bounded queue, which the manager drains on demand in
//! `find_asset_file_changed_events`. When the queue is full, events are
//! dropped rather than blocking the watcher thread.

use crate::limits::EVENT_QUEUE_CAPACITY;
use crate::types::{AssetGraphError, FileChangeKind};
use crossbeam_channel::{Receiver, Sender, bounded};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// A raw filesystem event queued by a watcher thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FileEvent {
    pub(crate) path: PathBuf,
    pub(crate) change: FileChangeKind,
}

/// Owns the notify watchers and the bounded event queue.
pub(crate) struct ChangeWatcher {
    tx: Sender<FileEvent>,
    rx: Receiver<FileEvent>,
    watchers: BTreeMap<PathBuf, RecommendedWatcher>,
}

impl ChangeWatcher {
    pub(crate) fn new() -> Self {
        Self::with_capacity(EVENT_QUEUE_CAPACITY)
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity);
        Self {
            tx,
            rx,
            watchers: BTreeMap::new(),
        }
    }

    /// Start observing a root directory recursively. Watching an already
    /// observed root is a no-op.
    pub(crate) fn watch(&mut self, root: &Path) -> Result<(), AssetGraphError> {
        if self.watchers.contains_key(root) {
            return Ok(());
        }

        let tx = self.tx.clone();
        let mut watcher =
            notify::recommended_watcher(move |result: Result<Event, notify::Error>| {
                match result {
                    Ok(event) => enqueue(&tx, event),
                    Err(error) => warn!(%error, "filesystem watcher error"),
                }
            })
            .map_err(|e| AssetGraphError::Watch(e.to_string()))?;

        watcher
            .watch(root, RecursiveMode::Recursive)
            .map_err(|e| AssetGraphError::Watch(e.to_string()))?;

        self.watchers.insert(root.to_path_buf(), watcher);
        Ok(())
    }

    /// Stop observing a root directory. Unknown roots are ignored.
    pub(crate) fn unwatch(&mut self, root: &Path) {
        if let Some(mut watcher) = self.watchers.remove(root) {
            if let Err(error) = watcher.unwatch(root) {
                warn!(%error, root = %root.display(), "failed to unwatch root");
            }
        }
    }

    /// Drain every queued event without blocking.
    pub(crate) fn drain(&self) -> Vec<FileEvent> {
        self.rx.try_iter().collect()
    }
}

/// Translate a notify event and push it onto the bounded queue.
fn enqueue(tx: &Sender<FileEvent>, event: Event) {
    let change = match event.kind {
        EventKind::Create(_) => Some(FileChangeKind::Added),
        EventKind::Modify(_) => Some(FileChangeKind::Updated),
        EventKind::Remove(_) => Some(FileChangeKind::Deleted),
        _ => None,
    };

    let Some(change) = change else {
        return;
    };

    for path in event.paths {
        if tx.try_send(FileEvent { path, change }).is_err() {
            warn!("file event queue full, dropping event");
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
