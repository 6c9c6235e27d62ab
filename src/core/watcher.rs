//! External change watcher for resource files.
//!
//! Wraps a debounced `notify` watcher over individual files. Debounced
//! change notifications are forwarded as plain paths on a channel; the
//! registry drains that channel on its own thread and decides what each
//! path means.
//!
//! Suspend/resume brackets the registry's own bulk writes (a full save)
//! so they are not mistaken for edits made by another program.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, Debouncer};
use parking_lot::Mutex;

#[derive(Debug, Default)]
struct WatchState {
    /// Paths currently attached to the backend
    watched: BTreeSet<PathBuf>,

    /// Paths detached by `suspend`, in the order they were watched
    suspended: Vec<PathBuf>,
}

/// File-level watch set with suspend/resume.
pub struct ResourceWatcher {
    // Lock order: `state` before `debouncer`.
    state: Mutex<WatchState>,
    debouncer: Mutex<Debouncer<RecommendedWatcher>>,
}

impl ResourceWatcher {
    /// Start a watcher. Changed paths arrive on the returned receiver,
    /// which disconnects once the watcher is dropped.
    pub fn new(debounce: Duration) -> notify::Result<(Self, Receiver<PathBuf>)> {
        let (tx, rx) = unbounded::<PathBuf>();

        let debouncer = new_debouncer(debounce, move |result: DebounceEventResult| {
            match result {
                Ok(events) => {
                    for event in events {
                        if tx.send(event.path).is_err() {
                            return;
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("Watcher error: {:?}", e);
                }
            }
        })?;

        Ok((
            Self {
                state: Mutex::new(WatchState::default()),
                debouncer: Mutex::new(debouncer),
            },
            rx,
        ))
    }

    /// Start watching `path`. Already-watched paths are left alone.
    pub fn add_path(&self, path: &Path) -> notify::Result<()> {
        let mut state = self.state.lock();
        if state.watched.contains(path) {
            return Ok(());
        }
        self.attach(path)?;
        state.watched.insert(path.to_path_buf());
        tracing::debug!("Watching {}", path.display());
        Ok(())
    }

    /// Re-attach `path` after a change event.
    ///
    /// Editors that save through a temporary file and an atomic rename
    /// leave the backend watching a dead inode, so the watch is always
    /// re-issued. Paths held by an active suspension are not touched.
    pub fn ensure_watched(&self, path: &Path) -> notify::Result<()> {
        let mut state = self.state.lock();
        if state.suspended.iter().any(|p| p == path) {
            return Ok(());
        }
        self.attach(path)?;
        if state.watched.insert(path.to_path_buf()) {
            tracing::debug!("Re-attached watch: {}", path.display());
        }
        Ok(())
    }

    /// Stop watching `path`, including any pending resume.
    /// Returns whether the path was actively watched.
    pub fn remove_path(&self, path: &Path) -> bool {
        let mut state = self.state.lock();
        state.suspended.retain(|p| p != path);
        let was_watched = state.watched.remove(path);
        if was_watched {
            self.detach(path);
        }
        was_watched
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.state.lock().watched.contains(path)
    }

    /// Currently watched paths
    pub fn files(&self) -> Vec<PathBuf> {
        self.state.lock().watched.iter().cloned().collect()
    }

    /// Paths waiting for `resume`
    pub fn suspended(&self) -> Vec<PathBuf> {
        self.state.lock().suspended.clone()
    }

    pub fn is_suspended(&self) -> bool {
        !self.state.lock().suspended.is_empty()
    }

    /// Detach every watched path and remember it for `resume`.
    ///
    /// Does nothing while an earlier suspension is still pending.
    pub fn suspend(&self) {
        let mut state = self.state.lock();
        if !state.suspended.is_empty() || state.watched.is_empty() {
            return;
        }

        let paths: Vec<PathBuf> = std::mem::take(&mut state.watched).into_iter().collect();
        for path in &paths {
            self.detach(path);
        }
        tracing::debug!("Suspended watching {} files", paths.len());
        state.suspended = paths;
    }

    /// Re-attach every suspended path that still exists.
    pub fn resume(&self) {
        let mut state = self.state.lock();
        if state.suspended.is_empty() {
            return;
        }

        let paths = std::mem::take(&mut state.suspended);
        let mut resumed = 0;
        for path in paths {
            if !path.exists() {
                continue;
            }
            match self.attach(&path) {
                Ok(()) => {
                    state.watched.insert(path);
                    resumed += 1;
                }
                Err(e) => tracing::warn!("Failed to resume watch on {}: {}", path.display(), e),
            }
        }
        tracing::debug!("Resumed watching {} files", resumed);
    }

    fn attach(&self, path: &Path) -> notify::Result<()> {
        self.debouncer
            .lock()
            .watcher()
            .watch(path, RecursiveMode::NonRecursive)
    }

    fn detach(&self, path: &Path) {
        // The backend may already have dropped a watch on a deleted file.
        if let Err(e) = self.debouncer.lock().watcher().unwatch(path) {
            tracing::debug!("Unwatch {}: {}", path.display(), e);
        }
    }
}

impl std::fmt::Debug for ResourceWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ResourceWatcher")
            .field("watched", &state.watched)
            .field("suspended", &state.suspended)
            .finish()
    }
}
