//! The filesystem watch bridge.
//!
//! Watcher callbacks do no index work themselves: they send events through
//! a crossbeam channel to a dedicated bridge thread, which translates
//! create/delete notifications under the notebook root into `add`/`remove`
//! calls on the shared collection. Errors raised by those calls are
//! terminal at this boundary — there is no synchronous caller to receive
//! them, so benign ones (duplicates, filtered-out files) are logged at
//! debug and everything else at warn.

use crate::error::{Result, VeloError};
use crate::notebook::NotebookState;
use crossbeam_channel::Sender;
use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{recommended_watcher, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// How long `stop` waits for the bridge thread before abandoning it.
const STOP_TIMEOUT: Duration = Duration::from_secs(5);

enum BridgeMessage {
    Fs(notify::Result<Event>),
    Shutdown,
}

/// A running recursive watcher plus the thread applying its events.
///
/// Stopped explicitly via [`WatchBridge::stop`] or implicitly on drop.
pub(crate) struct WatchBridge {
    watcher: Option<RecommendedWatcher>,
    thread: Option<JoinHandle<()>>,
    shutdown_tx: Sender<BridgeMessage>,
}

impl WatchBridge {
    /// Subscribe recursively under the notebook root and start the bridge
    /// thread. The root must already be scanned: events observed from here
    /// on are reconciled against the populated collection.
    pub(crate) fn start(state: Arc<NotebookState>) -> Result<WatchBridge> {
        let (tx, rx) = crossbeam_channel::unbounded();

        let event_tx = tx.clone();
        let mut watcher = recommended_watcher(move |result: notify::Result<Event>| {
            let _ = event_tx.send(BridgeMessage::Fs(result));
        })
        .map_err(|e| VeloError::watcher(format!("failed to create watcher: {e}")))?;

        watcher
            .watch(state.root(), RecursiveMode::Recursive)
            .map_err(|e| {
                VeloError::watcher(format!(
                    "failed to watch {}: {e}",
                    state.root().display()
                ))
            })?;

        let thread = thread::Builder::new()
            .name("velo-watcher".to_string())
            .spawn(move || bridge_loop(state, rx))?;

        Ok(WatchBridge {
            watcher: Some(watcher),
            thread: Some(thread),
            shutdown_tx: tx,
        })
    }

    /// Stop event delivery and wait (bounded) for the bridge thread.
    ///
    /// If the thread does not finish within [`STOP_TIMEOUT`] it is
    /// abandoned rather than blocking the caller indefinitely; it only
    /// holds an `Arc` of the notebook state, so nothing it touches can
    /// dangle.
    pub(crate) fn stop(&mut self) {
        // Dropping the watcher halts the native notification thread
        self.watcher.take();
        let _ = self.shutdown_tx.send(BridgeMessage::Shutdown);

        if let Some(handle) = self.thread.take() {
            let deadline = Instant::now() + STOP_TIMEOUT;
            while !handle.is_finished() && Instant::now() < deadline {
                thread::sleep(Duration::from_millis(10));
            }
            if handle.is_finished() {
                let _ = handle.join();
            } else {
                warn!("watch bridge thread did not stop in time, abandoning it");
            }
        }
    }
}

impl Drop for WatchBridge {
    fn drop(&mut self) {
        self.stop();
    }
}

fn bridge_loop(state: Arc<NotebookState>, rx: crossbeam_channel::Receiver<BridgeMessage>) {
    for message in rx {
        match message {
            BridgeMessage::Shutdown => break,
            BridgeMessage::Fs(Err(error)) => {
                warn!(%error, "filesystem watcher reported an error");
            }
            BridgeMessage::Fs(Ok(event)) => apply_event(&state, event),
        }
    }
    debug!("watch bridge thread exiting");
}

/// Translate one notification into index mutations.
///
/// Only leaf file changes affect note identity, so directory-level events
/// are dropped here. Platform rename notifications are expressed in the
/// index contract's terms: the old path is a deletion, the new one a
/// creation.
fn apply_event(state: &Arc<NotebookState>, event: Event) {
    match event.kind {
        EventKind::Create(CreateKind::Folder) | EventKind::Remove(RemoveKind::Folder) => {}
        EventKind::Create(_) => {
            for path in &event.paths {
                handle_created(state, path);
            }
        }
        EventKind::Remove(_) => {
            for path in &event.paths {
                handle_removed(state, path);
            }
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            for path in &event.paths {
                handle_removed(state, path);
            }
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            for path in &event.paths {
                handle_created(state, path);
            }
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if event.paths.len() == 2 => {
            handle_removed(state, &event.paths[0]);
            handle_created(state, &event.paths[1]);
        }
        _ => {}
    }
}

fn handle_created(state: &Arc<NotebookState>, path: &Path) {
    if path.is_dir() {
        return;
    }
    let Some((directory, name)) = split_leaf(path) else {
        return;
    };
    debug!(path = %path.display(), "detected new file");
    match state.add_in(&name, Some(directory)) {
        Ok(_) => {}
        Err(error) if error.is_benign() => {
            debug!(path = %path.display(), %error, "skipping created file");
        }
        Err(error) => {
            warn!(path = %path.display(), %error, "failed to index created file");
        }
    }
}

fn handle_removed(state: &Arc<NotebookState>, path: &Path) {
    let Some((directory, name)) = split_leaf(path) else {
        return;
    };
    debug!(path = %path.display(), "detected deleted file");
    state.remove_in(&name, Some(directory));
}

fn split_leaf(path: &Path) -> Option<(&Path, String)> {
    let directory = path.parent()?;
    let name = path.file_name()?.to_string_lossy().into_owned();
    Some((directory, name))
}
