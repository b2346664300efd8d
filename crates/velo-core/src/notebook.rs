//! The in-memory, filesystem-synchronized note index.
//!
//! The [`Notebook`] owns the ordered collection of [`Note`]s, the
//! path-validation and title-derivation logic, the mutation API
//! (`add`/`remove`), and the lock protecting all of the above. It is
//! populated by an initial recursive scan of the root and then kept
//! consistent by a background watch bridge for the lifetime of the index.
//!
//! ## Concurrency
//!
//! The collection is mutated from at least three threads of control: the
//! constructing/API-calling thread and the watcher's notification thread
//! (which funnels into the bridge thread). One mutex protects only the
//! collection's structure — never file I/O. File creation for new notes
//! happens before the lock is taken for the duplicate-check-and-insert
//! step, and note contents are read through to disk entirely outside the
//! lock. Reads hand out point-in-time snapshots, so an in-progress
//! iteration is never invalidated by a concurrent add or remove.

use crate::config::Config;
use crate::error::{Result, VeloError};
use crate::note::Note;
use crate::search::{BruteForce, SearchStrategy};
use crate::watcher::WatchBridge;
use parking_lot::Mutex;
use std::ffi::OsStr;
use std::fs;
use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};
use std::sync::Arc;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// The note index: a directory of plain-text files mirrored in memory.
///
/// All structural changes — whether from direct API calls or from
/// filesystem events relayed by the watch bridge — funnel through the same
/// two mutation entry points ([`Notebook::add_in`] and
/// [`Notebook::remove_in`]), so one code path enforces every invariant.
pub struct Notebook {
    state: Arc<NotebookState>,
    bridge: Mutex<Option<WatchBridge>>,
}

/// Shared state behind the notebook: configuration-derived rules plus the
/// locked collection. The watch bridge thread holds its own `Arc` of this.
pub(crate) struct NotebookState {
    root: PathBuf,
    extension: String,
    extensions: Vec<String>,
    exclude: Vec<String>,
    strategy: Box<dyn SearchStrategy>,
    notes: Mutex<Vec<Note>>,
}

impl Notebook {
    /// Open a notebook over `config.notes_dir` with the default brute-force
    /// search strategy.
    ///
    /// Creates the root directory (and parents) if absent, scans it
    /// recursively for eligible notes, then starts watching it for external
    /// changes. The scan completes before the watcher starts, so no event
    /// can race the initial population.
    pub fn open(config: &Config) -> Result<Notebook> {
        Self::open_with(config, Box::new(BruteForce))
    }

    /// Open a notebook with a custom search strategy.
    pub fn open_with(config: &Config, strategy: Box<dyn SearchStrategy>) -> Result<Notebook> {
        let state = NotebookState::initialize(config, strategy)?;
        let bridge = WatchBridge::start(Arc::clone(&state))?;
        info!(root = %state.root.display(), notes = state.len(), "notebook open");
        Ok(Notebook {
            state,
            bridge: Mutex::new(Some(bridge)),
        })
    }

    /// Absolute, canonicalized root of the notebook.
    pub fn root(&self) -> &Path {
        &self.state.root
    }

    /// The extension given to newly created untyped notes (with leading dot).
    pub fn default_extension(&self) -> &str {
        &self.state.extension
    }

    /// Register `name` (a filename relative to the root) as a note,
    /// creating an empty file for it if none exists.
    ///
    /// Returns `Ok(None)` for names that are silently ignored (excluded
    /// basenames, backup files, pre-existing dotfiles, unrecognized
    /// extensions), `Ok(Some(note))` on success, and an error for invalid
    /// or duplicate titles. A failed add leaves the collection untouched.
    pub fn add(&self, name: &str) -> Result<Option<Note>> {
        self.state.add_in(name, None)
    }

    /// Like [`Notebook::add`], with an explicit containing directory.
    pub fn add_in(&self, name: &str, directory: &Path) -> Result<Option<Note>> {
        self.state.add_in(name, Some(directory))
    }

    /// Remove the note registered for `name` from the index, if any.
    ///
    /// Never fails and never touches the filesystem: the backing file is
    /// assumed already gone. Removing an unknown name is a no-op.
    pub fn remove(&self, name: &str) {
        self.state.remove_in(name, None);
    }

    /// Like [`Notebook::remove`], with an explicit containing directory.
    pub fn remove_in(&self, name: &str, directory: &Path) {
        self.state.remove_in(name, Some(directory));
    }

    /// Return the notes matching `query`, in collection order.
    pub fn search(&self, query: &str) -> Vec<Note> {
        self.state.search(query)
    }

    /// Number of indexed notes.
    pub fn len(&self) -> usize {
        self.state.len()
    }

    /// True when no notes are indexed.
    pub fn is_empty(&self) -> bool {
        self.state.len() == 0
    }

    /// The note at `index` in collection order, if in bounds.
    pub fn get(&self, index: usize) -> Option<Note> {
        self.state.notes.lock().get(index).cloned()
    }

    /// A point-in-time snapshot of the collection, in insertion order.
    /// Callers impose any secondary ordering (e.g. by [`Note::mtime`]).
    pub fn notes(&self) -> Vec<Note> {
        self.state.snapshot()
    }

    /// True when a note with this exact title and extension is indexed.
    pub fn contains_title(&self, title: &str, extension: &str) -> bool {
        self.state
            .notes
            .lock()
            .iter()
            .any(|n| n.title() == title && n.extension() == extension)
    }

    /// Stop the watch bridge and release its thread.
    ///
    /// Waits a bounded interval for the bridge thread to terminate, then
    /// proceeds regardless. Safe to call multiple times; also runs on drop.
    pub fn close(&self) {
        if let Some(mut bridge) = self.bridge.lock().take() {
            debug!(root = %self.state.root.display(), "closing notebook");
            bridge.stop();
        }
    }
}

impl Drop for Notebook {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Notebook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notebook")
            .field("root", &self.state.root)
            .field("len", &self.len())
            .finish()
    }
}

impl NotebookState {
    /// Resolve the root, create it if needed, and run the initial scan.
    pub(crate) fn initialize(
        config: &Config,
        strategy: Box<dyn SearchStrategy>,
    ) -> Result<Arc<NotebookState>> {
        let root = &config.notes_dir;
        if !root.is_dir() {
            debug!(root = %root.display(), "notes directory does not exist, creating it");
            fs::create_dir_all(root)
                .map_err(|e| VeloError::initialization(root.clone(), e.to_string()))?;
        }
        let root = root
            .canonicalize()
            .map_err(|e| VeloError::initialization(root.clone(), e.to_string()))?;

        let state = Arc::new(NotebookState {
            root,
            extension: normalize_extension(&config.extension),
            extensions: config
                .extensions
                .iter()
                .map(|e| normalize_extension(e))
                .collect(),
            exclude: config.exclude.clone(),
            strategy,
            notes: Mutex::new(Vec::new()),
        });
        state.scan()?;
        Ok(state)
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) fn len(&self) -> usize {
        self.notes.lock().len()
    }

    pub(crate) fn snapshot(&self) -> Vec<Note> {
        self.notes.lock().clone()
    }

    pub(crate) fn search(&self, query: &str) -> Vec<Note> {
        // Hold the lock only long enough to copy; matching reads note
        // contents from disk and must not block mutations.
        let snapshot = self.snapshot();
        self.strategy.search(&snapshot, query)
    }

    /// Walk the root, pruning excluded subtrees before descending, and
    /// register every eligible file. Benign rejections (duplicates, invalid
    /// titles) are expected during a cold scan and do not abort it.
    fn scan(&self) -> Result<()> {
        let walker = WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !self
                        .exclude
                        .iter()
                        .any(|name| OsStr::new(name) == entry.file_name())
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) => {
                    warn!(%error, "skipping unreadable entry during scan");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let directory = entry.path().parent().map(Path::to_path_buf);
            match self.add_in(&name, directory.as_deref()) {
                Ok(_) => {}
                Err(error) if error.is_benign() => {
                    debug!(%name, %error, "skipping file during scan");
                }
                Err(error) => return Err(error),
            }
        }
        Ok(())
    }

    /// Register an existing file or create-and-register a new one.
    ///
    /// Both paths share this single entry point so that scanning, watcher
    /// relays, and user-initiated creation all enforce identical naming and
    /// containment rules.
    pub(crate) fn add_in(&self, name: &str, directory: Option<&Path>) -> Result<Option<Note>> {
        if self.exclude.iter().any(|excluded| excluded == name) {
            debug!(%name, "ignoring excluded name");
            return Ok(None);
        }
        if name.ends_with('~') {
            return Ok(None);
        }

        let directory = directory.unwrap_or(&self.root);
        let candidate = directory.join(name);
        let file_exists = candidate.exists();

        // Pre-existing dotfiles (seen by scans and watcher events) are
        // silently skipped; creating one through this API is rejected.
        if name.starts_with('.') {
            if file_exists {
                return Ok(None);
            }
            return Err(VeloError::invalid_title(
                name,
                "dotfiles cannot be created",
            ));
        }
        if name.starts_with(MAIN_SEPARATOR) || name.starts_with('/') {
            return Err(VeloError::invalid_title(
                name,
                "name must be relative to the notebook root",
            ));
        }

        let Some(extension) = self.matched_extension(name) else {
            return Ok(None);
        };

        // Containment is checked on canonicalized paths, never by string
        // prefix: `/notes2` must not pass for a root of `/notes`, and
        // symlink indirection must not escape the root.
        let resolved = resolve_lenient(&candidate);
        let rel = resolved.strip_prefix(&self.root).map_err(|_| {
            VeloError::invalid_title(name, "path escapes the notebook root")
        })?;
        let title = derive_title(rel, &extension)?;

        if !file_exists {
            debug!(path = %resolved.display(), "creating note file");
            if let Some(parent) = resolved.parent() {
                if !parent.is_dir() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::OpenOptions::new()
                .append(true)
                .create(true)
                .open(&resolved)?;
        }

        let mut notes = self.notes.lock();
        if notes
            .iter()
            .any(|n| n.title() == title && n.extension() == extension)
        {
            return Err(VeloError::AlreadyExists { title, extension });
        }
        let note = Note::new(title, extension, resolved);
        notes.push(note.clone());
        Ok(Some(note))
    }

    /// Drop the first note whose title matches the one derived from `name`.
    ///
    /// Deliberately validation-free: this is invoked from asynchronous
    /// watcher callbacks where a failure has nowhere useful to propagate.
    /// Matching is by title alone; the file may carry an extension the
    /// notebook never indexed, in which case nothing matches and nothing
    /// happens.
    pub(crate) fn remove_in(&self, name: &str, directory: Option<&Path>) {
        let directory = directory.unwrap_or(&self.root);
        let resolved = resolve_lenient(&directory.join(name));
        let Ok(rel) = resolved.strip_prefix(&self.root) else {
            debug!(%name, "remove for a path outside the root, ignoring");
            return;
        };
        let title = rel.with_extension("").to_string_lossy().into_owned();

        let mut notes = self.notes.lock();
        if let Some(position) = notes.iter().position(|n| n.title() == title) {
            notes.remove(position);
            debug!(%title, remaining = notes.len(), "removed note");
        }
    }

    /// The extension of `name` (with leading dot) if it is one the
    /// notebook recognizes.
    fn matched_extension(&self, name: &str) -> Option<String> {
        let extension = Path::new(name)
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))?;
        self.extensions.contains(&extension).then_some(extension)
    }
}

/// Normalize an extension to begin with a dot; `"txt"` and `".txt"` are
/// both accepted in configuration.
fn normalize_extension(extension: &str) -> String {
    if extension.is_empty() || extension.starts_with('.') {
        extension.to_string()
    } else {
        format!(".{extension}")
    }
}

/// Derive a note title from its root-relative path: strip the matched
/// extension, leading separators, and surrounding whitespace. An empty
/// final segment (e.g. the name was just an extension) is invalid.
fn derive_title(rel: &Path, extension: &str) -> Result<String> {
    let rel_str = rel.to_string_lossy();
    let stem = rel_str.strip_suffix(extension).unwrap_or(&rel_str);
    let title = stem.trim_start_matches(MAIN_SEPARATOR).trim();
    let last_segment = title.rsplit(MAIN_SEPARATOR).next().unwrap_or("");
    if last_segment.is_empty() {
        return Err(VeloError::invalid_title(
            rel_str.into_owned(),
            "title segment is empty after stripping the extension",
        ));
    }
    Ok(title.to_string())
}

/// Canonicalize a path that may not exist yet: resolve the deepest existing
/// ancestor through symlinks, then re-append the lexically normalized
/// remainder.
fn resolve_lenient(path: &Path) -> PathBuf {
    if let Ok(resolved) = path.canonicalize() {
        return resolved;
    }
    let normalized = lexical_normalize(path);
    let mut prefix = normalized.as_path();
    let mut remainder = Vec::new();
    loop {
        if prefix.exists() {
            break;
        }
        match (prefix.parent(), prefix.file_name()) {
            (Some(parent), Some(name)) => {
                remainder.push(name.to_os_string());
                prefix = parent;
            }
            _ => break,
        }
    }
    let mut resolved = prefix
        .canonicalize()
        .unwrap_or_else(|_| prefix.to_path_buf());
    for name in remainder.iter().rev() {
        resolved.push(name);
    }
    resolved
}

/// Resolve `.` and `..` components without touching the filesystem.
fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
