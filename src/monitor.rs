use std::collections::HashSet;
use std::path::{Path, PathBuf};

const SAVE_EXTENSION: &str = "sav";
const IRONMAN_MARKER: &str = "ironman";
const MULTIPLAYER_PREFIX: &str = "mp";

/// Configuration the monitor is constructed with. A small `Default`-implementing struct rather
/// than a file-based config system — there's no persistent daemon configuration surface here,
/// only the parameters a collaborator passes in at construction time.
#[derive(Debug, Clone, Default)]
pub struct MonitorConfig {
    /// Only directories whose name starts with this prefix are considered. Empty matches all.
    pub game_name_prefix: String,
}

/// Polls a directory tree for new save files, filtering them by naming convention and
/// remembering which paths have already been handed off, so a restart does not re-dispatch
/// files that were already processed.
pub struct SavePathMonitor {
    root: PathBuf,
    processed: HashSet<PathBuf>,
    prefix: String,
}

impl SavePathMonitor {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_config(root, MonitorConfig::default())
    }

    pub fn with_config(root: impl Into<PathBuf>, config: MonitorConfig) -> Self {
        SavePathMonitor { root: root.into(), processed: HashSet::new(), prefix: config.game_name_prefix }
    }

    /// Return the set of accepted new files under `root`, without marking them as seen.
    /// Results are sorted lexicographically for deterministic processing order.
    pub fn scan(&self) -> Vec<PathBuf> {
        let mut found = Vec::new();
        walk(&self.root, &mut found);
        found.retain(|path| self.accepts(path));
        found.sort();
        found
    }

    /// Record `paths` as already processed, regardless of whether parsing them succeeded.
    pub fn mark_seen<I: IntoIterator<Item = PathBuf>>(&mut self, paths: I) {
        self.processed.extend(paths);
    }

    /// Mark every currently-matching file as processed, without yielding it. Used on startup to
    /// skip files that already existed before the monitor started watching.
    pub fn mark_all_existing_seen(&mut self) {
        let existing = self.scan();
        self.mark_seen(existing);
    }

    /// Restrict future scans to directories whose name starts with `prefix`, and un-mark any
    /// previously processed path that now matches, so a restart under a prefix replays the
    /// currently-selected game from the beginning.
    pub fn restrict_to_prefix(&mut self, prefix: impl Into<String>) {
        self.prefix = prefix.into();
        let prefix_ref = self.prefix.clone();
        self.processed.retain(|path| !parent_name(path).starts_with(&prefix_ref));
    }

    fn accepts(&self, path: &Path) -> bool {
        if self.processed.contains(path) {
            tracing::debug!(path = %path.display(), "skipping already-processed save");
            return false;
        }
        if path.to_string_lossy().contains(IRONMAN_MARKER) {
            tracing::debug!(path = %path.display(), "skipping ironman save");
            return false;
        }
        let parent = parent_name(path);
        if parent.starts_with(MULTIPLAYER_PREFIX) {
            tracing::debug!(path = %path.display(), "skipping multiplayer save directory");
            return false;
        }
        if !parent.starts_with(self.prefix.as_str()) {
            return false;
        }
        true
    }
}

fn parent_name(path: &Path) -> String {
    path.parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// The game identifier for a save file: the name of the directory directly containing it.
pub fn game_identifier(path: &Path) -> String {
    parent_name(path)
}

/// Recursively collect every `*.sav` file under `dir` into `found`. Hand-rolled over
/// `std::fs::read_dir` rather than a directory-walking crate, the way a small, cheap filtering
/// walk is done elsewhere in this lineage (one `read_dir` call per directory, recursing into
/// subdirectories, matching files by extension at the leaves).
fn walk(dir: &Path, found: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(dir = %dir.display(), error = %err, "failed to read directory during scan");
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            walk(&path, found);
        } else if path.extension().is_some_and(|ext| ext == SAVE_EXTENSION) {
            found.push(path);
        }
    }
}
