//! File watching for `comic-site watch`.
//!
//! Watches the comics directory (plus the date index and a custom stylesheet
//! when they live elsewhere) and hands batches of changed paths to a rebuild
//! callback. Rebuilds run synchronously on the watching thread, so a change
//! made during a build is picked up by the next batch.

use crate::config::SiteConfig;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher as _};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("file watcher error: {0}")]
    Notify(#[from] notify::Error),
    #[error("nothing to watch: {0} does not exist")]
    MissingSource(PathBuf),
}

/// Events closer together than this are coalesced into one rebuild.
const DEBOUNCE: Duration = Duration::from_millis(100);

pub struct Watcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<notify::Result<notify::Event>>,
    sources: Sources,
}

/// Which event paths count as source changes.
#[derive(Debug)]
struct Sources {
    comics_dir: PathBuf,
    /// Single files living outside the comics directory. Their parent
    /// directories are watched, so only these names are of interest there.
    files: Vec<PathBuf>,
    /// Writes under the output directory never trigger a rebuild.
    output_dir: PathBuf,
}

impl Sources {
    fn new(config: &SiteConfig) -> Self {
        let comics_dir = absolute(&config.comics_dir);
        let mut files: Vec<PathBuf> = [Some(&config.dates_file), config.stylesheet.as_ref()]
            .into_iter()
            .flatten()
            .map(|path| absolute(path))
            .filter(|path| !path.starts_with(&comics_dir))
            .collect();
        files.sort();
        files.dedup();
        Self {
            comics_dir,
            files,
            output_dir: absolute(&config.output_dir),
        }
    }

    /// Directories holding the out-of-tree files.
    fn file_dirs(&self) -> Vec<&Path> {
        let mut dirs: Vec<&Path> = self.files.iter().filter_map(|f| f.parent()).collect();
        dirs.sort();
        dirs.dedup();
        dirs
    }

    fn is_source(&self, path: &Path) -> bool {
        if path.starts_with(&self.output_dir) {
            return false;
        }
        path.starts_with(&self.comics_dir) || self.files.iter().any(|f| f == path)
    }
}

impl Watcher {
    /// Start watching the sources named by `config`.
    pub fn new(config: &SiteConfig) -> Result<Self, WatchError> {
        if !config.comics_dir.is_dir() {
            return Err(WatchError::MissingSource(config.comics_dir.clone()));
        }
        let sources = Sources::new(config);

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;

        watcher.watch(&sources.comics_dir, RecursiveMode::Recursive)?;
        // Editors that save by rename replace the file, so watch its directory
        for dir in sources.file_dirs() {
            if dir.is_dir() {
                watcher.watch(dir, RecursiveMode::NonRecursive)?;
            }
        }
        tracing::info!(path = %config.comics_dir.display(), "watching for changes");

        Ok(Self {
            _watcher: watcher,
            rx,
            sources,
        })
    }

    /// Block until changes arrive, then call `rebuild` with each batch.
    /// Returns when the underlying watcher shuts down.
    pub fn run(&self, mut rebuild: impl FnMut(&[PathBuf])) {
        while let Some(changed) = self.next_batch(None) {
            rebuild(&changed);
        }
    }

    /// Wait (up to `timeout`, or forever) for a relevant change, then keep
    /// collecting until the debounce window passes quietly.
    pub fn next_batch(&self, timeout: Option<Duration>) -> Option<Vec<PathBuf>> {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut changed = Vec::new();

        while changed.is_empty() {
            let event = match deadline {
                Some(deadline) => {
                    let left = deadline.checked_duration_since(Instant::now())?;
                    self.rx.recv_timeout(left).ok()?
                }
                None => self.rx.recv().ok()?,
            };
            self.collect(event, &mut changed);
        }

        while let Ok(event) = self.rx.recv_timeout(DEBOUNCE) {
            self.collect(event, &mut changed);
        }
        changed.sort();
        changed.dedup();
        Some(changed)
    }

    fn collect(&self, event: notify::Result<notify::Event>, changed: &mut Vec<PathBuf>) {
        match event {
            Ok(event) if is_content_change(&event.kind) => changed.extend(
                event
                    .paths
                    .into_iter()
                    .filter(|p| self.sources.is_source(p)),
            ),
            Ok(_) => {}
            Err(e) => tracing::warn!("watch error: {e}"),
        }
    }
}

/// Creations, modifications and removals. Plain reads (which the build
/// itself causes) are not changes.
fn is_content_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

fn absolute(path: &Path) -> PathBuf {
    path.canonicalize()
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
