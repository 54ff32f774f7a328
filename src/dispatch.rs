use crate::archive::read_gamestate;
use crate::error::{SaveFileError, SaveParseError};
use crate::lexer::Lexer;
use crate::monitor::game_identifier;
use crate::node::Mapping;
use crate::parser::parse_document;
use crossbeam::channel::{self, Receiver};
use std::path::PathBuf;
use std::thread::JoinHandle;

/// The result of parsing one save file: its game identifier paired with either the parsed tree
/// or the file-tagged error that stopped the parse.
pub type DispatchItem = (String, Result<Mapping, SaveFileError>);

/// Configuration for [`ParallelDispatcher::dispatch`]. `workers = 1` runs every job inline on the
/// caller's thread, with no pool spun up at all.
#[derive(Debug, Clone, Copy)]
pub struct DispatcherConfig {
    pub workers: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        let available = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        DispatcherConfig { workers: available.saturating_sub(2).max(1) }
    }
}

fn parse_one(path: PathBuf) -> DispatchItem {
    let identifier = game_identifier(&path);
    let outcome = parse_path(&path);
    if let Err(err) = &outcome {
        tracing::error!(path = %path.display(), error = %err, "failed to parse save file");
    }
    let outcome = outcome.map_err(|error| SaveFileError { path, error });
    (identifier, outcome)
}

fn parse_path(path: &std::path::Path) -> Result<Mapping, SaveParseError> {
    let text = read_gamestate(path)?;
    let tree = parse_document(Lexer::new(&text))?;
    Ok(tree)
}

enum Inner {
    Inline(std::vec::IntoIter<PathBuf>),
    Pool { result_rx: Receiver<DispatchItem>, driver: Option<JoinHandle<()>> },
}

/// Turns a batch of save paths into a stream of `(game_identifier, outcome)` pairs. With more
/// than one worker, a fixed-size `rayon` thread pool parses jobs concurrently and each job pushes
/// its completed result onto a shared `crossbeam` channel; iterating this dispatcher is exactly
/// iterating that channel's receiving end, so results surface in completion order with no
/// busy-polling.
pub struct ParallelDispatcher {
    inner: Inner,
}

impl ParallelDispatcher {
    /// Dispatch `paths` for parsing under `config`. The whole batch is handed to the pool (or, for
    /// a single worker, queued for inline iteration) up front — there is no way to submit more
    /// work to a dispatcher once it has started.
    pub fn dispatch(paths: Vec<PathBuf>, config: DispatcherConfig) -> Self {
        if config.workers <= 1 {
            return ParallelDispatcher { inner: Inner::Inline(paths.into_iter()) };
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .build()
            .expect("failed to build worker pool");
        let (result_tx, result_rx) = channel::unbounded::<DispatchItem>();

        // Drive the pool from a dedicated thread so `dispatch` can return immediately and the
        // caller can start draining `result_rx` while jobs are still in flight.
        let driver = std::thread::spawn(move || {
            pool.install(|| {
                rayon::scope(|scope| {
                    for path in paths {
                        let result_tx = result_tx.clone();
                        scope.spawn(move |_| {
                            let _ = result_tx.send(parse_one(path));
                        });
                    }
                });
            });
            // `result_tx` and every clone handed to a job are dropped here, closing the channel.
        });

        ParallelDispatcher { inner: Inner::Pool { result_rx, driver: Some(driver) } }
    }

    /// Wait for every in-flight job to finish and join the pool's driver thread. A no-op for the
    /// inline mode. Results already yielded are unaffected; results not yet consumed are dropped.
    pub fn teardown(mut self) {
        if let Inner::Pool { driver, .. } = &mut self.inner {
            if let Some(handle) = driver.take() {
                let _ = handle.join();
            }
        }
    }
}

impl Iterator for ParallelDispatcher {
    type Item = DispatchItem;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            Inner::Inline(paths) => paths.next().map(parse_one),
            Inner::Pool { result_rx, .. } => result_rx.recv().ok(),
        }
    }
}
