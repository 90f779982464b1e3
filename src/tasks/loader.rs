use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::error::Error;
use crate::events::{FrameAsset, FrameEvent, LoadFrame};
use crate::frame::{AssetLayout, FrameAddress, FrameIndex};
use crate::source::AssetSource;

/// Terminal result of one frame's fallback chain.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    Loaded {
        asset: Arc<FrameAsset>,
        path: PathBuf,
        /// Whether a fallback path supplied the asset.
        fallback: bool,
    },
    Failed {
        attempts: usize,
    },
}

enum Attempt {
    Trying(VecDeque<PathBuf>),
    Succeeded { asset: FrameAsset, path: PathBuf },
    Exhausted,
}

/// Tries the primary path, then each fallback in order, one at a time.
pub async fn load_frame<S: AssetSource>(source: &S, address: &FrameAddress) -> LoadOutcome {
    let mut state = Attempt::Trying(address.candidates().map(PathBuf::from).collect());
    let mut attempts = 0usize;
    loop {
        state = match state {
            Attempt::Trying(mut remaining) => match remaining.pop_front() {
                None => Attempt::Exhausted,
                Some(path) => {
                    attempts += 1;
                    match source.fetch(&path).await {
                        Ok(asset) => Attempt::Succeeded { asset, path },
                        Err(err) if err.is_not_found() => {
                            debug!(index = %address.index, path = %err.path().display(), "candidate missing");
                            Attempt::Trying(remaining)
                        }
                        Err(err) => {
                            warn!(index = %address.index, error = %err, "candidate unreadable; trying next");
                            Attempt::Trying(remaining)
                        }
                    }
                }
            },
            Attempt::Succeeded { asset, path } => {
                let fallback = attempts > 1;
                if fallback {
                    info!(index = %address.index, path = %path.display(), "fallback loaded");
                }
                return LoadOutcome::Loaded {
                    asset: Arc::new(asset),
                    path,
                    fallback,
                };
            }
            Attempt::Exhausted => return LoadOutcome::Failed { attempts },
        };
    }
}

/// Loaded/errored bookkeeping for progress logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub loaded: usize,
    pub errored: usize,
}

impl LoadStats {
    pub fn settled(&self) -> usize {
        self.loaded + self.errored
    }

    /// Counts `outcome`. Returns `true` when progress should be logged.
    fn record(&mut self, outcome: &LoadOutcome, frame_count: usize, log_every: usize) -> bool {
        match outcome {
            LoadOutcome::Loaded { .. } => {
                self.loaded += 1;
                self.loaded % log_every.max(1) == 0 || self.settled() == frame_count
            }
            LoadOutcome::Failed { .. } => {
                self.errored += 1;
                self.settled() == frame_count
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoaderOptions {
    pub layout: AssetLayout,
    pub frame_count: usize,
    pub max_in_flight: usize,
    pub progress_log_interval: usize,
}

/// Runs fallback chains for requested frames and forwards the outcomes.
///
/// Each index is fetched at most once; repeated requests are dropped.
/// Returns when cancelled, when the player goes away, or once the request
/// channel is closed and every chain has finished.
#[instrument(skip_all, fields(frames = opts.frame_count))]
pub async fn run<S: AssetSource>(
    source: Arc<S>,
    opts: LoaderOptions,
    mut load_rx: Receiver<LoadFrame>,
    to_player: Sender<FrameEvent>,
    cancel: CancellationToken,
) -> Result<LoadStats> {
    let mut requested: HashSet<FrameIndex> = HashSet::new();
    let mut tasks: JoinSet<(FrameIndex, LoadOutcome)> = JoinSet::new();
    let mut stats = LoadStats::default();
    let mut inputs_open = true;
    let max_in_flight = opts.max_in_flight.max(1);

    loop {
        if !inputs_open && tasks.is_empty() {
            break;
        }
        select! {
            _ = cancel.cancelled() => break,

            maybe_req = load_rx.recv(), if inputs_open && tasks.len() < max_in_flight => {
                let Some(LoadFrame { index, priority }) = maybe_req else {
                    inputs_open = false;
                    continue;
                };
                if index.0 >= opts.frame_count {
                    warn!(%index, "load requested past the end of the sequence");
                    continue;
                }
                if !requested.insert(index) {
                    debug!(%index, "duplicate load request ignored");
                    continue;
                }
                debug!(%index, priority, "loading frame");
                let address = FrameAddress::resolve(&opts.layout, index);
                let source = Arc::clone(&source);
                tasks.spawn(async move {
                    let outcome = load_frame(source.as_ref(), &address).await;
                    (index, outcome)
                });
            }

            Some(joined) = tasks.join_next() => {
                let (index, outcome) = match joined {
                    Ok(done) => done,
                    Err(err) => {
                        warn!(error = %err, "frame load task failed");
                        continue;
                    }
                };
                if stats.record(&outcome, opts.frame_count, opts.progress_log_interval) {
                    info!(
                        loaded = stats.loaded,
                        errored = stats.errored,
                        total = opts.frame_count,
                        "frames loaded: {}/{}",
                        stats.loaded,
                        opts.frame_count
                    );
                }
                let event = match outcome {
                    LoadOutcome::Loaded { asset, path, .. } => FrameEvent::Loaded { index, asset, path },
                    LoadOutcome::Failed { attempts } => {
                        let err = Error::AllFallbacksExhausted { index, attempts };
                        error!(error = %err, "frame unavailable");
                        FrameEvent::Failed { index }
                    }
                };
                if to_player.send(event).await.is_err() {
                    debug!("player channel closed; stopping loader");
                    break;
                }
            }
        }
    }
    Ok(stats)
}
