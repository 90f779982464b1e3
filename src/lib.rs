//! Scroll-driven image-sequence player.
//!
//! Binds page scroll position to playback of a numbered frame sequence,
//! loading frames in the background (priority first, the long tail
//! staggered, each with a list of fallback paths) and painting them onto a
//! [`Surface`](render::surface::Surface) sized to its container.

pub mod config;
pub mod error;
pub mod events;
pub mod frame;
pub mod logging;
pub mod player;
pub mod scroll;
pub mod source;
pub mod processing {
    pub mod blur;
    pub mod layout;
}
pub mod render {
    pub mod cpu;
    pub mod renderer;
    pub mod surface;
    pub mod text;
}
pub mod tasks {
    pub mod loader;
    pub mod player;
    pub mod scheduler;
}

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub use config::Configuration;
pub use error::{Error, LoadError};
pub use events::{FrameAsset, HostSignal, ScrollPosition, Viewport};
pub use frame::{AssetLayout, FrameAddress, FrameIndex, FrameStore};
pub use player::SequencePlayer;
pub use render::surface::Surface;
pub use source::{AssetSource, FsAssetSource};

/// Inbound signals from the host page.
pub struct HostChannels {
    /// Scroll and resize notifications. Dropping the sender stops the player.
    pub signals: mpsc::Receiver<HostSignal>,
    /// `true` once the page has finished loading.
    pub page_loaded: watch::Receiver<bool>,
}

/// Runs the whole pipeline: scheduler and loader as background tasks, the
/// player loop on the calling task. Returns the player (and its surface)
/// once `cancel` fires or the host drops its signal sender.
pub async fn run<A: AssetSource, S: Surface>(
    cfg: Configuration,
    source: A,
    surface: S,
    viewport: Viewport,
    host: HostChannels,
    cancel: CancellationToken,
) -> Result<SequencePlayer<S>> {
    let cfg = cfg.validated().context("invalid configuration values")?;
    info!(
        base_path = %cfg.base_path.display(),
        frames = cfg.frame_count,
        priority = cfg.priority_count,
        "starting sequence player"
    );

    let (load_tx, load_rx) = mpsc::channel::<events::LoadFrame>(64); // Scheduler -> Loader
    let (frame_tx, frame_rx) = mpsc::channel::<events::FrameEvent>(64); // Loader -> Player
    let background = cancel.child_token();

    let mut tasks = JoinSet::new();

    tasks.spawn({
        let opts = tasks::scheduler::ScheduleOptions {
            frame_count: cfg.frame_count,
            priority_count: cfg.priority_count,
            stagger_delay: cfg.stagger_delay,
        };
        let page_loaded = host.page_loaded;
        let cancel = background.clone();
        async move { tasks::scheduler::run(opts, page_loaded, load_tx, cancel).await }
    });

    tasks.spawn({
        let opts = tasks::loader::LoaderOptions {
            layout: cfg.layout(),
            frame_count: cfg.frame_count,
            max_in_flight: cfg.loader_max_in_flight,
            progress_log_interval: cfg.progress_log_interval,
        };
        let source = Arc::new(source);
        let cancel = background.clone();
        async move {
            let stats = tasks::loader::run(source, opts, load_rx, frame_tx, cancel).await?;
            debug!(loaded = stats.loaded, errored = stats.errored, "loader finished");
            Ok(())
        }
    });

    let player = SequencePlayer::new(&cfg, surface, &viewport);
    let loop_opts = tasks::player::PlayerLoopOptions {
        tick_interval: cfg.tick_interval,
        placeholder_grace: cfg.placeholder_grace,
    };
    let result = tasks::player::run(player, loop_opts, host.signals, frame_rx, cancel.clone()).await;

    background.cancel();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(error = %err, "background task ended with error"),
            Err(err) => warn!(error = %err, "background task panicked"),
        }
    }
    result
}
