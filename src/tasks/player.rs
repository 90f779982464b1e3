use std::time::Duration;

use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::Receiver;
use tokio::time::{interval, sleep, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::events::{FrameEvent, HostSignal};
use crate::player::SequencePlayer;
use crate::render::surface::Surface;

/// Longest step fed to the scrub; keeps a stalled loop from jumping.
const MAX_TICK: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy)]
pub struct PlayerLoopOptions {
    pub tick_interval: Duration,
    pub placeholder_grace: Duration,
}

/// Event loop driving a [`SequencePlayer`]. Runs until cancelled or until
/// the host drops its signal sender, then hands the player back.
pub async fn run<S: Surface>(
    mut player: SequencePlayer<S>,
    opts: PlayerLoopOptions,
    mut signals: Receiver<HostSignal>,
    mut frames: Receiver<FrameEvent>,
    cancel: CancellationToken,
) -> Result<SequencePlayer<S>> {
    let grace = sleep(opts.placeholder_grace);
    tokio::pin!(grace);
    let mut grace_pending = true;
    let mut frames_open = true;
    let mut ticker = interval(opts.tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_tick = Instant::now();

    loop {
        // Frame events are polled ahead of the grace deadline.
        select! {
            biased;

            _ = cancel.cancelled() => break,

            maybe_frame = frames.recv(), if frames_open => match maybe_frame {
                Some(FrameEvent::Loaded { index, asset, path }) => {
                    debug!(%index, path = %path.display(), "frame ready");
                    player.on_frame_loaded(index, asset);
                }
                Some(FrameEvent::Failed { index }) => player.on_frame_failed(index),
                None => {
                    info!(loaded = player.frames().loaded_count(), "frame loading finished");
                    frames_open = false;
                }
            },

            maybe_signal = signals.recv() => match maybe_signal {
                Some(HostSignal::Scroll(position)) => {
                    if player.is_settled() {
                        ticker.reset();
                        last_tick = Instant::now();
                    }
                    player.on_scroll(position);
                }
                Some(HostSignal::Resize(viewport)) => {
                    debug!(?viewport, "viewport resized");
                    player.on_resize(&viewport);
                }
                None => {
                    debug!("host signals closed; stopping player");
                    break;
                }
            },

            now = ticker.tick(), if !player.is_settled() => {
                let dt = now.saturating_duration_since(last_tick).min(MAX_TICK);
                last_tick = now;
                if let Some(frame) = player.tick(dt) {
                    debug!(%frame, "frame changed");
                }
            }

            _ = &mut grace, if grace_pending => {
                grace_pending = false;
                player.on_grace_elapsed();
            }
        }
    }
    Ok(player)
}
