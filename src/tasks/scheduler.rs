use std::time::Duration;

use anyhow::{Context, Result};
use tokio::select;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::events::LoadFrame;
use crate::frame::FrameIndex;

/// When one frame's load is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledLoad {
    pub index: FrameIndex,
    /// Offset from the scheduler start (page already loaded) or from the
    /// page-load signal (page still loading). Zero for priority frames.
    pub delay: Duration,
    pub priority: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleOptions {
    pub frame_count: usize,
    pub priority_count: usize,
    pub stagger_delay: Duration,
}

/// One entry per index in `[0, frame_count)`, in index order.
pub fn plan(opts: &ScheduleOptions, page_loaded: bool) -> Vec<ScheduledLoad> {
    let priority_count = opts.priority_count.min(opts.frame_count);
    (0..opts.frame_count)
        .map(|i| {
            let priority = i < priority_count;
            let steps = match (priority, page_loaded) {
                (true, _) => 0,
                (false, true) => i,
                (false, false) => i - priority_count,
            };
            ScheduledLoad {
                index: FrameIndex(i),
                delay: opts.stagger_delay * steps as u32,
                priority,
            }
        })
        .collect()
}

/// Issues priority loads at once, then staggers the rest.
///
/// If the page is still loading, deferred loads wait for `page_loaded` to
/// turn true. A dropped sender counts as loaded.
#[instrument(skip_all, fields(frames = opts.frame_count, priority = opts.priority_count))]
pub async fn run(
    opts: ScheduleOptions,
    mut page_loaded: watch::Receiver<bool>,
    to_loader: mpsc::Sender<LoadFrame>,
    cancel: CancellationToken,
) -> Result<()> {
    let start = Instant::now();
    let loaded_at_start = *page_loaded.borrow_and_update();
    let schedule = plan(&opts, loaded_at_start);
    let (priority, deferred): (Vec<_>, Vec<_>) = schedule.into_iter().partition(|s| s.priority);

    for entry in &priority {
        to_loader
            .send(LoadFrame {
                index: entry.index,
                priority: true,
            })
            .await
            .context("loader channel closed during priority loads")?;
    }
    debug!(count = priority.len(), "priority loads issued");

    if deferred.is_empty() {
        return Ok(());
    }

    let base = if loaded_at_start {
        start
    } else {
        debug!("waiting for page load before deferred frames");
        select! {
            _ = cancel.cancelled() => return Ok(()),
            res = async { page_loaded.wait_for(|loaded| *loaded).await.map(|_| ()) } => {
                if res.is_err() {
                    debug!("page-load signal dropped; continuing as loaded");
                }
            }
        }
        Instant::now()
    };
    info!(
        deferred = deferred.len(),
        stagger = %humantime::format_duration(opts.stagger_delay),
        "staggering deferred frame loads"
    );

    for entry in deferred {
        select! {
            _ = cancel.cancelled() => return Ok(()),
            _ = sleep_until(base + entry.delay) => {}
        }
        if to_loader
            .send(LoadFrame {
                index: entry.index,
                priority: false,
            })
            .await
            .is_err()
        {
            debug!("loader channel closed; stopping scheduler");
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_count_above_frame_count_is_capped() {
        let opts = ScheduleOptions {
            frame_count: 3,
            priority_count: 10,
            stagger_delay: Duration::from_millis(50),
        };
        let schedule = plan(&opts, false);
        assert_eq!(schedule.len(), 3);
        assert!(schedule.iter().all(|s| s.priority && s.delay.is_zero()));
    }
}
