//! Scroll position to frame index, with scrubbing.
//!
//! The displayed progress trails the scroll-derived target and eases toward
//! it exponentially, so a fling plays through intermediate frames instead of
//! jumping. The smoothing factor is computed from the elapsed time, which
//! keeps the motion identical at any tick rate.

use std::time::Duration;

use crate::events::ScrollPosition;
use crate::frame::FrameIndex;

/// Closer than this to the target, progress snaps and the driver settles.
const SETTLE_EPSILON: f32 = 1e-4;

/// Scroll progress in `[0, 1]`. Overscroll is clamped; a page that cannot
/// scroll reports 0.
pub fn progress_for(position: ScrollPosition) -> f32 {
    let height = position.scrollable_height;
    if !height.is_finite() || height <= 0.0 || !position.offset.is_finite() {
        return 0.0;
    }
    (position.offset / height).clamp(0.0, 1.0)
}

/// `round(progress × (N − 1))`.
pub fn frame_for_progress(progress: f32, frame_count: usize) -> FrameIndex {
    let last = frame_count.saturating_sub(1);
    let frame = (progress.clamp(0.0, 1.0) * last as f32).round() as usize;
    FrameIndex(frame.min(last))
}

#[derive(Debug, Clone)]
pub struct ScrollProgressDriver {
    frame_count: usize,
    time_constant: Duration,
    target: f32,
    progress: f32,
    current: FrameIndex,
}

impl ScrollProgressDriver {
    /// `scrub` is the time the displayed frame needs to (nearly) catch up.
    pub fn new(frame_count: usize, scrub: Duration) -> Self {
        Self {
            frame_count,
            time_constant: scrub / 3,
            target: 0.0,
            progress: 0.0,
            current: FrameIndex::FIRST,
        }
    }

    pub fn set_scroll(&mut self, position: ScrollPosition) {
        self.target = progress_for(position);
    }

    /// Moves the smoothed progress toward the target by `dt`. Returns the new
    /// frame only when it differs from the last one reported.
    pub fn advance(&mut self, dt: Duration) -> Option<FrameIndex> {
        if self.time_constant.is_zero() {
            self.progress = self.target;
        } else {
            let alpha = 1.0 - (-dt.as_secs_f32() / self.time_constant.as_secs_f32()).exp();
            self.progress += (self.target - self.progress) * alpha;
            if (self.target - self.progress).abs() < SETTLE_EPSILON {
                self.progress = self.target;
            }
        }
        let frame = frame_for_progress(self.progress, self.frame_count);
        if frame == self.current {
            return None;
        }
        self.current = frame;
        Some(frame)
    }

    pub fn is_settled(&self) -> bool {
        self.progress == self.target
    }

    pub fn current(&self) -> FrameIndex {
        self.current
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn target(&self) -> f32 {
        self.target
    }
}
