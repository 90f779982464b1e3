use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::Configuration;
use crate::error::Error;
use crate::events::{FrameAsset, ScrollPosition, Viewport};
use crate::frame::{FrameIndex, FrameStore};
use crate::render::renderer::SurfaceRenderer;
use crate::render::surface::Surface;
use crate::scroll::ScrollProgressDriver;

/// Ties scroll progress, the frame store and the renderer together.
///
/// All state lives here and is touched from a single task, so frame events
/// may arrive in any order without locking.
pub struct SequencePlayer<S> {
    frames: FrameStore,
    driver: ScrollProgressDriver,
    renderer: SurfaceRenderer<S>,
    base_path: PathBuf,
    placeholder_visible: bool,
    last_painted: Option<FrameIndex>,
}

impl<S: Surface> SequencePlayer<S> {
    /// Configures the surface for `viewport`; nothing is painted yet.
    pub fn new(cfg: &Configuration, surface: S, viewport: &Viewport) -> Self {
        let mut renderer = SurfaceRenderer::new(surface, cfg);
        renderer.configure(viewport);
        Self {
            frames: FrameStore::new(cfg.frame_count),
            driver: ScrollProgressDriver::new(cfg.frame_count, cfg.scrub),
            renderer,
            base_path: cfg.base_path.clone(),
            placeholder_visible: false,
            last_painted: None,
        }
    }

    pub fn on_scroll(&mut self, position: ScrollPosition) {
        self.driver.set_scroll(position);
    }

    /// Advances the scrub; repaints when the displayed frame changes.
    pub fn tick(&mut self, dt: Duration) -> Option<FrameIndex> {
        let frame = self.driver.advance(dt)?;
        self.paint(frame);
        Some(frame)
    }

    /// Reconfigure first, then repaint whatever was showing. Resizing clears
    /// the surface, so when the current frame is still missing the last
    /// painted one goes back up.
    pub fn on_resize(&mut self, viewport: &Viewport) {
        self.renderer.configure(viewport);
        if self.placeholder_visible {
            self.renderer.render_placeholder();
            return;
        }
        if !self.paint(self.driver.current()) {
            if let Some(last) = self.last_painted {
                self.paint(last);
            }
        }
    }

    /// Stores a freshly loaded frame. Frame 0 paints immediately so the
    /// surface is never blank before the first scroll; the current frame
    /// paints as soon as it arrives.
    pub fn on_frame_loaded(&mut self, index: FrameIndex, asset: Arc<FrameAsset>) -> bool {
        if !self.frames.insert(index, asset) {
            debug!(%index, "frame already stored; ignoring duplicate");
            return false;
        }
        let current = self.driver.current();
        if index == FrameIndex::FIRST {
            if !self.paint(current) {
                self.paint(FrameIndex::FIRST);
            }
        } else if index == current {
            self.paint(current);
        }
        true
    }

    pub fn on_frame_failed(&mut self, index: FrameIndex) {
        debug!(%index, "frame permanently unavailable; holding last paint");
    }

    /// Grace window over. Paints the diagnostic placeholder if nothing loaded.
    pub fn on_grace_elapsed(&mut self) -> bool {
        if self.frames.loaded_count() > 0 {
            return false;
        }
        let err = Error::NoAssetsAvailable {
            base_path: self.base_path.clone(),
        };
        warn!(error = %err, "no frames loaded yet; check the asset folder and file names");
        self.renderer.render_placeholder();
        self.placeholder_visible = true;
        true
    }

    fn paint(&mut self, index: FrameIndex) -> bool {
        let painted = self.renderer.render(index, &self.frames);
        if painted {
            self.placeholder_visible = false;
            self.last_painted = Some(index);
        }
        painted
    }

    pub fn current_frame(&self) -> FrameIndex {
        self.driver.current()
    }

    pub fn is_settled(&self) -> bool {
        self.driver.is_settled()
    }

    /// Frame currently on the surface, if any.
    pub fn last_painted(&self) -> Option<FrameIndex> {
        self.last_painted
    }

    pub fn placeholder_visible(&self) -> bool {
        self.placeholder_visible
    }

    pub fn frames(&self) -> &FrameStore {
        &self.frames
    }

    pub fn renderer(&self) -> &SurfaceRenderer<S> {
        &self.renderer
    }

    pub fn into_surface(self) -> S {
        self.renderer.into_surface()
    }
}
