use std::path::PathBuf;

use tracing::{debug, trace};

use crate::config::{Configuration, MobileOptions, PlaceholderOptions};
use crate::events::Viewport;
use crate::frame::{FrameIndex, FrameStore};
use crate::processing::layout::{contain_rect, SurfaceGeometry};
use crate::render::surface::{Rgba, Shadow, Surface};

/// Placeholder lines sit this many device pixels above/below the centre.
const PLACEHOLDER_LINE_OFFSET: f32 = 20.0;

/// Sizes the surface to its container and paints frames onto it.
pub struct SurfaceRenderer<S> {
    surface: S,
    geometry: Option<SurfaceGeometry>,
    viewport_width: f32,
    mobile: MobileOptions,
    shadow: Option<Shadow>,
    placeholder: PlaceholderOptions,
    base_path: PathBuf,
}

impl<S: Surface> SurfaceRenderer<S> {
    pub fn new(surface: S, cfg: &Configuration) -> Self {
        Self {
            surface,
            geometry: None,
            viewport_width: 0.0,
            mobile: cfg.mobile.clone(),
            shadow: cfg.shadow.shadow(),
            placeholder: cfg.placeholder.clone(),
            base_path: cfg.base_path.clone(),
        }
    }

    /// Backing store = CSS size × pixel ratio, drawing in CSS pixels.
    pub fn configure(&mut self, viewport: &Viewport) {
        let geometry = SurfaceGeometry::from_viewport(viewport);
        self.surface.resize(
            geometry.backing_width,
            geometry.backing_height,
            geometry.css_width,
            geometry.css_height,
        );
        self.surface.set_transform(geometry.pixel_ratio);
        self.viewport_width = viewport.viewport_width;
        debug!(
            css_width = geometry.css_width,
            css_height = geometry.css_height,
            ratio = geometry.pixel_ratio,
            backing_width = geometry.backing_width,
            backing_height = geometry.backing_height,
            "surface configured"
        );
        self.geometry = Some(geometry);
    }

    /// Paints `index` if its asset is ready. Returns `false` without touching
    /// the surface otherwise, so the previous frame stays visible.
    pub fn render(&mut self, index: FrameIndex, frames: &FrameStore) -> bool {
        let Some(geometry) = self.geometry else {
            return false;
        };
        let Some(asset) = frames.get(index).filter(|a| a.is_drawable()) else {
            trace!(%index, "frame not ready; keeping previous paint");
            return false;
        };
        let multiplier = self.mobile.multiplier_for(self.viewport_width);
        let dest = contain_rect(
            geometry.css_width,
            geometry.css_height,
            asset.width(),
            asset.height(),
            multiplier,
        );
        self.surface.clear();
        self.surface.set_shadow(self.shadow);
        self.surface.draw_image(asset.pixels(), dest);
        self.surface.set_shadow(None);
        true
    }

    /// Solid background plus an explanation that no frames were found.
    pub fn render_placeholder(&mut self) {
        let Some(geometry) = self.geometry else {
            return;
        };
        let ratio = geometry.pixel_ratio;
        let cx = geometry.backing_width as f32 / 2.0;
        let cy = geometry.backing_height as f32 / 2.0;
        let color = Rgba::opaque(self.placeholder.foreground);
        let size = self.placeholder.font_px * ratio;
        let [first, second] = self.placeholder_lines();

        self.surface.clear();
        self.surface.set_transform(1.0);
        self.surface.fill(Rgba::opaque(self.placeholder.background));
        self.surface
            .fill_text(&first, cx, cy - PLACEHOLDER_LINE_OFFSET, size, color);
        self.surface
            .fill_text(&second, cx, cy + PLACEHOLDER_LINE_OFFSET, size, color);
        self.surface.set_transform(ratio);
    }

    pub fn placeholder_lines(&self) -> [String; 2] {
        [
            "No frames found in the configured source.".to_string(),
            format!(
                "Expected files like 0001.png in {}",
                self.base_path.display()
            ),
        ]
    }

    pub fn geometry(&self) -> Option<&SurfaceGeometry> {
        self.geometry.as_ref()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}
