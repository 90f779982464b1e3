//! Drawing-surface seam.
//!
//! Mirrors the handful of 2D-context calls the renderer needs so the same
//! renderer can drive a browser canvas binding, the bundled [`CpuSurface`],
//! or a test double.
//!
//! [`CpuSurface`]: crate::render::cpu::CpuSurface

use image::RgbaImage;

use crate::processing::layout::DrawRect;

/// Straight (non-premultiplied) RGBA8 colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const TRANSPARENT: Self = Self([0, 0, 0, 0]);

    pub fn opaque([r, g, b]: [u8; 3]) -> Self {
        Self([r, g, b, 255])
    }
}

/// Soft drop shadow painted behind drawn images.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub color: Rgba,
    /// Canvas-style blur amount in CSS pixels.
    pub blur: f32,
}

pub trait Surface {
    /// Reallocates the backing store (device pixels) and records the CSS size.
    /// Content is cleared and the transform reset to identity.
    fn resize(&mut self, backing_width: u32, backing_height: u32, css_width: f32, css_height: f32);

    /// Uniform CSS-to-device scale applied to `draw_image` coordinates.
    fn set_transform(&mut self, scale: f32);

    /// Clears every backing pixel to transparent.
    fn clear(&mut self);

    /// Fills every backing pixel with `color`, ignoring the transform.
    fn fill(&mut self, color: Rgba);

    /// Shadow applied to subsequent `draw_image` calls; `None` disables it.
    fn set_shadow(&mut self, shadow: Option<Shadow>);

    /// Draws `image` stretched into `dest` (CSS pixels, transformed).
    fn draw_image(&mut self, image: &RgbaImage, dest: DrawRect);

    /// Draws one line of text horizontally centred on `x` with its alphabetic
    /// baseline at `y`. Position and size are transformed like `draw_image`.
    fn fill_text(&mut self, text: &str, x: f32, y: f32, size_px: f32, color: Rgba);

    fn backing_size(&self) -> (u32, u32);
}
