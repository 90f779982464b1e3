//! Software surface backed by an RGBA8 buffer.
//!
//! Implements the 2D-context subset from [`Surface`] with straight-alpha
//! source-over blending. Useful headless, for snapshots, and for hosts that
//! upload a finished buffer to their own compositor.

use ab_glyph::FontArc;
use anyhow::{Context, Result};
use fast_image_resize as fir;
use image::{GrayImage, Luma, RgbaImage};
use tracing::{debug, warn};

use crate::processing::blur::{blur_mask, blur_radius, shadow_sigma};
use crate::processing::layout::DrawRect;
use crate::render::surface::{Rgba, Shadow, Surface};
use crate::render::text::{draw_text_centered, load_sans_font};

/// Shadow masks are blurred at reduced resolution once sigma exceeds this.
const SHADOW_SIGMA_PER_STEP: f32 = 4.0;

pub struct CpuSurface {
    pixels: RgbaImage,
    css_size: (f32, f32),
    scale: f32,
    shadow: Option<Shadow>,
    font: Option<FontArc>,
}

impl CpuSurface {
    /// Surface without a font; `fill_text` becomes a no-op.
    pub fn new() -> Self {
        Self {
            pixels: RgbaImage::new(0, 0),
            css_size: (0.0, 0.0),
            scale: 1.0,
            shadow: None,
            font: None,
        }
    }

    pub fn with_font(font: FontArc) -> Self {
        Self {
            font: Some(font),
            ..Self::new()
        }
    }

    /// Uses the system sans-serif face for text, if one can be found.
    pub fn with_system_font() -> Self {
        let font = load_sans_font();
        if font.is_none() {
            warn!("no sans-serif system font found; placeholder text will not be drawn");
        }
        Self { font, ..Self::new() }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn css_size(&self) -> (f32, f32) {
        self.css_size
    }

    pub fn transform(&self) -> f32 {
        self.scale
    }

    fn draw_shadow(&mut self, layer: &RgbaImage, x0: i64, y0: i64, shadow: Shadow) {
        let sigma = shadow_sigma(shadow.blur) * self.scale;
        let step = (sigma / SHADOW_SIGMA_PER_STEP).floor().max(1.0) as u32;
        let local_sigma = sigma / step as f32;
        let pad = blur_radius(local_sigma);

        let mask_w = layer.width().div_ceil(step) + pad * 2;
        let mask_h = layer.height().div_ceil(step) + pad * 2;
        let mut mask = GrayImage::new(mask_w, mask_h);
        for my in pad..mask_h - pad {
            for mx in pad..mask_w - pad {
                let sx = ((mx - pad) * step).min(layer.width() - 1);
                let sy = ((my - pad) * step).min(layer.height() - 1);
                mask.put_pixel(mx, my, Luma([layer.get_pixel(sx, sy).0[3]]));
            }
        }
        let mask = blur_mask(&mask, local_sigma);

        let reach = i64::from(pad * step);
        let (tw, th) = (self.pixels.width() as i64, self.pixels.height() as i64);
        let x_start = (x0 - reach).max(0);
        let y_start = (y0 - reach).max(0);
        let x_end = (x0 + i64::from(layer.width()) + reach).min(tw);
        let y_end = (y0 + i64::from(layer.height()) + reach).min(th);
        for py in y_start..y_end {
            for px in x_start..x_end {
                let mx = ((px - x0 + reach) / i64::from(step)) as u32;
                let my = ((py - y0 + reach) / i64::from(step)) as u32;
                if mx >= mask_w || my >= mask_h {
                    continue;
                }
                let coverage = f32::from(mask.get_pixel(mx, my).0[0]) / 255.0;
                if coverage > 0.0 {
                    blend_pixel(self.pixels.get_pixel_mut(px as u32, py as u32), shadow.color, coverage);
                }
            }
        }
    }

    fn composite(&mut self, layer: &RgbaImage, x0: i64, y0: i64) {
        let (tw, th) = (self.pixels.width() as i64, self.pixels.height() as i64);
        for (lx, ly, src) in layer.enumerate_pixels() {
            let x = x0 + i64::from(lx);
            let y = y0 + i64::from(ly);
            if x < 0 || y < 0 || x >= tw || y >= th {
                continue;
            }
            blend_pixel(self.pixels.get_pixel_mut(x as u32, y as u32), Rgba(src.0), 1.0);
        }
    }
}

impl Default for CpuSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for CpuSurface {
    fn resize(&mut self, backing_width: u32, backing_height: u32, css_width: f32, css_height: f32) {
        self.pixels = RgbaImage::new(backing_width, backing_height);
        self.css_size = (css_width, css_height);
        self.scale = 1.0;
        self.shadow = None;
    }

    fn set_transform(&mut self, scale: f32) {
        self.scale = scale;
    }

    fn clear(&mut self) {
        self.pixels.fill(0);
    }

    fn fill(&mut self, color: Rgba) {
        for pixel in self.pixels.pixels_mut() {
            blend_pixel(pixel, color, 1.0);
        }
    }

    fn set_shadow(&mut self, shadow: Option<Shadow>) {
        self.shadow = shadow.filter(|s| s.color.0[3] > 0);
    }

    fn draw_image(&mut self, image: &RgbaImage, dest: DrawRect) {
        let width = (dest.width * self.scale).round();
        let height = (dest.height * self.scale).round();
        if width < 1.0 || height < 1.0 || image.width() == 0 || image.height() == 0 {
            return;
        }
        let layer = match resize_rgba(image, width as u32, height as u32) {
            Ok(layer) => layer,
            Err(err) => {
                warn!(error = %err, "skipping draw");
                return;
            }
        };
        let x0 = (dest.x * self.scale).round() as i64;
        let y0 = (dest.y * self.scale).round() as i64;
        if let Some(shadow) = self.shadow {
            self.draw_shadow(&layer, x0, y0, shadow);
        }
        self.composite(&layer, x0, y0);
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, size_px: f32, color: Rgba) {
        let Some(font) = self.font.as_ref() else {
            debug!(text, "no font loaded; text skipped");
            return;
        };
        let s = self.scale;
        draw_text_centered(&mut self.pixels, font, text, x * s, y * s, size_px * s, color);
    }

    fn backing_size(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }
}

/// Source-over blend of `color` at `coverage` onto a straight-alpha pixel.
pub(crate) fn blend_pixel(dst: &mut image::Rgba<u8>, color: Rgba, coverage: f32) {
    let sa = f32::from(color.0[3]) / 255.0 * coverage.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return;
    }
    let da = f32::from(dst.0[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        dst.0 = [0, 0, 0, 0];
        return;
    }
    for c in 0..3 {
        let s = f32::from(color.0[c]);
        let d = f32::from(dst.0[c]);
        dst.0[c] = ((s * sa + d * da * (1.0 - sa)) / out_a).round().clamp(0.0, 255.0) as u8;
    }
    dst.0[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

fn resize_rgba(source: &RgbaImage, target_w: u32, target_h: u32) -> Result<RgbaImage> {
    if source.width() == target_w && source.height() == target_h {
        return Ok(source.clone());
    }
    let src_view = fir::images::ImageRef::new(
        source.width(),
        source.height(),
        source.as_raw(),
        fir::PixelType::U8x4,
    )
    .context("failed to create source view for frame resize")?;
    let mut dst_image = fir::images::Image::new(target_w, target_h, fir::PixelType::U8x4);
    let options = fir::ResizeOptions::new()
        .resize_alg(fir::ResizeAlg::Convolution(fir::FilterType::CatmullRom));
    let mut resizer = fir::Resizer::new();
    resizer
        .resize(&src_view, &mut dst_image, Some(&options))
        .context("frame resize failed")?;
    RgbaImage::from_raw(target_w, target_h, dst_image.into_vec())
        .context("failed to construct resized RGBA image")
}
