use crate::events::Viewport;

/// Destination rectangle in CSS pixels. May extend past the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Surface sizing derived from the container and device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceGeometry {
    pub css_width: f32,
    pub css_height: f32,
    pub pixel_ratio: f32,
    pub backing_width: u32,
    pub backing_height: u32,
}

impl SurfaceGeometry {
    pub fn from_viewport(viewport: &Viewport) -> Self {
        let css_width = sanitize_extent(viewport.container_width);
        let css_height = sanitize_extent(viewport.container_height);
        let pixel_ratio = viewport.pixel_ratio();
        Self {
            css_width,
            css_height,
            pixel_ratio,
            backing_width: (css_width * pixel_ratio).floor() as u32,
            backing_height: (css_height * pixel_ratio).floor() as u32,
        }
    }
}

fn sanitize_extent(v: f32) -> f32 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

/// "Contain" placement of a `src_w`×`src_h` image in a `box_w`×`box_h` box,
/// centred, with an extra `multiplier` applied to the uniform scale.
pub fn contain_rect(box_w: f32, box_h: f32, src_w: u32, src_h: u32, multiplier: f32) -> DrawRect {
    let iw = src_w.max(1) as f32;
    let ih = src_h.max(1) as f32;
    let scale = (box_w / iw).min(box_h / ih).max(0.0);
    let scale = if scale.is_finite() { scale } else { 1.0 };
    let scale = scale * multiplier;
    DrawRect {
        x: ((box_w - iw * scale) / 2.0).round(),
        y: ((box_h - ih * scale) / 2.0).round(),
        width: (iw * scale).round(),
        height: (ih * scale).round(),
    }
}
