use ab_glyph::{point, Font, FontArc, FontVec, Glyph, PxScale, ScaleFont};
use fontdb::{Database, Family, Query, ID};
use image::RgbaImage;
use tracing::debug;

use crate::render::cpu::blend_pixel;
use crate::render::surface::Rgba;

/// Named faces tried when the generic sans-serif mapping resolves to nothing.
const SANS_FAMILIES: &[&str] = &[
    "DejaVu Sans",
    "Liberation Sans",
    "Noto Sans",
    "Arial",
    "Helvetica",
];

/// A sans-serif system face: the generic family first, then well-known
/// names, then any face that parses.
pub fn load_sans_font() -> Option<FontArc> {
    let mut db = Database::new();
    db.load_system_fonts();

    let generic = db.query(&Query {
        families: &[Family::SansSerif],
        ..Query::default()
    });
    if let Some(font) = generic.and_then(|id| load_face(&db, id)) {
        debug!(faces = db.len(), "resolved generic sans-serif face");
        return Some(font);
    }

    for name in SANS_FAMILIES {
        if let Some(font) = find_family(&db, name).and_then(|id| load_face(&db, id)) {
            debug!(family = *name, faces = db.len(), "resolved named sans-serif face");
            return Some(font);
        }
    }

    let font = db.faces().find_map(|face| load_face(&db, face.id));
    if font.is_some() {
        debug!(faces = db.len(), "no sans-serif family found; using first usable face");
    }
    font
}

fn find_family(db: &Database, requested: &str) -> Option<ID> {
    let requested_lower = requested.to_lowercase();
    db.faces().find_map(|face| {
        face.families
            .iter()
            .any(|(family, _)| family.to_lowercase() == requested_lower)
            .then_some(face.id)
    })
}

fn load_face(db: &Database, id: ID) -> Option<FontArc> {
    db.with_face_data(id, |data, index| {
        FontVec::try_from_vec_and_index(data.to_vec(), index)
            .ok()
            .map(FontArc::new)
    })?
}

/// Width of `text` laid out at `size_px`, including kerning.
pub fn measure(font: &FontArc, text: &str, size_px: f32) -> f32 {
    layout(font, text, size_px, 0.0, 0.0)
        .last()
        .map(|(glyph, advance)| glyph.position.x + advance)
        .unwrap_or(0.0)
}

fn layout(font: &FontArc, text: &str, size_px: f32, x: f32, baseline: f32) -> Vec<(Glyph, f32)> {
    let scale = PxScale::from(size_px);
    let scaled = font.as_scaled(scale);
    let mut caret = x;
    let mut previous = None;
    let mut glyphs = Vec::with_capacity(text.len());
    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(prev) = previous {
            caret += scaled.kern(prev, id);
        }
        let advance = scaled.h_advance(id);
        glyphs.push((id.with_scale_and_position(scale, point(caret, baseline)), advance));
        caret += advance;
        previous = Some(id);
    }
    glyphs
}

/// Rasterizes `text` centred on `cx` with its baseline at `baseline`.
pub fn draw_text_centered(
    target: &mut RgbaImage,
    font: &FontArc,
    text: &str,
    cx: f32,
    baseline: f32,
    size_px: f32,
    color: Rgba,
) {
    let width = measure(font, text, size_px);
    let (tw, th) = (target.width() as i64, target.height() as i64);
    for (glyph, _) in layout(font, text, size_px, cx - width / 2.0, baseline) {
        let Some(outlined) = font.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        outlined.draw(|gx, gy, coverage| {
            let x = bounds.min.x as i64 + i64::from(gx);
            let y = bounds.min.y as i64 + i64::from(gy);
            if x < 0 || y < 0 || x >= tw || y >= th {
                return;
            }
            blend_pixel(target.get_pixel_mut(x as u32, y as u32), color, coverage);
        });
    }
}
