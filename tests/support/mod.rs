#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::RgbaImage;
use scroll_frame::error::LoadError;
use scroll_frame::processing::layout::DrawRect;
use scroll_frame::render::surface::{Rgba, Shadow, Surface};
use scroll_frame::{AssetSource, FrameAsset};

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Resize { backing: (u32, u32), css: (f32, f32) },
    Transform(f32),
    Clear,
    Fill(Rgba),
    Shadow(Option<Shadow>),
    Draw { size: (u32, u32), dest: DrawRect },
    Text(String),
}

/// Surface double that records every call. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    ops: Arc<Mutex<Vec<Op>>>,
    backing: (u32, u32),
}

impl RecordingSurface {
    pub fn ops(&self) -> Vec<Op> {
        self.ops.lock().unwrap().clone()
    }

    pub fn take(&self) -> Vec<Op> {
        std::mem::take(&mut *self.ops.lock().unwrap())
    }

    pub fn texts(&self) -> Vec<String> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                Op::Text(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    pub fn draws(&self) -> Vec<DrawRect> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                Op::Draw { dest, .. } => Some(dest),
                _ => None,
            })
            .collect()
    }

    fn push(&self, op: Op) {
        self.ops.lock().unwrap().push(op);
    }
}

impl Surface for RecordingSurface {
    fn resize(&mut self, backing_width: u32, backing_height: u32, css_width: f32, css_height: f32) {
        self.backing = (backing_width, backing_height);
        self.push(Op::Resize {
            backing: (backing_width, backing_height),
            css: (css_width, css_height),
        });
    }

    fn set_transform(&mut self, scale: f32) {
        self.push(Op::Transform(scale));
    }

    fn clear(&mut self) {
        self.push(Op::Clear);
    }

    fn fill(&mut self, color: Rgba) {
        self.push(Op::Fill(color));
    }

    fn set_shadow(&mut self, shadow: Option<Shadow>) {
        self.push(Op::Shadow(shadow));
    }

    fn draw_image(&mut self, image: &RgbaImage, dest: DrawRect) {
        self.push(Op::Draw {
            size: image.dimensions(),
            dest,
        });
    }

    fn fill_text(&mut self, text: &str, _x: f32, _y: f32, _size_px: f32, _color: Rgba) {
        self.push(Op::Text(text.to_string()));
    }

    fn backing_size(&self) -> (u32, u32) {
        self.backing
    }
}

/// In-memory asset source. Paths not registered are "not found".
#[derive(Debug, Clone, Default)]
pub struct MockSource {
    available: HashMap<PathBuf, (u32, u32)>,
    delays: HashMap<PathBuf, Duration>,
    calls: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockSource {
    pub fn with(mut self, path: &str, size: (u32, u32)) -> Self {
        self.available.insert(PathBuf::from(path), size);
        self
    }

    pub fn delayed(mut self, path: &str, delay: Duration) -> Self {
        self.delays.insert(PathBuf::from(path), delay);
        self
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }
}

impl AssetSource for MockSource {
    async fn fetch(&self, path: &Path) -> Result<FrameAsset, LoadError> {
        self.calls.lock().unwrap().push(path.to_path_buf());
        if let Some(delay) = self.delays.get(path) {
            tokio::time::sleep(*delay).await;
        }
        match self.available.get(path) {
            Some(&(w, h)) => Ok(FrameAsset::new(RgbaImage::from_pixel(
                w,
                h,
                image::Rgba([200, 10, 10, 255]),
            ))),
            None => Err(LoadError::NotFound(path.to_path_buf())),
        }
    }
}

pub fn asset(w: u32, h: u32) -> Arc<FrameAsset> {
    Arc::new(FrameAsset::new(RgbaImage::from_pixel(
        w,
        h,
        image::Rgba([10, 200, 10, 255]),
    )))
}
