use std::path::PathBuf;
use std::sync::Arc;

use image::RgbaImage;

use crate::frame::FrameIndex;

/// Decoded RGBA8 pixels for one frame.
#[derive(Debug, Clone)]
pub struct FrameAsset {
    pixels: RgbaImage,
}

impl FrameAsset {
    pub fn new(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// An asset with a zero dimension cannot be drawn.
    pub fn is_drawable(&self) -> bool {
        self.width() > 0 && self.height() > 0
    }
}

/// Scheduler -> Loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadFrame {
    pub index: FrameIndex,
    pub priority: bool,
}

/// Loader -> Player
#[derive(Debug, Clone)]
pub enum FrameEvent {
    Loaded {
        index: FrameIndex,
        asset: Arc<FrameAsset>,
        path: PathBuf,
    },
    Failed {
        index: FrameIndex,
    },
}

/// Page scroll state in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollPosition {
    /// Distance scrolled from the top of the page.
    pub offset: f32,
    /// Total scrollable distance (document height minus viewport height).
    pub scrollable_height: f32,
}

/// Layout box and display characteristics reported by the host page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub container_width: f32,
    pub container_height: f32,
    /// Window width used for the mobile enlargement decision.
    pub viewport_width: f32,
    pub device_pixel_ratio: f32,
}

impl Viewport {
    /// Device pixel ratio with the `|| 1` fallback applied.
    pub fn pixel_ratio(&self) -> f32 {
        if self.device_pixel_ratio.is_finite() && self.device_pixel_ratio > 0.0 {
            self.device_pixel_ratio
        } else {
            1.0
        }
    }
}

/// Host page -> Player
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostSignal {
    Scroll(ScrollPosition),
    Resize(Viewport),
}
