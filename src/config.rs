use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use serde::Deserialize;

use crate::error::Error;
use crate::frame::AssetLayout;
use crate::render::surface::{Rgba, Shadow};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Configuration {
    /// Directory that page-root relative asset paths resolve against.
    pub asset_root: PathBuf,
    /// Folder (under the asset root) holding `0001.png`, `0002.png`, ...
    pub base_path: PathBuf,
    /// Total number of frames in the sequence.
    pub frame_count: usize,
    /// Frames loaded immediately at startup; the rest are staggered.
    pub priority_count: usize,
    /// Spacing between deferred loads.
    #[serde(with = "humantime_serde")]
    pub stagger_delay: Duration,
    /// Time the displayed frame takes to catch up with the scroll position.
    #[serde(with = "humantime_serde")]
    pub scrub: Duration,
    /// How long to wait for a first frame before painting the diagnostic placeholder.
    #[serde(with = "humantime_serde")]
    pub placeholder_grace: Duration,
    /// Animation tick while the scrub is catching up.
    #[serde(with = "humantime_serde")]
    pub tick_interval: Duration,
    /// Maximum number of fallback chains running at once.
    pub loader_max_in_flight: usize,
    /// Log load progress every N successful loads.
    pub progress_log_interval: usize,
    pub mobile: MobileOptions,
    pub shadow: ShadowOptions,
    pub placeholder: PlaceholderOptions,
    pub fallbacks: FallbackDirs,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let cfg = serde_yaml::from_str(&s)
            .map_err(Error::Config)
            .with_context(|| format!("invalid configuration in {}", path.display()))?;
        Ok(cfg)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        ensure!(self.frame_count > 0, "frame-count must be greater than zero");
        ensure!(
            self.priority_count <= self.frame_count,
            "priority-count ({}) must not exceed frame-count ({})",
            self.priority_count,
            self.frame_count
        );
        ensure!(
            self.loader_max_in_flight > 0,
            "loader-max-in-flight must be greater than zero"
        );
        ensure!(
            self.progress_log_interval > 0,
            "progress-log-interval must be greater than zero"
        );
        ensure!(
            !self.tick_interval.is_zero(),
            "tick-interval must be greater than zero"
        );
        self.mobile.validate()?;
        self.shadow.validate()?;
        ensure!(
            self.placeholder.font_px > 0.0,
            "placeholder.font-px must be positive"
        );
        Ok(self)
    }

    pub fn layout(&self) -> AssetLayout {
        AssetLayout {
            base_path: self.base_path.clone(),
            unscreen_dir: self.fallbacks.unscreen_dir.clone(),
            frames_dir: self.fallbacks.frames_dir.clone(),
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("."),
            base_path: PathBuf::from("Images"),
            frame_count: 187,
            priority_count: 20,
            stagger_delay: Duration::from_millis(50),
            scrub: Duration::from_millis(900),
            placeholder_grace: Duration::from_millis(1200),
            tick_interval: Duration::from_millis(16),
            loader_max_in_flight: 32,
            progress_log_interval: 50,
            mobile: MobileOptions::default(),
            shadow: ShadowOptions::default(),
            placeholder: PlaceholderOptions::default(),
            fallbacks: FallbackDirs::default(),
        }
    }
}

/// Enlargement applied on narrow viewports.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct MobileOptions {
    /// Viewport widths at or below this (logical px) count as mobile.
    pub breakpoint: f32,
    /// Multiplier on top of the contain scale.
    pub scale: f32,
}

impl MobileOptions {
    /// Scale multiplier for a viewport of the given logical width.
    pub fn multiplier_for(&self, viewport_width: f32) -> f32 {
        if viewport_width <= self.breakpoint {
            self.scale
        } else {
            1.0
        }
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.scale.is_finite() && self.scale > 0.0,
            "mobile.scale must be positive"
        );
        Ok(())
    }
}

impl Default for MobileOptions {
    fn default() -> Self {
        Self {
            breakpoint: 768.0,
            scale: 1.2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ShadowOptions {
    pub color: [u8; 3],
    pub opacity: f32,
    /// Blur radius in CSS pixels, as a canvas `shadowBlur`.
    pub blur: f32,
}

impl ShadowOptions {
    pub fn shadow(&self) -> Option<Shadow> {
        if self.opacity <= 0.0 {
            return None;
        }
        let alpha = (self.opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        let [r, g, b] = self.color;
        Some(Shadow {
            color: Rgba([r, g, b, alpha]),
            blur: self.blur,
        })
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.blur.is_finite() && self.blur >= 0.0,
            "shadow.blur must be zero or positive"
        );
        Ok(())
    }
}

impl Default for ShadowOptions {
    fn default() -> Self {
        Self {
            color: [0, 212, 255],
            opacity: 0.3,
            blur: 30.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PlaceholderOptions {
    pub background: [u8; 3],
    pub foreground: [u8; 3],
    /// Text size in CSS pixels (multiplied by the device pixel ratio when drawn).
    pub font_px: f32,
}

impl Default for PlaceholderOptions {
    fn default() -> Self {
        Self {
            background: [0x11, 0x11, 0x11],
            foreground: [0xff, 0xff, 0xff],
            font_px: 24.0,
        }
    }
}

/// Folder names used by the fallback search.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct FallbackDirs {
    pub unscreen_dir: PathBuf,
    pub frames_dir: PathBuf,
}

impl Default for FallbackDirs {
    fn default() -> Self {
        let layout = AssetLayout::default();
        Self {
            unscreen_dir: layout.unscreen_dir,
            frames_dir: layout.frames_dir,
        }
    }
}
