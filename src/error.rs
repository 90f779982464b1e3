use std::path::PathBuf;

use thiserror::Error;

use crate::frame::FrameIndex;

/// Library error type for scroll-frame operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Every candidate path for a frame failed; the slot stays empty.
    #[error("all {attempts} candidate paths failed for frame {index}")]
    AllFallbacksExhausted { index: FrameIndex, attempts: usize },

    /// Nothing loaded within the startup grace window.
    #[error("no frames loaded from {}", base_path.display())]
    NoAssetsAvailable { base_path: PathBuf },

    /// YAML/serde configuration error.
    #[error(transparent)]
    Config(#[from] serde_yaml::Error),
}

/// Failure of a single fetch attempt.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("asset not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("asset {} has no pixels", .0.display())]
    Empty(PathBuf),

    #[error("decode task for {} did not complete", .0.display())]
    Aborted(PathBuf),
}

impl LoadError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::NotFound(path) | Self::Empty(path) | Self::Aborted(path) => path,
            Self::Io { path, .. } | Self::Decode { path, .. } => path,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
