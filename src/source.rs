use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::config::Configuration;
use crate::error::LoadError;
use crate::events::FrameAsset;

/// Transport for frame images. Paths are relative to the page root.
pub trait AssetSource: Send + Sync + 'static {
    fn fetch(&self, path: &Path) -> impl Future<Output = Result<FrameAsset, LoadError>> + Send;
}

/// Reads and decodes frames from a directory on disk.
#[derive(Debug, Clone)]
pub struct FsAssetSource {
    root: PathBuf,
}

impl FsAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Source rooted at the configured `asset-root`.
    pub fn for_config(cfg: &Configuration) -> Self {
        Self::new(cfg.asset_root.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for FsAssetSource {
    async fn fetch(&self, path: &Path) -> Result<FrameAsset, LoadError> {
        let full = self.root.join(path);
        let requested = path.to_path_buf();
        trace!(path = %full.display(), "fetching frame");
        tokio::task::spawn_blocking(move || decode_rgba8(&full, requested))
            .await
            .map_err(|_| LoadError::Aborted(path.to_path_buf()))?
    }
}

fn decode_rgba8(full: &Path, requested: PathBuf) -> Result<FrameAsset, LoadError> {
    let reader = image::ImageReader::open(full).map_err(|source| match source.kind() {
        ErrorKind::NotFound => LoadError::NotFound(requested.clone()),
        _ => LoadError::Io {
            path: requested.clone(),
            source,
        },
    })?;
    let img = reader
        .with_guessed_format()
        .map_err(|source| LoadError::Io {
            path: requested.clone(),
            source,
        })?
        .decode()
        .map_err(|source| LoadError::Decode {
            path: requested.clone(),
            source,
        })?;
    let asset = FrameAsset::new(img.to_rgba8());
    if !asset.is_drawable() {
        return Err(LoadError::Empty(requested));
    }
    Ok(asset)
}
