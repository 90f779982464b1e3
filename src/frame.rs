//! Frame indices, asset addressing, and the write-once frame store.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::events::FrameAsset;

/// Zero-based position in the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FrameIndex(pub usize);

impl FrameIndex {
    pub const FIRST: Self = Self(0);

    /// One-based ordinal used in asset file names.
    pub fn ordinal(self) -> usize {
        self.0 + 1
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for FrameIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for FrameIndex {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

/// Where frame images live relative to the asset root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLayout {
    pub base_path: PathBuf,
    pub unscreen_dir: PathBuf,
    pub frames_dir: PathBuf,
}

impl Default for AssetLayout {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("Images"),
            unscreen_dir: PathBuf::from("pv2-unscreen"),
            frames_dir: PathBuf::from("frames"),
        }
    }
}

/// Primary path plus the ordered fallbacks tried when it fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameAddress {
    pub index: FrameIndex,
    pub primary: PathBuf,
    pub fallbacks: [PathBuf; 4],
}

impl FrameAddress {
    pub fn resolve(layout: &AssetLayout, index: FrameIndex) -> Self {
        let n = index.ordinal();
        let name = format!("{n:04}.png");
        let male = format!("male{n:04}.png");
        Self {
            index,
            primary: layout.base_path.join(&name),
            fallbacks: [
                PathBuf::from(&name),
                layout.unscreen_dir.join(format!("unscreen-{n:03}.png")),
                layout.frames_dir.join(&male),
                PathBuf::from(male),
            ],
        }
    }

    /// Primary first, then fallbacks in order.
    pub fn candidates(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.primary.as_path()).chain(self.fallbacks.iter().map(PathBuf::as_path))
    }
}

/// `FrameIndex -> FrameAsset` mapping. Slots are filled once and never cleared.
#[derive(Debug, Clone)]
pub struct FrameStore {
    slots: Vec<Option<Arc<FrameAsset>>>,
    loaded: usize,
}

impl FrameStore {
    pub fn new(frame_count: usize) -> Self {
        Self {
            slots: vec![None; frame_count],
            loaded: 0,
        }
    }

    /// Stores `asset` if the slot is empty. Returns `false` for occupied or
    /// out-of-range slots.
    pub fn insert(&mut self, index: FrameIndex, asset: Arc<FrameAsset>) -> bool {
        match self.slots.get_mut(index.0) {
            Some(slot @ None) => {
                *slot = Some(asset);
                self.loaded += 1;
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, index: FrameIndex) -> Option<&Arc<FrameAsset>> {
        self.slots.get(index.0).and_then(Option::as_ref)
    }

    pub fn contains(&self, index: FrameIndex) -> bool {
        self.get(index).is_some()
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn asset(w: u32) -> Arc<FrameAsset> {
        Arc::new(FrameAsset::new(RgbaImage::new(w, 1)))
    }

    #[test]
    fn store_is_write_once() {
        let mut store = FrameStore::new(3);
        assert!(store.insert(FrameIndex(1), asset(2)));
        assert!(!store.insert(FrameIndex(1), asset(5)));
        assert_eq!(store.get(FrameIndex(1)).unwrap().width(), 2);
        assert_eq!(store.loaded_count(), 1);
    }

    #[test]
    fn store_ignores_out_of_range() {
        let mut store = FrameStore::new(2);
        assert!(!store.insert(FrameIndex(2), asset(1)));
        assert_eq!(store.loaded_count(), 0);
        assert!(store.get(FrameIndex(7)).is_none());
    }

    #[test]
    fn store_accepts_out_of_order_writes() {
        let mut store = FrameStore::new(200);
        assert!(store.insert(FrameIndex(100), asset(1)));
        assert!(store.insert(FrameIndex(5), asset(1)));
        assert!(store.contains(FrameIndex(100)));
        assert!(store.contains(FrameIndex(5)));
        assert!(!store.contains(FrameIndex(6)));
        assert_eq!(store.loaded_count(), 2);
    }

    #[test]
    fn candidates_start_with_primary() {
        let address = FrameAddress::resolve(&AssetLayout::default(), FrameIndex(0));
        let all: Vec<&Path> = address.candidates().collect();
        assert_eq!(all.len(), 5);
        assert_eq!(all[0], Path::new("Images/0001.png"));
        assert_eq!(all[4], Path::new("male0001.png"));
    }
}
