//! Artifact store backends: image files in a directory, or memory.

use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};
use tracing::{debug, trace};

use crate::error::ArtifactError;
use crate::tracker::{ArtifactKey, ArtifactKind, ArtifactRef, ArtifactStore, is_empty_image};

/// Writes each artifact as an image file under one directory.
///
/// Files are named `object{track}_image{n}.{ext}` for crops and
/// `object{track}_mask{n}.{ext}` for masks. Crops are encoded as RGB8 and
/// masks as 8-bit grayscale.
#[derive(Debug, Clone)]
pub struct DirectoryArtifactStore {
    root: PathBuf,
    format: ImageFormat,
    extension: &'static str,
}

impl DirectoryArtifactStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    /// Images are written as JPEG.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, ArtifactError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        debug!(root = %root.display(), "opened artifact directory");
        Ok(Self {
            root,
            format: ImageFormat::Jpeg,
            extension: "jpeg",
        })
    }

    /// Encode images with `format` instead of JPEG.
    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.format = format;
        self.extension = format.extensions_str().first().copied().unwrap_or("img");
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location an artifact is (or would be) written to.
    pub fn path_for(&self, key: &ArtifactKey) -> PathBuf {
        self.root
            .join(format!("{}.{}", key.file_stem(), self.extension))
    }
}

impl ArtifactStore for DirectoryArtifactStore {
    fn persist(
        &mut self,
        key: ArtifactKey,
        image: &DynamicImage,
    ) -> Result<ArtifactRef, ArtifactError> {
        if is_empty_image(Some(image)) {
            return Err(ArtifactError::EmptyImage { key });
        }

        let encoded = match key.kind {
            ArtifactKind::Crop => DynamicImage::ImageRgb8(image.to_rgb8()),
            ArtifactKind::Mask => DynamicImage::ImageLuma8(image.to_luma8()),
        };
        let path = self.path_for(&key);
        encoded.save_with_format(&path, self.format)?;

        trace!(%key, path = %path.display(), "wrote artifact");
        Ok(path)
    }
}

/// Keeps artifacts in memory, in the order they were persisted.
#[derive(Debug, Clone, Default)]
pub struct InMemoryArtifactStore {
    entries: Vec<(ArtifactKey, DynamicImage)>,
}

impl InMemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ArtifactKey> + '_ {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn get(&self, key: &ArtifactKey) -> Option<&DynamicImage> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, image)| image)
    }
}

impl ArtifactStore for InMemoryArtifactStore {
    fn persist(
        &mut self,
        key: ArtifactKey,
        image: &DynamicImage,
    ) -> Result<ArtifactRef, ArtifactError> {
        if is_empty_image(Some(image)) {
            return Err(ArtifactError::EmptyImage { key });
        }
        self.entries.push((key, image.clone()));
        Ok(PathBuf::from(key.file_stem()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("trackstore-{}-{}", name, std::process::id()))
    }

    #[test]
    fn test_directory_store_writes_files() {
        let dir = scratch_dir("dir-store");
        let mut store = DirectoryArtifactStore::new(&dir).unwrap();

        let crop_key = ArtifactKey::new(2, 1, ArtifactKind::Crop);
        let mask_key = ArtifactKey::new(2, 1, ArtifactKind::Mask);
        let crop = store
            .persist(crop_key, &DynamicImage::new_rgba8(8, 6))
            .unwrap();
        let mask = store
            .persist(mask_key, &DynamicImage::new_luma8(8, 6))
            .unwrap();

        assert_eq!(crop, dir.join("object2_image1.jpeg"));
        assert_eq!(mask, dir.join("object2_mask1.jpeg"));
        let decoded = image::open(&crop).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 6));
        assert!(mask.exists());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_directory_store_png() {
        let dir = scratch_dir("png-store");
        let mut store = DirectoryArtifactStore::new(&dir)
            .unwrap()
            .with_format(ImageFormat::Png);
        let key = ArtifactKey::new(0, 0, ArtifactKind::Mask);
        assert_eq!(store.path_for(&key), dir.join("object0_mask0.png"));
        let path = store.persist(key, &DynamicImage::new_luma8(3, 3)).unwrap();
        assert!(path.exists());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_empty_image_rejected() {
        let mut store = InMemoryArtifactStore::new();
        let key = ArtifactKey::new(0, 0, ArtifactKind::Crop);
        let err = store
            .persist(key, &DynamicImage::new_rgb8(0, 5))
            .unwrap_err();
        assert!(matches!(err, ArtifactError::EmptyImage { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn test_in_memory_lookup() {
        let mut store = InMemoryArtifactStore::new();
        let key = ArtifactKey::new(1, 0, ArtifactKind::Crop);
        let reference = store.persist(key, &DynamicImage::new_rgb8(2, 2)).unwrap();
        assert_eq!(reference, PathBuf::from("object1_image0"));
        assert_eq!(store.len(), 1);
        assert!(store.get(&key).is_some());
    }
}
