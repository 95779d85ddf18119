//! Contract for the collaborator that persists observation crops and masks.

use std::fmt;
use std::path::PathBuf;

use image::DynamicImage;

use crate::error::ArtifactError;

/// Retrievable reference to a persisted artifact.
pub type ArtifactRef = PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Rendered crop of the detected object.
    Crop,
    /// Segmentation mask of the detected object.
    Mask,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Crop => "image",
            Self::Mask => "mask",
        }
    }
}

/// Identifies one artifact: the owning track, the observation's position in
/// the track history, and whether it is a crop or a mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArtifactKey {
    pub track_id: u64,
    pub observation: usize,
    pub kind: ArtifactKind,
}

impl ArtifactKey {
    pub fn new(track_id: u64, observation: usize, kind: ArtifactKind) -> Self {
        Self {
            track_id,
            observation,
            kind,
        }
    }

    /// File stem such as `object3_image2` or `object3_mask2`.
    pub fn file_stem(&self) -> String {
        format!(
            "object{}_{}{}",
            self.track_id,
            self.kind.as_str(),
            self.observation
        )
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_stem())
    }
}

/// Storage backend for per-observation crops and masks.
///
/// Implementations are called synchronously from the association path and
/// must either persist the image or return an error. No retries happen on
/// the caller side.
pub trait ArtifactStore {
    /// Persist `image` under `key` and return a reference to it.
    fn persist(
        &mut self,
        key: ArtifactKey,
        image: &DynamicImage,
    ) -> Result<ArtifactRef, ArtifactError>;
}

impl<S: ArtifactStore + ?Sized> ArtifactStore for &mut S {
    fn persist(
        &mut self,
        key: ArtifactKey,
        image: &DynamicImage,
    ) -> Result<ArtifactRef, ArtifactError> {
        (**self).persist(key, image)
    }
}

/// Absent and zero-sized images are treated the same.
pub fn is_empty_image(image: Option<&DynamicImage>) -> bool {
    image.is_none_or(|img| img.width() == 0 || img.height() == 0)
}
