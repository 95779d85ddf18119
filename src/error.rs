//! Error types for association and artifact persistence.

use crate::tracker::{ArtifactKey, Rect};

/// Errors raised while associating detections with tracks.
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    /// IoU is undefined because the combined area of the two boxes is not positive.
    #[error("degenerate geometry: union area of {a} and {b} is not positive")]
    DegenerateGeometry { a: Rect, b: Rect },

    /// The artifact collaborator failed to persist a crop or mask.
    #[error("artifact persistence failed: {0}")]
    Artifact(#[from] ArtifactError),

    /// The detector collaborator failed to produce detections for a frame.
    #[error("detection failed: {0}")]
    Detection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// No track exists at the given store position.
    #[error("no track at store position {0}")]
    TrackNotFound(usize),
}

/// Errors raised by an [`ArtifactStore`](crate::tracker::ArtifactStore).
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Zero-sized images are never written.
    #[error("refusing to persist empty image for {key}")]
    EmptyImage { key: ArtifactKey },
}

pub type Result<T> = std::result::Result<T, TrackError>;
