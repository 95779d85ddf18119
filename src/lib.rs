//! Persistent identities for per-frame object detections.
//!
//! Detections are associated with existing tracks by bounding-box overlap
//! (IoU) against each track's most recent box, gated on category, frame
//! recency and crop validity. Unmatched detections found new tracks. Every
//! track keeps an append-only history of boxes, centroids, frame indices and
//! references to the persisted crop/mask of each observation.

pub mod error;
pub mod integration;
pub mod tracker;

pub use error::{ArtifactError, Result, TrackError};
pub use integration::{
    DetectionBuilder, DetectionSource, DirectoryArtifactStore, InMemoryArtifactStore,
    IntoDetections, TrackerPipeline,
};
pub use tracker::{
    ArtifactKey, ArtifactKind, ArtifactRef, ArtifactStore, AssignmentMode, Association, Color,
    Detection, IouTracker, Point, Rect, RejectedCandidate, Rejection, Track, TrackStore,
    TrackerConfig,
};
