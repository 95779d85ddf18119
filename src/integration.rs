//! Integration module for connecting detectors and artifact storage with the tracker.
//!
//! This module provides the detector trait, artifact store backends and a
//! pipeline that ties a detector to an [`IouTracker`](crate::tracker::IouTracker).

mod artifact_store;
mod builder;
mod detector;
mod pipeline;

pub use artifact_store::{DirectoryArtifactStore, InMemoryArtifactStore};
pub use builder::DetectionBuilder;
pub use detector::{DetectionSource, IntoDetections};
pub use pipeline::TrackerPipeline;
