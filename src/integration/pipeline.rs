//! TrackerPipeline for combining detection with tracking.

use tracing::debug;

use crate::error::{Result, TrackError};
use crate::tracker::{ArtifactStore, Association, IouTracker, TrackStore, TrackerConfig};

use super::DetectionSource;

/// A combined tracker that bundles detection inference with IoU association.
///
/// Frames are numbered by the pipeline itself, starting at 0, in the order
/// they are passed to [`process_frame`](Self::process_frame).
pub struct TrackerPipeline<D: DetectionSource, A: ArtifactStore> {
    detector: D,
    tracker: IouTracker<A>,
    frame_index: u64,
}

impl<D: DetectionSource, A: ArtifactStore> TrackerPipeline<D, A> {
    /// Create a new tracking pipeline with the given detector, tracker config and artifact store.
    pub fn new(detector: D, config: TrackerConfig, artifacts: A) -> Self {
        Self {
            detector,
            tracker: IouTracker::new(config, artifacts),
            frame_index: 0,
        }
    }

    /// Create a new tracking pipeline with default tracker configuration.
    pub fn with_default_config(detector: D, artifacts: A) -> Self {
        Self::new(detector, TrackerConfig::default(), artifacts)
    }

    /// Wrap an already configured tracker.
    pub fn from_tracker(detector: D, tracker: IouTracker<A>) -> Self {
        Self {
            detector,
            tracker,
            frame_index: 0,
        }
    }

    /// Process a single frame and return one association per detection.
    ///
    /// # Arguments
    /// * `input` - Raw image bytes
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    pub fn process_frame(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<Association>> {
        let frame_index = self.frame_index;
        self.frame_index += 1;

        let detections = self
            .detector
            .detect(input, width, height, frame_index)
            .map_err(|err| TrackError::Detection(Box::new(err)))?;
        debug!(frame = frame_index, detections = detections.len(), "processing frame");

        self.tracker.associate_frame(&detections)
    }

    /// Index the next processed frame will receive.
    pub fn next_frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Get a reference to the underlying detector.
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Get a mutable reference to the underlying detector.
    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    /// Get a reference to the underlying tracker.
    pub fn tracker(&self) -> &IouTracker<A> {
        &self.tracker
    }

    /// Get a mutable reference to the underlying tracker.
    pub fn tracker_mut(&mut self) -> &mut IouTracker<A> {
        &mut self.tracker
    }

    /// Tracks accumulated so far.
    pub fn store(&self) -> &TrackStore {
        self.tracker.store()
    }
}
