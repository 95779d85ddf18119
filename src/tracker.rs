mod artifacts;
mod association;
mod geometry;
mod iou_tracker;
mod matching;
mod store;
mod track;

pub use artifacts::{ArtifactKey, ArtifactKind, ArtifactRef, ArtifactStore, is_empty_image};
pub use association::{Association, RejectedCandidate, Rejection};
pub use geometry::{Point, Rect, intersection_area, iou, iou_matrix};
pub use iou_tracker::{AssignmentMode, IouTracker, TrackerConfig};
pub use matching::Detection;
pub use store::TrackStore;
pub use track::{Color, Observation, Track};
