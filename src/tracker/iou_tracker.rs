//! Match-or-create association of detections against the track store.

use image::DynamicImage;
use ndarray::ArrayView1;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, trace, warn};

use crate::error::Result;
use crate::tracker::artifacts::{
    ArtifactKey, ArtifactKind, ArtifactRef, ArtifactStore, is_empty_image,
};
use crate::tracker::association::{Association, RejectedCandidate, Rejection};
use crate::tracker::geometry::{Rect, iou, iou_matrix};
use crate::tracker::matching::{self, AssignmentResult, Detection};
use crate::tracker::store::TrackStore;
use crate::tracker::track::{Color, Track};

/// Cost given to pairs that fail a gate in the frame-level assignment.
const GATED_COST: f64 = 1e6;

/// How detections of one frame are assigned to tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssignmentMode {
    /// Each detection takes its best track in input order. Later detections
    /// may see tracks created earlier in the same frame.
    #[default]
    Greedy,
    /// One-shot optimal bipartite assignment over the tracks that existed
    /// at the start of the frame.
    Optimal,
}

/// Configuration for the [`IouTracker`].
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Minimum IoU against a track's latest box to extend it
    pub iou_threshold: f64,
    /// A track last seen this many frames ago or more can no longer be extended
    pub max_frame_gap: u64,
    pub assignment: AssignmentMode,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            iou_threshold: 0.5,
            max_frame_gap: 30,
            assignment: AssignmentMode::Greedy,
        }
    }
}

impl TrackerConfig {
    pub fn with_iou_threshold(mut self, threshold: f64) -> Self {
        self.iou_threshold = threshold;
        self
    }

    pub fn with_max_frame_gap(mut self, frames: u64) -> Self {
        self.max_frame_gap = frames;
        self
    }

    pub fn with_assignment(mut self, mode: AssignmentMode) -> Self {
        self.assignment = mode;
        self
    }

    /// Acceptance gate for a candidate. Gates are checked in a fixed order
    /// and the first failure is reported.
    fn gate(
        &self,
        track: &Track,
        detection: &Detection,
        iou: f64,
    ) -> std::result::Result<(), Rejection> {
        if iou < self.iou_threshold {
            return Err(Rejection::LowIou);
        }
        if track.category() != detection.category {
            return Err(Rejection::CategoryMismatch);
        }
        if detection.has_empty_crop() {
            return Err(Rejection::EmptyCrop);
        }
        if track.frames_since(detection.frame_index) >= self.max_frame_gap {
            return Err(Rejection::Stale);
        }
        Ok(())
    }
}

/// Associates detections with tracks by IoU against each track's most
/// recent box and persists the crop/mask of every observation.
///
/// Artifacts are written before history is appended, so a persistence
/// failure leaves the store untouched apart from a consumed track id.
pub struct IouTracker<A: ArtifactStore> {
    store: TrackStore,
    artifacts: A,
    config: TrackerConfig,
    rng: StdRng,
}

impl<A: ArtifactStore> IouTracker<A> {
    pub fn new(config: TrackerConfig, artifacts: A) -> Self {
        Self::with_rng(config, artifacts, StdRng::from_entropy())
    }

    /// Tracker whose display colors are reproducible.
    pub fn with_seed(config: TrackerConfig, artifacts: A, seed: u64) -> Self {
        Self::with_rng(config, artifacts, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: TrackerConfig, artifacts: A, rng: StdRng) -> Self {
        Self {
            store: TrackStore::new(),
            artifacts,
            config,
            rng,
        }
    }

    pub fn store(&self) -> &TrackStore {
        &self.store
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn artifacts(&self) -> &A {
        &self.artifacts
    }

    pub fn artifacts_mut(&mut self) -> &mut A {
        &mut self.artifacts
    }

    pub fn into_parts(self) -> (TrackStore, A) {
        (self.store, self.artifacts)
    }

    /// Extend the best-matching track with `detection`, or start a new one.
    ///
    /// Only the highest-IoU track is considered; ties go to the lowest store
    /// position. If that track fails a gate, a new track is created even when
    /// a lower-scoring track would have passed.
    pub fn associate(&mut self, detection: &Detection) -> Result<Association> {
        let mut rejected = None;

        if let Some((index, score)) = self.best_candidate(&detection.bbox)? {
            let track = self.store.get(index)?;
            match self.config.gate(track, detection, score) {
                Ok(()) => return self.extend(index, score, detection),
                Err(reason) => {
                    debug!(
                        track_id = track.id(),
                        iou = score,
                        frame = detection.frame_index,
                        %reason,
                        "rejected best candidate"
                    );
                    rejected = Some(RejectedCandidate {
                        index,
                        track_id: track.id(),
                        iou: score,
                        reason,
                    });
                }
            }
        }

        self.create(detection, rejected)
    }

    /// Associate every detection of one frame, returning one result per
    /// detection in input order.
    pub fn associate_frame(&mut self, detections: &[Detection]) -> Result<Vec<Association>> {
        match self.config.assignment {
            AssignmentMode::Greedy => detections.iter().map(|d| self.associate(d)).collect(),
            AssignmentMode::Optimal => self.associate_frame_optimal(detections),
        }
    }

    fn associate_frame_optimal(&mut self, detections: &[Detection]) -> Result<Vec<Association>> {
        let det_boxes: Vec<Rect> = detections.iter().map(|d| d.bbox).collect();
        let ious = iou_matrix(&det_boxes, &self.store.latest_boxes())?;

        let mut cost = ious.mapv(|v| 1.0 - v);
        for (i, det) in detections.iter().enumerate() {
            for (j, track) in self.store.iter().enumerate() {
                if self.config.gate(track, det, ious[[i, j]]).is_err() {
                    cost[[i, j]] = GATED_COST;
                }
            }
        }

        let AssignmentResult { matches, .. } =
            matching::linear_assignment(&cost, 1.0 - self.config.iou_threshold);
        trace!(
            detections = detections.len(),
            tracks = self.store.len(),
            matched = matches.len(),
            "solved frame assignment"
        );

        let mut assigned = vec![None; detections.len()];
        for (idet, itrack) in matches {
            assigned[idet] = Some(itrack);
        }

        let mut results = Vec::with_capacity(detections.len());
        for (i, det) in detections.iter().enumerate() {
            let association = match assigned[i] {
                Some(j) => self.extend(j, ious[[i, j]], det)?,
                None => {
                    let rejected = match best_in_row(ious.row(i)) {
                        Some((j, score)) => {
                            let track = self.store.get(j)?;
                            let reason = self
                                .config
                                .gate(track, det, score)
                                .err()
                                .unwrap_or(Rejection::Contested);
                            Some(RejectedCandidate {
                                index: j,
                                track_id: track.id(),
                                iou: score,
                                reason,
                            })
                        }
                        None => None,
                    };
                    self.create(det, rejected)?
                }
            };
            results.push(association);
        }
        Ok(results)
    }

    /// Highest IoU against each track's latest box, first maximum wins.
    fn best_candidate(&self, bbox: &Rect) -> Result<Option<(usize, f64)>> {
        let mut best: Option<(usize, f64)> = None;
        for (index, track) in self.store.iter().enumerate() {
            let score = iou(bbox, &track.latest_box())?;
            if best.is_none_or(|(_, b)| score > b) {
                best = Some((index, score));
            }
        }
        Ok(best)
    }

    fn extend(&mut self, index: usize, score: f64, detection: &Detection) -> Result<Association> {
        let track = self.store.get(index)?;
        let (track_id, observation, color) = (track.id(), track.len(), track.display_color());

        let (crop, mask) = self.persist(track_id, observation, detection)?;
        self.store.get_mut(index)?.extend(detection, crop, mask);

        debug!(
            track_id,
            index,
            iou = score,
            frame = detection.frame_index,
            observations = observation + 1,
            "extended track"
        );
        Ok(Association::Matched {
            index,
            track_id,
            iou: score,
            color,
        })
    }

    fn create(
        &mut self,
        detection: &Detection,
        rejected: Option<RejectedCandidate>,
    ) -> Result<Association> {
        let track_id = self.store.allocate_id();
        let (crop, mask) = self.persist(track_id, 0, detection)?;
        let color = Color::random(&mut self.rng);
        let index = self
            .store
            .push(Track::new(track_id, detection, color, crop, mask));

        info!(
            track_id,
            index,
            category = %detection.category,
            frame = detection.frame_index,
            bbox = %detection.bbox,
            "created track"
        );
        Ok(Association::Created {
            index,
            track_id,
            color,
            rejected,
        })
    }

    fn persist(
        &mut self,
        track_id: u64,
        observation: usize,
        detection: &Detection,
    ) -> Result<(Option<ArtifactRef>, Option<ArtifactRef>)> {
        let crop = self.persist_one(
            ArtifactKey::new(track_id, observation, ArtifactKind::Crop),
            detection.crop.as_ref(),
        )?;
        let mask = self.persist_one(
            ArtifactKey::new(track_id, observation, ArtifactKind::Mask),
            detection.mask.as_ref(),
        )?;
        Ok((crop, mask))
    }

    fn persist_one(
        &mut self,
        key: ArtifactKey,
        image: Option<&DynamicImage>,
    ) -> Result<Option<ArtifactRef>> {
        let Some(image) = image.filter(|img| !is_empty_image(Some(*img))) else {
            return Ok(None);
        };
        match self.artifacts.persist(key, image) {
            Ok(reference) => Ok(Some(reference)),
            Err(err) => {
                warn!(%key, error = %err, "failed to persist artifact");
                Err(err.into())
            }
        }
    }
}

fn best_in_row(row: ArrayView1<'_, f64>) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (j, &score) in row.iter().enumerate() {
        if best.is_none_or(|(_, b)| score > b) {
            best = Some((j, score));
        }
    }
    best
}
