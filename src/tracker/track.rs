//! Tracked object and its append-only observation history.

use std::fmt;
use std::path::Path;
use std::time::SystemTime;

use rand::Rng;

use crate::tracker::artifacts::ArtifactRef;
use crate::tracker::geometry::{Point, Rect};
use crate::tracker::matching::Detection;

/// Display color assigned to a track at creation, channels in `[0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            r: rng.gen_range(0.0..1.0),
            g: rng.gen_range(0.0..1.0),
            b: rng.gen_range(0.0..1.0),
        }
    }

    /// Scale to 8-bit RGB for drawing.
    pub fn to_rgb8(&self) -> [u8; 3] {
        let scale = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [scale(self.r), scale(self.g), scale(self.b)]
    }
}

/// One entry of a track's history.
#[derive(Debug, Clone, Copy)]
pub struct Observation<'a> {
    pub frame_index: u64,
    pub rect: Rect,
    pub centroid: Point,
    pub crop: Option<&'a Path>,
    pub mask: Option<&'a Path>,
}

/// Full history of one tracked object.
///
/// Every history sequence grows by exactly one entry per observation and is
/// never shrunk or reordered. `category` and `display_color` are fixed at
/// creation.
#[derive(Debug, Clone)]
pub struct Track {
    id: u64,
    category: String,
    display_color: Color,
    centroids: Vec<Point>,
    boxes: Vec<Rect>,
    frame_indices: Vec<u64>,
    crop_paths: Vec<Option<ArtifactRef>>,
    mask_paths: Vec<Option<ArtifactRef>>,
    latest_box: Rect,
    latest_frame: u64,
    last_seen: SystemTime,
}

impl Track {
    /// Start a track from its founding detection.
    pub(crate) fn new(
        id: u64,
        detection: &Detection,
        display_color: Color,
        crop: Option<ArtifactRef>,
        mask: Option<ArtifactRef>,
    ) -> Self {
        Self {
            id,
            category: detection.category.clone(),
            display_color,
            centroids: vec![detection.centroid()],
            boxes: vec![detection.bbox],
            frame_indices: vec![detection.frame_index],
            crop_paths: vec![crop],
            mask_paths: vec![mask],
            latest_box: detection.bbox,
            latest_frame: detection.frame_index,
            last_seen: SystemTime::now(),
        }
    }

    /// Append one matched observation.
    pub(crate) fn extend(
        &mut self,
        detection: &Detection,
        crop: Option<ArtifactRef>,
        mask: Option<ArtifactRef>,
    ) {
        self.centroids.push(detection.centroid());
        self.boxes.push(detection.bbox);
        self.frame_indices.push(detection.frame_index);
        self.crop_paths.push(crop);
        self.mask_paths.push(mask);
        self.latest_box = detection.bbox;
        self.latest_frame = detection.frame_index;
        self.last_seen = SystemTime::now();
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn display_color(&self) -> Color {
        self.display_color
    }

    /// Number of observations, including the founding one.
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn centroids(&self) -> &[Point] {
        &self.centroids
    }

    pub fn boxes(&self) -> &[Rect] {
        &self.boxes
    }

    pub fn frame_indices(&self) -> &[u64] {
        &self.frame_indices
    }

    pub fn crop_paths(&self) -> &[Option<ArtifactRef>] {
        &self.crop_paths
    }

    pub fn mask_paths(&self) -> &[Option<ArtifactRef>] {
        &self.mask_paths
    }

    /// Box of the most recent observation; the only one used for matching.
    pub fn latest_box(&self) -> Rect {
        self.latest_box
    }

    pub fn latest_frame(&self) -> u64 {
        self.latest_frame
    }

    pub fn latest_centroid(&self) -> Point {
        self.latest_box.center()
    }

    /// Wall-clock time of the last update. Advisory only.
    pub fn last_seen(&self) -> SystemTime {
        self.last_seen
    }

    /// Frames between the latest observation and `frame_index`.
    pub fn frames_since(&self, frame_index: u64) -> u64 {
        self.latest_frame.abs_diff(frame_index)
    }

    pub fn observations(&self) -> impl Iterator<Item = Observation<'_>> + '_ {
        (0..self.len()).map(move |i| Observation {
            frame_index: self.frame_indices[i],
            rect: self.boxes[i],
            centroid: self.centroids[i],
            crop: self.crop_paths[i].as_deref(),
            mask: self.mask_paths[i].as_deref(),
        })
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - id: {}", self.category, self.id)
    }
}
