use image::DynamicImage;
use trackstore_rs::{
    ArtifactError, ArtifactKey, ArtifactRef, ArtifactStore, Association, Detection,
    InMemoryArtifactStore, IouTracker, Rect, Rejection, TrackError, TrackerConfig,
};

fn car(x: i32, y: i32, w: i32, h: i32, frame: u64) -> Detection {
    Detection::new(Rect::new(x, y, w, h), "car", frame)
        .with_crop(DynamicImage::new_rgb8(8, 8))
}

fn tracker() -> IouTracker<InMemoryArtifactStore> {
    IouTracker::with_seed(TrackerConfig::default(), InMemoryArtifactStore::new(), 1)
}

/// Tracker holding a single "car" track at (0, 0, 10, 10) last seen in frame 5.
fn tracker_with_t0() -> IouTracker<InMemoryArtifactStore> {
    let mut tracker = tracker();
    tracker.associate(&car(0, 0, 10, 10, 5)).unwrap();
    tracker
}

fn assert_history_consistent(tracker: &IouTracker<impl ArtifactStore>) {
    for track in tracker.store() {
        let n = track.len();
        assert_eq!(track.centroids().len(), n, "{track}");
        assert_eq!(track.boxes().len(), n, "{track}");
        assert_eq!(track.frame_indices().len(), n, "{track}");
        assert_eq!(track.crop_paths().len(), n, "{track}");
        assert_eq!(track.mask_paths().len(), n, "{track}");
        assert_eq!(track.latest_box(), *track.boxes().last().unwrap());
        assert_eq!(track.latest_frame(), *track.frame_indices().last().unwrap());
    }
}

#[test]
fn test_first_detection_creates_track_zero() {
    let mut tracker = tracker();
    let result = tracker.associate(&car(0, 0, 10, 10, 0)).unwrap();

    assert!(matches!(
        result,
        Association::Created {
            index: 0,
            track_id: 0,
            rejected: None,
            ..
        }
    ));
    assert_eq!(result.iou(), None);
    assert_eq!(tracker.store().len(), 1);
    assert_eq!(tracker.store().get(0).unwrap().len(), 1);
}

#[test]
fn test_identical_box_extends_track() {
    let mut tracker = tracker_with_t0();
    let color = tracker.store().get(0).unwrap().display_color();

    let result = tracker.associate(&car(0, 0, 10, 10, 6)).unwrap();

    assert_eq!(
        result,
        Association::Matched {
            index: 0,
            track_id: 0,
            iou: 1.0,
            color,
        }
    );
    assert_eq!(tracker.store().len(), 1);
    let track = tracker.store().get(0).unwrap();
    assert_eq!(track.len(), 2);
    assert_eq!(track.frame_indices(), &[5, 6]);
    assert_eq!(track.display_color(), color);
}

#[test]
fn test_stale_track_is_not_extended() {
    let mut tracker = tracker_with_t0();
    let result = tracker.associate(&car(0, 0, 10, 10, 100)).unwrap();

    let rejected = result.rejected().copied().unwrap();
    assert_eq!(rejected.reason, Rejection::Stale);
    assert_eq!(rejected.iou, 1.0);
    assert_eq!(result.track_id(), 1);
    assert_eq!(tracker.store().len(), 2);
    assert_eq!(tracker.store().get(0).unwrap().len(), 1);
}

#[test]
fn test_frame_gap_boundary() {
    let mut tracker = tracker_with_t0();
    assert!(tracker.associate(&car(0, 0, 10, 10, 34)).unwrap().is_match());

    let mut tracker = tracker_with_t0();
    assert!(!tracker.associate(&car(0, 0, 10, 10, 35)).unwrap().is_match());
}

#[test]
fn test_category_mismatch_creates_track() {
    let mut tracker = tracker_with_t0();
    let truck = Detection::new(Rect::new(0, 0, 10, 10), "truck", 6)
        .with_crop(DynamicImage::new_rgb8(8, 8));
    let result = tracker.associate(&truck).unwrap();

    assert_eq!(
        result.rejected().map(|r| r.reason),
        Some(Rejection::CategoryMismatch)
    );
    assert_eq!(tracker.store().len(), 2);
    assert_eq!(tracker.store().get(1).unwrap().category(), "truck");
}

#[test]
fn test_empty_crop_creates_track() {
    for crop in [None, Some(DynamicImage::new_rgb8(0, 0))] {
        let mut tracker = tracker_with_t0();
        let mut det = Detection::new(Rect::new(0, 0, 10, 10), "car", 6);
        det.crop = crop;

        let result = tracker.associate(&det).unwrap();
        assert_eq!(
            result.rejected().map(|r| r.reason),
            Some(Rejection::EmptyCrop)
        );
        assert_eq!(tracker.store().len(), 2);
        assert!(tracker.store().get(1).unwrap().crop_paths()[0].is_none());
    }
}

#[test]
fn test_highest_iou_wins_regardless_of_order() {
    // Against (0, 0, 19, 9): (5, 0, 19, 9) scores 0.6 and (0, 0, 49, 9) scores 0.4.
    let detection = car(0, 0, 19, 9, 1);
    for boxes in [[(0, 49), (5, 19)], [(5, 19), (0, 49)]] {
        let mut tracker = tracker();
        let mut empty = |x: i32, w: i32| {
            // Empty crops keep the two founding detections from merging.
            let det = Detection::new(Rect::new(x, 0, w, 9), "car", 0);
            tracker.associate(&det).unwrap();
        };
        for (x, w) in boxes {
            empty(x, w);
        }
        assert_eq!(tracker.store().len(), 2);

        let result = tracker.associate(&detection).unwrap();
        let chosen = tracker.store().get(result.index()).unwrap();
        assert!(result.is_match());
        assert_eq!(chosen.boxes()[0], Rect::new(5, 0, 19, 9));
        assert!((result.iou().unwrap() - 0.6).abs() < 1e-12);
    }
}

#[test]
fn test_gated_best_candidate_is_not_replaced_by_runner_up() {
    let mut tracker = tracker();
    tracker.associate(&car(0, 0, 10, 10, 0)).unwrap();
    let person = Detection::new(Rect::new(1, 1, 10, 10), "person", 0);
    tracker.associate(&person).unwrap();
    assert_eq!(tracker.store().len(), 2);

    // Best candidate is the person track; the car track also clears 0.5.
    let result = tracker.associate(&car(1, 1, 10, 10, 1)).unwrap();
    assert_eq!(
        result.rejected().map(|r| (r.index, r.reason)),
        Some((1, Rejection::CategoryMismatch))
    );
    assert_eq!(tracker.store().len(), 3);
}

#[test]
fn test_greedy_same_frame_order_dependence() {
    let mut tracker = tracker_with_t0();
    let results = tracker
        .associate_frame(&[car(1, 0, 10, 10, 6), car(0, 0, 10, 10, 6)])
        .unwrap();

    // The first detection claims track 0; the second then matches the
    // updated box of that same track.
    assert!(results.iter().all(Association::is_match));
    assert!(results.iter().all(|r| r.index() == 0));
    assert_eq!(tracker.store().get(0).unwrap().len(), 3);
}

#[test]
fn test_ids_unique_and_history_consistent() {
    let mut tracker = tracker();
    for frame in 0..60u64 {
        let x = (frame as i32) * 2;
        let mut detections = vec![car(x, 0, 20, 20, frame), car(200, 200, 20, 20, frame)];
        if frame % 7 == 0 {
            detections.push(Detection::new(Rect::new(x, 0, 20, 20), "bike", frame));
        }
        if frame % 40 == 0 {
            let mask = DynamicImage::new_luma8(8, 8);
            detections.push(car(500 + x, 500, 10, 10, frame).with_mask(mask));
        }
        tracker.associate_frame(&detections).unwrap();
        assert_history_consistent(&tracker);
    }

    let ids: Vec<u64> = tracker.store().iter().map(|t| t.id()).collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(ids[0], 0);

    // The moving car and the parked car each keep one identity.
    assert_eq!(tracker.store().get(0).unwrap().len(), 60);
    assert_eq!(tracker.store().get(1).unwrap().len(), 60);
}

/// Fails once `remaining` successful writes are used up.
struct FlakyStore {
    inner: InMemoryArtifactStore,
    remaining: usize,
}

impl ArtifactStore for FlakyStore {
    fn persist(
        &mut self,
        key: ArtifactKey,
        image: &DynamicImage,
    ) -> Result<ArtifactRef, ArtifactError> {
        if self.remaining == 0 {
            return Err(ArtifactError::Io(std::io::Error::other("disk full")));
        }
        self.remaining -= 1;
        self.inner.persist(key, image)
    }
}

#[test]
fn test_persistence_failure_leaves_history_untouched() {
    let store = FlakyStore {
        inner: InMemoryArtifactStore::new(),
        remaining: 1,
    };
    let mut tracker = IouTracker::with_seed(TrackerConfig::default(), store, 3);
    tracker.associate(&car(0, 0, 10, 10, 0)).unwrap();

    let err = tracker.associate(&car(0, 0, 10, 10, 1)).unwrap_err();
    assert!(matches!(err, TrackError::Artifact(ArtifactError::Io(_))));
    assert_eq!(tracker.store().get(0).unwrap().len(), 1);

    let err = tracker.associate(&car(300, 300, 10, 10, 1)).unwrap_err();
    assert!(matches!(err, TrackError::Artifact(_)));
    assert_eq!(tracker.store().len(), 1);

    // The id claimed by the failed creation is never handed out again.
    tracker.artifacts_mut().remaining = 1;
    let result = tracker.associate(&car(300, 300, 10, 10, 2)).unwrap();
    assert_eq!(result.track_id(), 2);
    assert_history_consistent(&tracker);
}
