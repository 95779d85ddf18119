//! Trait for object detection backends.

use crate::tracker::Detection;

/// Trait for object detection backends.
///
/// Implement this trait to connect any detection or segmentation model to
/// the tracker.
///
/// # Example
///
/// ```ignore
/// use trackstore_rs::{Detection, DetectionSource};
///
/// struct MyDetector {
///     // Your model here
/// }
///
/// impl DetectionSource for MyDetector {
///     type Error = std::io::Error;
///
///     fn detect(
///         &mut self,
///         input: &[u8],
///         width: u32,
///         height: u32,
///         frame_index: u64,
///     ) -> Result<Vec<Detection>, Self::Error> {
///         // Run inference, crop each box out of `input`, return detections
///         Ok(vec![])
///     }
/// }
/// ```
pub trait DetectionSource {
    /// Error type for detection failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Run inference on raw image data and return detections.
    ///
    /// # Arguments
    /// * `input` - Raw image bytes (format depends on implementation)
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    /// * `frame_index` - Index of the frame, to be stamped on every detection
    fn detect(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
        frame_index: u64,
    ) -> Result<Vec<Detection>, Self::Error>;
}

/// Helper trait for converting model-specific outputs to `Detection`.
pub trait IntoDetections {
    /// Convert the output into detections observed in `frame_index`.
    fn into_detections(self, frame_index: u64) -> Vec<Detection>;
}

impl IntoDetections for Vec<Detection> {
    fn into_detections(self, frame_index: u64) -> Vec<Detection> {
        self.into_iter()
            .map(|mut d| {
                d.frame_index = frame_index;
                d
            })
            .collect()
    }
}
