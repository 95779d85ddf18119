//! Builder for creating Detection objects from various input formats.

use image::DynamicImage;

use crate::tracker::{Detection, Rect};

/// Builder for creating `Detection` objects from various input formats.
#[derive(Debug, Clone, Default)]
pub struct DetectionBuilder {
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
    category: String,
    frame_index: u64,
    crop: Option<DynamicImage>,
    mask: Option<DynamicImage>,
}

impl DetectionBuilder {
    /// Create a new detection builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set bounding box in TLBR format (x1, y1, x2, y2).
    pub fn tlbr(mut self, x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        self.x1 = x1;
        self.y1 = y1;
        self.x2 = x2;
        self.y2 = y2;
        self
    }

    /// Set bounding box in XYWH format (center_x, center_y, width, height).
    pub fn xywh(mut self, cx: i32, cy: i32, w: i32, h: i32) -> Self {
        self.x1 = cx - w / 2;
        self.y1 = cy - h / 2;
        self.x2 = self.x1 + w;
        self.y2 = self.y1 + h;
        self
    }

    /// Set bounding box in TLWH format (left, top, width, height).
    pub fn tlwh(mut self, x: i32, y: i32, w: i32, h: i32) -> Self {
        self.x1 = x;
        self.y1 = y;
        self.x2 = x + w;
        self.y2 = y + h;
        self
    }

    /// Set the class label.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the frame the detection was observed in.
    pub fn frame(mut self, frame_index: u64) -> Self {
        self.frame_index = frame_index;
        self
    }

    /// Attach the rendered crop of the object.
    pub fn crop(mut self, crop: DynamicImage) -> Self {
        self.crop = Some(crop);
        self
    }

    /// Attach the segmentation mask of the object.
    pub fn mask(mut self, mask: DynamicImage) -> Self {
        self.mask = Some(mask);
        self
    }

    /// Build the final `Detection`.
    pub fn build(self) -> Detection {
        Detection {
            bbox: Rect::from_tlbr(self.x1, self.y1, self.x2, self.y2),
            category: self.category,
            frame_index: self.frame_index,
            crop: self.crop,
            mask: self.mask,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_builder() {
        let det = DetectionBuilder::new()
            .tlbr(10, 20, 50, 80)
            .category("person")
            .frame(4)
            .crop(DynamicImage::new_rgb8(40, 60))
            .build();

        assert_eq!(det.bbox, Rect::new(10, 20, 40, 60));
        assert_eq!(det.category, "person");
        assert_eq!(det.frame_index, 4);
        assert!(!det.has_empty_crop());
        assert!(det.mask.is_none());
    }

    #[test]
    fn test_box_formats_agree() {
        let a = DetectionBuilder::new().tlwh(10, 20, 40, 60).build();
        let b = DetectionBuilder::new().xywh(30, 50, 40, 60).build();
        assert_eq!(a.bbox, b.bbox);
    }
}
