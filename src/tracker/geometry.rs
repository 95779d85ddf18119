//! Integer box geometry and the overlap metric used for association.
//!
//! Pixel coordinates are inclusive on both ends: a box spanning `left..=right`
//! covers `right - left + 1` columns. Two boxes that share an edge therefore
//! overlap by one row or column.

use std::fmt;

use ndarray::Array2;

use crate::error::{Result, TrackError};

/// Centroid of a bounding box in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[inline]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Axis-aligned bounding box: top-left corner plus width and height.
///
/// Width and height are expected to be non-negative. Zero-sized boxes are
/// legal and still cover a single pixel row/column under the inclusive
/// convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Top-left x coordinate
    pub x: i32,
    /// Top-left y coordinate
    pub y: i32,
    /// Width of the bounding box
    pub width: i32,
    /// Height of the bounding box
    pub height: i32,
}

impl Rect {
    /// Create a new Rect from top-left coordinates and dimensions (TLWH format).
    #[inline]
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        debug_assert!(width >= 0 && height >= 0, "negative box size");
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a Rect from TLBR format (top-left x, top-left y, bottom-right x, bottom-right y).
    #[inline]
    pub fn from_tlbr(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self::new(x1, y1, x2 - x1, y2 - y1)
    }

    #[inline]
    pub fn left(&self) -> i32 {
        self.x
    }

    #[inline]
    pub fn top(&self) -> i32 {
        self.y
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Convert to TLBR format: (x1, y1, x2, y2).
    #[inline]
    pub fn to_tlbr(&self) -> [i32; 4] {
        [self.left(), self.top(), self.right(), self.bottom()]
    }

    /// Convert to TLWH format: (x, y, width, height).
    #[inline]
    pub fn to_tlwh(&self) -> [i32; 4] {
        [self.x, self.y, self.width, self.height]
    }

    /// Midpoint of the box, truncated toward zero.
    #[inline]
    pub fn center(&self) -> Point {
        Point::new(
            (self.left() + self.right()) / 2,
            (self.top() + self.bottom()) / 2,
        )
    }

    /// Pixel area under the inclusive convention: `(w + 1) * (h + 1)`.
    #[inline]
    pub fn area(&self) -> i64 {
        let w = i64::from(self.right()) - i64::from(self.left()) + 1;
        let h = i64::from(self.bottom()) - i64::from(self.top()) + 1;
        w * h
    }

    /// Calculate Intersection over Union (IoU) with another bounding box.
    pub fn iou(&self, other: &Rect) -> Result<f64> {
        iou(self, other)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.x, self.y, self.width, self.height)
    }
}

/// Area of the overlap between two boxes, zero when they are disjoint.
pub fn intersection_area(a: &Rect, b: &Rect) -> i64 {
    let x1 = i64::from(a.left().max(b.left()));
    let y1 = i64::from(a.top().max(b.top()));
    let x2 = i64::from(a.right().min(b.right()));
    let y2 = i64::from(a.bottom().min(b.bottom()));

    let inter_width = (x2 - x1 + 1).max(0);
    let inter_height = (y2 - y1 + 1).max(0);
    inter_width * inter_height
}

/// Intersection over Union of two boxes, in `[0, 1]`.
///
/// Fails with [`TrackError::DegenerateGeometry`] when the union area is not
/// positive instead of silently reporting zero overlap.
pub fn iou(a: &Rect, b: &Rect) -> Result<f64> {
    let inter_area = intersection_area(a, b);
    let union_area = a.area() + b.area() - inter_area;

    if union_area <= 0 {
        return Err(TrackError::DegenerateGeometry { a: *a, b: *b });
    }
    Ok(inter_area as f64 / union_area as f64)
}

/// IoU between every pair of boxes.
///
/// Returns a matrix of shape (M, N) where M is the length of `boxes_a`
/// and N is the length of `boxes_b`.
pub fn iou_matrix(boxes_a: &[Rect], boxes_b: &[Rect]) -> Result<Array2<f64>> {
    let mut ious = Array2::zeros((boxes_a.len(), boxes_b.len()));
    for (i, a) in boxes_a.iter().enumerate() {
        for (j, b) in boxes_b.iter().enumerate() {
            ious[[i, j]] = iou(a, b)?;
        }
    }
    Ok(ious)
}
