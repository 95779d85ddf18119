//! Detection input and frame-level assignment utilities.

use image::DynamicImage;
use ndarray::Array2;
use tracing::warn;

use crate::tracker::artifacts::is_empty_image;
use crate::tracker::geometry::{Point, Rect};

/// One object observed by the detector in a single frame.
#[derive(Debug, Clone)]
pub struct Detection {
    /// Bounding box in TLWH format
    pub bbox: Rect,
    /// Object class label
    pub category: String,
    /// Frame the detection was observed in
    pub frame_index: u64,
    /// Rendered crop of the object, if the detector produced one
    pub crop: Option<DynamicImage>,
    /// Segmentation mask of the object, if the detector produced one
    pub mask: Option<DynamicImage>,
}

impl Detection {
    pub fn new(bbox: Rect, category: impl Into<String>, frame_index: u64) -> Self {
        Self {
            bbox,
            category: category.into(),
            frame_index,
            crop: None,
            mask: None,
        }
    }

    pub fn with_crop(mut self, crop: DynamicImage) -> Self {
        self.crop = Some(crop);
        self
    }

    pub fn with_mask(mut self, mask: DynamicImage) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn centroid(&self) -> Point {
        self.bbox.center()
    }

    /// True when the crop is absent or zero-sized. Such detections never
    /// extend an existing track.
    pub fn has_empty_crop(&self) -> bool {
        is_empty_image(self.crop.as_ref())
    }
}

#[derive(Debug, Clone)]
pub struct AssignmentResult {
    /// (row, column) pairs
    pub matches: Vec<(usize, usize)>,
    pub unmatched_rows: Vec<usize>,
    pub unmatched_cols: Vec<usize>,
}

/// Minimum-cost assignment of rows to columns. Pairs costing more than
/// `thresh` are left unmatched.
pub fn linear_assignment(cost_matrix: &Array2<f64>, thresh: f64) -> AssignmentResult {
    let (num_rows, num_cols) = cost_matrix.dim();

    if num_rows == 0 || num_cols == 0 {
        return AssignmentResult {
            matches: vec![],
            unmatched_rows: (0..num_rows).collect(),
            unmatched_cols: (0..num_cols).collect(),
        };
    }

    let size = num_rows.max(num_cols);
    let mut padded = Array2::<f64>::from_elem((size, size), 1e6);
    padded
        .slice_mut(ndarray::s![..num_rows, ..num_cols])
        .assign(cost_matrix);

    let mut matches = vec![];
    let mut unmatched_rows = vec![];
    let mut unmatched_cols_mask: Vec<bool> = vec![true; num_cols];

    match lapjv::lapjv(&padded) {
        Ok((row_to_col, _)) => {
            for (row_idx, &col_idx) in row_to_col.iter().enumerate().take(num_rows) {
                if col_idx < num_cols && cost_matrix[[row_idx, col_idx]] <= thresh {
                    matches.push((row_idx, col_idx));
                    unmatched_cols_mask[col_idx] = false;
                } else {
                    unmatched_rows.push(row_idx);
                }
            }
        }
        Err(err) => {
            warn!(error = ?err, rows = num_rows, cols = num_cols, "assignment solver failed");
            unmatched_rows = (0..num_rows).collect();
        }
    }

    let unmatched_cols = unmatched_cols_mask
        .iter()
        .enumerate()
        .filter_map(|(i, &u)| u.then_some(i))
        .collect();

    AssignmentResult {
        matches,
        unmatched_rows,
        unmatched_cols,
    }
}
