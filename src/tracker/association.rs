//! Outcome of associating one detection.

use std::fmt;

use crate::tracker::track::Color;

/// Why the best-scoring candidate track was not extended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// IoU below the acceptance threshold.
    LowIou,
    /// Candidate track has a different category.
    CategoryMismatch,
    /// Detection has no usable crop.
    EmptyCrop,
    /// Candidate was last updated too many frames ago.
    Stale,
    /// Candidate passed every gate but the frame-level assignment gave it to
    /// another detection.
    Contested,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::LowIou => "iou below threshold",
            Self::CategoryMismatch => "category mismatch",
            Self::EmptyCrop => "empty crop",
            Self::Stale => "track stale",
            Self::Contested => "assigned to another detection",
        };
        f.write_str(s)
    }
}

/// Best candidate that was considered and turned down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RejectedCandidate {
    /// Store position of the candidate
    pub index: usize,
    pub track_id: u64,
    pub iou: f64,
    pub reason: Rejection,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Association {
    /// The detection extended an existing track.
    Matched {
        index: usize,
        track_id: u64,
        iou: f64,
        color: Color,
    },
    /// The detection founded a new track. `rejected` is `None` when there was
    /// no candidate at all.
    Created {
        index: usize,
        track_id: u64,
        color: Color,
        rejected: Option<RejectedCandidate>,
    },
}

impl Association {
    /// Store position of the matched or created track.
    pub fn index(&self) -> usize {
        match self {
            Self::Matched { index, .. } | Self::Created { index, .. } => *index,
        }
    }

    pub fn track_id(&self) -> u64 {
        match self {
            Self::Matched { track_id, .. } | Self::Created { track_id, .. } => *track_id,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Matched { color, .. } | Self::Created { color, .. } => *color,
        }
    }

    /// Matched IoU, or the best rejected IoU for a new track.
    pub fn iou(&self) -> Option<f64> {
        match self {
            Self::Matched { iou, .. } => Some(*iou),
            Self::Created { rejected, .. } => rejected.map(|r| r.iou),
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }

    pub fn rejected(&self) -> Option<&RejectedCandidate> {
        match self {
            Self::Matched { .. } => None,
            Self::Created { rejected, .. } => rejected.as_ref(),
        }
    }
}
