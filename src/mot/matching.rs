use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::mot::{RecognitionResult, Track, TrackId};
use crate::utils::iou;

/// Insertion-ordered track storage. Iteration order is the tie-break order for matching
pub type TrackTable = IndexMap<TrackId, Track>;

/// Common interface for associating a recognition result with an existing track.
///
/// Implementations only pick a candidate: expiry, creation and updates stay in `TrackManager`.
///
/// Implementations:
/// - `LabelMatch` - identity label equality, first track in table order wins
/// - `LabelIoUMatch` - label equality gated by bounding box overlap
/// - `MatchingPolicy` - runtime selection between the two
pub trait MatchStrategy {
    fn match_track(&self, tracks: &TrackTable, result: &RecognitionResult) -> Option<TrackId>;
}

/// Matches purely on identity label. A label is assumed to correspond to at most one subject
/// in frame, so this strategy never lets two tracks share a label.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LabelMatch;

impl MatchStrategy for LabelMatch {
    fn match_track(&self, tracks: &TrackTable, result: &RecognitionResult) -> Option<TrackId> {
        tracks
            .values()
            .find(|track| track.get_name() == result.name)
            .map(|track| track.get_id())
    }
}

/// Matches on identity label and requires the last observed box to overlap the new one
/// by at least `min_iou`. Among several candidates the highest IoU wins, earliest track on ties.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelIoUMatch {
    pub min_iou: f32,
}

impl LabelIoUMatch {
    pub fn new(min_iou: f32) -> Self {
        LabelIoUMatch { min_iou }
    }
}

impl MatchStrategy for LabelIoUMatch {
    fn match_track(&self, tracks: &TrackTable, result: &RecognitionResult) -> Option<TrackId> {
        let bbox = result.bbox_or_default();
        let mut best: Option<(TrackId, f32)> = None;
        for track in tracks.values().filter(|track| track.get_name() == result.name) {
            let overlap = iou(&track.get_bbox(), &bbox);
            if overlap < self.min_iou {
                continue;
            }
            // Strict comparison keeps the earliest track on equal overlap
            match best {
                Some((_, best_overlap)) if overlap <= best_overlap => {}
                _ => best = Some((track.get_id(), overlap)),
            }
        }
        best.map(|(id, _)| id)
    }
}

/// Strategy selected from configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchingPolicy {
    /// Identity label equality only
    #[default]
    Label,
    /// Identity label equality plus minimum bounding box overlap
    LabelIou { min_iou: f32 },
}

impl MatchStrategy for MatchingPolicy {
    fn match_track(&self, tracks: &TrackTable, result: &RecognitionResult) -> Option<TrackId> {
        match self {
            MatchingPolicy::Label => LabelMatch.match_track(tracks, result),
            MatchingPolicy::LabelIou { min_iou } => {
                LabelIoUMatch::new(*min_iou).match_track(tracks, result)
            }
        }
    }
}

use std::fmt;
impl fmt::Display for MatchingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MatchingPolicy::Label => write!(f, "label"),
            MatchingPolicy::LabelIou { min_iou } => write!(f, "label+iou>={}", min_iou),
        }
    }
}
