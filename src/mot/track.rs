use serde::Serialize;

use crate::mot::RecognitionResult;
use crate::utils::Rect;

/// Integer identifier of a track. Starts at 1 and is never reused
pub type TrackId = u64;

/// Persistent identity record spanning several frames
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    id: TrackId,
    name: String,
    bbox: Rect,
    confidence: Option<f32>,
    first_seen: u64,
    last_seen: u64,
    hits: usize,
}

impl Track {
    /// Registers new track from the result observed at `frame_index`
    pub fn new(id: TrackId, result: &RecognitionResult, frame_index: u64) -> Self {
        Track {
            id,
            name: result.name.clone(),
            bbox: result.bbox_or_default(),
            confidence: result.confidence,
            first_seen: frame_index,
            last_seen: frame_index,
            hits: 1,
        }
    }
    pub fn get_id(&self) -> TrackId {
        self.id
    }
    pub fn get_name(&self) -> &str {
        &self.name
    }
    pub fn get_bbox(&self) -> Rect {
        self.bbox
    }
    pub fn get_confidence(&self) -> Option<f32> {
        self.confidence
    }
    pub fn get_first_seen(&self) -> u64 {
        self.first_seen
    }
    pub fn get_last_seen(&self) -> u64 {
        self.last_seen
    }
    /// Number of results applied to this track, creation included
    pub fn get_hits(&self) -> usize {
        self.hits
    }
    /// Frames elapsed since the track was last observed
    pub fn staleness(&self, frame_index: u64) -> u64 {
        frame_index.saturating_sub(self.last_seen)
    }
    pub fn is_visible(&self, frame_index: u64) -> bool {
        self.last_seen == frame_index
    }
    // Apply newly observed location
    pub fn update(&mut self, result: &RecognitionResult, frame_index: u64) {
        self.bbox = result.bbox_or_default();
        self.confidence = result.confidence;
        self.last_seen = frame_index;
        self.hits += 1;
    }
}
