use serde::{Deserialize, Serialize};

use crate::utils::Rect;

/// Reserved identity label for detections the recognizer could not identify
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Single detection produced by the recognizer for one frame.
///
/// The bounding box is optional on the wire: a result without one is tolerated
/// and treated as the zero-area rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Rect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl RecognitionResult {
    /// Creates new result with bounding box and no confidence
    ///
    /// Basic usage:
    ///
    /// ```
    /// use cctv_track::mot::RecognitionResult;
    /// use cctv_track::utils::Rect;
    /// let result = RecognitionResult::new("Alice", Rect::new(10, 10, 50, 50));
    /// assert_eq!(result.name, "Alice");
    /// ```
    pub fn new<S: Into<String>>(name: S, bbox: Rect) -> Self {
        RecognitionResult {
            name: name.into(),
            bbox: Some(bbox),
            confidence: None,
        }
    }
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }
    /// Bounding box or zero rectangle for malformed results
    pub fn bbox_or_default(&self) -> Rect {
        self.bbox.unwrap_or_default()
    }
}
