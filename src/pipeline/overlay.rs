use serde::Serialize;

use crate::mot::{MatchStrategy, TrackId, TrackManager};
use crate::utils::{Point, Rect};

/// Vertical offset of a track label above its box
const LABEL_OFFSET: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Green,
    Red,
}

/// Box drawn around a visible track
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxAnnotation {
    pub track_id: TrackId,
    pub bbox: Rect,
    pub label: String,
    pub label_origin: Point,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextAnnotation {
    pub text: String,
    pub origin: Point,
    pub color: Color,
    pub scale: f32,
}

/// Drawing instructions for one processed frame. The external renderer paints them on top
/// of whatever the recognizer already drew on the frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    pub frame_index: u64,
    pub boxes: Vec<BoxAnnotation>,
    pub texts: Vec<TextAnnotation>,
}

impl Overlay {
    /// Builds the overlay for `frame_index` from the tracks visible in that frame.
    /// `progress` is the share of the stream consumed, in percent, if the total is known.
    pub fn compose<M: MatchStrategy>(
        frame_index: u64,
        tracks: &TrackManager<M>,
        progress: Option<f64>,
        frame_height: u32,
    ) -> Self {
        let boxes = tracks
            .visible_tracks(frame_index)
            .map(|track| {
                let bbox = track.get_bbox();
                let corner = bbox.top_left();
                let color = if track.get_name() == tracks.get_unknown_label() {
                    Color::Red
                } else {
                    Color::Green
                };
                BoxAnnotation {
                    track_id: track.get_id(),
                    bbox,
                    label: format!("ID:{} {}", track.get_id(), track.get_name()),
                    label_origin: Point::new(corner.x, corner.y.saturating_sub(LABEL_OFFSET)),
                    color,
                }
            })
            .collect();

        let mut texts = vec![
            TextAnnotation {
                text: format!("Frame: {}", frame_index),
                origin: Point::new(10, 30),
                color: Color::Red,
                scale: 0.6,
            },
            TextAnnotation {
                text: format!("Tracking: {} persons", tracks.len()),
                origin: Point::new(10, 60),
                color: Color::Red,
                scale: 0.6,
            },
        ];
        if let Some(p) = progress {
            texts.push(TextAnnotation {
                text: format!("Progress: {:.1}%", p),
                origin: Point::new(10, i32::try_from(frame_height).unwrap_or(i32::MAX).saturating_sub(20)),
                color: Color::Green,
                scale: 0.6,
            });
        }

        Overlay {
            frame_index,
            boxes,
            texts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mot::{MatchingPolicy, RecognitionResult};

    #[test]
    fn test_compose() {
        let mut manager = TrackManager::default();
        manager.update(&[RecognitionResult::new("Bob", Rect::new(5, 5, 10, 10))], 3);
        manager.update(&[RecognitionResult::new("Alice", Rect::new(10, 20, 50, 60))], 6);

        let overlay = Overlay::compose(6, &manager, Some(12.5), 720);
        assert_eq!(overlay.boxes.len(), 1);
        let alice = &overlay.boxes[0];
        assert_eq!(alice.track_id, 2);
        assert_eq!(alice.label, "ID:2 Alice");
        assert_eq!(alice.label_origin, Point::new(10, 10));
        assert_eq!(alice.color, Color::Green);

        let texts: Vec<&str> = overlay.texts.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Frame: 6", "Tracking: 2 persons", "Progress: 12.5%"]);
        assert_eq!(overlay.texts[2].origin, Point::new(10, 700));
    }

    #[test]
    fn test_reserved_label_not_boxed() {
        let mut manager = TrackManager::new(30, "<none>", MatchingPolicy::Label);
        manager.update(&[RecognitionResult::new("<none>", Rect::new(0, 0, 1, 1))], 1);
        assert!(manager.is_empty());

        let mut manager = TrackManager::new(30, "Unknown", MatchingPolicy::Label);
        manager.update(&[RecognitionResult::new("Alice", Rect::new(0, 0, 1, 1))], 1);
        let overlay = Overlay::compose(1, &manager, None, 480);
        assert_eq!(overlay.boxes[0].color, Color::Green);
        assert_eq!(overlay.texts.len(), 2);
    }

    #[test]
    fn test_label_origin_at_coordinate_limit() {
        let mut manager = TrackManager::default();
        manager.update(&[RecognitionResult::new("Alice", Rect::new(0, i32::MIN, 10, 10))], 1);
        let overlay = Overlay::compose(1, &manager, Some(1.0), u32::MAX);
        assert_eq!(overlay.boxes[0].label_origin, Point::new(0, i32::MIN));
        assert_eq!(overlay.texts[2].origin, Point::new(10, i32::MAX - 20));
    }
}
