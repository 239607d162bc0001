use std::time::{Duration, Instant};

use log::trace;

/// Decides for each incoming frame whether it is processed or dropped.
///
/// Two gates cooperate:
/// - stride gate: only every `interval`-th frame is eligible, where
///   `interval = max(1, round(source_fps / target_fps))`;
/// - wall-clock gate: an eligible frame is admitted only if at least `1 / target_fps`
///   seconds passed since the previous admission.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    target_fps: f64,
    // Stride between eligible frames, never below 1
    interval: u64,
    // Minimum spacing between two admissions
    min_period: Duration,
    // Frames seen so far, dropped ones included
    frame_count: u64,
    last_processed: Option<Instant>,
}

impl FrameScheduler {
    /// Creates new scheduler for a source with native rate `source_fps`
    ///
    /// Basic usage:
    ///
    /// ```
    /// use cctv_track::pipeline::FrameScheduler;
    /// let scheduler = FrameScheduler::new(30.0, 10.0);
    /// assert_eq!(scheduler.interval(), 3);
    /// ```
    pub fn new(source_fps: f64, target_fps: f64) -> Self {
        FrameScheduler {
            target_fps,
            interval: stride_interval(source_fps, target_fps),
            min_period: min_period(target_fps),
            frame_count: 0,
            last_processed: None,
        }
    }
    /// Registers the next frame read from the source and reports whether it must be processed.
    /// The frame counter advances on every call, the admission time only on admission.
    pub fn admit(&mut self, now: Instant) -> bool {
        self.frame_count += 1;
        if self.frame_count % self.interval != 0 {
            return false;
        }
        if let Some(last) = self.last_processed {
            if now.saturating_duration_since(last) < self.min_period {
                trace!("Frame {}: dropped by wall-clock gate", self.frame_count);
                return false;
            }
        }
        self.last_processed = Some(now);
        true
    }
    /// Index of the last frame passed to `admit`. Frames are counted from 1
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
    pub fn interval(&self) -> u64 {
        self.interval
    }
    pub fn target_fps(&self) -> f64 {
        self.target_fps
    }
    pub fn min_period(&self) -> Duration {
        self.min_period
    }
    pub fn last_processed(&self) -> Option<Instant> {
        self.last_processed
    }
    /// Share of `total_frames` consumed so far, in percent. None when the total is unknown
    pub fn progress(&self, total_frames: u64) -> Option<f64> {
        if total_frames == 0 {
            return None;
        }
        Some(self.frame_count as f64 / total_frames as f64 * 100.0)
    }
}

// Zero, negative or non-finite rates fall back to processing every frame
fn stride_interval(source_fps: f64, target_fps: f64) -> u64 {
    if !(source_fps.is_finite() && source_fps > 0.0 && target_fps.is_finite() && target_fps > 0.0) {
        return 1;
    }
    let ratio = (source_fps / target_fps).round_ties_even();
    if ratio < 1.0 {
        return 1;
    }
    ratio as u64
}

fn min_period(target_fps: f64) -> Duration {
    if !(target_fps.is_finite() && target_fps > 0.0) {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(1.0 / target_fps)
}

use std::fmt;
impl fmt::Display for FrameScheduler {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Target FPS: {}\n\tStride interval: {}\n\tMinimum period: {:?}",
            self.target_fps, self.interval, self.min_period
        )
    }
}
