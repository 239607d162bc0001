use std::collections::HashSet;

use itertools::Itertools;
use log::debug;

use crate::mot::{MatchStrategy, MatchingPolicy, RecognitionResult, Track, TrackId, TrackTable, UNKNOWN_LABEL};

/// Default staleness threshold in frames
pub const DEFAULT_MAX_STALENESS: u64 = 30;

/// Turns per-frame recognition results into identity-stable tracks
pub struct TrackManager<M: MatchStrategy = MatchingPolicy> {
    // Max number of frames a track survives without being observed. Default is 30
    max_staleness: u64,
    // Results carrying this label are rendered but never tracked. Default is "Unknown"
    unknown_label: String,
    // Next identifier to hand out
    next_id: TrackId,
    strategy: M,
    // Storage
    tracks: TrackTable,
}

impl Default for TrackManager<MatchingPolicy> {
    /// Creates default instance of TrackManager
    ///
    /// Basic usage:
    ///
    /// ```
    /// use cctv_track::mot::TrackManager;
    /// let manager = TrackManager::default();
    /// assert!(manager.is_empty());
    /// ```
    fn default() -> Self {
        TrackManager::new(DEFAULT_MAX_STALENESS, UNKNOWN_LABEL, MatchingPolicy::Label)
    }
}

impl<M: MatchStrategy> TrackManager<M> {
    /// Creates new instance of TrackManager
    ///
    /// Basic usage:
    ///
    /// ```
    /// use cctv_track::mot::{LabelIoUMatch, TrackManager};
    /// let max_staleness: u64 = 45;
    /// let manager = TrackManager::new(max_staleness, "Unknown", LabelIoUMatch::new(0.3));
    /// ```
    pub fn new<S: Into<String>>(_max_staleness: u64, _unknown_label: S, _strategy: M) -> Self {
        TrackManager {
            max_staleness: _max_staleness,
            unknown_label: _unknown_label.into(),
            next_id: 1,
            strategy: _strategy,
            tracks: TrackTable::new(),
        }
    }
    /// Applies results of the admitted frame `frame_index`.
    ///
    /// Stale tracks are expired first, then every result is matched against the table
    /// in the order received. Only the first result applied to a track in a given
    /// cycle counts: later results resolving to the same track are consumed silently.
    pub fn update(&mut self, results: &[RecognitionResult], frame_index: u64) {
        self.expire(frame_index);

        let mut touched: HashSet<TrackId> = HashSet::new();
        for result in results {
            if result.name == self.unknown_label {
                continue;
            }
            match self.strategy.match_track(&self.tracks, result) {
                Some(id) => {
                    if !touched.insert(id) {
                        debug!("Frame {}: duplicate result for track {} ({}) ignored", frame_index, id, result.name);
                        continue;
                    }
                    if let Some(track) = self.tracks.get_mut(&id) {
                        track.update(result, frame_index);
                    }
                }
                None => {
                    let id = self.next_id;
                    self.next_id += 1;
                    self.tracks.insert(id, Track::new(id, result, frame_index));
                    touched.insert(id);
                    debug!("Frame {}: new track {} ({})", frame_index, id, result.name);
                }
            }
        }
    }
    // Removes every track not observed within the staleness window
    fn expire(&mut self, frame_index: u64) {
        let max_staleness = self.max_staleness;
        let before = self.tracks.len();
        self.tracks.retain(|_, track| {
            let delete = track.staleness(frame_index) > max_staleness;
            !delete // <- if we want to keep track closure should return true
        });
        if self.tracks.len() != before {
            debug!("Frame {}: expired {} track(s)", frame_index, before - self.tracks.len());
        }
    }
    /// Tracks observed in `frame_index`, in table order
    pub fn visible_tracks(&self, frame_index: u64) -> impl Iterator<Item = &Track> {
        self.tracks.values().filter(move |track| track.is_visible(frame_index))
    }
    /// Comma-separated `id:name` list of visible tracks, for logging
    pub fn describe_visible(&self, frame_index: u64) -> String {
        self.visible_tracks(frame_index)
            .map(|track| format!("{}:{}", track.get_id(), track.get_name()))
            .join(", ")
    }
    pub fn tracks(&self) -> &TrackTable {
        &self.tracks
    }
    pub fn get(&self, id: TrackId) -> Option<&Track> {
        self.tracks.get(&id)
    }
    pub fn len(&self) -> usize {
        self.tracks.len()
    }
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
    pub fn get_max_staleness(&self) -> u64 {
        self.max_staleness
    }
    pub fn get_unknown_label(&self) -> &str {
        &self.unknown_label
    }
    pub fn get_strategy(&self) -> &M {
        &self.strategy
    }
}

use std::fmt;
impl<M: MatchStrategy> fmt::Display for TrackManager<M> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Maximum staleness: {}\n\tUnknown label: {}\n\tActive tracks: {}",
            self.max_staleness,
            self.unknown_label,
            self.tracks.len()
        )
    }
}
