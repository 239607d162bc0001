use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Local;
use log::{debug, error, info, warn};
use uuid::Uuid;

use crate::mot::{MatchStrategy, MatchingPolicy, TrackManager};
use crate::pipeline::{
    Clock, FrameScheduler, Output, Overlay, PresentControl, Recognition, Recognizer, SessionConfig,
    SessionSummary, SystemClock, Termination, VideoSource,
};

/// One video-processing session: scheduler state, track table and the recognizer driving them.
///
/// State is never reset: process each stream with a fresh session.
pub struct Session<R, C: Clock = SystemClock, M: MatchStrategy = MatchingPolicy> {
    session_id: Uuid,
    scheduler: FrameScheduler,
    tracker: TrackManager<M>,
    recognizer: R,
    clock: C,
}

impl<R, C: Clock> Session<R, C, MatchingPolicy> {
    /// Creates session for a source running at `source_fps`
    ///
    /// Basic usage:
    ///
    /// ```
    /// use cctv_track::pipeline::{ScriptedRecognizer, Session, SessionConfig, SystemClock};
    /// let config = SessionConfig::default();
    /// let session = Session::new(&config, 30.0, ScriptedRecognizer::default(), SystemClock);
    /// assert_eq!(session.scheduler().interval(), 3);
    /// ```
    pub fn new(config: &SessionConfig, source_fps: f64, recognizer: R, clock: C) -> Self {
        let scheduler = FrameScheduler::new(source_fps, config.target_fps);
        let tracker = TrackManager::new(config.max_staleness, config.unknown_label.clone(), config.matching);
        Session::with_parts(scheduler, tracker, recognizer, clock)
    }
}

impl<R, C: Clock, M: MatchStrategy> Session<R, C, M> {
    /// Assembles session from already configured parts
    pub fn with_parts(scheduler: FrameScheduler, tracker: TrackManager<M>, recognizer: R, clock: C) -> Self {
        Session {
            session_id: Uuid::new_v4(),
            scheduler,
            tracker,
            recognizer,
            clock,
        }
    }
    pub fn id(&self) -> Uuid {
        self.session_id
    }
    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }
    pub fn tracker(&self) -> &TrackManager<M> {
        &self.tracker
    }
    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }
    /// Processes `source` until it is exhausted, fails, the operator quits or `stop` is raised.
    ///
    /// `stop` is checked between frames only. Source and output are released on every exit path.
    /// Failures are handled here and end up in the returned summary, never propagated.
    pub fn run<S>(&mut self, source: &mut S, mut output: Output<'_, S::Frame>, stop: &AtomicBool) -> SessionSummary
    where
        S: VideoSource,
        R: Recognizer<S::Frame>,
    {
        let metadata = *source.metadata();
        let started_at = Local::now();
        let started = self.clock.now();
        info!(
            "Session {}: {:.1} FPS source, {} frames, {}x{}; processing at {} FPS (1 every {} frames), output: {}",
            self.session_id,
            metadata.fps,
            metadata.frames,
            metadata.width,
            metadata.height,
            self.scheduler.target_fps(),
            self.scheduler.interval(),
            output.kind()
        );

        let mut frames_read: u64 = 0;
        let mut frames_processed: u64 = 0;
        let termination = loop {
            if stop.load(Ordering::Relaxed) {
                info!("Session {}: stop requested", self.session_id);
                break Termination::Stopped;
            }
            let frame = match source.read_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break Termination::EndOfStream,
                Err(e) => {
                    error!("Session {}: source failed: {}", self.session_id, e);
                    break Termination::ReadFailure(e.to_string());
                }
            };
            frames_read += 1;

            if !self.scheduler.admit(self.clock.now()) {
                continue;
            }
            let frame_index = self.scheduler.frame_count();
            frames_processed += 1;

            let recognized = self.recognizer.recognize(frame);
            let Recognition { frame, results } = match recognized {
                Ok(recognition) => recognition,
                Err(e) => {
                    // Frame is lost, but staleness still advances
                    warn!("Frame {}: recognition failed: {}", frame_index, e);
                    self.tracker.update(&[], frame_index);
                    continue;
                }
            };
            self.tracker.update(&results, frame_index);
            debug!(
                "Frame {}: {} result(s), visible [{}]",
                frame_index,
                results.len(),
                self.tracker.describe_visible(frame_index)
            );

            let overlay = Overlay::compose(
                frame_index,
                &self.tracker,
                self.scheduler.progress(metadata.frames),
                metadata.height,
            );
            let mut output_failed = false;
            match &mut output {
                Output::Sink(sink) => {
                    if let Err(e) = sink.write_frame(&frame, &overlay) {
                        error!("Frame {}: sink write failed, output disabled: {}", frame_index, e);
                        if let Err(e) = sink.release() {
                            warn!("Session {}: sink release failed: {}", self.session_id, e);
                        }
                        output_failed = true;
                    }
                }
                Output::Display(presenter) => match presenter.present(&frame, &overlay) {
                    Ok(PresentControl::Continue) => {}
                    Ok(PresentControl::Quit) => {
                        info!("Session {}: quit requested at frame {}", self.session_id, frame_index);
                        break Termination::QuitRequested;
                    }
                    Err(e) => {
                        error!("Frame {}: display failed, output disabled: {}", frame_index, e);
                        presenter.release();
                        output_failed = true;
                    }
                },
                Output::Discard => {}
            }
            if output_failed {
                output = Output::Discard;
            }
        };

        source.release();
        match &mut output {
            Output::Sink(sink) => {
                if let Err(e) = sink.release() {
                    error!("Session {}: sink release failed: {}", self.session_id, e);
                }
            }
            Output::Display(presenter) => presenter.release(),
            Output::Discard => {}
        }

        let elapsed = self.clock.now().saturating_duration_since(started);
        let summary = SessionSummary {
            session_id: self.session_id,
            started_at,
            finished_at: Local::now(),
            frames_read,
            frames_processed,
            total_frames: metadata.frames,
            elapsed_secs: elapsed.as_secs_f64(),
            termination,
        };
        info!(
            "Session {}: {} of {} frames processed in {:.2}s ({:.2} FPS)",
            self.session_id,
            summary.frames_processed,
            summary.total_frames,
            summary.elapsed_secs,
            summary.throughput()
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mot::RecognitionResult;
    use crate::pipeline::{
        ManualClock, PipelineError, Presenter, ScriptedRecognizer, VideoMetadata, VideoSink,
    };
    use crate::utils::Rect;
    use std::time::Duration;

    struct VecSource {
        metadata: VideoMetadata,
        next: u64,
        fail_at: Option<u64>,
        released: usize,
    }

    impl VecSource {
        fn new(fps: f64, frames: u64) -> Self {
            VecSource {
                metadata: VideoMetadata {
                    fps,
                    frames,
                    width: 640,
                    height: 480,
                },
                next: 0,
                fail_at: None,
                released: 0,
            }
        }
    }

    impl VideoSource for VecSource {
        type Frame = u64;
        fn metadata(&self) -> &VideoMetadata {
            &self.metadata
        }
        fn read_frame(&mut self) -> Result<Option<u64>, PipelineError> {
            if self.fail_at == Some(self.next + 1) {
                return Err(PipelineError::SourceRead("corrupted packet".to_string()));
            }
            if self.next >= self.metadata.frames {
                return Ok(None);
            }
            self.next += 1;
            Ok(Some(self.next))
        }
        fn release(&mut self) {
            self.released += 1;
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        written: Vec<(u64, Overlay)>,
        fail_on_write: Option<usize>,
        attempts: usize,
        released: usize,
    }

    impl VideoSink<u64> for RecordingSink {
        fn write_frame(&mut self, frame: &u64, overlay: &Overlay) -> Result<(), PipelineError> {
            self.attempts += 1;
            if self.fail_on_write == Some(self.attempts) {
                return Err(PipelineError::SinkWrite("disk full".to_string()));
            }
            self.written.push((*frame, overlay.clone()));
            Ok(())
        }
        fn release(&mut self) -> Result<(), PipelineError> {
            self.released += 1;
            Ok(())
        }
    }

    struct QuittingPresenter {
        quit_after: usize,
        shown: usize,
        released: usize,
    }

    impl Presenter<u64> for QuittingPresenter {
        fn present(&mut self, _frame: &u64, _overlay: &Overlay) -> Result<PresentControl, PipelineError> {
            self.shown += 1;
            if self.shown >= self.quit_after {
                return Ok(PresentControl::Quit);
            }
            Ok(PresentControl::Continue)
        }
        fn release(&mut self) {
            self.released += 1;
        }
    }

    /// Recognizes `first` on the first call, fails on every later one
    struct FailingRecognizer {
        first: Option<Vec<RecognitionResult>>,
    }

    impl Recognizer<u64> for FailingRecognizer {
        fn recognize(&mut self, frame: u64) -> Result<Recognition<u64>, PipelineError> {
            match self.first.take() {
                Some(results) => Ok(Recognition { frame, results }),
                None => Err(PipelineError::Recognition(format!("model timeout on frame {}", frame))),
            }
        }
    }

    // 20 FPS source processed at 10 FPS in real time: every 2nd frame is admitted
    fn realtime_session(script: Vec<Vec<RecognitionResult>>) -> Session<ScriptedRecognizer, ManualClock> {
        let config = SessionConfig::default();
        let clock = ManualClock::new().with_step(Duration::from_millis(50));
        Session::new(&config, 20.0, ScriptedRecognizer::new(script), clock)
    }

    fn alice() -> RecognitionResult {
        RecognitionResult::new("Alice", Rect::new(10, 10, 50, 50))
    }

    #[test]
    fn test_end_of_stream() {
        let mut session = realtime_session(vec![
            vec![alice(), RecognitionResult::new("Unknown", Rect::new(0, 0, 5, 5))],
            vec![alice(), RecognitionResult::new("Bob", Rect::new(60, 60, 90, 90))],
        ]);
        let mut source = VecSource::new(20.0, 20);
        let mut sink = RecordingSink::default();
        let stop = AtomicBool::new(false);

        let summary = session.run(&mut source, Output::Sink(&mut sink), &stop);

        assert_eq!(summary.termination, Termination::EndOfStream);
        assert_eq!(summary.frames_read, 20);
        assert_eq!(summary.frames_processed, 10);
        assert_eq!(summary.total_frames, 20);
        assert_eq!(session.recognizer().calls(), 10);

        let indices: Vec<u64> = sink.written.iter().map(|(_, overlay)| overlay.frame_index).collect();
        assert_eq!(indices, vec![2, 4, 6, 8, 10, 12, 14, 16, 18, 20]);
        // Recognizer hands back the very frame it received
        assert_eq!(sink.written[0].0, 2);
        assert_eq!(sink.written[1].1.boxes.len(), 2);
        assert_eq!(sink.written[2].1.boxes.len(), 0);
        assert_eq!(sink.written[9].1.texts[2].text, "Progress: 100.0%");

        assert_eq!(session.tracker().len(), 2);
        assert_eq!(session.tracker().get(1).unwrap().get_last_seen(), 4);
        assert_eq!(source.released, 1);
        assert_eq!(sink.released, 1);
    }

    #[test]
    fn test_wall_clock_gate_limits_fast_source() {
        // Frames arrive every 10ms although the source claims 20 FPS
        let config = SessionConfig::default();
        let clock = ManualClock::new().with_step(Duration::from_millis(10));
        let mut session = Session::new(&config, 20.0, ScriptedRecognizer::default(), clock);
        let mut source = VecSource::new(20.0, 50);
        let stop = AtomicBool::new(false);

        let summary = session.run(&mut source, Output::Discard, &stop);
        assert_eq!(summary.frames_read, 50);
        assert_eq!(summary.frames_processed, 5);
    }

    #[test]
    fn test_stop_signal() {
        let mut session = realtime_session(vec![]);
        let mut source = VecSource::new(20.0, 20);
        let mut sink = RecordingSink::default();
        let stop = AtomicBool::new(true);

        let summary = session.run(&mut source, Output::Sink(&mut sink), &stop);
        assert_eq!(summary.termination, Termination::Stopped);
        assert_eq!(summary.frames_read, 0);
        assert!(sink.written.is_empty());
        assert_eq!(source.released, 1);
        assert_eq!(sink.released, 1);
    }

    #[test]
    fn test_quit_from_display() {
        let mut session = realtime_session(vec![vec![alice()]]);
        let mut source = VecSource::new(20.0, 20);
        let mut presenter = QuittingPresenter {
            quit_after: 3,
            shown: 0,
            released: 0,
        };
        let stop = AtomicBool::new(false);

        let summary = session.run(&mut source, Output::Display(&mut presenter), &stop);
        assert_eq!(summary.termination, Termination::QuitRequested);
        assert_eq!(summary.frames_processed, 3);
        assert_eq!(summary.frames_read, 6);
        assert_eq!(presenter.released, 1);
        assert_eq!(source.released, 1);
    }

    #[test]
    fn test_read_failure_ends_session() {
        let mut session = realtime_session(vec![]);
        let mut source = VecSource::new(20.0, 20);
        source.fail_at = Some(7);
        let mut sink = RecordingSink::default();
        let stop = AtomicBool::new(false);

        let summary = session.run(&mut source, Output::Sink(&mut sink), &stop);
        assert!(matches!(summary.termination, Termination::ReadFailure(_)));
        assert_eq!(summary.frames_read, 6);
        assert_eq!(summary.frames_processed, 3);
        assert_eq!(source.released, 1);
        assert_eq!(sink.released, 1);
    }

    #[test]
    fn test_sink_failure_disables_output() {
        let mut session = realtime_session(vec![vec![alice()]]);
        let mut source = VecSource::new(20.0, 20);
        let mut sink = RecordingSink {
            fail_on_write: Some(2),
            ..Default::default()
        };
        let stop = AtomicBool::new(false);

        let summary = session.run(&mut source, Output::Sink(&mut sink), &stop);
        assert_eq!(summary.termination, Termination::EndOfStream);
        assert_eq!(summary.frames_processed, 10);
        assert_eq!(sink.attempts, 2);
        assert_eq!(sink.written.len(), 1);
        assert_eq!(sink.released, 1);
    }

    #[test]
    fn test_recognition_failure_skips_rendering() {
        let config = SessionConfig::default();
        let clock = ManualClock::new().with_step(Duration::from_millis(50));
        let recognizer = FailingRecognizer { first: Some(vec![alice()]) };
        let mut session = Session::new(&config, 20.0, recognizer, clock);
        let mut source = VecSource::new(20.0, 80);
        let mut sink = RecordingSink::default();
        let stop = AtomicBool::new(false);

        let summary = session.run(&mut source, Output::Sink(&mut sink), &stop);
        assert_eq!(summary.termination, Termination::EndOfStream);
        assert_eq!(summary.frames_processed, 40);
        assert_eq!(sink.attempts, 1);
        assert_eq!(sink.written[0].1.frame_index, 2);
        // Seen at frame 2, gone once failed frames push staleness past 30
        assert!(session.tracker().is_empty());
        assert_eq!(sink.released, 1);
    }

    #[test]
    fn test_elapsed_and_throughput() {
        let mut session = realtime_session(vec![]);
        let mut source = VecSource::new(20.0, 20);
        let stop = AtomicBool::new(false);

        let summary = session.run(&mut source, Output::Discard, &stop);
        // One clock reading at start, one per frame read, plus the final one
        assert!((summary.elapsed_secs - 1.05).abs() < 1e-9);
        assert!((summary.throughput() - 10.0 / 1.05).abs() < 1e-9);
    }
}
