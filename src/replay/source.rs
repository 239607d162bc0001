use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info};
use serde::Deserialize;

use crate::mot::RecognitionResult;
use crate::pipeline::{PipelineError, VideoMetadata, VideoSource};

/// Frame of a recorded capture together with the recognizer output stored for it
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayFrame {
    pub index: u64,
    pub width: u32,
    pub height: u32,
    pub results: Vec<RecognitionResult>,
}

#[derive(Debug, Deserialize)]
struct FrameRecord {
    frame: u64,
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

/// Video source backed by a JSON lines capture.
///
/// The first line is the stream header, e.g. `{"fps":30.0,"frames":300,"width":1280,"height":720}`.
/// Following lines are sparse per-frame records in increasing frame order,
/// e.g. `{"frame":12,"results":[{"name":"Alice","bbox":[10,10,50,50]}]}`.
/// Frames without a record carry no results. With `frames` unknown (0) the stream ends
/// after the last record.
pub struct ReplaySource<B: BufRead> {
    metadata: VideoMetadata,
    lines: Lines<B>,
    line_no: usize,
    pending: Option<FrameRecord>,
    exhausted: bool,
    next_index: u64,
    // Sleep between reads to emulate a live source
    pace: Option<Duration>,
    last_read: Option<Instant>,
    released: bool,
}

impl ReplaySource<BufReader<File>> {
    /// Opens capture file. Failures are reported as `PipelineError::SourceOpen`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| PipelineError::SourceOpen(format!("{}: {}", path.display(), e)))?;
        let source = ReplaySource::from_reader(BufReader::new(file))?;
        info!(
            "Opened {}: {:.1} FPS, {} frames, {}x{}",
            path.display(),
            source.metadata.fps,
            source.metadata.frames,
            source.metadata.width,
            source.metadata.height
        );
        Ok(source)
    }
}

impl<B: BufRead> ReplaySource<B> {
    pub fn from_reader(reader: B) -> Result<Self, PipelineError> {
        let mut lines = reader.lines();
        let mut line_no = 0;
        let header = loop {
            line_no += 1;
            match lines.next() {
                Some(Ok(line)) if line.trim().is_empty() => continue,
                Some(Ok(line)) => break line,
                Some(Err(e)) => return Err(PipelineError::SourceOpen(e.to_string())),
                None => return Err(PipelineError::SourceOpen("capture has no header".to_string())),
            }
        };
        let metadata: VideoMetadata = serde_json::from_str(&header)
            .map_err(|e| PipelineError::SourceOpen(format!("bad header: {}", e)))?;
        Ok(ReplaySource {
            metadata,
            lines,
            line_no,
            pending: None,
            exhausted: false,
            next_index: 0,
            pace: None,
            last_read: None,
            released: false,
        })
    }
    /// Builder pattern to pace reads at the native frame rate
    pub fn paced(mut self) -> Self {
        if self.metadata.fps.is_finite() && self.metadata.fps > 0.0 {
            self.pace = Some(Duration::from_secs_f64(1.0 / self.metadata.fps));
        }
        self
    }
    // Loads next record unless one is already waiting
    fn fill_pending(&mut self) -> Result<(), PipelineError> {
        if self.pending.is_some() || self.exhausted {
            return Ok(());
        }
        for line in self.lines.by_ref() {
            self.line_no += 1;
            let line = line.map_err(|e| PipelineError::SourceRead(format!("line {}: {}", self.line_no, e)))?;
            if line.trim().is_empty() {
                continue;
            }
            let record: FrameRecord = serde_json::from_str(&line)
                .map_err(|e| PipelineError::SourceRead(format!("line {}: {}", self.line_no, e)))?;
            self.pending = Some(record);
            return Ok(());
        }
        self.exhausted = true;
        Ok(())
    }
    fn wait_pace(&mut self) {
        if let Some(period) = self.pace {
            if let Some(last) = self.last_read {
                let elapsed = last.elapsed();
                if elapsed < period {
                    thread::sleep(period - elapsed);
                }
            }
            self.last_read = Some(Instant::now());
        }
    }
}

impl<B: BufRead> VideoSource for ReplaySource<B> {
    type Frame = ReplayFrame;

    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    fn read_frame(&mut self) -> Result<Option<ReplayFrame>, PipelineError> {
        if self.released {
            return Ok(None);
        }
        if self.metadata.frames > 0 && self.next_index >= self.metadata.frames {
            return Ok(None);
        }
        self.fill_pending()?;
        if self.metadata.frames == 0 && self.pending.is_none() {
            return Ok(None);
        }
        self.next_index += 1;
        let results = match self.pending.as_ref().map(|record| record.frame) {
            Some(frame) if frame < self.next_index => {
                return Err(PipelineError::SourceRead(format!(
                    "line {}: record for frame {} is out of order",
                    self.line_no, frame
                )));
            }
            Some(frame) if frame == self.next_index => {
                self.pending.take().map(|record| record.results).unwrap_or_default()
            }
            _ => Vec::new(),
        };
        self.wait_pace();
        Ok(Some(ReplayFrame {
            index: self.next_index,
            width: self.metadata.width,
            height: self.metadata.height,
            results,
        }))
    }

    fn release(&mut self) {
        if !self.released {
            debug!("Replay source released after {} frames", self.next_index);
        }
        self.released = true;
        self.pending = None;
    }
}
