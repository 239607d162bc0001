use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;
use serde::Serialize;

use crate::pipeline::{Overlay, PipelineError, VideoSink};
use crate::replay::ReplayFrame;

#[derive(Serialize)]
struct SinkRecord<'a> {
    frame: u64,
    width: u32,
    height: u32,
    overlay: &'a Overlay,
}

/// Sink writing one JSON object per processed frame: the source frame index,
/// its dimensions and the overlay to draw on it
pub struct JsonLinesSink<W: Write> {
    writer: W,
    written: u64,
}

impl JsonLinesSink<BufWriter<File>> {
    /// Creates output file. Failures are reported as `PipelineError::SinkInit`
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let file = File::create(path)
            .map_err(|e| PipelineError::SinkInit(format!("{}: {}", path.display(), e)))?;
        info!("Writing overlays to {}", path.display());
        Ok(JsonLinesSink::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        JsonLinesSink { writer, written: 0 }
    }
    pub fn written(&self) -> u64 {
        self.written
    }
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> VideoSink<ReplayFrame> for JsonLinesSink<W> {
    fn write_frame(&mut self, frame: &ReplayFrame, overlay: &Overlay) -> Result<(), PipelineError> {
        let record = SinkRecord {
            frame: frame.index,
            width: frame.width,
            height: frame.height,
            overlay,
        };
        serde_json::to_writer(&mut self.writer, &record)
            .map_err(|e| PipelineError::SinkWrite(e.to_string()))?;
        self.writer
            .write_all(b"\n")
            .map_err(|e| PipelineError::SinkWrite(e.to_string()))?;
        self.written += 1;
        Ok(())
    }

    fn release(&mut self) -> Result<(), PipelineError> {
        self.writer.flush()?;
        Ok(())
    }
}
