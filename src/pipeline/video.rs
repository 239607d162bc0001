use serde::{Deserialize, Serialize};

use crate::pipeline::{Overlay, PipelineError};

/// Stream properties queried once when the source is opened
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Native frame rate. May be 0.0 when the container does not report it
    pub fps: f64,
    /// Total number of frames. 0 when unknown
    #[serde(default)]
    pub frames: u64,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

/// Sequential reader of decoded frames
pub trait VideoSource {
    type Frame;
    fn metadata(&self) -> &VideoMetadata;
    /// Next frame, or `Ok(None)` once the stream is exhausted
    fn read_frame(&mut self) -> Result<Option<Self::Frame>, PipelineError>;
    /// Releases underlying resources. Called exactly once when a session ends
    fn release(&mut self) {}
}

/// Destination for processed frames, e.g. an encoder writing at the target rate
pub trait VideoSink<F> {
    fn write_frame(&mut self, frame: &F, overlay: &Overlay) -> Result<(), PipelineError>;
    fn release(&mut self) -> Result<(), PipelineError> {
        Ok(())
    }
}

/// Operator decision after a frame was presented interactively
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentControl {
    Continue,
    Quit,
}

/// Interactive display used when no sink is configured
pub trait Presenter<F> {
    fn present(&mut self, frame: &F, overlay: &Overlay) -> Result<PresentControl, PipelineError>;
    fn release(&mut self) {}
}

/// Where processed frames go
pub enum Output<'a, F> {
    Sink(&'a mut dyn VideoSink<F>),
    Display(&'a mut dyn Presenter<F>),
    Discard,
}

impl<'a, F> Output<'a, F> {
    pub fn kind(&self) -> &'static str {
        match self {
            Output::Sink(_) => "sink",
            Output::Display(_) => "display",
            Output::Discard => "discard",
        }
    }
}
