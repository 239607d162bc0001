use thiserror::Error;

/// Failures at the source, sink and recognizer boundaries of a processing session
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Video source could not be opened. Terminal for the session
    #[error("SourceOpen: {0}")]
    SourceOpen(String),
    /// Source failed mid-stream. No further frames are read from it
    #[error("SourceRead: {0}")]
    SourceRead(String),
    /// Output sink could not be created
    #[error("SinkInit: {0}")]
    SinkInit(String),
    /// Sink failed to accept a frame. No further frames are written to it
    #[error("SinkWrite: {0}")]
    SinkWrite(String),
    #[error("Recognition: {0}")]
    Recognition(String),
    #[error("Config: {0}")]
    Config(String),
    #[error("Io: {0}")]
    Io(#[from] std::io::Error),
    #[error("Json: {0}")]
    Json(#[from] serde_json::Error),
}
