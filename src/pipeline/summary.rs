use chrono::{DateTime, Local};
use serde::Serialize;
use uuid::Uuid;

/// Why a session stopped reading frames
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum Termination {
    /// Source has no further frames
    EndOfStream,
    /// External stop signal observed between frames
    Stopped,
    /// Operator quit from the interactive display
    QuitRequested,
    /// Source failed mid-stream
    ReadFailure(String),
}

/// Report produced at the end of a processing session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    /// Frames read from the source, dropped ones included
    pub frames_read: u64,
    /// Frames admitted by the scheduler and sent through recognition
    pub frames_processed: u64,
    /// Total frames reported by the source at open time, 0 if unknown
    pub total_frames: u64,
    pub elapsed_secs: f64,
    pub termination: Termination,
}

impl SessionSummary {
    /// Processed frames per second of wall time. 0.0 for an instantaneous session
    pub fn throughput(&self) -> f64 {
        if self.elapsed_secs <= 0.0 {
            return 0.0;
        }
        self.frames_processed as f64 / self.elapsed_secs
    }
}

use std::fmt;
impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Processing complete! ({:?})", self.termination)?;
        writeln!(f, "Frames processed: {}/{}", self.frames_processed, self.total_frames)?;
        writeln!(f, "Processing time: {:.2} seconds", self.elapsed_secs)?;
        write!(f, "Average FPS: {:.2}", self.throughput())
    }
}
