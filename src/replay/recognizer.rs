use std::mem;

use crate::pipeline::{PipelineError, Recognition, Recognizer};
use crate::replay::ReplayFrame;

/// Recognizer that hands back the output recorded alongside each replayed frame
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplayRecognizer;

impl Recognizer<ReplayFrame> for ReplayRecognizer {
    fn recognize(&mut self, mut frame: ReplayFrame) -> Result<Recognition<ReplayFrame>, PipelineError> {
        let results = mem::take(&mut frame.results);
        Ok(Recognition { frame, results })
    }
}
