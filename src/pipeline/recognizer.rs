use std::collections::VecDeque;

use crate::mot::RecognitionResult;
use crate::pipeline::PipelineError;

/// Output of one recognizer call: the frame as annotated by the model and its detections
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition<F> {
    pub frame: F,
    pub results: Vec<RecognitionResult>,
}

/// External biometric recognizer. Synchronous, one frame in, ordered detections out
pub trait Recognizer<F> {
    fn recognize(&mut self, frame: F) -> Result<Recognition<F>, PipelineError>;
}

/// Recognizer returning pre-recorded result sets, one per call, in order.
/// Once the script is exhausted every frame yields no detections.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRecognizer {
    script: VecDeque<Vec<RecognitionResult>>,
    calls: usize,
}

impl ScriptedRecognizer {
    pub fn new<I: IntoIterator<Item = Vec<RecognitionResult>>>(script: I) -> Self {
        ScriptedRecognizer {
            script: script.into_iter().collect(),
            calls: 0,
        }
    }
    /// Number of frames handed to the recognizer so far
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl<F> Recognizer<F> for ScriptedRecognizer {
    fn recognize(&mut self, frame: F) -> Result<Recognition<F>, PipelineError> {
        self.calls += 1;
        let results = self.script.pop_front().unwrap_or_default();
        Ok(Recognition { frame, results })
    }
}
