use std::io::{BufRead, Write};

use itertools::Itertools;
use log::warn;

use crate::pipeline::{Overlay, PipelineError, PresentControl, Presenter};
use crate::replay::ReplayFrame;

/// Interactive display printing each processed frame's overlay as a text line.
///
/// In step mode the presenter waits for a line on `input` after every frame:
/// `q` quits, anything else moves on. End of input switches stepping off.
pub struct TerminalPresenter<W: Write, I: BufRead> {
    out: W,
    input: Option<I>,
}

impl<W: Write, I: BufRead> TerminalPresenter<W, I> {
    pub fn new(out: W, input: Option<I>) -> Self {
        TerminalPresenter { out, input }
    }
    pub fn into_output(self) -> W {
        self.out
    }
}

/// Single line rendering of an overlay
pub fn describe_overlay(overlay: &Overlay) -> String {
    let boxes = overlay
        .boxes
        .iter()
        .map(|b| format!("{} [{},{},{},{}]", b.label, b.bbox.x1, b.bbox.y1, b.bbox.x2, b.bbox.y2))
        .join("; ");
    let texts = overlay.texts.iter().map(|t| t.text.as_str()).join(" | ");
    if boxes.is_empty() {
        texts
    } else {
        format!("{} | {}", texts, boxes)
    }
}

impl<W: Write, I: BufRead> Presenter<ReplayFrame> for TerminalPresenter<W, I> {
    fn present(&mut self, _frame: &ReplayFrame, overlay: &Overlay) -> Result<PresentControl, PipelineError> {
        writeln!(self.out, "{}", describe_overlay(overlay))?;
        let input = match self.input.as_mut() {
            Some(input) => input,
            None => return Ok(PresentControl::Continue),
        };
        write!(self.out, "[enter: next, q: quit] ")?;
        self.out.flush()?;
        let mut answer = String::new();
        if input.read_line(&mut answer)? == 0 {
            self.input = None;
            return Ok(PresentControl::Continue);
        }
        if answer.trim().eq_ignore_ascii_case("q") {
            return Ok(PresentControl::Quit);
        }
        Ok(PresentControl::Continue)
    }

    fn release(&mut self) {
        if let Err(e) = self.out.flush() {
            warn!("Terminal presenter: flush on release failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mot::{RecognitionResult, TrackManager};
    use crate::utils::Rect;
    use std::io::{self, Cursor};

    /// Accepts writes, refuses to flush
    struct BrokenPipe(Vec<u8>);

    impl Write for BrokenPipe {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.write(buf)
        }
        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal closed"))
        }
    }

    fn frame_and_overlay() -> (ReplayFrame, Overlay) {
        let mut manager = TrackManager::default();
        manager.update(&[RecognitionResult::new("Alice", Rect::new(10, 10, 50, 50))], 3);
        let frame = ReplayFrame {
            index: 3,
            width: 640,
            height: 480,
            results: vec![],
        };
        (frame, Overlay::compose(3, &manager, None, 480))
    }

    #[test]
    fn test_describe() {
        let (_, overlay) = frame_and_overlay();
        assert_eq!(
            describe_overlay(&overlay),
            "Frame: 3 | Tracking: 1 persons | ID:1 Alice [10,10,50,50]"
        );
    }

    #[test]
    fn test_step_mode_quit() {
        let (frame, overlay) = frame_and_overlay();
        let mut presenter = TerminalPresenter::new(Vec::new(), Some(Cursor::new("\nq\n")));
        assert_eq!(presenter.present(&frame, &overlay).unwrap(), PresentControl::Continue);
        assert_eq!(presenter.present(&frame, &overlay).unwrap(), PresentControl::Quit);
        let printed = String::from_utf8(presenter.into_output()).unwrap();
        assert_eq!(printed.matches("Frame: 3").count(), 2);
    }

    #[test]
    fn test_end_of_input_stops_stepping() {
        let (frame, overlay) = frame_and_overlay();
        let mut presenter = TerminalPresenter::new(Vec::new(), Some(Cursor::new("")));
        assert_eq!(presenter.present(&frame, &overlay).unwrap(), PresentControl::Continue);
        assert_eq!(presenter.present(&frame, &overlay).unwrap(), PresentControl::Continue);
        let printed = String::from_utf8(presenter.into_output()).unwrap();
        assert_eq!(printed.matches("[enter: next, q: quit]").count(), 1);
    }

    #[test]
    fn test_release_survives_flush_error() {
        let (frame, overlay) = frame_and_overlay();
        let mut presenter = TerminalPresenter::new(BrokenPipe(Vec::new()), None::<Cursor<&str>>);
        assert_eq!(presenter.present(&frame, &overlay).unwrap(), PresentControl::Continue);
        presenter.release();
        let printed = String::from_utf8(presenter.into_output().0).unwrap();
        assert!(printed.starts_with("Frame: 3"));
    }
}
