use std::io::{self, Write};
use thorp_core::CountingState;

use super::overlay::OverlayView;

/// Consumer of engine snapshots.
///
/// `present` follows state changes; `refresh` is the periodic redraw and
/// receives whatever snapshot is current, changed or not.
pub trait PresentationSink {
    fn present(&mut self, state: &CountingState) -> io::Result<()>;

    fn refresh(&mut self, state: &CountingState) -> io::Result<()> {
        self.present(state)
    }
}

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Writes the overlay to a terminal. Updates skip frames identical to the
/// one already on screen; refreshes always repaint, clearing the screen
/// first when colour is on.
pub struct TerminalOverlay<W> {
    writer: W,
    color: bool,
    last_frame: Option<String>,
    frames: usize,
}

impl<W: Write> TerminalOverlay<W> {
    pub fn new(writer: W, color: bool) -> Self {
        Self {
            writer,
            color,
            last_frame: None,
            frames: 0,
        }
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> PresentationSink for TerminalOverlay<W> {
    fn present(&mut self, state: &CountingState) -> io::Result<()> {
        let frame = OverlayView::from_state(state).render(self.color);
        if self.last_frame.as_deref() == Some(frame.as_str()) {
            return Ok(());
        }
        self.draw(frame)
    }

    fn refresh(&mut self, state: &CountingState) -> io::Result<()> {
        if self.color {
            self.writer.write_all(CLEAR_SCREEN.as_bytes())?;
        }
        self.draw(OverlayView::from_state(state).render(self.color))
    }
}

impl<W: Write> TerminalOverlay<W> {
    fn draw(&mut self, frame: String) -> io::Result<()> {
        writeln!(self.writer, "{frame}")?;
        self.writer.flush()?;
        self.last_frame = Some(frame);
        self.frames += 1;
        Ok(())
    }
}
