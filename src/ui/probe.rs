use ratatui::crossterm::terminal;

use super::format::{ContentFormatter, MathHook};
use super::layout::{BodyLayout, BODY_INDENT};
use crate::display::{LayoutProbe, MessageHandle};

/// Measures message bodies the way the renderer lays them out: wrapped
/// rows at the current transcript width, times the terminal cell height.
pub struct TerminalProbe<'a> {
    body: BodyLayout<'a>,
    /// Transcript width in columns as of the last drawn frame.
    width: u16,
    cell_height: u16,
}

impl<'a> TerminalProbe<'a> {
    pub fn new(
        formatter: &'a dyn ContentFormatter,
        math: Option<&'a dyn MathHook>,
        width: u16,
        cell_height: u16,
    ) -> Self {
        Self {
            body: BodyLayout { formatter, math },
            width,
            cell_height: cell_height.max(1),
        }
    }

    pub fn set_width(&mut self, width: u16) {
        self.width = width;
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn cell_height(&self) -> u16 {
        self.cell_height
    }
}

impl LayoutProbe for TerminalProbe<'_> {
    fn content_height(&self, handle: &MessageHandle) -> Option<u32> {
        let body_width = self.width.checked_sub(BODY_INDENT).filter(|w| *w > 0)?;
        let rows = self.body.body_rows(handle.body(), body_width).len();
        Some(rows as u32 * u32::from(self.cell_height))
    }
}

/// Pixel height of one terminal row, when the terminal reports its pixel
/// size. Many terminals report zero, hence the fallback.
pub fn detect_cell_height(fallback: u16) -> u16 {
    let Ok(size) = terminal::window_size() else {
        return fallback;
    };
    if size.height == 0 || size.rows == 0 {
        return fallback;
    }
    (size.height / size.rows).max(1)
}
