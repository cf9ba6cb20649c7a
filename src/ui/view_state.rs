use std::time::{Duration, Instant};

use ratatui::layout::Rect;

use super::layout::{HitTarget, TranscriptLayout};
use crate::core::message::MessageId;
use crate::display::Transcript;

const STATUS_TTL: Duration = Duration::from_secs(3);

/// Interaction state of the transcript viewer that is not display state of
/// any message: selection, outer scroll, last frame geometry.
#[derive(Debug)]
pub struct ViewState {
    pub selected: Option<MessageId>,
    /// First transcript line shown in the viewport.
    pub scroll_offset: usize,
    /// Keep the viewport pinned to the end as the transcript grows.
    pub follow_tail: bool,
    reveal_selected: bool,
    status: Option<(String, Instant)>,
    /// Transcript area of the last drawn frame.
    pub transcript_area: Rect,
    pub last_layout: TranscriptLayout,
    pub exit_requested: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            selected: None,
            scroll_offset: 0,
            follow_tail: true,
            reveal_selected: false,
            status: None,
            transcript_area: Rect::default(),
            last_layout: TranscriptLayout::default(),
            exit_requested: false,
        }
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_next(&mut self, transcript: &Transcript) {
        self.step_selection(transcript, 1);
    }

    pub fn select_previous(&mut self, transcript: &Transcript) {
        self.step_selection(transcript, -1);
    }

    fn step_selection(&mut self, transcript: &Transcript, delta: isize) {
        let ids = transcript.ids();
        if ids.is_empty() {
            self.selected = None;
            return;
        }
        let next = match self.selected.and_then(|id| ids.iter().position(|x| *x == id)) {
            Some(idx) => idx.saturating_add_signed(delta).min(ids.len() - 1),
            None if delta < 0 => ids.len() - 1,
            None => 0,
        };
        self.select(ids[next]);
    }

    pub fn select(&mut self, id: MessageId) {
        self.selected = Some(id);
        self.reveal_selected = true;
        self.follow_tail = false;
    }

    /// Drop a selection that points at a removed message.
    pub fn prune_selection(&mut self, transcript: &Transcript) {
        if self.selected.is_some_and(|id| transcript.get(id).is_none()) {
            self.selected = None;
        }
    }

    pub fn scroll_by(&mut self, delta: isize) {
        self.follow_tail = false;
        self.scroll_offset = self.scroll_offset.saturating_add_signed(delta);
    }

    /// Lines one page scroll moves: the viewport height less one line of
    /// overlap.
    pub fn page(&self) -> isize {
        isize::try_from(self.transcript_area.height.max(2) - 1).unwrap_or(isize::MAX)
    }

    pub fn jump_to_end(&mut self) {
        self.follow_tail = true;
    }

    pub fn set_status(&mut self, message: impl Into<String>, now: Instant) {
        self.status = Some((message.into(), now));
    }

    pub fn status(&self, now: Instant) -> Option<&str> {
        match &self.status {
            Some((message, at)) if now.saturating_duration_since(*at) < STATUS_TTL => {
                Some(message.as_str())
            }
            _ => None,
        }
    }

    /// Clamp the scroll offset to the laid out transcript in a viewport of
    /// `height` rows. Tail-follow and a pending selection reveal win.
    pub fn settle_scroll(&mut self, layout: &TranscriptLayout, height: u16) {
        let height = usize::from(height);
        let total = layout.lines.len();
        let max_offset = total.saturating_sub(height);

        if self.reveal_selected {
            self.reveal_selected = false;
            if let Some(span) = self.selected.and_then(|id| layout.span_of(id)) {
                if span.start < self.scroll_offset {
                    self.scroll_offset = span.start;
                } else if span.start + span.len > self.scroll_offset + height {
                    self.scroll_offset = (span.start + span.len).saturating_sub(height);
                    self.scroll_offset = self.scroll_offset.min(span.start);
                }
            }
        }

        if self.follow_tail {
            self.scroll_offset = max_offset;
        }
        self.scroll_offset = self.scroll_offset.min(max_offset);
        // Scrolling back down to the end resumes following.
        if self.scroll_offset == max_offset && self.selected.is_none() {
            self.follow_tail = true;
        }
    }

    /// Map a terminal cell to what was drawn there in the last frame.
    pub fn hit_test(&self, column: u16, row: u16) -> Option<HitTarget> {
        let area = self.transcript_area;
        if column < area.x
            || column >= area.x + area.width
            || row < area.y
            || row >= area.y + area.height
        {
            return None;
        }
        let line = self.scroll_offset + usize::from(row - area.y);
        self.last_layout.hit(line, column - area.x)
    }
}
