use super::controls::ControlSet;
use super::state::{DisplayClass, Transition};
use crate::core::message::{MessageBody, MessageId, MessageType, NewMessage};

/// Rows scrolled up from the tail of a compact message's body. Zero keeps
/// the view pinned to the newest output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InnerScroll {
    from_bottom: u16,
}

impl InnerScroll {
    pub fn rows_from_bottom(&self) -> u16 {
        self.from_bottom
    }

    pub fn is_following(&self) -> bool {
        self.from_bottom == 0
    }

    pub fn scroll_up(&mut self, rows: u16, max: u16) {
        self.from_bottom = self.from_bottom.saturating_add(rows).min(max);
    }

    pub fn scroll_down(&mut self, rows: u16) {
        self.from_bottom = self.from_bottom.saturating_sub(rows);
    }

    pub fn reset(&mut self) {
        self.from_bottom = 0;
    }
}

/// One rendered message and the display state the synchronizer owns for it.
#[derive(Debug, Clone)]
pub struct MessageHandle {
    id: MessageId,
    ty: MessageType,
    pub(crate) body: MessageBody,
    command: Option<String>,
    pub(crate) streaming: bool,
    display: DisplayClass,
    pub(crate) preview: Option<String>,
    pub(crate) summary: Option<String>,
    pub(crate) controls: Option<ControlSet>,
    pub(crate) transition: Option<Transition>,
    pub(crate) scroll: InnerScroll,
}

impl MessageHandle {
    pub(crate) fn new(id: MessageId, message: NewMessage) -> Self {
        Self {
            id,
            ty: message.ty,
            body: message.body,
            command: message.command,
            streaming: message.streaming,
            display: DisplayClass::default(),
            preview: None,
            summary: None,
            controls: None,
            transition: None,
            scroll: InnerScroll::default(),
        }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn ty(&self) -> MessageType {
        self.ty
    }

    pub fn body(&self) -> &MessageBody {
        &self.body
    }

    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    pub fn display(&self) -> DisplayClass {
        self.display
    }

    pub(crate) fn set_display(&mut self, class: DisplayClass) {
        if class != DisplayClass::Compact {
            self.scroll.reset();
        }
        self.display = class;
    }

    /// Preview line shown while collapsed. Present exactly when the
    /// message is collapsed; may be empty for types with no content.
    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    /// One-line command summary for code execution messages.
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn controls(&self) -> Option<&ControlSet> {
        self.controls.as_ref()
    }

    pub fn transition(&self) -> Option<&Transition> {
        self.transition.as_ref()
    }

    pub fn scroll(&self) -> InnerScroll {
        self.scroll
    }

    pub fn scroll_mut(&mut self) -> &mut InnerScroll {
        &mut self.scroll
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_scroll_clamps_and_resets() {
        let mut scroll = InnerScroll::default();
        assert!(scroll.is_following());
        scroll.scroll_up(5, 3);
        assert_eq!(scroll.rows_from_bottom(), 3);
        scroll.scroll_down(1);
        assert_eq!(scroll.rows_from_bottom(), 2);
        scroll.scroll_down(10);
        assert!(scroll.is_following());
    }

    #[test]
    fn leaving_compact_resets_inner_scroll() {
        let message = NewMessage::new(MessageType::Tool, MessageBody::text("output"));
        let mut handle = MessageHandle::new(MessageId(1), message);
        handle.set_display(DisplayClass::Compact);
        handle.scroll_mut().scroll_up(4, 10);
        handle.set_display(DisplayClass::Expanded);
        assert!(handle.scroll().is_following());
    }
}
