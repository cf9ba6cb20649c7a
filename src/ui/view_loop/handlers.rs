//! Applies viewer input to the display engine and view state.

use std::time::Instant;

use ratatui::crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use super::keybindings::ViewAction;
use crate::core::message::MessageId;
use crate::core::prefs::PreferenceStore;
use crate::display::{ControlAction, ControlKind, DisplayClass, DisplayEngine, LayoutProbe};
use crate::ui::layout::{compact_rows, HitTarget};
use crate::ui::view_state::ViewState;
use crate::utils::clipboard::Clipboard;

const WHEEL_STEP: isize = 3;
const MESSAGE_SCROLL_STEP: u16 = 3;

/// What the handlers need besides the engine and the view.
pub struct InputContext<'a> {
    pub probe: &'a dyn LayoutProbe,
    pub clipboard: &'a dyn Clipboard,
    pub cell_height: u16,
    pub now: Instant,
}

pub fn handle_view_action<S: PreferenceStore>(
    engine: &mut DisplayEngine<S>,
    view: &mut ViewState,
    action: ViewAction,
    ctx: &InputContext<'_>,
) {
    match action {
        ViewAction::Quit => view.exit_requested = true,
        ViewAction::SelectNext => view.select_next(engine.transcript()),
        ViewAction::SelectPrevious => view.select_previous(engine.transcript()),
        ViewAction::ClearSelection => view.selected = None,
        ViewAction::PageUp => {
            let page = view.page();
            view.scroll_by(-page);
        }
        ViewAction::PageDown => {
            let page = view.page();
            view.scroll_by(page);
        }
        ViewAction::JumpToEnd => {
            view.selected = None;
            view.jump_to_end();
        }
        ViewAction::ToggleHeightPolicy => {
            engine.toggle_height_policy(ctx.probe);
            let state = if engine.height_policy().fixed_height {
                "on"
            } else {
                "off"
            };
            view.set_status(format!("Fixed message height {state}"), ctx.now);
        }
        ViewAction::ToggleHidden => {
            if let Some(id) = require_selection(view, ctx.now) {
                run_control(engine, view, id, ControlKind::Hide, ctx);
            }
        }
        ViewAction::ToggleFullHeight => {
            if let Some(id) = require_selection(view, ctx.now) {
                run_control(engine, view, id, ControlKind::Height, ctx);
            }
        }
        ViewAction::CopySelected => {
            if let Some(id) = require_selection(view, ctx.now) {
                run_control(engine, view, id, ControlKind::Copy, ctx);
            }
        }
        ViewAction::ScrollMessageUp => {
            if let Some(id) = require_selection(view, ctx.now) {
                scroll_message(engine, id, true, ctx);
            }
        }
        ViewAction::ScrollMessageDown => {
            if let Some(id) = require_selection(view, ctx.now) {
                scroll_message(engine, id, false, ctx);
            }
        }
    }
}

/// Route a mouse event. Clicks on a control glyph run that control; clicks
/// anywhere else on a message select and copy it.
pub fn handle_mouse<S: PreferenceStore>(
    engine: &mut DisplayEngine<S>,
    view: &mut ViewState,
    mouse: MouseEvent,
    ctx: &InputContext<'_>,
) {
    match mouse.kind {
        MouseEventKind::ScrollUp => view.scroll_by(-WHEEL_STEP),
        MouseEventKind::ScrollDown => view.scroll_by(WHEEL_STEP),
        MouseEventKind::Down(MouseButton::Left) => {
            match view.hit_test(mouse.column, mouse.row) {
                Some(HitTarget::Control(id, kind)) => run_control(engine, view, id, kind, ctx),
                Some(HitTarget::Message(id)) => {
                    view.select(id);
                    copy_with_status(engine, view, id, ctx);
                }
                None => {}
            }
        }
        _ => {}
    }
}

fn require_selection(view: &mut ViewState, now: Instant) -> Option<MessageId> {
    if view.selected.is_none() {
        view.set_status("Select a message first (j/k)", now);
    }
    view.selected
}

fn run_control<S: PreferenceStore>(
    engine: &mut DisplayEngine<S>,
    view: &mut ViewState,
    id: MessageId,
    kind: ControlKind,
    ctx: &InputContext<'_>,
) {
    let Some(action) = engine
        .transcript()
        .get(id)
        .and_then(|handle| handle.controls())
        .and_then(|controls| {
            controls
                .buttons()
                .into_iter()
                .find(|button| button.kind() == kind)
                .map(|button| button.action(id))
        })
    else {
        return;
    };

    match action {
        ControlAction::Copy(id) => copy_with_status(engine, view, id, ctx),
        ControlAction::ToggleHidden(ty) => {
            engine.dispatch(action, ctx.clipboard, ctx.probe, ctx.now);
            let state = if engine.preference(ty).hidden {
                "hidden"
            } else {
                "shown"
            };
            view.set_status(format!("{} messages {state}", ty.label()), ctx.now);
        }
        ControlAction::ToggleFullHeight(ty) => {
            engine.dispatch(action, ctx.clipboard, ctx.probe, ctx.now);
            let state = if engine.preference(ty).full_height {
                "shown at full height"
            } else {
                "height limited"
            };
            view.set_status(format!("{} messages {state}", ty.label()), ctx.now);
        }
    }
}

fn copy_with_status<S: PreferenceStore>(
    engine: &mut DisplayEngine<S>,
    view: &mut ViewState,
    id: MessageId,
    ctx: &InputContext<'_>,
) {
    let label = engine
        .transcript()
        .get(id)
        .map(|handle| handle.ty().label())
        .unwrap_or("Message");
    if engine.copy_message(id, ctx.clipboard, ctx.now) {
        view.set_status(format!("Copied {label} content"), ctx.now);
    } else {
        view.set_status("Nothing copied", ctx.now);
    }
}

fn scroll_message<S: PreferenceStore>(
    engine: &mut DisplayEngine<S>,
    id: MessageId,
    up: bool,
    ctx: &InputContext<'_>,
) {
    let visible = compact_rows(ctx.cell_height);
    let cell_height = u32::from(ctx.cell_height.max(1));
    let Some(handle) = engine.transcript_mut().get_mut(id) else {
        return;
    };
    if handle.display() != DisplayClass::Compact {
        return;
    }
    let total = ctx
        .probe
        .content_height(handle)
        .map_or(0, |height| (height / cell_height) as usize);
    let max = u16::try_from(total.saturating_sub(visible)).unwrap_or(u16::MAX);
    if up {
        handle.scroll_mut().scroll_up(MESSAGE_SCROLL_STEP, max);
    } else {
        handle.scroll_mut().scroll_down(MESSAGE_SCROLL_STEP);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::{MessageBody, MessageType, NewMessage};
    use crate::core::prefs::MemoryPreferenceStore;
    use crate::ui::format::TerminalFormatter;
    use crate::ui::layout::{HitTarget, LineHit, TranscriptLayout};
    use crate::ui::probe::TerminalProbe;
    use ratatui::crossterm::event::KeyModifiers;
    use ratatui::layout::Rect;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingClipboard {
        copied: RefCell<Vec<String>>,
    }

    impl Clipboard for RecordingClipboard {
        fn write_text(&self, text: &str) -> Result<(), String> {
            self.copied.borrow_mut().push(text.to_string());
            Ok(())
        }
    }

    fn tall(count: usize) -> String {
        (1..=count)
            .map(|n| format!("row {n}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn keyboard_toggle_needs_a_selection() {
        let formatter = TerminalFormatter;
        let probe = TerminalProbe::new(&formatter, None, 60, 16);
        let clipboard = RecordingClipboard::default();
        let mut engine = DisplayEngine::new(MemoryPreferenceStore::new());
        engine.push_message(
            NewMessage::new(MessageType::Tool, MessageBody::text("done")),
            &probe,
        );
        let mut view = ViewState::new();
        let now = Instant::now();
        let ctx = InputContext {
            probe: &probe,
            clipboard: &clipboard,
            cell_height: 16,
            now,
        };

        handle_view_action(&mut engine, &mut view, ViewAction::ToggleHidden, &ctx);
        assert!(!engine.preference(MessageType::Tool).hidden);
        assert_eq!(view.status(now), Some("Select a message first (j/k)"));

        handle_view_action(&mut engine, &mut view, ViewAction::SelectNext, &ctx);
        handle_view_action(&mut engine, &mut view, ViewAction::ToggleHidden, &ctx);
        assert!(engine.preference(MessageType::Tool).hidden);
        assert_eq!(view.status(now), Some("Tool messages hidden"));
    }

    #[test]
    fn clicking_control_dispatches_and_clicking_body_copies() {
        let formatter = TerminalFormatter;
        let probe = TerminalProbe::new(&formatter, None, 60, 16);
        let clipboard = RecordingClipboard::default();
        let mut engine = DisplayEngine::new(MemoryPreferenceStore::new());
        let id = engine.push_message(
            NewMessage::new(MessageType::Agent, MessageBody::text("plan")),
            &probe,
        );
        let mut view = ViewState::new();
        view.transcript_area = Rect::new(0, 1, 60, 10);
        view.last_layout = TranscriptLayout {
            lines: vec![Default::default(); 2],
            hits: vec![
                Some(LineHit {
                    message: id,
                    buttons: vec![(50..53, ControlKind::Height)],
                }),
                Some(LineHit {
                    message: id,
                    buttons: Vec::new(),
                }),
            ],
            spans: Vec::new(),
        };
        let ctx = InputContext {
            probe: &probe,
            clipboard: &clipboard,
            cell_height: 16,
            now: Instant::now(),
        };

        assert_eq!(
            view.hit_test(51, 1),
            Some(HitTarget::Control(id, ControlKind::Height))
        );
        handle_mouse(&mut engine, &mut view, click(51, 1), &ctx);
        assert!(engine.preference(MessageType::Agent).full_height);
        assert!(clipboard.copied.borrow().is_empty());

        handle_mouse(&mut engine, &mut view, click(5, 2), &ctx);
        assert_eq!(view.selected, Some(id));
        assert_eq!(clipboard.copied.borrow().as_slice(), ["plan".to_string()]);
    }

    #[test]
    fn message_scroll_is_clamped_to_hidden_rows() {
        let formatter = TerminalFormatter;
        let probe = TerminalProbe::new(&formatter, None, 60, 16);
        let clipboard = RecordingClipboard::default();
        let mut engine = DisplayEngine::new(MemoryPreferenceStore::new());
        let id = engine.push_message(
            NewMessage::new(MessageType::CodeExe, MessageBody::text(tall(20))),
            &probe,
        );
        assert_eq!(
            engine.transcript().get(id).map(|h| h.display()),
            Some(DisplayClass::Compact)
        );
        let mut view = ViewState::new();
        view.select(id);
        let ctx = InputContext {
            probe: &probe,
            clipboard: &clipboard,
            cell_height: 16,
            now: Instant::now(),
        };

        // 20 rows, 18 visible: two rows can be scrolled into view.
        handle_view_action(&mut engine, &mut view, ViewAction::ScrollMessageUp, &ctx);
        let scroll = engine.transcript().get(id).map(|h| h.scroll());
        assert_eq!(scroll.map(|s| s.rows_from_bottom()), Some(2));

        handle_view_action(&mut engine, &mut view, ViewAction::ScrollMessageDown, &ctx);
        let scroll = engine.transcript().get(id).map(|h| h.scroll());
        assert_eq!(scroll.map(|s| s.is_following()), Some(true));
    }
}
