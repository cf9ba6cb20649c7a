use super::*;
use crate::core::message::{KvRow, MessageBody, MessageId, MessageType, NewMessage};
use crate::core::prefs::{GlobalHeightPolicy, MemoryPreferenceStore, PreferenceStore};
use crate::display::controls::{ButtonIcon, ButtonTone};
use crate::display::scheduler::{DEFAULT_RECLASSIFY_DELAY, STREAMING_RECLASSIFY_DELAY};
use crate::utils::clipboard::Clipboard;
use std::cell::{Cell, RefCell};
use std::time::{Duration, Instant};

/// Every content line is 30px tall; counts how often it is asked.
struct RowProbe {
    row_px: u32,
    available: Cell<bool>,
    calls: Cell<usize>,
}

impl RowProbe {
    fn new() -> Self {
        Self {
            row_px: 30,
            available: Cell::new(true),
            calls: Cell::new(0),
        }
    }
}

impl LayoutProbe for RowProbe {
    fn content_height(&self, handle: &MessageHandle) -> Option<u32> {
        self.calls.set(self.calls.get() + 1);
        if !self.available.get() {
            return None;
        }
        Some(handle.body().content.lines().count() as u32 * self.row_px)
    }
}

#[derive(Default)]
struct RecordingClipboard {
    copied: RefCell<Vec<String>>,
    fail: bool,
}

impl Clipboard for RecordingClipboard {
    fn write_text(&self, text: &str) -> Result<(), String> {
        if self.fail {
            return Err("clipboard unavailable".to_string());
        }
        self.copied.borrow_mut().push(text.to_string());
        Ok(())
    }
}

fn lines(count: usize) -> String {
    (1..=count)
        .map(|n| format!("line {n}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn message(ty: MessageType, content: impl Into<String>) -> NewMessage {
    NewMessage::new(ty, MessageBody::text(content))
}

fn engine() -> DisplayEngine<MemoryPreferenceStore> {
    DisplayEngine::new(MemoryPreferenceStore::new())
}

fn class_of<S: PreferenceStore>(engine: &DisplayEngine<S>, id: MessageId) -> DisplayClass {
    engine
        .transcript()
        .get(id)
        .map(MessageHandle::display)
        .expect("message present")
}

#[test]
fn tall_tool_output_is_compact() {
    let probe = RowProbe::new();
    let mut engine = engine();
    // 15 rows * 30px = 450px
    let id = engine.push_message(message(MessageType::Tool, lines(15)), &probe);
    assert_eq!(class_of(&engine, id), DisplayClass::Compact);
}

#[test]
fn short_tool_output_is_natural() {
    let probe = RowProbe::new();
    let mut engine = engine();
    // 4 rows * 30px = 120px
    let id = engine.push_message(message(MessageType::Tool, lines(4)), &probe);
    assert_eq!(class_of(&engine, id), DisplayClass::Natural);
}

#[test]
fn hiding_a_type_collapses_every_message_and_restores_on_toggle() {
    let probe = RowProbe::new();
    let mut engine = engine();
    let ids = [
        engine.push_message(message(MessageType::Tool, lines(15)), &probe),
        engine.push_message(message(MessageType::Tool, lines(2)), &probe),
        engine.push_message(message(MessageType::Tool, lines(20)), &probe),
    ];
    let other = engine.push_message(message(MessageType::Agent, lines(3)), &probe);
    let before: Vec<_> = ids.iter().map(|id| class_of(&engine, *id)).collect();

    engine.toggle_hidden(MessageType::Tool, &probe);
    for id in ids {
        let handle = engine.transcript().get(id).expect("message present");
        assert_eq!(handle.display(), DisplayClass::Collapsed);
        assert_eq!(handle.preview(), Some("line 1"));
    }
    assert_eq!(class_of(&engine, other), DisplayClass::Natural);

    engine.toggle_hidden(MessageType::Tool, &probe);
    let after: Vec<_> = ids.iter().map(|id| class_of(&engine, *id)).collect();
    assert_eq!(before, after);
    for id in ids {
        assert_eq!(engine.transcript().get(id).and_then(MessageHandle::preview), None);
    }
}

#[test]
fn hidden_code_exe_previews_last_line() {
    let probe = RowProbe::new();
    let mut engine = engine();
    let id = engine.push_message(message(MessageType::CodeExe, "Building...\nDone.\n"), &probe);
    engine.toggle_hidden(MessageType::CodeExe, &probe);
    assert_eq!(
        engine.transcript().get(id).and_then(MessageHandle::preview),
        Some("Last: Done.")
    );
}

#[test]
fn hidden_streamed_code_exe_preview_follows_content() {
    let probe = RowProbe::new();
    let mut engine = engine();
    let now = Instant::now();
    engine.toggle_hidden(MessageType::CodeExe, &probe);
    let id = engine.push_message(message(MessageType::CodeExe, "").streaming(true), &probe);
    assert_eq!(
        engine.transcript().get(id).and_then(MessageHandle::preview),
        Some("No output")
    );

    engine.transcript_mut().append_content(id, "Building...\n");
    engine.transcript_mut().append_content(id, "Done.\n");
    engine.process_mutations(now);
    assert!(engine.finish_streaming(id, now));
    assert_eq!(engine.run_due(now + Duration::from_secs(1), &probe), 1);

    let handle = engine.transcript().get(id).expect("message present");
    assert_eq!(handle.display(), DisplayClass::Collapsed);
    assert_eq!(handle.preview(), Some("Last: Done."));
    assert!(handle.transition().is_none());
}

#[test]
fn disabled_policy_expands_every_visible_message() {
    let probe = RowProbe::new();
    let mut engine = engine();
    let tall = engine.push_message(message(MessageType::Tool, lines(15)), &probe);
    let short = engine.push_message(message(MessageType::Response, lines(2)), &probe);
    let hidden = engine.push_message(message(MessageType::Info, lines(2)), &probe);
    engine.toggle_hidden(MessageType::Info, &probe);

    engine.toggle_height_policy(&probe);
    assert!(!engine.height_policy().fixed_height);
    assert_eq!(class_of(&engine, tall), DisplayClass::Expanded);
    assert_eq!(class_of(&engine, short), DisplayClass::Expanded);
    assert_eq!(class_of(&engine, hidden), DisplayClass::Collapsed);

    let late = engine.push_message(message(MessageType::Browser, lines(30)), &probe);
    assert_eq!(class_of(&engine, late), DisplayClass::Expanded);
}

#[test]
fn hidden_and_full_height_messages_are_never_measured() {
    let probe = RowProbe::new();
    let mut engine = engine();
    engine.toggle_hidden(MessageType::Tool, &probe);
    engine.toggle_full_height(MessageType::Agent, &probe);
    let calls = probe.calls.get();

    engine.push_message(message(MessageType::Tool, lines(40)), &probe);
    engine.push_message(message(MessageType::Agent, lines(40)), &probe);
    assert_eq!(probe.calls.get(), calls);
}

#[test]
fn failed_measurement_on_apply_falls_back_to_compact() {
    let probe = RowProbe::new();
    probe.available.set(false);
    let mut engine = engine();
    let id = engine.push_message(message(MessageType::Tool, lines(2)), &probe);
    assert_eq!(class_of(&engine, id), DisplayClass::Compact);

    // The debounced path reads a failed measurement as natural.
    engine.schedule_reclassify(id, Instant::now());
    engine.run_due(Instant::now() + Duration::from_secs(1), &probe);
    assert_eq!(class_of(&engine, id), DisplayClass::Natural);
}

#[test]
fn toggles_are_involutions() {
    let probe = RowProbe::new();
    let mut engine = engine();
    let id = engine.push_message(message(MessageType::Agent, lines(12)), &probe);
    let initial = engine.preference(MessageType::Agent);
    let initial_class = class_of(&engine, id);

    engine.toggle_full_height(MessageType::Agent, &probe);
    assert_eq!(class_of(&engine, id), DisplayClass::Expanded);
    engine.toggle_full_height(MessageType::Agent, &probe);

    assert_eq!(engine.preference(MessageType::Agent), initial);
    assert_eq!(class_of(&engine, id), initial_class);
}

#[test]
fn every_message_of_a_type_shares_one_state() {
    let probe = RowProbe::new();
    let mut engine = engine();
    let ids: Vec<_> = (0..4)
        .map(|n| engine.push_message(message(MessageType::Warning, lines(n * 8 + 1)), &probe))
        .collect();

    engine.toggle_full_height(MessageType::Warning, &probe);
    for id in &ids {
        let handle = engine.transcript().get(*id).expect("message present");
        assert_eq!(handle.display(), DisplayClass::Expanded);
        let controls = handle.controls().expect("controls attached");
        assert_eq!(controls.height.visual().tone, ButtonTone::Engaged);
        assert!(controls.height.visual().active);
    }
}

#[test]
fn registration_touches_only_the_new_message() {
    let probe = RowProbe::new();
    let mut engine = engine();
    let first = engine.push_message(message(MessageType::Tool, lines(2)), &probe);

    // Grow the first message behind the engine's back; registering a
    // sibling must not reclassify it.
    engine.transcript_mut().replace_content(first, lines(30));
    engine.push_message(message(MessageType::Tool, lines(2)), &probe);
    assert_eq!(class_of(&engine, first), DisplayClass::Natural);
}

#[test]
fn code_exe_registration_adds_command_summary() {
    let probe = RowProbe::new();
    let mut engine = engine();
    let id = engine.push_message(
        message(MessageType::CodeExe, "").with_command("cargo fmt --check\ncargo test"),
        &probe,
    );
    let blank = engine.push_message(
        message(MessageType::CodeExe, "").with_command("   "),
        &probe,
    );
    let tool = engine.push_message(message(MessageType::Tool, "").with_command("ls"), &probe);

    let summary = |id: MessageId| {
        engine
            .transcript()
            .get(id)
            .and_then(MessageHandle::summary)
            .map(str::to_string)
    };
    assert_eq!(summary(id).as_deref(), Some("cargo fmt --check"));
    assert_eq!(summary(blank), None);
    assert_eq!(summary(tool), None);
}

#[test]
fn hidden_types_always_carry_a_preview() {
    let probe = RowProbe::new();
    let mut engine = engine();
    engine.toggle_hidden(MessageType::Agent, &probe);
    engine.toggle_hidden(MessageType::Info, &probe);

    let agent = engine.push_message(
        NewMessage::new(
            MessageType::Agent,
            MessageBody::default().with_kvps(vec![KvRow::new("tool_name", "search")]),
        ),
        &probe,
    );
    let info = engine.push_message(message(MessageType::Info, ""), &probe);

    assert_eq!(
        engine.transcript().get(agent).and_then(MessageHandle::preview),
        Some("search")
    );
    assert_eq!(
        engine.transcript().get(info).and_then(MessageHandle::preview),
        Some("")
    );

    // Re-applying replaces the preview rather than stacking another one.
    engine.apply_type(MessageType::Agent, &probe);
    assert_eq!(
        engine.transcript().get(agent).and_then(MessageHandle::preview),
        Some("search")
    );
}

#[test]
fn streaming_bursts_reclassify_once_after_quiet_period() {
    let probe = RowProbe::new();
    let mut engine = engine();
    let start = Instant::now();
    let id = engine.push_message(message(MessageType::CodeExe, "").streaming(true), &probe);
    assert_eq!(class_of(&engine, id), DisplayClass::Natural);

    for step in 0..20u64 {
        let at = start + Duration::from_millis(step * 10);
        engine.transcript_mut().append_content(id, "output line\n");
        assert_eq!(engine.process_mutations(at), 1);
    }
    let last = start + Duration::from_millis(190);
    assert_eq!(engine.scheduler().len(), 1);
    assert_eq!(engine.next_deadline(), Some(last + STREAMING_RECLASSIFY_DELAY));

    assert_eq!(engine.run_due(last + Duration::from_millis(100), &probe), 0);
    assert_eq!(class_of(&engine, id), DisplayClass::Natural);

    let fired = last + STREAMING_RECLASSIFY_DELAY;
    assert_eq!(engine.run_due(fired, &probe), 1);
    let handle = engine.transcript().get(id).expect("message present");
    assert_eq!(handle.display(), DisplayClass::Compact);
    assert!(handle.transition().is_some_and(|t| t.is_fading(fired)));

    engine.settle_transitions(fired + Duration::from_secs(1));
    assert!(engine
        .transcript()
        .get(id)
        .and_then(MessageHandle::transition)
        .is_none());
}

#[test]
fn non_streaming_mutations_are_ignored() {
    let probe = RowProbe::new();
    let mut engine = engine();
    let id = engine.push_message(message(MessageType::Tool, "start"), &probe);
    engine.transcript_mut().append_content(id, "\nmore");
    assert_eq!(engine.process_mutations(Instant::now()), 0);
    assert!(engine.scheduler().is_empty());
}

#[test]
fn finishing_a_stream_settles_with_default_delay() {
    let probe = RowProbe::new();
    let mut engine = engine();
    let now = Instant::now();
    let id = engine.push_message(message(MessageType::Response, "").streaming(true), &probe);
    engine.transcript_mut().append_content(id, &lines(20));
    assert!(engine.finish_streaming(id, now));
    assert_eq!(engine.next_deadline(), Some(now + DEFAULT_RECLASSIFY_DELAY));
    engine.run_due(now + DEFAULT_RECLASSIFY_DELAY, &probe);
    assert_eq!(class_of(&engine, id), DisplayClass::Compact);
}

#[test]
fn reclassification_leaves_preference_classes_alone() {
    let probe = RowProbe::new();
    let mut engine = engine();
    let now = Instant::now();
    let id = engine.push_message(message(MessageType::Agent, "").streaming(true), &probe);
    engine.transcript_mut().append_content(id, &lines(20));
    engine.process_mutations(now);
    engine.toggle_hidden(MessageType::Agent, &probe);

    engine.run_due(now + Duration::from_secs(1), &probe);
    assert_eq!(class_of(&engine, id), DisplayClass::Collapsed);
    assert!(engine
        .transcript()
        .get(id)
        .and_then(MessageHandle::transition)
        .is_none());
}

#[test]
fn watcher_is_created_once_per_transcript() {
    let probe = RowProbe::new();
    let mut engine = engine();
    assert!(engine.transcript().watcher().is_none());
    engine.push_message(message(MessageType::User, "hi"), &probe);
    let serial = engine.transcript().watcher().map(|w| w.serial());
    assert!(serial.is_some());
    for _ in 0..5 {
        engine.push_message(message(MessageType::Response, "hello"), &probe);
    }
    assert_eq!(engine.transcript().watcher().map(|w| w.serial()), serial);
}

#[test]
fn removing_a_message_cancels_its_timer() {
    let probe = RowProbe::new();
    let mut engine = engine();
    let now = Instant::now();
    let id = engine.push_message(message(MessageType::CodeExe, "").streaming(true), &probe);
    engine.transcript_mut().append_content(id, "x");
    engine.process_mutations(now);
    assert!(engine.scheduler().is_pending(id));

    assert!(engine.remove_message(id).is_some());
    assert!(engine.scheduler().is_empty());
    assert_eq!(engine.run_due(now + Duration::from_secs(1), &probe), 0);
    assert!(engine.transcript().ids_of_type(MessageType::CodeExe).is_empty());
}

#[test]
fn copy_flashes_on_success_and_logs_on_failure() {
    let probe = RowProbe::new();
    let mut engine = engine();
    let now = Instant::now();
    let id = engine.push_message(message(MessageType::Response, "  answer  "), &probe);

    let clipboard = RecordingClipboard::default();
    assert!(engine.copy_message(id, &clipboard, now));
    assert_eq!(clipboard.copied.borrow().as_slice(), ["answer".to_string()]);
    let copy = &engine
        .transcript()
        .get(id)
        .and_then(MessageHandle::controls)
        .expect("controls attached")
        .copy;
    assert_eq!(copy.displayed(now).0, ButtonIcon::Check);

    let broken = RecordingClipboard {
        fail: true,
        ..Default::default()
    };
    let later = now + Duration::from_secs(1);
    assert!(!engine.copy_message(id, &broken, later));
    let copy = &engine
        .transcript()
        .get(id)
        .and_then(MessageHandle::controls)
        .expect("controls attached")
        .copy;
    assert_eq!(copy.displayed(later).0, ButtonIcon::Copy);
}

#[test]
fn control_actions_dispatch_to_the_synchronizer() {
    let probe = RowProbe::new();
    let clipboard = RecordingClipboard::default();
    let mut engine = engine();
    let id = engine.push_message(message(MessageType::Browser, "page"), &probe);
    let hide = engine
        .transcript()
        .get(id)
        .and_then(MessageHandle::controls)
        .map(|controls| controls.hide.action(id))
        .expect("controls attached");

    engine.dispatch(hide, &clipboard, &probe, Instant::now());
    assert!(engine.preference(MessageType::Browser).hidden);
    assert_eq!(class_of(&engine, id), DisplayClass::Collapsed);
}

#[test]
fn engine_starts_from_persisted_policy() {
    let probe = RowProbe::new();
    let store = MemoryPreferenceStore::with_policy(GlobalHeightPolicy {
        fixed_height: false,
    });
    let mut engine = DisplayEngine::new(store);
    let id = engine.push_message(message(MessageType::User, lines(1)), &probe);
    assert_eq!(class_of(&engine, id), DisplayClass::Expanded);
}
