//! Interactive transcript viewer.
//!
//! The loop sleeps until terminal input, replay output, or the next
//! reclassification deadline, applies whatever arrived, and redraws when
//! anything changed. All display state
//! lives in the [`DisplayEngine`]; the loop only feeds it events and a
//! [`TerminalProbe`] sized to the last drawn frame.

pub mod handlers;
pub mod keybindings;
pub mod lifecycle;
pub mod replay;

use std::{
    error::Error,
    time::{Duration, Instant},
};

use ratatui::crossterm::event::{self, Event, KeyEventKind};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::core::prefs::PreferenceStore;
use crate::core::transcript_file::TranscriptRecord;
use crate::display::{DisplayEngine, MessageHandle};
use crate::ui::format::{TerminalFormatter, UnicodeMath};
use crate::ui::layout::BodyLayout;
use crate::ui::probe::{detect_cell_height, TerminalProbe};
use crate::ui::renderer::{ui, Chrome};
use crate::ui::theme::Theme;
use crate::ui::view_state::ViewState;
use crate::utils::clipboard::Clipboard;

use handlers::{handle_mouse, handle_view_action, InputContext};
use keybindings::action_for_key;
use lifecycle::{restore_terminal, setup_terminal};
use replay::{spawn_replay, ReplayCursor, ReplayMessage};

#[derive(Debug)]
pub enum UiEvent {
    Crossterm(Event),
}

/// Frame interval while something is animating (fades, copy feedback).
const ANIMATION_FRAME: Duration = Duration::from_millis(50);

pub struct ViewOptions {
    pub records: Vec<TranscriptRecord>,
    /// Shown in the title bar.
    pub source: String,
    /// Stream records in chunk by chunk instead of loading them at once.
    pub replay: bool,
    pub chunk_delay: Duration,
    pub theme: Theme,
    /// Cell height to assume when the terminal does not report pixels.
    pub cell_height_fallback: u16,
}

fn spawn_event_reader(event_tx: mpsc::UnboundedSender<UiEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => {
                        continue;
                    }
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}

pub async fn run_view<S: PreferenceStore>(
    store: S,
    options: ViewOptions,
    clipboard: &dyn Clipboard,
) -> Result<(), Box<dyn Error>> {
    let ViewOptions {
        records,
        source,
        replay,
        chunk_delay,
        theme,
        cell_height_fallback,
    } = options;

    let formatter = TerminalFormatter;
    let math = UnicodeMath;
    let cell_height = detect_cell_height(cell_height_fallback);
    debug!(cell_height, "resolved terminal cell height");

    let mut terminal = setup_terminal()?;
    let width = terminal.size().map(|size| size.width).unwrap_or(80);
    let mut probe = TerminalProbe::new(&formatter, Some(&math), width, cell_height);
    let chrome = Chrome {
        theme: &theme,
        body: BodyLayout {
            formatter: &formatter,
            math: Some(&math),
        },
        cell_height: probe.cell_height(),
        source: &source,
    };

    let mut engine = DisplayEngine::new(store);
    let mut view = ViewState::new();

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<UiEvent>();
    let event_reader_handle = spawn_event_reader(event_tx);

    let cancel_token = CancellationToken::new();
    let (replay_tx, mut replay_rx) = mpsc::unbounded_channel::<ReplayMessage>();
    let mut cursor = ReplayCursor::new();
    if replay {
        info!(records = records.len(), "replaying transcript");
        spawn_replay(records, replay_tx, cancel_token.clone(), chunk_delay);
    } else {
        drop(replay_tx);
        for record in records {
            engine.push_message(record.message, &probe);
        }
    }

    let mut request_redraw = true;
    let mut last_frame = Instant::now();
    let mut animating = false;

    let result: Result<(), Box<dyn Error>> = 'main_loop: loop {
        let now = Instant::now();

        if request_redraw || (animating && now.duration_since(last_frame) >= ANIMATION_FRAME) {
            if let Err(err) = terminal.draw(|f| ui(f, &engine, &mut view, &chrome, now)) {
                break 'main_loop Err(err.into());
            }
            last_frame = now;
            request_redraw = false;
            // One more frame after the last animation ends clears it.
            animating = view.status(now).is_some()
                || engine
                    .transcript()
                    .iter()
                    .any(|handle| handle.transition().is_some() || is_flashing(handle, now));

            // Measurements follow the width the transcript was last drawn at.
            let drawn_width = view.transcript_area.width;
            if drawn_width != probe.width() {
                debug!(from = probe.width(), to = drawn_width, "transcript width changed");
                probe.set_width(drawn_width);
                engine.apply_all(&probe);
                request_redraw = true;
            }
        }

        let wake = if request_redraw {
            None
        } else {
            let frame_due = animating.then(|| last_frame + ANIMATION_FRAME);
            let deadline = [engine.next_deadline(), frame_due]
                .into_iter()
                .flatten()
                .min();
            Some(wait_for_wake(&mut event_rx, &mut replay_rx, deadline).await)
        };

        let mut ui_events = Vec::new();
        let mut replay_messages = Vec::new();
        match wake {
            Some(Wake::Ui(ev)) => ui_events.push(ev),
            Some(Wake::Replay(message)) => replay_messages.push(message),
            Some(Wake::Timer) | None => {}
        }
        while let Ok(ev) = event_rx.try_recv() {
            ui_events.push(ev);
        }
        while let Ok(message) = replay_rx.try_recv() {
            replay_messages.push(message);
        }

        let events_processed = !ui_events.is_empty();
        for UiEvent::Crossterm(ev) in ui_events {
            let ctx = InputContext {
                probe: &probe,
                clipboard,
                cell_height: probe.cell_height(),
                now: Instant::now(),
            };
            match ev {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if let Some(action) = action_for_key(&key) {
                        handle_view_action(&mut engine, &mut view, action, &ctx);
                    }
                }
                Event::Mouse(mouse) => handle_mouse(&mut engine, &mut view, mouse, &ctx),
                _ => {}
            }
            if view.exit_requested {
                break 'main_loop Ok(());
            }
        }

        let received_any = !replay_messages.is_empty();
        for message in replay_messages {
            cursor.apply(message, &mut engine, &probe, Instant::now());
        }
        if received_any {
            view.prune_selection(engine.transcript());
            if cursor.is_finished() {
                view.set_status("Replay finished", Instant::now());
            }
        }

        let now = Instant::now();
        engine.process_mutations(now);
        let reclassified = engine.run_due(now, &probe);
        engine.settle_transitions(now);

        if events_processed || received_any || reclassified > 0 {
            request_redraw = true;
        }
    };

    cancel_token.cancel();
    event_reader_handle.abort();
    restore_terminal(&mut terminal)?;

    result
}

enum Wake {
    Ui(UiEvent),
    Replay(ReplayMessage),
    Timer,
}

/// Sleep until input, replay output, or `deadline`, whichever comes first.
async fn wait_for_wake(
    event_rx: &mut mpsc::UnboundedReceiver<UiEvent>,
    replay_rx: &mut mpsc::UnboundedReceiver<ReplayMessage>,
    deadline: Option<Instant>,
) -> Wake {
    let sleep = async {
        match deadline {
            Some(at) => tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::select! {
        Some(ev) = event_rx.recv() => Wake::Ui(ev),
        Some(message) = replay_rx.recv() => Wake::Replay(message),
        _ = sleep => Wake::Timer,
        else => Wake::Timer,
    }
}

fn is_flashing(handle: &MessageHandle, now: Instant) -> bool {
    handle.controls().is_some_and(|controls| {
        controls
            .buttons()
            .into_iter()
            .any(|button| button.displayed(now).0 != button.visual().icon)
    })
}
