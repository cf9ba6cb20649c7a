use std::time::Instant;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

use super::layout::{layout_transcript, BodyLayout, LayoutContext};
use super::theme::Theme;
use super::view_state::ViewState;
use crate::core::prefs::PreferenceStore;
use crate::display::DisplayEngine;

const HELP: &str =
    "j/k select · h hide · f height · g policy · c copy · [/] scroll message · q quit";

pub struct Chrome<'a> {
    pub theme: &'a Theme,
    pub body: BodyLayout<'a>,
    pub cell_height: u16,
    pub source: &'a str,
}

pub fn ui<S: PreferenceStore>(
    f: &mut Frame,
    engine: &DisplayEngine<S>,
    view: &mut ViewState,
    chrome: &Chrome<'_>,
    now: Instant,
) {
    let theme = chrome.theme;
    f.render_widget(
        Block::default().style(Style::default().bg(theme.background_color)),
        f.area(),
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    let policy = if engine.height_policy().fixed_height {
        "fixed"
    } else {
        "unlimited"
    };
    let title = format!(
        "Scrollfold v{} - {} • {} messages • height: {}",
        env!("CARGO_PKG_VERSION"),
        chrome.source,
        engine.transcript().len(),
        policy
    );
    f.render_widget(
        Paragraph::new(Line::styled(title, theme.title_style)),
        chunks[0],
    );

    let area = chunks[1];
    let ctx = LayoutContext {
        theme,
        body: chrome.body,
        width: area.width,
        cell_height: chrome.cell_height,
        selected: view.selected,
        now,
    };
    let layout = layout_transcript(engine.transcript(), &ctx);
    view.settle_scroll(&layout, area.height);

    let end = (view.scroll_offset + usize::from(area.height)).min(layout.lines.len());
    let visible = layout.lines[view.scroll_offset.min(end)..end].to_vec();
    f.render_widget(Paragraph::new(visible), area);

    view.transcript_area = area;
    view.last_layout = layout;

    let status = match view.status(now) {
        Some(message) => Line::styled(message.to_string(), theme.status_style),
        None => selection_hints(engine, view, theme),
    };
    f.render_widget(Paragraph::new(status), chunks[2]);
}

/// Tooltips of the selected message's controls, or the key help.
fn selection_hints<S: PreferenceStore>(
    engine: &DisplayEngine<S>,
    view: &ViewState,
    theme: &Theme,
) -> Line<'static> {
    let controls = view
        .selected
        .and_then(|id| engine.transcript().get(id))
        .and_then(|handle| handle.controls());
    let Some(controls) = controls else {
        return Line::styled(HELP, theme.status_style);
    };

    let mut spans = Vec::new();
    for (key, button) in ["h", "f", "c"].into_iter().zip(controls.buttons()) {
        if !spans.is_empty() {
            spans.push(Span::styled(" · ", theme.status_style));
        }
        spans.push(Span::styled(
            format!("{key} "),
            theme.button_style(button.visual().tone),
        ));
        spans.push(Span::styled(
            button.visual().tooltip.clone(),
            theme.status_style,
        ));
    }
    Line::from(spans)
}
