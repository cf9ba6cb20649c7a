use std::ops::Range;
use std::time::Instant;

use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::format::{ContentFormatter, MathHook, SegmentKind};
use super::theme::Theme;
use crate::core::message::{KvValue, MessageBody, MessageId};
use crate::core::text_wrapping::{TextWrapper, WrapConfig};
use crate::display::classifier::COMPACT_THRESHOLD_PX;
use crate::display::controls::ControlKind;
use crate::display::{DisplayClass, MessageHandle, Transcript};

/// Columns reserved to the left of every body row.
pub const BODY_INDENT: u16 = 2;
const KEY_COLUMN_MAX: usize = 18;

/// Formatting collaborators shared by the renderer and the layout probe.
#[derive(Clone, Copy)]
pub struct BodyLayout<'a> {
    pub formatter: &'a dyn ContentFormatter,
    pub math: Option<&'a dyn MathHook>,
}

/// One unstyled row of a message body after wrapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyRow {
    /// Key label on the first row of a key/value pair.
    pub key: Option<String>,
    /// Extra columns before `text` (the key column on continuation rows).
    pub indent: usize,
    pub text: String,
    pub emphasis: bool,
}

impl BodyRow {
    fn text(text: String) -> Self {
        Self {
            key: None,
            indent: 0,
            text,
            emphasis: false,
        }
    }
}

impl BodyLayout<'_> {
    fn prepare(&self, body: &MessageBody, text: &str) -> String {
        match (body.latex, self.math) {
            (true, Some(math)) => self.formatter.format(&math.render(text)),
            _ => self.formatter.format(text),
        }
    }

    /// Rows the message body occupies at `width` columns (indent excluded).
    pub fn body_rows(&self, body: &MessageBody, width: u16) -> Vec<BodyRow> {
        let width = usize::from(width).max(1);
        let mut rows = Vec::new();

        let key_col = body
            .kvps
            .iter()
            .map(|row| display_key(&row.key).width() + 2)
            .max()
            .unwrap_or(0)
            .min(KEY_COLUMN_MAX)
            .min(width / 3);

        for kv in &body.kvps {
            let value = kv
                .values
                .iter()
                .map(|value| match value {
                    KvValue::Text(text) => self.prepare(body, text),
                    KvValue::Image(path) => format!("⟦image {path}⟧"),
                })
                .collect::<Vec<_>>()
                .join("\n");
            let wrapped = TextWrapper::wrap_lines(&value, &WrapConfig::new(width - key_col));
            let emphasis = kv.is_thoughts();
            if wrapped.is_empty() {
                rows.push(BodyRow {
                    key: Some(display_key(&kv.key)),
                    indent: key_col,
                    text: String::new(),
                    emphasis,
                });
            }
            for (idx, text) in wrapped.into_iter().enumerate() {
                rows.push(BodyRow {
                    key: (idx == 0).then(|| display_key(&kv.key)),
                    indent: key_col,
                    text,
                    emphasis,
                });
            }
        }

        let content = body.content.trim_end_matches('\n');
        if !content.is_empty() {
            if !rows.is_empty() {
                rows.push(BodyRow::text(String::new()));
            }
            let formatted = self.prepare(body, content);
            rows.extend(
                TextWrapper::wrap_lines(&formatted, &WrapConfig::new(width))
                    .into_iter()
                    .map(BodyRow::text),
            );
        }
        rows
    }
}

fn display_key(key: &str) -> String {
    key.replace('_', " ")
}

/// Body rows visible for a compact message at the given cell height.
pub fn compact_rows(cell_height: u16) -> usize {
    (COMPACT_THRESHOLD_PX / u32::from(cell_height.max(1))).max(1) as usize
}

/// What a click on a transcript cell lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Control(MessageId, ControlKind),
    Message(MessageId),
}

#[derive(Debug, Clone)]
pub struct LineHit {
    pub message: MessageId,
    pub buttons: Vec<(Range<u16>, ControlKind)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageSpan {
    pub id: MessageId,
    pub start: usize,
    pub len: usize,
}

/// Flattened transcript lines plus the geometry needed for mouse hits and
/// selection scrolling.
#[derive(Debug, Default)]
pub struct TranscriptLayout {
    pub lines: Vec<Line<'static>>,
    pub hits: Vec<Option<LineHit>>,
    pub spans: Vec<MessageSpan>,
}

impl TranscriptLayout {
    /// Resolve a click on line `line`, column `col`. Controls win over the
    /// message underneath them.
    pub fn hit(&self, line: usize, col: u16) -> Option<HitTarget> {
        let hit = self.hits.get(line)?.as_ref()?;
        let control = hit
            .buttons
            .iter()
            .find(|(range, _)| range.contains(&col))
            .map(|(_, kind)| HitTarget::Control(hit.message, *kind));
        Some(control.unwrap_or(HitTarget::Message(hit.message)))
    }

    pub fn span_of(&self, id: MessageId) -> Option<MessageSpan> {
        self.spans.iter().find(|span| span.id == id).copied()
    }
}

pub struct LayoutContext<'a> {
    pub theme: &'a Theme,
    pub body: BodyLayout<'a>,
    pub width: u16,
    pub cell_height: u16,
    pub selected: Option<MessageId>,
    pub now: Instant,
}

pub fn layout_transcript(transcript: &Transcript, ctx: &LayoutContext<'_>) -> TranscriptLayout {
    let mut layout = TranscriptLayout::default();
    for handle in transcript.iter() {
        let start = layout.lines.len();
        layout_message(handle, ctx, &mut layout);
        layout.spans.push(MessageSpan {
            id: handle.id(),
            start,
            len: layout.lines.len() - start,
        });
    }
    layout
}

fn push(layout: &mut TranscriptLayout, line: Line<'static>, hit: Option<LineHit>) {
    layout.lines.push(line);
    layout.hits.push(hit);
}

fn layout_message(handle: &MessageHandle, ctx: &LayoutContext<'_>, layout: &mut TranscriptLayout) {
    let theme = ctx.theme;
    let id = handle.id();
    let body_hit = || {
        Some(LineHit {
            message: id,
            buttons: Vec::new(),
        })
    };

    let (header, buttons) = header_line(handle, ctx);
    push(
        layout,
        header,
        Some(LineHit {
            message: id,
            buttons,
        }),
    );

    let pad = " ".repeat(usize::from(BODY_INDENT));
    if let Some(summary) = handle.summary() {
        push(
            layout,
            Line::from(vec![
                Span::raw(pad.clone()),
                Span::styled(format!("$ {summary}"), theme.summary_style),
            ]),
            body_hit(),
        );
    }

    if handle.display() == DisplayClass::Collapsed {
        if let Some(preview) = handle.preview().filter(|preview| !preview.is_empty()) {
            push(
                layout,
                Line::from(vec![
                    Span::raw(pad.clone()),
                    Span::styled(format!("⋯ {preview}"), theme.preview_style),
                ]),
                body_hit(),
            );
        }
        push(layout, Line::default(), None);
        return;
    }

    let body_width = ctx.width.saturating_sub(BODY_INDENT);
    let rows = ctx.body.body_rows(handle.body(), body_width);
    let fading = handle
        .transition()
        .is_some_and(|transition| transition.is_fading(ctx.now));
    let text_style = if fading {
        theme.fading_style
    } else {
        theme.body_style
    };

    let (visible, above, below) = match handle.display() {
        DisplayClass::Compact => compact_window(
            rows.len(),
            compact_rows(ctx.cell_height),
            usize::from(handle.scroll().rows_from_bottom()),
        ),
        _ => (0..rows.len(), 0, 0),
    };

    if above > 0 {
        push(
            layout,
            Line::styled(format!("{pad}▲ {above} more"), theme.indicator_style),
            body_hit(),
        );
    }
    for row in &rows[visible] {
        let mut spans = vec![Span::raw(pad.clone())];
        match &row.key {
            Some(key) => {
                let key_width = key.width();
                spans.push(Span::styled(key.clone(), theme.kv_key_style));
                spans.push(Span::raw(" ".repeat(row.indent.saturating_sub(key_width))));
            }
            None if row.indent > 0 => spans.push(Span::raw(" ".repeat(row.indent))),
            None => {}
        }
        let style = if row.emphasis {
            text_style.add_modifier(ratatui::style::Modifier::ITALIC)
        } else {
            text_style
        };
        for segment in ctx.body.formatter.segments(&row.text) {
            let segment_style = match segment.kind {
                SegmentKind::Plain => style,
                SegmentKind::Path => theme.path_style,
                SegmentKind::Image => theme.image_style,
            };
            spans.push(Span::styled(segment.text.to_string(), segment_style));
        }
        push(layout, Line::from(spans), body_hit());
    }
    if below > 0 {
        push(
            layout,
            Line::styled(format!("{pad}▼ {below} more"), theme.indicator_style),
            body_hit(),
        );
    }
    push(layout, Line::default(), None);
}

/// Visible row range of a compact body pinned `from_bottom` rows above its
/// tail, plus the number of hidden rows above and below.
pub fn compact_window(
    total: usize,
    max_rows: usize,
    from_bottom: usize,
) -> (Range<usize>, usize, usize) {
    if total <= max_rows {
        return (0..total, 0, 0);
    }
    let from_bottom = from_bottom.min(total - max_rows);
    let end = total - from_bottom;
    let start = end - max_rows;
    (start..end, start, from_bottom)
}

fn header_line(
    handle: &MessageHandle,
    ctx: &LayoutContext<'_>,
) -> (Line<'static>, Vec<(Range<u16>, ControlKind)>) {
    let theme = ctx.theme;
    let ty = handle.ty();
    let selected = ctx.selected == Some(handle.id());
    let marker = match (selected, handle.display()) {
        (true, _) => "▶ ",
        (false, DisplayClass::Collapsed) => "▸ ",
        (false, _) => "▾ ",
    };

    let mut title = ty.label().to_string();
    if let Some(heading) = handle.body().heading.as_deref().filter(|h| !h.is_empty()) {
        title.push_str(" · ");
        title.push_str(heading);
    }
    if handle.is_streaming() {
        title.push_str(" …");
    }

    let Some(controls) = handle.controls() else {
        return (
            Line::from(vec![
                Span::styled(marker, theme.selected_marker_style),
                Span::styled(title, theme.header_style(ty)),
            ]),
            Vec::new(),
        );
    };

    let labels: Vec<(String, ControlKind, ratatui::style::Style)> = controls
        .buttons()
        .iter()
        .map(|button| {
            let (icon, tone) = button.displayed(ctx.now);
            (
                format!("[{}]", icon.glyph()),
                button.kind(),
                theme.button_style(tone),
            )
        })
        .collect();
    let buttons_width: usize =
        labels.iter().map(|(label, _, _)| label.width()).sum::<usize>() + labels.len() - 1;

    let total = usize::from(ctx.width);
    let room = total.saturating_sub(marker.width() + buttons_width + 1);
    if title.width() > room {
        title = clip_to_width(&title, room.saturating_sub(1));
        title.push('…');
    }
    let gap = total
        .saturating_sub(marker.width() + title.width() + buttons_width)
        .max(1);

    let mut spans = vec![
        Span::styled(marker, theme.selected_marker_style),
        Span::styled(title.clone(), theme.header_style(ty)),
        Span::raw(" ".repeat(gap)),
    ];
    let mut col = (marker.width() + title.width() + gap) as u16;
    let mut regions = Vec::with_capacity(labels.len());
    for (idx, (label, kind, style)) in labels.into_iter().enumerate() {
        if idx > 0 {
            spans.push(Span::raw(" "));
            col += 1;
        }
        let width = label.width() as u16;
        regions.push((col..col + width, kind));
        col += width;
        spans.push(Span::styled(label, style));
    }
    (Line::from(spans), regions)
}

fn clip_to_width(text: &str, max: usize) -> String {
    let mut width = 0;
    text.chars()
        .take_while(|ch| {
            width += UnicodeWidthChar::width(*ch).unwrap_or(0);
            width <= max
        })
        .collect()
}
