//! One-line previews shown in place of a collapsed message body.

use crate::core::message::{KvValue, MessageBody, MessageType};
use unicode_segmentation::UnicodeSegmentation;

pub const PREVIEW_MAX_CHARS: usize = 80;

const AGENT_FALLBACK: &str = "Agent message content";
const RESPONSE_FALLBACK: &str = "Agent response content";

pub fn synthesize_preview(ty: MessageType, body: &MessageBody) -> String {
    match ty {
        MessageType::CodeExe => match content_lines(&body.content).last() {
            Some(line) => format!("Last: {line}"),
            None => "No output".to_string(),
        },
        MessageType::Agent => agent_preview(body),
        MessageType::Response => content_lines(&body.content)
            .next()
            .map(truncate_preview)
            .unwrap_or_else(|| RESPONSE_FALLBACK.to_string()),
        _ => content_lines(&body.content)
            .next()
            .map(truncate_preview)
            .unwrap_or_default(),
    }
}

fn agent_preview(body: &MessageBody) -> String {
    let rows: Vec<(String, String)> = body
        .kvps
        .iter()
        .map(|row| (row.key.to_lowercase(), row_text(&row.values)))
        .collect();

    let preferred = rows.iter().find(|(key, value)| {
        (key.contains("thought") || key.contains("text") || key.contains("tool"))
            && is_plain(value)
    });
    if let Some((_, value)) = preferred {
        return truncate_preview(value);
    }
    if let Some((_, value)) = rows.iter().find(|(_, value)| is_plain(value)) {
        return truncate_preview(value);
    }

    match content_lines(&body.content).next() {
        Some(line) if is_plain(line) => truncate_preview(line),
        _ => AGENT_FALLBACK.to_string(),
    }
}

/// Text of every value in a row on one line. Images carry no text.
fn row_text(values: &[KvValue]) -> String {
    values
        .iter()
        .filter_map(|value| match value {
            KvValue::Text(text) => Some(text.split_whitespace().collect::<Vec<_>>().join(" ")),
            KvValue::Image(_) => None,
        })
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Non-empty and not a serialized object or array.
fn is_plain(value: &str) -> bool {
    !value.is_empty() && !value.starts_with('{') && !value.starts_with('[')
}

fn content_lines(content: &str) -> impl DoubleEndedIterator<Item = &str> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
}

/// Cut to [`PREVIEW_MAX_CHARS`] user-perceived characters, marking the cut
/// with `...`.
pub fn truncate_preview(text: &str) -> String {
    let mut graphemes = text.grapheme_indices(true);
    match graphemes.nth(PREVIEW_MAX_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::KvRow;

    #[test]
    fn code_exe_previews_last_output_line() {
        let body = MessageBody::text("Building...\nDone.\n");
        assert_eq!(
            synthesize_preview(MessageType::CodeExe, &body),
            "Last: Done."
        );
        assert_eq!(
            synthesize_preview(MessageType::CodeExe, &MessageBody::text("  \n\n")),
            "No output"
        );
    }

    #[test]
    fn agent_prefers_named_rows_in_declaration_order() {
        let body = MessageBody::default().with_kvps(vec![
            KvRow::new("step", "2"),
            KvRow::new("tool_args", "{\"path\": \"/tmp\"}"),
            KvRow::new("thoughts", "Look at the failing test first"),
            KvRow::new("tool_name", "code_execution_tool"),
        ]);
        assert_eq!(
            synthesize_preview(MessageType::Agent, &body),
            "Look at the failing test first"
        );
    }

    #[test]
    fn agent_falls_back_through_rows_then_content() {
        let rows_only = MessageBody::default().with_kvps(vec![
            KvRow::new("thoughts", "[\"a\", \"b\"]"),
            KvRow::new("step", "finalize"),
        ]);
        assert_eq!(synthesize_preview(MessageType::Agent, &rows_only), "finalize");

        let json_content = MessageBody::text("{\"thoughts\": []}");
        assert_eq!(
            synthesize_preview(MessageType::Agent, &json_content),
            "Agent message content"
        );

        let prose = MessageBody::text("\nPlanning the migration\nstep two");
        assert_eq!(
            synthesize_preview(MessageType::Agent, &prose),
            "Planning the migration"
        );
    }

    #[test]
    fn agent_row_preview_uses_every_text_value() {
        let body = MessageBody::default().with_kvps(vec![KvRow {
            key: "thoughts".to_string(),
            values: vec![
                KvValue::Text("Read the config".to_string()),
                KvValue::Image("/tmp/shot.png".to_string()),
                KvValue::Text("then rerun\nthe tests".to_string()),
            ],
        }]);
        assert_eq!(
            synthesize_preview(MessageType::Agent, &body),
            "Read the config then rerun the tests"
        );
    }

    #[test]
    fn agent_skips_image_values() {
        let body = MessageBody::default().with_kvps(vec![KvRow {
            key: "screenshot".to_string(),
            values: vec![KvValue::Image("/tmp/shot.png".to_string())],
        }]);
        assert_eq!(
            synthesize_preview(MessageType::Agent, &body),
            "Agent message content"
        );
    }

    #[test]
    fn response_and_other_types_use_first_line() {
        assert_eq!(
            synthesize_preview(MessageType::Response, &MessageBody::default()),
            "Agent response content"
        );
        assert_eq!(
            synthesize_preview(MessageType::Tool, &MessageBody::text("\n  ok  \nmore")),
            "ok"
        );
        assert_eq!(
            synthesize_preview(MessageType::Info, &MessageBody::default()),
            ""
        );
    }

    #[test]
    fn long_lines_are_truncated_by_grapheme() {
        let line = "é".repeat(85);
        let preview = synthesize_preview(MessageType::User, &MessageBody::text(line));
        assert!(preview.ends_with("..."));
        assert_eq!(preview.trim_end_matches("...").graphemes(true).count(), 80);

        let exact = "x".repeat(80);
        assert_eq!(truncate_preview(&exact), exact);
    }
}
