//! Content formatting for the terminal: escaping, path highlighting, inline
//! image placeholders and the optional math hook.

use base64::Engine;

const IMAGE_OPEN: &str = "<image>";
const IMAGE_CLOSE: &str = "</image>";
const PLACEHOLDER_OPEN: char = '⟦';
const PLACEHOLDER_CLOSE: char = '⟧';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Plain,
    Path,
    Image,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub kind: SegmentKind,
    pub text: &'a str,
}

pub trait ContentFormatter {
    /// Normalize raw message text into display text.
    fn format(&self, text: &str) -> String;

    /// Split one wrapped display row into styled segments.
    fn segments<'a>(&self, row: &'a str) -> Vec<Segment<'a>>;
}

/// Rewrites math markup in messages that opted into it.
pub trait MathHook {
    fn render(&self, text: &str) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalFormatter;

impl ContentFormatter for TerminalFormatter {
    fn format(&self, text: &str) -> String {
        strip_control_chars(&expand_images(text))
    }

    fn segments<'a>(&self, row: &'a str) -> Vec<Segment<'a>> {
        let mut segments = Vec::new();
        let mut plain_start = 0;
        let mut idx = 0;

        while idx < row.len() {
            let rest = &row[idx..];
            let token_end = if rest.starts_with(PLACEHOLDER_OPEN) {
                rest.find(PLACEHOLDER_CLOSE)
                    .map(|end| (end + PLACEHOLDER_CLOSE.len_utf8(), SegmentKind::Image))
            } else if starts_path(row, idx) {
                Some((path_len(rest), SegmentKind::Path))
            } else {
                None
            };

            match token_end {
                Some((len, kind)) if len > 0 => {
                    if plain_start < idx {
                        segments.push(Segment {
                            kind: SegmentKind::Plain,
                            text: &row[plain_start..idx],
                        });
                    }
                    segments.push(Segment {
                        kind,
                        text: &row[idx..idx + len],
                    });
                    idx += len;
                    plain_start = idx;
                }
                _ => {
                    idx += rest.chars().next().map_or(1, char::len_utf8);
                }
            }
        }

        if plain_start < row.len() {
            segments.push(Segment {
                kind: SegmentKind::Plain,
                text: &row[plain_start..],
            });
        }
        segments
    }
}

/// Remove terminal control sequences. Tabs become four spaces; newlines stay.
fn strip_control_chars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\n' => out.push('\n'),
            '\t' => out.push_str("    "),
            '\r' => {}
            '\u{1b}' => {
                // Skip a CSI sequence (`ESC [ ... final`), or just the escape.
                if chars.peek() == Some(&'[') {
                    chars.next();
                    for next in chars.by_ref() {
                        if ('@'..='~').contains(&next) {
                            break;
                        }
                    }
                }
            }
            ch if ch.is_control() => {}
            ch => out.push(ch),
        }
    }
    out
}

fn expand_images(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find(IMAGE_OPEN) {
        let body_start = open + IMAGE_OPEN.len();
        let Some(close) = rest[body_start..].find(IMAGE_CLOSE) else {
            break;
        };
        out.push_str(&rest[..open]);
        out.push_str(&image_placeholder(&rest[body_start..body_start + close]));
        rest = &rest[body_start + close + IMAGE_CLOSE.len()..];
    }
    out.push_str(rest);
    out
}

pub fn image_placeholder(payload: &str) -> String {
    let compact: String = payload.chars().filter(|ch| !ch.is_whitespace()).collect();
    match base64::engine::general_purpose::STANDARD.decode(compact.as_bytes()) {
        Ok(bytes) => format!(
            "{PLACEHOLDER_OPEN}image {}{PLACEHOLDER_CLOSE}",
            format_size(bytes.len())
        ),
        Err(_) => format!("{PLACEHOLDER_OPEN}image: unreadable data{PLACEHOLDER_CLOSE}"),
    }
}

fn format_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KiB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MiB", bytes as f64 / (1024.0 * 1024.0))
    }
}

fn is_path_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.' | '/' | '~')
}

/// A path starts at a `/` or `~/` that opens the row or follows whitespace
/// or `>`, and continues with at least one more path character.
fn starts_path(row: &str, idx: usize) -> bool {
    let rest = &row[idx..];
    if !(rest.starts_with('/') || rest.starts_with("~/")) {
        return false;
    }
    let preceded_ok = row[..idx]
        .chars()
        .next_back()
        .is_none_or(|prev| prev.is_whitespace() || prev == '>');
    preceded_ok && path_len(rest) > 1
}

fn path_len(rest: &str) -> usize {
    let len = rest
        .char_indices()
        .find(|(_, ch)| !is_path_char(*ch))
        .map(|(idx, _)| idx)
        .unwrap_or(rest.len());
    // Trailing sentence punctuation is not part of the path.
    rest[..len].trim_end_matches('.').len()
}

/// Replaces common LaTeX commands with their Unicode symbols and drops the
/// `$` delimiters around inline math.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnicodeMath;

const MATH_SYMBOLS: &[(&str, &str)] = &[
    ("\\alpha", "α"),
    ("\\beta", "β"),
    ("\\gamma", "γ"),
    ("\\delta", "δ"),
    ("\\epsilon", "ε"),
    ("\\lambda", "λ"),
    ("\\mu", "μ"),
    ("\\pi", "π"),
    ("\\sigma", "σ"),
    ("\\theta", "θ"),
    ("\\infty", "∞"),
    ("\\times", "×"),
    ("\\cdot", "·"),
    ("\\leq", "≤"),
    ("\\geq", "≥"),
    ("\\neq", "≠"),
    ("\\approx", "≈"),
    ("\\sum", "∑"),
    ("\\int", "∫"),
    ("\\sqrt", "√"),
    ("\\rightarrow", "→"),
    ("\\to", "→"),
];

impl MathHook for UnicodeMath {
    fn render(&self, text: &str) -> String {
        let mut out = text.replace("$$", "").replace('$', "");
        // Longest command first so `\to` does not eat the head of `\theta`.
        let mut symbols = MATH_SYMBOLS.to_vec();
        symbols.sort_by_key(|(command, _)| std::cmp::Reverse(command.len()));
        for (command, symbol) in symbols {
            out = out.replace(command, symbol);
        }
        out
    }
}
