//! Width-aware word wrapping for message bodies.
//!
//! The renderer and the layout probe both go through this module, so the
//! number of rows a message occupies on screen is exactly the number of rows
//! the height classifier measures. Spacing inside a line is preserved; words
//! longer than the available width are split at the cell boundary.

use unicode_width::UnicodeWidthChar;

#[derive(Debug, Clone, Copy)]
pub struct WrapConfig {
    /// Maximum width of a row, in terminal cells.
    pub width: usize,
}

impl WrapConfig {
    pub fn new(width: usize) -> Self {
        Self { width }
    }
}

pub struct TextWrapper;

impl TextWrapper {
    /// Wrap `text` into display rows. Every `\n` starts a new row and an
    /// empty input yields no rows.
    pub fn wrap_lines(text: &str, config: &WrapConfig) -> Vec<String> {
        let width = config.width.max(1);
        let mut rows = Vec::new();
        if text.is_empty() {
            return rows;
        }
        for line in text.split('\n') {
            wrap_one_line(line, width, &mut rows);
        }
        rows
    }

    pub fn count_wrapped_lines(text: &str, config: &WrapConfig) -> usize {
        Self::wrap_lines(text, config).len()
    }
}

fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(0)
}

fn wrap_one_line(line: &str, width: usize, rows: &mut Vec<String>) {
    let mut current = String::new();
    let mut current_width = 0usize;

    for token in split_keep_spaces(line) {
        let token_width: usize = token.chars().map(char_width).sum();
        let is_space = token.chars().all(char::is_whitespace);

        if current_width + token_width <= width {
            current.push_str(token);
            current_width += token_width;
            continue;
        }

        if is_space {
            // Break at the run of spaces; it does not carry onto the next row.
            rows.push(std::mem::take(&mut current));
            current_width = 0;
            continue;
        }

        if current_width > 0 && token_width <= width {
            rows.push(current.trim_end().to_string());
            current.clear();
            current.push_str(token);
            current_width = token_width;
            continue;
        }

        for ch in token.chars() {
            let w = char_width(ch);
            if current_width + w > width && current_width > 0 {
                rows.push(std::mem::take(&mut current));
                current_width = 0;
            }
            current.push(ch);
            current_width += w;
        }
    }

    rows.push(current);
}

/// Split into alternating runs of whitespace and non-whitespace.
fn split_keep_spaces(line: &str) -> impl Iterator<Item = &str> {
    let mut rest = line;
    std::iter::from_fn(move || {
        let first = rest.chars().next()?;
        let space = first.is_whitespace();
        let end = rest
            .char_indices()
            .find(|(_, ch)| ch.is_whitespace() != space)
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len());
        let (token, tail) = rest.split_at(end);
        rest = tail;
        Some(token)
    })
}
