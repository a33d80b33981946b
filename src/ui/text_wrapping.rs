//! Width-aware word wrapping for transcript text.
//!
//! The transcript is pre-wrapped into explicit lines so the scroll math in
//! the renderer counts exactly the rows ratatui will draw.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Wrap `text` to `width` display columns.
///
/// Embedded newlines always break. Words longer than `width` are split at
/// the column limit. Interior spacing is preserved; spaces at a wrap point
/// are dropped. Always returns at least one (possibly empty) line.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for source_line in text.split('\n') {
        let source_line = source_line.strip_suffix('\r').unwrap_or(source_line);
        wrap_single_line(source_line, width, &mut lines);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn wrap_single_line(line: &str, width: usize, out: &mut Vec<String>) {
    if line.width() <= width {
        out.push(line.to_string());
        return;
    }

    let mut current = String::new();
    let mut current_width = 0;

    for token in split_keeping_spaces(line) {
        let token_width = token.width();
        let is_space = token.starts_with(' ');

        if current_width + token_width <= width {
            current.push_str(token);
            current_width += token_width;
            continue;
        }

        if is_space {
            // Break here and swallow the run of spaces.
            if current_width > 0 {
                out.push(std::mem::take(&mut current));
                current_width = 0;
            }
            continue;
        }

        if current_width > 0 && token_width <= width {
            out.push(std::mem::take(&mut current).trim_end().to_string());
            current.push_str(token);
            current_width = token_width;
            continue;
        }

        for ch in token.chars() {
            let ch_width = ch.width().unwrap_or(0);
            if current_width + ch_width > width && current_width > 0 {
                out.push(std::mem::take(&mut current));
                current_width = 0;
            }
            current.push(ch);
            current_width += ch_width;
        }
    }

    if !current.is_empty() || out.is_empty() {
        out.push(current);
    }
}

/// Split into alternating runs of spaces and non-spaces.
fn split_keeping_spaces(line: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_space = None;

    for (idx, ch) in line.char_indices() {
        let space = ch == ' ';
        match in_space {
            Some(prev) if prev != space => {
                tokens.push(&line[start..idx]);
                start = idx;
            }
            _ => {}
        }
        in_space = Some(space);
    }
    if start < line.len() {
        tokens.push(&line[start..]);
    }
    tokens
}
