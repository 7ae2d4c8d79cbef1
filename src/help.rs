//! Usage text: one line per option, flag spellings in a shared left column,
//! help text word-wrapped into the remaining width.

use crate::option::OptionKey;

pub(crate) const DEFAULT_WIDTH: usize = 80;

const INDENT: usize = 2;
const GUTTER: usize = 2;
const MIN_HELP_WIDTH: usize = 10;

/// Render `entries` (already in display order) at `width` columns.
pub(crate) fn render<'k>(
    entries: impl Iterator<Item = (&'k OptionKey, &'k str)>,
    width: usize,
) -> String {
    let rows: Vec<(String, &str)> = entries
        .map(|(key, help)| (key.to_string(), help))
        .collect();
    let flag_width = rows
        .iter()
        .map(|(flags, _)| flags.chars().count())
        .max()
        .unwrap_or(0);
    let help_width = width
        .saturating_sub(INDENT + flag_width + GUTTER)
        .max(MIN_HELP_WIDTH);
    let continuation = " ".repeat(INDENT + flag_width + GUTTER);

    let mut out = String::from("Usage:\n");
    for (flags, help) in rows {
        let lines = fill_text(help, help_width);
        let mut lines = lines.iter();
        let first = lines.next().map(String::as_str).unwrap_or("");
        let line = format!(
            "{}{flags:<flag_width$}{}{first}",
            " ".repeat(INDENT),
            " ".repeat(GUTTER)
        );
        out.push_str(line.trim_end());
        out.push('\n');
        for rest in lines {
            out.push_str(&continuation);
            out.push_str(rest);
            out.push('\n');
        }
    }
    out
}

/// Greedy word wrap. Lines never exceed `width` unless a single word does,
/// in which case that word gets a line of its own.
pub fn fill_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current_len > 0 && current_len + 1 + word_len > width {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }
    if current_len > 0 {
        lines.push(current);
    }
    lines
}
