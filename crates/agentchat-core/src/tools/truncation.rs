//! Output truncation utilities for tool results
//!
//! Limits are counted in characters, never bytes, so multi-byte text is never
//! split mid-character.

use crate::constants::tools::DISPLAY_RESULT_CHARS;

/// Result of a truncation operation
pub struct TruncationResult {
    pub text: String,
    pub was_truncated: bool,
    pub lines_shown: usize,
    pub lines_total: usize,
    pub chars_shown: usize,
    pub chars_total: usize,
}

impl TruncationResult {
    /// Format a truncation notice for appending to output
    pub fn notice(&self) -> Option<String> {
        if !self.was_truncated {
            return None;
        }
        Some(format!(
            "\n[Output truncated: showed {} of {} lines ({}/{} characters)]",
            self.lines_shown, self.lines_total, self.chars_shown, self.chars_total,
        ))
    }

    /// Text followed by the notice, if any
    pub fn into_output(self) -> String {
        match self.notice() {
            Some(notice) => format!("{}{}", self.text, notice),
            None => self.text,
        }
    }
}

/// Head-truncate: keep the first N lines/characters.
pub fn truncate_head(text: &str, max_lines: usize, max_chars: usize) -> TruncationResult {
    let chars_total = text.chars().count();
    let lines: Vec<&str> = text.lines().collect();
    let lines_total = lines.len();

    if lines_total <= max_lines && chars_total <= max_chars {
        return TruncationResult {
            text: text.to_string(),
            was_truncated: false,
            lines_shown: lines_total,
            lines_total,
            chars_shown: chars_total,
            chars_total,
        };
    }

    let line_limited = &lines[..lines_total.min(max_lines)];
    let joined = line_limited.join("\n");

    let final_text = if joined.chars().count() > max_chars {
        let head = take_chars(&joined, max_chars);
        // Prefer ending on a line boundary when one exists
        match head.rfind('\n') {
            Some(cutoff) if cutoff > 0 => head[..cutoff].to_string(),
            _ => head.to_string(),
        }
    } else {
        joined
    };

    TruncationResult {
        lines_shown: final_text.lines().count(),
        chars_shown: final_text.chars().count(),
        text: final_text,
        was_truncated: true,
        lines_total,
        chars_total,
    }
}

/// Head-truncate so the text plus its truncation notice fit in `max_chars`.
pub fn truncate_head_to_fit(text: &str, max_chars: usize) -> String {
    let first = truncate_head(text, usize::MAX, max_chars);
    let Some(notice) = first.notice() else {
        return first.text;
    };
    // A shorter cut never lengthens the notice: only the shown counts shrink
    let budget = max_chars.saturating_sub(notice.chars().count());
    truncate_head(text, usize::MAX, budget).into_output()
}

/// First `max_chars` characters of `text`
pub fn take_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Cap a tool result for display to a remote client, marking the cut with `…`.
pub fn truncate_for_display(text: &str) -> String {
    truncate_with_ellipsis(text, DISPLAY_RESULT_CHARS)
}

pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    let head = take_chars(text, max_chars);
    if head.len() == text.len() {
        text.to_string()
    } else {
        format!("{}…", head)
    }
}
