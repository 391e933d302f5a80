//! Conservative rule-based sentence splitting, used when no model is loaded.

/// Split at `.`, `!` or `?` (runs allowed) followed by whitespace and an
/// uppercase letter. Returns trimmed, non-empty `(start, end)` byte ranges.
pub(crate) fn split_sentence_ranges(text: &str) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        // Swallow the rest of a terminal run like "?!" or "...".
        let mut end = i + c.len_utf8();
        while let Some(&(j, next)) = chars.peek() {
            if matches!(next, '.' | '!' | '?') {
                end = j + next.len_utf8();
                chars.next();
            } else {
                break;
            }
        }

        // Look ahead: whitespace, then an uppercase letter.
        let rest = &text[end..];
        let after_space = rest.trim_start();
        if after_space.len() == rest.len() {
            continue;
        }
        if after_space.chars().next().is_some_and(char::is_uppercase) {
            push_trimmed(text, start, end, &mut ranges);
            start = end;
        }
    }

    push_trimmed(text, start, text.len(), &mut ranges);
    ranges
}

/// Push `text[start..end]` with surrounding whitespace removed, if non-empty.
pub(crate) fn push_trimmed(text: &str, start: usize, end: usize, out: &mut Vec<(usize, usize)>) {
    let slice = &text[start..end];
    let trimmed = slice.trim();
    if trimmed.is_empty() {
        return;
    }
    let lead = slice.len() - slice.trim_start().len();
    out.push((start + lead, start + lead + trimmed.len()));
}
