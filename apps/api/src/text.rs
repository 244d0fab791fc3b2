//! Bounded views over document text.
//!
//! Extraction tiers only ever read a prefix of the document; larger windows cost
//! more backend latency. All offsets here are byte offsets that land on char
//! boundaries, so multi-byte text never panics on slicing.

/// Prefix sent to the profile classifier.
pub const CLASSIFICATION_WINDOW: usize = 1_000;
/// Prefix searched for aggressive "N years" tokens.
pub const AGGRESSIVE_WINDOW: usize = 2_000;
/// Prefix treated as the summary region.
pub const SUMMARY_WINDOW: usize = 5_000;
/// Prefix sent with skill extraction prompts.
pub const SKILLS_WINDOW: usize = 10_000;
/// Prefix treated as the work-history region.
pub const WORK_HISTORY_WINDOW: usize = 15_000;
/// Prefix sent with the experience extraction prompt.
pub const EXPERIENCE_WINDOW: usize = 20_000;

/// First `max_chars` characters of `text`.
pub fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// The match `start..end` widened by up to `radius` characters on each side.
pub fn char_window(text: &str, start: usize, end: usize, radius: usize) -> &str {
    let from = if radius == 0 {
        start
    } else {
        text[..start]
            .char_indices()
            .rev()
            .nth(radius - 1)
            .map(|(i, _)| i)
            .unwrap_or(0)
    };
    let to = text[end..]
        .char_indices()
        .nth(radius)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());
    &text[from..to]
}
