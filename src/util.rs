const OMISSION: &str = "...";

/// Shortens `text` to at most `max_chars` characters, ending in `...` when
/// anything was cut.
pub fn truncate_title(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let keep = max_chars.saturating_sub(OMISSION.len());
    let mut truncated = text.chars().take(keep).collect::<String>();
    truncated.push_str(OMISSION);
    truncated
}
