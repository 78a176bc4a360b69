//! Bracket-aware truncation.
//!
//! When structured output is cut short, the closing bracket matching its
//! first character is re-appended so the model does not try to continue an
//! unterminated literal.

/// Truncate `output` to `max_length` characters.
///
/// Strings starting with `(`, `[` or `{` get `...)`, `...]` or `...}`
/// appended; anything else gets `...`. Short strings are returned unchanged.
pub fn truncate_str(output: &str, max_length: usize) -> String {
    if output.chars().count() <= max_length {
        return output.to_string();
    }

    let suffix = match output.chars().next() {
        Some('(') => "...)",
        Some('[') => "...]",
        Some('{') => "...}",
        _ => "...",
    };
    let head: String = output.chars().take(max_length).collect();
    format!("{head}{suffix}")
}
