//! Free-text normalization applied to every field before it reaches a response.

/// Collapse every run of whitespace to a single ASCII space and trim both ends.
///
/// ```
/// use paper_proxy::text::normalize;
///
/// assert_eq!(normalize("  Deep \n\t Learning\n"), "Deep Learning");
/// ```
#[must_use]
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Like [`normalize`], but absent input yields an empty string.
#[must_use]
pub fn normalize_opt(text: Option<&str>) -> String {
    text.map(normalize).unwrap_or_default()
}

/// Keep at most `max_chars` characters, cutting on a char boundary.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
