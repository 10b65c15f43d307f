//! Topic name normalization.

/// Normalizes topic name, or returns `None` if nothing usable is left.
///
/// Whitespace becomes `_`, the characters `@`, `~` and the sequence `:=`
/// are dropped, repeated slashes are collapsed, a leading slash is added
/// and a trailing one is removed.
///
pub fn as_valid_topic(topic: &str) -> Option<String> {
    let cleaned = topic
        .trim()
        .replace(":=", "")
        .chars()
        .filter(|&c| c != '@' && c != '~')
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect::<String>();

    let segments: Vec<_> = cleaned.split('/').filter(|part| !part.is_empty()).collect();
    if segments.is_empty() {
        return None;
    }
    Some(format!("/{}", segments.join("/")))
}

/// Returns the first candidate which normalizes to a valid topic.
pub fn valid_topic<I, S>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    candidates
        .into_iter()
        .find_map(|candidate| as_valid_topic(candidate.as_ref()))
}
