//! Free-text search helpers for list queries

/// Build a `%…%` pattern for `ILIKE … ESCAPE '\'` from a raw search string
///
/// Blank input yields `None`. `%`, `_` and `\` in the input match literally.
pub fn contains_pattern(search: Option<&str>) -> Option<String> {
    let term = search.map(str::trim).filter(|s| !s.is_empty())?;

    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    Some(pattern)
}
