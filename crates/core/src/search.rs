//! Free-text search helpers shared by request and provider search.
//!
//! Matching is a case-insensitive substring test (`ILIKE`), so the only job
//! here is turning user input into a safe pattern.

use crate::error::CoreError;

/// Longest accepted search query, in characters.
pub const MAX_QUERY_LEN: usize = 100;

/// Escape character used in generated `ILIKE` patterns.
pub const LIKE_ESCAPE: char = '\\';

/// Normalise a search query: trim whitespace and reject over-long input.
///
/// Returns `Ok(None)` for empty or whitespace-only input.
pub fn normalize_query(query: &str) -> Result<Option<&str>, CoreError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > MAX_QUERY_LEN {
        return Err(CoreError::Validation(format!(
            "search query must be at most {MAX_QUERY_LEN} characters"
        )));
    }
    Ok(Some(trimmed))
}

/// Build a `%term%` pattern for `ILIKE ... ESCAPE '\'`.
///
/// `%`, `_` and the escape character itself are escaped so user input is
/// always matched literally.
///
/// # Examples
///
/// ```
/// use huduma_core::search::build_like_pattern;
/// assert_eq!(build_like_pattern("plumb"), "%plumb%");
/// assert_eq!(build_like_pattern("50%"), "%50\\%%");
/// ```
pub fn build_like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if c == '%' || c == '_' || c == LIKE_ESCAPE {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
