//! Filesystem-safe filename sanitization.

/// Sanitizes a URL/path fragment for safe use as a local filename.
///
/// - Strips everything from the first `?` or `#` onward
/// - Replaces every character outside `[A-Za-z0-9._-]` with `_`
///
/// Pure and total: never fails, and `sanitize_filename(sanitize_filename(x))
/// == sanitize_filename(x)` for any input.
pub fn sanitize_filename(name: &str) -> String {
    let stem = name
        .split(['?', '#'])
        .next()
        .unwrap_or_default();

    stem.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
