//! Title sanitization for artifact filenames.

/// Linux NAME_MAX in bytes.
const NAME_MAX: usize = 255;

/// Strips every character of `title` outside ASCII word characters
/// (`[A-Za-z0-9_]`), whitespace, and `-`. Spacing is preserved as-is.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect()
}

/// Cuts `stem` so that `stem.ext` fits in NAME_MAX bytes, on a char boundary.
pub(crate) fn truncate_stem<'a>(stem: &'a str, extension: &str) -> &'a str {
    let budget = NAME_MAX.saturating_sub(extension.len() + 1);
    if stem.len() <= budget {
        return stem;
    }
    let mut take = budget;
    while take > 0 && !stem.is_char_boundary(take) {
        take -= 1;
    }
    &stem[..take]
}
