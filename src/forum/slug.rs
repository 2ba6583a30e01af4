//! Slug derivation for forum titles.

use unicode_normalization::UnicodeNormalization;

/// Maximum slug length.
pub const MAX_SLUG_LENGTH: usize = 40;

/// Combining diacritical marks (U+0300..U+036F).
fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036F}').contains(&c)
}

/// Derive a URL-safe slug from a title.
///
/// Lowercases, strips diacritics, collapses every run of characters outside
/// `[a-z0-9]` into one hyphen, trims hyphens and truncates to 40 characters.
/// The result may be empty.
///
/// # Examples
///
/// ```
/// use naranjo::forum::slugify;
///
/// assert_eq!(slugify("Música Retro!!"), "musica-retro");
/// assert_eq!(slugify("!!!"), "");
/// ```
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.to_lowercase().nfd().filter(|c| !is_combining_mark(*c)) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    // Only ASCII remains, so byte length equals character count.
    if slug.len() > MAX_SLUG_LENGTH {
        slug.truncate(MAX_SLUG_LENGTH);
    }
    slug.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_diacritics_and_punctuation() {
        assert_eq!(slugify("Música Retro!!"), "musica-retro");
        assert_eq!(slugify("Ñandú & Pingüino"), "nandu-pinguino");
    }

    #[test]
    fn test_collapses_runs_and_trims() {
        assert_eq!(slugify("  --Hello,   World--  "), "hello-world");
        assert_eq!(slugify("a...b"), "a-b");
        assert_eq!(slugify("C++ / Rust"), "c-rust");
    }

    #[test]
    fn test_empty_results() {
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("日本語"), "");
    }

    #[test]
    fn test_truncates_without_trailing_hyphen() {
        let title = format!("{} {}", "a".repeat(39), "bbbb");
        let slug = slugify(&title);
        assert_eq!(slug, "a".repeat(39));
        assert!(slug.len() <= MAX_SLUG_LENGTH);

        assert_eq!(slugify(&"x".repeat(60)).len(), MAX_SLUG_LENGTH);
    }

    #[test]
    fn test_is_deterministic() {
        assert_eq!(slugify("Foro General 2024"), slugify("Foro General 2024"));
        assert_eq!(slugify("Foro General 2024"), "foro-general-2024");
    }
}
