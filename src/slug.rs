//! Slug and display-title helpers.
//!
//! Every page has a slug (the URL-safe identifier matched against category
//! paths) and a title. When front matter omits them they are derived here:
//!
//! - `hello-world.md` → title "hello world"
//! - title "Crème Brûlée, Part 2" → slug `creme-brulee-part-2`

/// Convert arbitrary text to a URL slug.
///
/// Non-ASCII text is transliterated first, then every run of characters
/// that is not an ASCII letter or digit collapses to a single `-`. Leading
/// and trailing dashes are trimmed.
pub fn slugify(text: &str) -> String {
    let ascii = deunicode::deunicode(text);
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_dash = false;
    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Display title from a file stem: dashes and underscores become spaces.
pub fn title_from_stem(stem: &str) -> String {
    stem.replace(['-', '_'], " ").trim().to_string()
}
