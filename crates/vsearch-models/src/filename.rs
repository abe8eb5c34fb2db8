//! Deterministic output filename derivation.
//!
//! The filename doubles as the artifact's de-duplication key: two requests
//! for the same (query, page, search type) resolve to the same file, and a
//! build is skipped entirely when that file already exists.

use crate::search::SearchType;

/// Turn free text into a filesystem-safe slug: lowercase, punctuation
/// stripped, whitespace runs collapsed to single hyphens.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;
    for c in text.chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_hyphen = true;
        }
        // Everything else (punctuation) is dropped without a separator.
    }
    slug
}

/// Derive the supercut filename for a query.
///
/// Pattern: `supercut_<slug>[_<page>][_<search_type>].mp4`. The page suffix
/// is omitted for page 1 and the search-type suffix for `audio`.
pub fn supercut_filename(query: &str, page: u32, search_type: SearchType) -> String {
    let mut filename = format!("supercut_{}", slugify(query));
    if page > 1 {
        filename.push_str(&format!("_{}", page));
    }
    if search_type != SearchType::Audio {
        filename.push_str(&format!("_{}", search_type));
    }
    filename.push_str(".mp4");
    filename
}

/// Poster still filename for a video filename.
pub fn poster_filename(video_filename: &str) -> String {
    match video_filename.strip_suffix(".mp4") {
        Some(stem) => format!("{}.jpg", stem),
        None => format!("{}.jpg", video_filename),
    }
}
