//! Notice linker: publishes dated link notes as notices.
//!
//! # Invariants
//! - The date shape is one to four digits, `-` or `/`, one or two digits,
//!   anywhere in the note. No calendar validation: "24-3" and "9999/99"
//!   both match.
//! - Output is a pure function of the inputs.

use once_cell::sync::Lazy;
use regex::Regex;

static DATE_SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{1,4}[-/]\d{1,2}").expect("valid date shape regex"));

/// Returns whether `note` contains a date-shaped token.
pub fn has_date_token(note: &str) -> bool {
    DATE_SHAPE_RE.is_match(note)
}

/// Formats a notice body: `note` followed by an inline link to the card.
///
/// `url` and `title` are embedded verbatim; the board treats notice content
/// as trusted markup.
pub fn cross_link_content(note: &str, url: &str, title: &str) -> String {
    format!(
        "{note} <a href='{url}' target='_blank' style='text-decoration: underline; color: inherit;'>[{title}]</a>"
    )
}

/// Derives the notice published alongside a link, if any.
///
/// Returns `None` for empty notes and notes without a date-shaped token.
pub fn derive_notice(note: &str, url: &str, title: &str) -> Option<String> {
    if note.is_empty() || !has_date_token(note) {
        return None;
    }
    Some(cross_link_content(note, url, title))
}
