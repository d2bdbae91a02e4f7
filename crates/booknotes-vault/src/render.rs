//! Markdown rendering for book notes.
//!
//! A book renders as an author header followed by one block per entry:
//! ```markdown
//! #### by Frank Herbert
//!
//! **01-01-2023, 10:00:00**
//!
//! Fear is the mind-killer.
//!
//! ```

use booknotes_core::record::Annotation;
use booknotes_join::BookGroup;

/// Entry header format: `MM-DD-YYYY, HH:MM:SS`, 24-hour clock.
pub const TIMESTAMP_FORMAT: &str = "%m-%d-%Y, %H:%M:%S";

const UNDATED: &str = "undated";
const UNKNOWN_AUTHOR: &str = "Unknown";

/// Render a single annotation block. The block starts and ends with a blank line.
#[must_use]
pub fn render_entry(annotation: &Annotation) -> String {
    let stamp = annotation
        .timestamp
        .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| UNDATED.to_string());
    format!("\n\n**{stamp}**\n\n{}\n\n", annotation.text)
}

/// Render a whole book: author header, then every entry in the group's order.
#[must_use]
pub fn render_book(book: &BookGroup) -> String {
    let author = book.author.as_deref().unwrap_or(UNKNOWN_AUTHOR);
    let mut output = format!("#### by {author}");
    for entry in &book.entries {
        output.push_str(&render_entry(&entry.annotation));
    }
    output
}
