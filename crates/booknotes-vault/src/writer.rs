//! Vault and CSV writers.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDateTime, Timelike};
use tracing::{debug, info, warn};

use booknotes_core::error::{BooknotesError, Result};
use booknotes_core::record::JoinedRow;
use booknotes_join::Grouping;

use crate::render::render_book;

/// CSV columns after the leading (unnamed) row-index column.
pub const CSV_HEADER: [&str; 12] = [
    "style",
    "type",
    "timestamp",
    "book_id",
    "text",
    "id",
    "book_author",
    "book_path",
    "book_title",
    "collection_id",
    "collection_name",
    "sync_status",
];

const SYNC_STATUS: &str = "synced";
const CSV_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const CSV_TIMESTAMP_FORMAT_MICROS: &str = "%Y-%m-%d %H:%M:%S%.6f";
const UNSAFE_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Make `name` safe to use as a single path segment.
///
/// Separators, reserved characters and control characters become `_`; surrounding
/// whitespace and trailing dots are trimmed. Empty, `.` and `..` become `_`.
#[must_use]
pub fn sanitize_segment(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if UNSAFE_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    let trimmed = replaced.trim().trim_end_matches('.').trim_end();
    if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
        "_".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Write `markdown` to `<root>/<collection>/<title>.md`, replacing any existing file.
///
/// Both names are passed through [`sanitize_segment`]. Returns the written path.
///
/// # Errors
///
/// Returns [`BooknotesError::Io`] if the directory or file cannot be written.
pub fn write_vault(root: &Path, collection: &str, title: &str, markdown: &str) -> Result<PathBuf> {
    let path = note_path(root, collection, title);
    write_note(&path, markdown)?;
    Ok(path)
}

/// `<root>/<collection>/<title>.md` with both names sanitized.
#[must_use]
pub fn note_path(root: &Path, collection: &str, title: &str) -> PathBuf {
    root.join(sanitize_segment(collection))
        .join(format!("{}.md", sanitize_segment(title)))
}

fn write_note(path: &Path, markdown: &str) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, markdown)?;
    debug!(path = %path.display(), "wrote book note");
    Ok(())
}

/// Seconds only, or microseconds when the timestamp has a fractional part.
fn csv_timestamp(ts: &NaiveDateTime) -> String {
    let format = if ts.nanosecond() == 0 {
        CSV_TIMESTAMP_FORMAT
    } else {
        CSV_TIMESTAMP_FORMAT_MICROS
    };
    ts.format(format).to_string()
}

fn opt<T: ToString>(value: Option<&T>) -> String {
    value.map(ToString::to_string).unwrap_or_default()
}

/// Write the full joined table to `path` with a row index and a constant `sync_status`.
///
/// # Errors
///
/// Returns [`BooknotesError::Io`] if the parent directory cannot be created and
/// [`BooknotesError::Vault`] if the CSV cannot be written.
pub fn write_csv(path: &Path, rows: &[JoinedRow]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let csv_err = |e: csv::Error| BooknotesError::Vault(format!("{}: {e}", path.display()));

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_path(path)
        .map_err(csv_err)?;

    let mut header = vec![""];
    header.extend(CSV_HEADER);
    writer.write_record(&header).map_err(csv_err)?;

    for (index, row) in rows.iter().enumerate() {
        let a = &row.annotation;
        let timestamp = a
            .timestamp
            .map(|ts| csv_timestamp(&ts))
            .unwrap_or_default();
        writer
            .write_record([
                index.to_string(),
                opt(a.style.as_ref()),
                opt(a.kind.as_ref()),
                timestamp,
                opt(a.book_id.as_ref()),
                a.text.clone(),
                opt(a.id.as_ref()),
                opt(row.book_author.as_ref()),
                opt(row.book_path.as_ref()),
                opt(row.book_title.as_ref()),
                opt(row.collection_id.as_ref()),
                opt(row.collection_name.as_ref()),
                SYNC_STATUS.to_string(),
            ])
            .map_err(csv_err)?;
    }

    writer
        .flush()
        .map_err(|e| BooknotesError::Vault(format!("{}: {e}", path.display())))?;
    debug!(path = %path.display(), rows = rows.len(), "wrote csv snapshot");
    Ok(())
}

/// Writes grouped book notes under a vault root.
#[derive(Debug, Clone)]
pub struct VaultWriter {
    root: PathBuf,
    ungrouped_folder: String,
}

impl VaultWriter {
    /// `ungrouped_folder` receives books that belong to no collection.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, ungrouped_folder: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            ungrouped_folder: ungrouped_folder.into(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Render and write every book in `grouping`. Returns the written paths in order.
    ///
    /// Two books that land on the same note path (the ungrouped folder shadowing a
    /// collection of the same name, or names that sanitize alike) never share a file:
    /// later ones get a ` (2)`, ` (3)`, ... suffix. Paths compare case-insensitively.
    /// Fails fast: files written before an error stay on disk.
    ///
    /// # Errors
    ///
    /// Returns [`BooknotesError::Io`] on the first directory or file write failure.
    pub fn write_grouping(&self, grouping: &Grouping) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.root)?;

        let mut taken = HashSet::new();
        let mut written = Vec::with_capacity(grouping.book_count());
        for collection in &grouping.collections {
            let folder = collection
                .name
                .as_deref()
                .unwrap_or(self.ungrouped_folder.as_str());
            for book in &collection.books {
                let path = self.claim_path(&mut taken, folder, &book.title);
                write_note(&path, &render_book(book))?;
                written.push(path);
            }
        }

        info!(
            root = %self.root.display(),
            files = written.len(),
            "wrote book notes"
        );
        Ok(written)
    }

    fn claim_path(&self, taken: &mut HashSet<String>, folder: &str, title: &str) -> PathBuf {
        let mut path = note_path(&self.root, folder, title);
        let mut n = 1;
        while !taken.insert(path.to_string_lossy().to_lowercase()) {
            n += 1;
            path = note_path(&self.root, folder, &format!("{} ({n})", sanitize_segment(title)));
        }
        if n > 1 {
            warn!(
                collection = folder,
                title,
                path = %path.display(),
                "note path already used by another book, writing to a suffixed file"
            );
        }
        path
    }
}
