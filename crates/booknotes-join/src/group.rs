//! Grouping of joined rows by collection and book title.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use tracing::warn;

use booknotes_core::record::JoinedRow;

/// All entries of one book within one collection, in chronological order.
#[derive(Debug, Clone, PartialEq)]
pub struct BookGroup {
    pub title: String,
    /// Author of the earliest entry.
    pub author: Option<String>,
    pub entries: Vec<JoinedRow>,
}

/// The books of one collection. `name` is `None` for books outside any collection.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionGroup {
    pub name: Option<String>,
    pub books: Vec<BookGroup>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grouping {
    /// Ungrouped bucket first, then collections by name.
    pub collections: Vec<CollectionGroup>,
    /// Rows left out because their book has no title.
    pub untitled: usize,
}

/// Timestamp ascending, rows without a timestamp last.
fn by_timestamp(a: &JoinedRow, b: &JoinedRow) -> Ordering {
    match (a.annotation.timestamp, b.annotation.timestamp) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable chronological sort; undated entries keep their relative order at the end.
pub fn sort_entries(entries: &mut [JoinedRow]) {
    entries.sort_by(by_timestamp);
}

/// Group rows by collection name, then by book title.
#[must_use]
pub fn group(rows: &[JoinedRow]) -> Grouping {
    let mut buckets: BTreeMap<Option<&str>, BTreeMap<&str, Vec<JoinedRow>>> = BTreeMap::new();
    let mut untitled = 0;

    for row in rows {
        let Some(title) = row.book_title.as_deref() else {
            untitled += 1;
            continue;
        };
        buckets
            .entry(row.collection_name.as_deref())
            .or_default()
            .entry(title)
            .or_default()
            .push(row.clone());
    }

    if untitled > 0 {
        warn!(
            rows = untitled,
            "skipping annotations whose book is missing from the library"
        );
    }

    let collections = buckets
        .into_iter()
        .map(|(name, books)| CollectionGroup {
            name: name.map(str::to_string),
            books: books
                .into_iter()
                .map(|(title, mut entries)| {
                    sort_entries(&mut entries);
                    BookGroup {
                        title: title.to_string(),
                        author: entries.first().and_then(|e| e.book_author.clone()),
                        entries,
                    }
                })
                .collect(),
        })
        .collect();

    Grouping {
        collections,
        untitled,
    }
}

impl Grouping {
    /// Number of (collection, book) pairs.
    #[must_use]
    pub fn book_count(&self) -> usize {
        self.collections.iter().map(|c| c.books.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use booknotes_core::record::Annotation;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn row(
        text: &str,
        title: Option<&str>,
        collection: Option<&str>,
        ts: Option<NaiveDateTime>,
    ) -> JoinedRow {
        JoinedRow {
            annotation: Annotation {
                id: None,
                book_id: Some("b".to_string()),
                style: None,
                kind: None,
                timestamp: ts,
                text: text.to_string(),
            },
            book_author: Some(format!("author of {text}")),
            book_path: None,
            book_title: title.map(str::to_string),
            collection_id: None,
            collection_name: collection.map(str::to_string),
        }
    }

    #[test]
    fn entries_sorted_chronologically_with_undated_last() {
        let rows = vec![
            row("ten", Some("Dune"), Some("Sci-Fi"), Some(at(10, 0))),
            row("undated", Some("Dune"), Some("Sci-Fi"), None),
            row("nine", Some("Dune"), Some("Sci-Fi"), Some(at(9, 0))),
            row("eleven", Some("Dune"), Some("Sci-Fi"), Some(at(11, 0))),
        ];

        let grouping = group(&rows);
        let texts: Vec<_> = grouping.collections[0].books[0]
            .entries
            .iter()
            .map(|e| e.annotation.text.as_str())
            .collect();
        assert_eq!(texts, vec!["nine", "ten", "eleven", "undated"]);
        assert_eq!(
            grouping.collections[0].books[0].author.as_deref(),
            Some("author of nine")
        );
    }

    #[test]
    fn groups_by_collection_then_title() {
        let rows = vec![
            row("a", Some("Emma"), Some("Classics"), Some(at(9, 0))),
            row("b", Some("Dune"), Some("Sci-Fi"), Some(at(9, 0))),
            row("c", Some("Dune"), Some("Classics"), Some(at(9, 0))),
            row("d", Some("Dune"), None, Some(at(9, 0))),
        ];

        let grouping = group(&rows);
        let names: Vec<_> = grouping
            .collections
            .iter()
            .map(|c| c.name.as_deref())
            .collect();
        assert_eq!(names, vec![None, Some("Classics"), Some("Sci-Fi")]);

        let classics: Vec<_> = grouping.collections[1]
            .books
            .iter()
            .map(|b| b.title.as_str())
            .collect();
        assert_eq!(classics, vec!["Dune", "Emma"]);
        assert_eq!(grouping.book_count(), 4);
    }

    #[test]
    fn rows_without_title_are_counted_not_grouped() {
        let rows = vec![
            row("a", None, None, None),
            row("b", Some("Dune"), None, None),
        ];

        let grouping = group(&rows);
        assert_eq!(grouping.untitled, 1);
        assert_eq!(grouping.book_count(), 1);
    }

    #[test]
    fn empty_input_gives_empty_grouping() {
        assert_eq!(group(&[]), Grouping::default());
    }
}
