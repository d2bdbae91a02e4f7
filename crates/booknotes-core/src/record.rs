//! Typed records read from the reader's databases and the joined row built from them.

use chrono::NaiveDateTime;

/// A single highlighted passage.
///
/// Extraction guarantees `text` is non-empty; rows with no text never become an `Annotation`.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub id: Option<String>,
    pub book_id: Option<String>,
    pub style: Option<i64>,
    pub kind: Option<i64>,
    /// Wall-clock creation time, `None` when the source value was missing or not finite.
    pub timestamp: Option<NaiveDateTime>,
    pub text: String,
}

/// A library asset.
#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub book_id: String,
    pub author: Option<String>,
    pub path: Option<String>,
    pub title: Option<String>,
}

/// One row of the book-to-collection join table.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionMembership {
    pub book_id: Option<String>,
    pub collection_id: Option<i64>,
}

/// A named collection of books.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub collection_id: i64,
    pub name: Option<String>,
}

/// An annotation left-joined with its book and (at most) one of the book's collections.
///
/// A book that belongs to several collections yields one row per collection, so the
/// same annotation can appear more than once.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRow {
    pub annotation: Annotation,
    pub book_author: Option<String>,
    pub book_path: Option<String>,
    pub book_title: Option<String>,
    pub collection_id: Option<i64>,
    pub collection_name: Option<String>,
}

impl JoinedRow {
    /// Row for an annotation whose book is not in the library.
    #[must_use]
    pub fn orphan(annotation: Annotation) -> Self {
        Self {
            annotation,
            book_author: None,
            book_path: None,
            book_title: None,
            collection_id: None,
            collection_name: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orphan_row_has_no_book_or_collection() {
        let annotation = Annotation {
            id: Some("a1".to_string()),
            book_id: Some("missing".to_string()),
            style: Some(1),
            kind: Some(2),
            timestamp: None,
            text: "quote".to_string(),
        };

        let row = JoinedRow::orphan(annotation.clone());
        assert_eq!(row.annotation, annotation);
        assert!(row.book_title.is_none());
        assert!(row.collection_name.is_none());
        assert!(row.collection_id.is_none());
    }
}
