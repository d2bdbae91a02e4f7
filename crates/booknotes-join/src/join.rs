//! Explicit left joins between the extracted tables.
//!
//! Cardinality per step:
//! - membership → collection: at most one collection per membership
//! - book → membership: fan-out, one row per surviving membership (or one row with no collection)
//! - annotation → book: fan-out through the book's collection rows (or one orphan row)

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use booknotes_core::record::{Annotation, Book, Collection, CollectionMembership, JoinedRow};

/// A collection membership with the collection's name attached.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedMembership {
    pub book_id: Option<String>,
    pub collection_id: Option<i64>,
    pub collection_name: Option<String>,
}

/// A book paired with one of its collections.
#[derive(Debug, Clone, PartialEq)]
pub struct BookWithCollection {
    pub book: Book,
    pub collection_id: Option<i64>,
    pub collection_name: Option<String>,
}

/// Left-join memberships with collections on collection id.
#[must_use]
pub fn name_memberships(
    memberships: &[CollectionMembership],
    collections: &[Collection],
) -> Vec<NamedMembership> {
    let mut by_id: HashMap<i64, &Collection> = HashMap::with_capacity(collections.len());
    for collection in collections {
        by_id.entry(collection.collection_id).or_insert(collection);
    }

    memberships
        .iter()
        .map(|m| NamedMembership {
            book_id: m.book_id.clone(),
            collection_id: m.collection_id,
            collection_name: m
                .collection_id
                .and_then(|id| by_id.get(&id))
                .and_then(|c| c.name.clone()),
        })
        .collect()
}

/// Drop memberships whose collection name is in `excluded`.
///
/// Memberships with no collection name are kept.
#[must_use]
pub fn exclude_collections(
    memberships: Vec<NamedMembership>,
    excluded: &BTreeSet<String>,
) -> Vec<NamedMembership> {
    let before = memberships.len();
    let kept: Vec<NamedMembership> = memberships
        .into_iter()
        .filter(|m| {
            m.collection_name
                .as_ref()
                .is_none_or(|name| !excluded.contains(name))
        })
        .collect();
    debug!(before, after = kept.len(), "excluded pseudo-collections");
    kept
}

/// Left-join books with their (filtered) collection memberships on book id.
#[must_use]
pub fn books_with_collections(
    books: &[Book],
    memberships: &[NamedMembership],
) -> Vec<BookWithCollection> {
    let mut by_book: HashMap<&str, Vec<&NamedMembership>> = HashMap::new();
    for membership in memberships {
        if let Some(book_id) = membership.book_id.as_deref() {
            by_book.entry(book_id).or_default().push(membership);
        }
    }

    let mut rows = Vec::with_capacity(books.len());
    for book in books {
        match by_book.get(book.book_id.as_str()) {
            Some(matches) => {
                for m in matches {
                    rows.push(BookWithCollection {
                        book: book.clone(),
                        collection_id: m.collection_id,
                        collection_name: m.collection_name.clone(),
                    });
                }
            }
            None => rows.push(BookWithCollection {
                book: book.clone(),
                collection_id: None,
                collection_name: None,
            }),
        }
    }
    rows
}

/// Left-join annotations with the enriched book rows on book id.
#[must_use]
pub fn annotations_with_books(
    annotations: &[Annotation],
    books: &[BookWithCollection],
) -> Vec<JoinedRow> {
    let mut by_book: HashMap<&str, Vec<&BookWithCollection>> = HashMap::new();
    for row in books {
        by_book.entry(row.book.book_id.as_str()).or_default().push(row);
    }

    let mut rows = Vec::with_capacity(annotations.len());
    for annotation in annotations {
        let matches = annotation
            .book_id
            .as_deref()
            .and_then(|id| by_book.get(id));
        match matches {
            Some(matches) => {
                for b in matches {
                    rows.push(JoinedRow {
                        annotation: annotation.clone(),
                        book_author: b.book.author.clone(),
                        book_path: b.book.path.clone(),
                        book_title: b.book.title.clone(),
                        collection_id: b.collection_id,
                        collection_name: b.collection_name.clone(),
                    });
                }
            }
            None => rows.push(JoinedRow::orphan(annotation.clone())),
        }
    }
    rows
}

/// Build the denormalized annotation table.
///
/// Collections named in `excluded` are removed before books are joined, so a book
/// whose only memberships are excluded ends up with no collection.
#[must_use]
pub fn join(
    annotations: &[Annotation],
    books: &[Book],
    memberships: &[CollectionMembership],
    collections: &[Collection],
    excluded: &BTreeSet<String>,
) -> Vec<JoinedRow> {
    let named = exclude_collections(name_memberships(memberships, collections), excluded);
    let enriched = books_with_collections(books, &named);
    let rows = annotations_with_books(annotations, &enriched);
    debug!(
        annotations = annotations.len(),
        rows = rows.len(),
        "joined annotations with books and collections"
    );
    rows
}
