//! # booknotes-source
//!
//! Read-only access to the e-book reader's two SQLite databases:
//! - [`locator`] finds the annotation and library database files under the user's home
//! - [`AnnotationSource`] reads highlights from `ZAEANNOTATION`
//! - [`LibrarySource`] reads books and collections from the library database
//!
//! Connections are opened with `SQLITE_OPEN_READ_ONLY` and dropped when the
//! source goes out of scope.

pub mod locator;

use std::path::Path;

use rusqlite::{Connection, OpenFlags};
use tracing::debug;

use booknotes_core::config::TimeZoneMode;
use booknotes_core::error::{BooknotesError, Result};
use booknotes_core::record::{Annotation, Book, Collection, CollectionMembership};
use booknotes_core::temporal::convert_timestamp;

pub use locator::{Locator, SourcePaths};

fn open_read_only(path: &Path) -> Result<Connection> {
    Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| BooknotesError::DataSource(format!("{}: {e}", path.display())))
}

fn data_source(e: rusqlite::Error) -> BooknotesError {
    BooknotesError::DataSource(e.to_string())
}

/// The annotation database (`AEAnnotation/*.sqlite`).
pub struct AnnotationSource {
    conn: Connection,
}

impl AnnotationSource {
    /// Open the annotation database read-only.
    ///
    /// # Errors
    ///
    /// Returns [`BooknotesError::DataSource`] if the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "opening annotation database");
        Ok(Self {
            conn: open_read_only(path)?,
        })
    }

    /// Wrap an existing connection.
    #[must_use]
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Read every annotation that carries text.
    ///
    /// Rows with NULL or empty selected text are dropped. Creation dates are
    /// shifted from the reader epoch and converted to wall-clock time in `zone`.
    ///
    /// # Errors
    ///
    /// Returns [`BooknotesError::DataSource`] if the table or a column is missing
    /// or a value has an unexpected type.
    pub fn annotations(&self, zone: TimeZoneMode) -> Result<Vec<Annotation>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT ZANNOTATIONSTYLE, ZANNOTATIONTYPE, ZANNOTATIONCREATIONDATE,
                        ZANNOTATIONASSETID, ZANNOTATIONSELECTEDTEXT, ZANNOTATIONUUID
                 FROM ZAEANNOTATION",
            )
            .map_err(data_source)?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, Option<i64>>(0)?,
                    row.get::<_, Option<i64>>(1)?,
                    row.get::<_, Option<f64>>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, Option<String>>(5)?,
                ))
            })
            .map_err(data_source)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(data_source)?;

        let total = rows.len();
        let annotations: Vec<Annotation> = rows
            .into_iter()
            .filter_map(|(style, kind, created, book_id, text, id)| {
                let text = text.filter(|t| !t.is_empty())?;
                Some(Annotation {
                    id,
                    book_id,
                    style,
                    kind,
                    timestamp: convert_timestamp(created, zone),
                    text,
                })
            })
            .collect();

        debug!(
            total,
            kept = annotations.len(),
            "read annotations from ZAEANNOTATION"
        );
        Ok(annotations)
    }
}

/// The library database (`BKLibrary/*.sqlite`).
pub struct LibrarySource {
    conn: Connection,
}

impl LibrarySource {
    /// Open the library database read-only.
    ///
    /// # Errors
    ///
    /// Returns [`BooknotesError::DataSource`] if the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "opening library database");
        Ok(Self {
            conn: open_read_only(path)?,
        })
    }

    #[must_use]
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Read every library asset. Assets without an id cannot be joined and are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`BooknotesError::DataSource`] if the query fails.
    pub fn books(&self) -> Result<Vec<Book>> {
        let mut stmt = self
            .conn
            .prepare("SELECT ZASSETID, ZAUTHOR, ZPATH, ZTITLE FROM ZBKLIBRARYASSET")
            .map_err(data_source)?;

        let books: Vec<Book> = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, Option<String>>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            })
            .map_err(data_source)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(data_source)?
            .into_iter()
            .filter_map(|(book_id, author, path, title)| {
                Some(Book {
                    book_id: book_id?,
                    author,
                    path,
                    title,
                })
            })
            .collect();

        debug!(count = books.len(), "read books from ZBKLIBRARYASSET");
        Ok(books)
    }

    /// Read collection memberships and collection names.
    ///
    /// # Errors
    ///
    /// Returns [`BooknotesError::DataSource`] if either query fails.
    pub fn collections(&self) -> Result<(Vec<CollectionMembership>, Vec<Collection>)> {
        let memberships = self
            .conn
            .prepare("SELECT ZASSETID, ZCOLLECTION FROM ZBKCOLLECTIONMEMBER")
            .map_err(data_source)?
            .query_map([], |row| {
                Ok(CollectionMembership {
                    book_id: row.get(0)?,
                    collection_id: row.get(1)?,
                })
            })
            .map_err(data_source)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(data_source)?;

        let collections = self
            .conn
            .prepare("SELECT Z_PK, ZTITLE FROM ZBKCOLLECTION")
            .map_err(data_source)?
            .query_map([], |row| {
                Ok(Collection {
                    collection_id: row.get(0)?,
                    name: row.get(1)?,
                })
            })
            .map_err(data_source)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(data_source)?;

        debug!(
            memberships = memberships.len(),
            collections = collections.len(),
            "read collections"
        );
        Ok((memberships, collections))
    }
}

/// Open `path`, read all annotations and close the connection.
///
/// # Errors
///
/// Returns [`BooknotesError::DataSource`] on any open or query failure.
pub fn extract_annotations(path: &Path, zone: TimeZoneMode) -> Result<Vec<Annotation>> {
    AnnotationSource::open(path)?.annotations(zone)
}

/// Open `path`, read all books and close the connection.
///
/// # Errors
///
/// Returns [`BooknotesError::DataSource`] on any open or query failure.
pub fn extract_books(path: &Path) -> Result<Vec<Book>> {
    LibrarySource::open(path)?.books()
}

/// Open `path`, read memberships and collections and close the connection.
///
/// # Errors
///
/// Returns [`BooknotesError::DataSource`] on any open or query failure.
pub fn extract_collections(path: &Path) -> Result<(Vec<CollectionMembership>, Vec<Collection>)> {
    LibrarySource::open(path)?.collections()
}
