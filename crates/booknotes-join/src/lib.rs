//! # booknotes-join
//!
//! Turns the extracted tables into vault-shaped groups:
//! - [`join()`] merges annotations, books and collections into [`JoinedRow`]s
//! - [`group()`] buckets rows by collection and book title, sorted chronologically
//!
//! [`JoinedRow`]: booknotes_core::record::JoinedRow

pub mod group;
pub mod join;

pub use group::{group, sort_entries, BookGroup, CollectionGroup, Grouping};
pub use join::{
    annotations_with_books, books_with_collections, exclude_collections, join,
    name_memberships, BookWithCollection, NamedMembership,
};
