//! # booknotes-core
//!
//! Core types shared by every booknotes crate:
//! - Source records ([`Annotation`], [`Book`], [`CollectionMembership`], [`Collection`])
//! - The denormalized [`JoinedRow`] produced by the joiner
//! - Reader-epoch time conversion ([`temporal`])
//! - Run configuration ([`Config`])
//! - Error hierarchy ([`BooknotesError`])

pub mod config;
pub mod error;
pub mod record;
pub mod temporal;

pub use config::{Config, SourceConfig, TimeZoneMode};
pub use error::{BooknotesError, Result};
pub use record::{Annotation, Book, Collection, CollectionMembership, JoinedRow};
pub use temporal::{convert_timestamp, READER_EPOCH_OFFSET};
