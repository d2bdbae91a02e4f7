//! # booknotes-vault
//!
//! Writes the grouped annotations into the vault:
//! - [`render`] builds one Markdown document per book
//! - [`writer`] places documents at `<root>/<collection>/<title>.md` and writes the CSV snapshot
//!
//! Every file is fully rewritten on each run, so unchanged input yields identical output.

pub mod render;
pub mod writer;

pub use render::{render_book, render_entry, TIMESTAMP_FORMAT};
pub use writer::{
    note_path, sanitize_segment, write_csv, write_vault, VaultWriter, CSV_HEADER,
};
