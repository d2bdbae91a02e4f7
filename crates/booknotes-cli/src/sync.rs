//! The export pipeline: locate, extract, join, group, write.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use booknotes_core::config::Config;
use booknotes_join::{group, join};
use booknotes_source::{extract_annotations, extract_books, extract_collections, Locator};
use booknotes_vault::{write_csv, VaultWriter};

/// Summary printed after a successful run.
#[derive(Debug, Serialize)]
pub struct SyncReport {
    pub vault_root: PathBuf,
    pub csv_path: PathBuf,
    pub annotations: usize,
    pub rows: usize,
    pub collections: usize,
    pub books_written: usize,
    pub skipped_untitled: usize,
    pub files: Vec<PathBuf>,
}

/// Run the whole export once. Any failure aborts the run; files already written stay.
pub fn run(config: &Config, locator: &Locator) -> Result<SyncReport> {
    config.validate()?;

    let paths = locator
        .resolve(&config.sources)
        .context("locating source databases")?;

    let annotations = extract_annotations(&paths.annotation_db, config.timezone)
        .with_context(|| format!("reading {}", paths.annotation_db.display()))?;
    let books = extract_books(&paths.library_db)
        .with_context(|| format!("reading {}", paths.library_db.display()))?;
    let (memberships, collections) = extract_collections(&paths.library_db)
        .with_context(|| format!("reading {}", paths.library_db.display()))?;
    info!(
        annotations = annotations.len(),
        books = books.len(),
        collections = collections.len(),
        "extracted source tables"
    );

    let rows = join(
        &annotations,
        &books,
        &memberships,
        &collections,
        &config.excluded_collections,
    );
    let grouping = group(&rows);

    let writer = VaultWriter::new(&config.vault_root, &config.ungrouped_folder);
    let files = writer
        .write_grouping(&grouping)
        .with_context(|| format!("writing notes to {}", config.vault_root.display()))?;

    let csv_path = config.csv_path();
    write_csv(&csv_path, &rows).with_context(|| format!("writing {}", csv_path.display()))?;
    info!(csv = %csv_path.display(), rows = rows.len(), "sync complete");

    Ok(SyncReport {
        vault_root: config.vault_root.clone(),
        csv_path,
        annotations: annotations.len(),
        rows: rows.len(),
        collections: grouping.collections.len(),
        books_written: files.len(),
        skipped_untitled: grouping.untitled,
        files,
    })
}
