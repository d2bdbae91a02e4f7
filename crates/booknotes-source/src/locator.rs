//! Finds the reader's annotation and library databases on disk.

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use booknotes_core::config::SourceConfig;
use booknotes_core::error::{BooknotesError, Result};

const CONTAINER_DOCUMENTS: &str = "Library/Containers/com.apple.iBooksX/Data/Documents";
const DATABASE_EXTENSION: &str = ".sqlite";

/// Paths of the two source databases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePaths {
    pub annotation_db: PathBuf,
    pub library_db: PathBuf,
}

/// Searches the reader's container for its databases.
#[derive(Debug, Clone)]
pub struct Locator {
    annotation_root: PathBuf,
    library_root: PathBuf,
}

impl Locator {
    /// Search roots under `home`.
    #[must_use]
    pub fn for_home(home: &Path) -> Self {
        let documents = home.join(CONTAINER_DOCUMENTS);
        Self {
            annotation_root: documents.join("AEAnnotation"),
            library_root: documents.join("BKLibrary"),
        }
    }

    /// Search roots under the invoking user's home directory.
    ///
    /// # Errors
    ///
    /// Returns [`BooknotesError::NotFound`] if the home directory cannot be determined.
    pub fn for_current_user() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| BooknotesError::NotFound("home directory".to_string()))?;
        Ok(Self::for_home(&home))
    }

    /// Locate both databases.
    ///
    /// # Errors
    ///
    /// Returns [`BooknotesError::NotFound`] naming every database that could not be found.
    pub fn locate(&self) -> Result<SourcePaths> {
        self.resolve(&SourceConfig::default())
    }

    /// Locate both databases, preferring explicit paths from `sources`.
    ///
    /// # Errors
    ///
    /// Returns [`BooknotesError::NotFound`] if an explicit path does not exist or
    /// a search finds no database. Both databases are required.
    pub fn resolve(&self, sources: &SourceConfig) -> Result<SourcePaths> {
        let annotation_db = pick(sources.annotation_db.as_deref(), &self.annotation_root);
        let library_db = pick(sources.library_db.as_deref(), &self.library_root);

        match (annotation_db, library_db) {
            (Some(annotation_db), Some(library_db)) => {
                info!(
                    annotation_db = %annotation_db.display(),
                    library_db = %library_db.display(),
                    "located source databases"
                );
                Ok(SourcePaths {
                    annotation_db,
                    library_db,
                })
            }
            (annotation_db, library_db) => {
                let mut missing = Vec::new();
                if annotation_db.is_none() {
                    missing.push(format!(
                        "annotation database under {}",
                        describe(sources.annotation_db.as_deref(), &self.annotation_root)
                    ));
                }
                if library_db.is_none() {
                    missing.push(format!(
                        "library database under {}",
                        describe(sources.library_db.as_deref(), &self.library_root)
                    ));
                }
                Err(BooknotesError::NotFound(missing.join("; ")))
            }
        }
    }
}

fn pick(explicit: Option<&Path>, root: &Path) -> Option<PathBuf> {
    match explicit {
        Some(path) => path.is_file().then(|| path.to_path_buf()),
        None => find_database(root),
    }
}

fn describe(explicit: Option<&Path>, root: &Path) -> String {
    explicit.unwrap_or(root).display().to_string()
}

/// First file under `root` whose name ends in `.sqlite`, walking entries in name order.
#[must_use]
pub fn find_database(root: &Path) -> Option<PathBuf> {
    let found = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .find(|e| {
            e.file_name()
                .to_str()
                .is_some_and(|name| name.ends_with(DATABASE_EXTENSION))
        })
        .map(|e| e.into_path());
    debug!(root = %root.display(), found = ?found, "searched for database");
    found
}
