//! Run configuration.
//!
//! Loaded from `~/.booknotes/config.toml` when present; every field has a default
//! so a partial file (or none at all) is valid. Format:
//! ```toml
//! vault_root = "/Users/me/Obsidian/Books"
//! excluded_collections = ["Finished", "Library"]
//! ungrouped_folder = "Ungrouped"
//! csv_file_name = "annotation_db.csv"
//! timezone = "utc"
//!
//! [sources]
//! annotation_db = "/tmp/AEAnnotation.sqlite"
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BooknotesError, Result};

/// Reader-application pseudo-collections that never become vault folders.
pub const DEFAULT_EXCLUDED_COLLECTIONS: &[&str] = &[
    "Downloaded",
    "PDFs",
    "Books",
    "Want to Read",
    "My Samples",
    "Library",
    "Audiobooks",
    "Finished",
];

const DEFAULT_VAULT_SUFFIX: &str =
    "Library/Mobile Documents/iCloud~md~obsidian/Documents/ObsiVault/Books";

/// Zone used to turn reader timestamps into wall-clock time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeZoneMode {
    #[default]
    Local,
    Utc,
}

/// Explicit database paths. Unset paths are found by the locator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation_db: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library_db: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub vault_root: PathBuf,
    pub excluded_collections: BTreeSet<String>,
    pub ungrouped_folder: String,
    pub csv_file_name: String,
    pub timezone: TimeZoneMode,
    pub sources: SourceConfig,
}

/// Field defaults for partial config files. Without a home directory the default
/// `vault_root` is relative, which [`Config::validate`] rejects.
impl Default for Config {
    fn default() -> Self {
        Self::for_home(&dirs::home_dir().unwrap_or_default())
    }
}

impl Config {
    /// Defaults rooted at the given home directory.
    #[must_use]
    pub fn for_home(home: &Path) -> Self {
        Self {
            vault_root: home.join(DEFAULT_VAULT_SUFFIX),
            excluded_collections: DEFAULT_EXCLUDED_COLLECTIONS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            ungrouped_folder: "Ungrouped".to_string(),
            csv_file_name: "annotation_db.csv".to_string(),
            timezone: TimeZoneMode::Local,
            sources: SourceConfig::default(),
        }
    }

    /// Defaults rooted at the invoking user's home directory.
    ///
    /// # Errors
    ///
    /// Returns [`BooknotesError::Config`] if the home directory cannot be determined.
    pub fn from_home_dir() -> Result<Self> {
        dirs::home_dir()
            .map(|home| Self::for_home(&home))
            .ok_or_else(|| BooknotesError::Config("home directory not found".to_string()))
    }

    /// Directory holding the default config file.
    ///
    /// # Errors
    ///
    /// Returns [`BooknotesError::Config`] if the home directory cannot be determined.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|home| home.join(".booknotes"))
            .ok_or_else(|| BooknotesError::Config("home directory not found".to_string()))
    }

    /// # Errors
    ///
    /// Returns [`BooknotesError::Config`] if the home directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load and validate the config at `path`, or defaults if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`BooknotesError::Io`] if the file cannot be read and
    /// [`BooknotesError::Config`] if it does not parse or fails validation.
    pub fn load(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)
                .map_err(|e| BooknotesError::Config(format!("{}: {e}", path.display())))?
        } else {
            Self::from_home_dir()?
        };
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns [`BooknotesError::Config`] describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.vault_root.as_os_str().is_empty() {
            return Err(BooknotesError::Config("vault_root cannot be empty".to_string()));
        }
        if !self.vault_root.is_absolute() {
            return Err(BooknotesError::Config(format!(
                "vault_root must be an absolute path, got '{}'",
                self.vault_root.display()
            )));
        }
        if self.ungrouped_folder.trim().is_empty() {
            return Err(BooknotesError::Config(
                "ungrouped_folder cannot be empty".to_string(),
            ));
        }
        if self.csv_file_name.trim().is_empty() || self.csv_file_name.contains(['/', '\\']) {
            return Err(BooknotesError::Config(format!(
                "csv_file_name must be a plain file name, got '{}'",
                self.csv_file_name
            )));
        }
        Ok(())
    }

    /// Full path of the CSV snapshot.
    #[must_use]
    pub fn csv_path(&self) -> PathBuf {
        self.vault_root.join(&self.csv_file_name)
    }

    #[must_use]
    pub fn is_excluded(&self, collection_name: &str) -> bool {
        self.excluded_collections.contains(collection_name)
    }
}
