//! Error types for booknotes.

use thiserror::Error;

/// Top-level result type for booknotes operations.
pub type Result<T> = std::result::Result<T, BooknotesError>;

/// Top-level error type for booknotes.
///
/// None of these are recovered inside the pipeline; every variant ends the run.
#[derive(Debug, Error)]
pub enum BooknotesError {
    /// A source database could not be located on disk.
    #[error("not found: {0}")]
    NotFound(String),

    /// A query against a source database failed (malformed file, missing table or column).
    #[error("data source error: {0}")]
    DataSource(String),

    #[error("vault error: {0}")]
    Vault(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_display_human_readable_messages() {
        let err = BooknotesError::NotFound("annotation database".to_string());
        assert_eq!(err.to_string(), "not found: annotation database");

        let err = BooknotesError::DataSource("no such table: ZAEANNOTATION".to_string());
        assert!(err.to_string().contains("ZAEANNOTATION"));
    }

    #[test]
    fn io_errors_convert_with_question_mark() {
        fn fails() -> Result<()> {
            let io: std::io::Result<()> = Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "denied",
            ));
            io?;
            Ok(())
        }

        let err = fails().unwrap_err();
        assert!(matches!(err, BooknotesError::Io(_)));
        assert!(err.to_string().contains("denied"));
    }
}
