//! Error types for the regnote-core library.
//!
//! Malformed definition or override lines are never errors; the matchers skip
//! them. Only I/O on the input sources surfaces here, and it is always fatal:
//! an unreadable source must not turn into an empty register database.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for regnote operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all regnote operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Failed to read an input file (definition source or override file)
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        /// Path to the file that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Creates a new file read error
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }
}

/// Reads a text input. Invalid UTF-8 is replaced rather than rejected, since
/// firmware sources occasionally carry stray Latin-1 bytes in comments.
pub(crate) fn read_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| Error::file_read(path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
