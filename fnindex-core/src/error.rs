//! Error taxonomy for scanning and writing an index
//!
//! Parsing itself never fails: a line that matches no known shape is plain
//! code. Only filesystem interactions produce errors, and every variant names
//! the offending path.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The project root has no top-level source container.
    #[error(
        "{} is not a project root: missing `{source_dir}` directory",
        root.display()
    )]
    NotAProjectRoot { root: PathBuf, source_dir: String },

    /// A single source file could not be read. Recovered by the scanner.
    #[error("failed to read {}: {source}", path.display())]
    FileReadFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The directory walk failed on something other than a leaf file read.
    #[error("failed to traverse {}: {source}", path.display())]
    TraversalFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The rendered document could not be persisted.
    #[error("failed to write index to {}: {source}", path.display())]
    OutputWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, IndexError>;
