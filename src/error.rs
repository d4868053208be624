//! Error types for release-index.
//!
//! This module defines all error types used throughout release-index, using
//! a combination of `thiserror` for ergonomic error definitions and `miette`
//! for rich diagnostic output.
//!
//! # Error Handling Strategy
//!
//! - All errors derive from [`IndexError`]
//! - Each variant includes helpful error messages and diagnostic codes
//! - Per-file failures are reported as warnings by the callers and never
//!   abort a scan; only precondition, configuration and output failures are
//!   fatal
//! - Errors are automatically converted to `miette::Result` for CLI output
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use release_index::error::{IndexError, Result};
//!
//! fn check_input(path: &Path) -> Result<()> {
//!     if !path.is_dir() {
//!         return Err(IndexError::InvalidDirectory(path.to_path_buf()));
//!     }
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Error types that can occur in release-index operations
#[derive(Error, Debug, Diagnostic)]
pub enum IndexError {
    /// An input or output directory does not exist.
    ///
    /// Checked once at startup, before any scanning begins.
    #[error("'{0}' is not a valid directory")]
    #[diagnostic(
        code(release_index::config::invalid_directory),
        help("Check the --input and --output paths.")
    )]
    InvalidDirectory(
        /// The offending path
        PathBuf,
    ),

    /// File system I/O error.
    ///
    /// Common causes: permission denied, a file removed between listing and
    /// hashing, disk full while writing the manifest.
    #[error("I/O error accessing '{path}'")]
    #[diagnostic(code(release_index::io_error))]
    IoError {
        /// The path that caused the I/O error
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Attempted to hash something that is not a regular file.
    #[error("Invalid file type for '{path}': {message}")]
    #[diagnostic(code(release_index::file::invalid_type))]
    InvalidFileType {
        /// The path of the invalid file
        path: PathBuf,
        /// Description of the file type issue
        message: String,
    },

    /// Writing command output (e.g. the pruner's path list) failed.
    #[error("Failed to write output")]
    #[diagnostic(code(release_index::output_error))]
    OutputError(#[source] std::io::Error),

    /// The directory walk failed below the input root.
    #[error("Failed to walk directory tree")]
    #[diagnostic(code(release_index::walk_error))]
    WalkError(#[from] walkdir::Error),

    /// The previous manifest exists but could not be parsed.
    ///
    /// Callers seeding the digest cache degrade this to an empty cache.
    #[error("Failed to parse manifest '{path}'")]
    #[diagnostic(
        code(release_index::manifest::parse_error),
        help("The previous manifest will be ignored and every artifact rehashed.")
    )]
    ManifestParse {
        /// The manifest path
        path: PathBuf,
        /// The underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// The manifest could not be serialized.
    #[error("Failed to serialize manifest")]
    #[diagnostic(code(release_index::manifest::serialization_error))]
    SerializationError(#[source] serde_json::Error),

    /// A configured regular expression does not compile.
    #[error("Invalid pattern '{pattern}'")]
    #[diagnostic(
        code(release_index::config::invalid_pattern),
        help("Patterns use the syntax of the `regex` crate.")
    )]
    InvalidPattern {
        /// The pattern as given
        pattern: String,
        /// The underlying regex error
        #[source]
        source: regex::Error,
    },

    /// Invalid or missing configuration.
    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(release_index::config::error),
        help("Check the required configuration parameters.")
    )]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },
}

/// Type alias for Results in this crate
pub type Result<T> = std::result::Result<T, IndexError>;
