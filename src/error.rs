//! Crate-level error types for the batch, config, and CLI surface.
//!
//! The resolution engine itself never fails; these cover everything around it.
use std::path::PathBuf;

/// All errors carry enough context to produce a useful diagnostic
/// without a debugger. Each variant names the file or reason for failure.
#[allow(clippy::error_impl_error, reason = "crate-level error type re-exported from lib")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Batch file exists but its contents are unusable.
    #[error("batch corrupt: {reason}")]
    BatchCorrupt {
        /// Description of the problem.
        reason: String,
    },

    /// Expected batch file does not exist on disk.
    #[error("batch not found: {}", path.display())]
    BatchNotFound {
        /// Path to the missing batch file.
        path: PathBuf,
    },

    /// Two documents in one batch share a vault path.
    #[error("duplicate document in batch: {path}")]
    DuplicateDocument {
        /// Vault path that appears more than once.
        path: String,
    },

    /// A file named on the command line does not exist.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON (de)serialization failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),
}
