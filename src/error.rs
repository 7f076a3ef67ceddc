//! Error types for capdump.

use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Fatal errors – abort the whole load/export
// ---------------------------------------------------------------------------

/// Errors that stop processing of an archive.
#[derive(Error, Debug)]
pub enum CapError {
    /// The input path does not exist or does not carry the expected extension.
    #[error(
        "unable to find a .{extension} archive at {}; verify the existence and the extension of the file",
        path.display()
    )]
    ArchiveNotFound { path: PathBuf, extension: String },

    /// The container itself could not be opened as a zip archive.
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// The manifest entry is absent from the archive.
    #[error("manifest entry '{0}' not found in archive")]
    ManifestMissing(String),

    /// The manifest could not be decoded or lacks the data repository.
    #[error("malformed manifest: {0}")]
    ManifestMalformed(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV rendering error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid export options or output encoding.
    #[error("export error: {0}")]
    Export(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, CapError>;

// ---------------------------------------------------------------------------
// Soft errors – local to a single channel
// ---------------------------------------------------------------------------

/// Per-channel failures. They are logged and degrade the channel to an empty
/// series (or skip its descriptor); they never abort sibling channels.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChannelError {
    #[error("subfile '{0}' not available in archive")]
    SubfileMissing(String),

    #[error("subfile '{path}' could not be read: {reason}")]
    SubfileUnreadable { path: String, reason: String },

    #[error("data set did not contain advertised number of elements: expected {expected} bytes, got {actual}")]
    RecordLengthMismatch { expected: u64, actual: u64 },

    #[error("malformed channel: {0}")]
    Malformed(String),
}
