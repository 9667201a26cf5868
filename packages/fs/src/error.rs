//! Error types for filesystem stores.
//!
//! Errors here are store-level. The request engine only distinguishes
//! "does not exist" from everything else; the remaining variants exist so
//! stores can report what actually happened in logs and messages.

/// Errors produced by `FileSystem` implementations.
#[derive(thiserror::Error, Debug)]
pub enum FsError {
    /// The path does not exist.
    #[error("no such node: {path}")]
    NotFound { path: String },

    /// A directory operation was applied to a file, or a path component
    /// that should be a directory is not one.
    #[error("not a directory: {path}")]
    NotADirectory { path: String },

    /// The node already exists and the operation cannot replace it.
    #[error("already exists: {path}")]
    AlreadyExists { path: String },

    /// The store refused the path (e.g. traversal outside the root).
    #[error("rejected path {path}: {reason}")]
    Rejected { path: String, reason: String },

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FsError {
    /// Whether this error means the target does not exist.
    ///
    /// Folds `io::ErrorKind::NotFound` into the same kind so callers never
    /// have to inspect the `Io` variant themselves.
    pub fn is_not_found(&self) -> bool {
        match self {
            FsError::NotFound { .. } => true,
            FsError::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Shorthand constructor for `NotFound`.
    pub fn not_found(path: impl Into<String>) -> Self {
        FsError::NotFound { path: path.into() }
    }
}
