//! The asynchronous filesystem trait.
//!
//! Paths handed to these methods are decoded virtual paths: `/`-rooted
//! strings identifying a node. The trait performs no normalization of `..`
//! or repeated slashes; an implementation either tolerates such paths or
//! rejects them (`LocalFs` rejects traversal, `MemoryFs` treats components
//! verbatim).

use async_trait::async_trait;
use bytes::Bytes;

use crate::{DirEntry, FsError, NodeStats};

/// Primitive operations the request engine translates verbs onto.
///
/// Methods take `&self`: one store instance is shared across all in-flight
/// requests, and each implementation provides its own interior
/// serialization. No operation here is atomic across interleaved calls to
/// the same path; the last completed write wins.
///
/// # Object Safety
///
/// This trait is object-safe: the engine holds an `Arc<dyn FileSystem>`.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Stat the node at `path`.
    ///
    /// # Returns
    ///
    /// * `Ok(stats)` - The node exists.
    /// * `Err(e)` with `e.is_not_found()` - The node does not exist.
    /// * `Err(e)` - Any other failure.
    async fn stat(&self, path: &str) -> Result<NodeStats, FsError>;

    /// Read the full contents of the file at `path`.
    async fn read_file(&self, path: &str) -> Result<Bytes, FsError>;

    /// Create or overwrite the file at `path` with `contents`.
    ///
    /// The parent directory must already exist.
    async fn write_file(&self, path: &str, contents: Bytes) -> Result<(), FsError>;

    /// Create the directory at `path`, creating missing ancestors.
    async fn mkdir_recursive(&self, path: &str) -> Result<(), FsError>;

    /// Create an empty file at `path`, or refresh its modification time if
    /// it already exists.
    async fn touch(&self, path: &str) -> Result<(), FsError>;

    /// Remove the file or directory at `path`, recursively.
    ///
    /// Fails with a "does not exist" error when there is nothing to remove.
    async fn remove_recursive(&self, path: &str) -> Result<(), FsError>;

    /// List the entries of the directory at `path`, sorted by name.
    async fn list_directory(&self, path: &str) -> Result<Vec<DirEntry>, FsError>;
}

#[async_trait]
impl<T: FileSystem + ?Sized> FileSystem for std::sync::Arc<T> {
    async fn stat(&self, path: &str) -> Result<NodeStats, FsError> {
        self.as_ref().stat(path).await
    }

    async fn read_file(&self, path: &str) -> Result<Bytes, FsError> {
        self.as_ref().read_file(path).await
    }

    async fn write_file(&self, path: &str, contents: Bytes) -> Result<(), FsError> {
        self.as_ref().write_file(path, contents).await
    }

    async fn mkdir_recursive(&self, path: &str) -> Result<(), FsError> {
        self.as_ref().mkdir_recursive(path).await
    }

    async fn touch(&self, path: &str) -> Result<(), FsError> {
        self.as_ref().touch(path).await
    }

    async fn remove_recursive(&self, path: &str) -> Result<(), FsError> {
        self.as_ref().remove_recursive(path).await
    }

    async fn list_directory(&self, path: &str) -> Result<Vec<DirEntry>, FsError> {
        self.as_ref().list_directory(path).await
    }
}
