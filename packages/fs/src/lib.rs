//! Filesystem collaborator for webmount.
//!
//! This crate defines the asynchronous filesystem surface the request engine
//! translates verbs onto:
//! - `FileSystem`: the primitive operations (`stat`, `read_file`,
//!   `write_file`, `mkdir_recursive`, `touch`, `remove_recursive`,
//!   `list_directory`)
//! - `NodeStats` / `DirEntry`: node metadata as observed at call time
//! - `FsError`: failure taxonomy with a distinguished "does not exist" kind
//!
//! Two stores are provided:
//! - `MemoryFs`: a self-contained tree, useful as the default sandbox and as
//!   the substitution fake in tests
//! - `LocalFs`: a persistent store rooted at a host directory
//!
//! # Example
//!
//! ```rust
//! use webmount_fs::{FileSystem, MemoryFs};
//! use bytes::Bytes;
//!
//! # async fn demo() -> Result<(), webmount_fs::FsError> {
//! let fs = MemoryFs::new();
//! fs.write_file("/hello.txt", Bytes::from_static(b"hi")).await?;
//! let stats = fs.stat("/hello.txt").await?;
//! assert_eq!(stats.size, 2);
//! # Ok(())
//! # }
//! ```

mod error;
mod local;
mod memory;
mod traits;
mod types;

pub use error::FsError;
pub use local::LocalFs;
pub use memory::MemoryFs;
pub use traits::FileSystem;
pub use types::{DirEntry, NodeKind, NodeStats};
