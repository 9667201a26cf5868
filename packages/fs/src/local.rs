//! Local on-disk filesystem store.
//!
//! Maps virtual paths beneath a root directory using `tokio::fs`. This is
//! the persistent store: everything written survives the process.

use std::path::{Component, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use bytes::Bytes;

use crate::{DirEntry, FileSystem, FsError, NodeStats};

/// A filesystem rooted at a host directory.
///
/// Virtual paths are joined beneath the root after rejecting anything that
/// could escape it (`..`, absolute components). That hardening lives here,
/// not in the request engine: the engine hands paths through verbatim.
pub struct LocalFs {
    root: PathBuf,
}

impl LocalFs {
    /// Create a store rooted at `root`.
    ///
    /// The root must be an existing directory.
    pub fn new(root: PathBuf) -> Result<Self, FsError> {
        let attr = std::fs::metadata(&root)?;
        if !attr.is_dir() {
            return Err(FsError::NotADirectory {
                path: root.display().to_string(),
            });
        }
        let root = root.canonicalize()?;
        Ok(Self { root })
    }

    /// Map a virtual path to a host path under the root.
    fn resolve(&self, path: &str) -> Result<PathBuf, FsError> {
        let mut resolved = self.root.clone();
        for component in PathBuf::from(path.trim_start_matches('/')).components() {
            match component {
                Component::Normal(c) => resolved.push(c),
                Component::CurDir => {}
                _ => {
                    return Err(FsError::Rejected {
                        path: path.to_string(),
                        reason: "path escapes the store root".to_string(),
                    })
                }
            }
        }
        Ok(resolved)
    }
}

fn stats_from_metadata(meta: &std::fs::Metadata) -> Result<NodeStats, FsError> {
    let modified = meta.modified()?;
    Ok(if meta.is_dir() {
        NodeStats::directory(modified)
    } else {
        NodeStats::file(meta.len(), modified)
    })
}

#[async_trait]
impl FileSystem for LocalFs {
    async fn stat(&self, path: &str) -> Result<NodeStats, FsError> {
        let host_path = self.resolve(path)?;
        let meta = tokio::fs::metadata(&host_path).await?;
        stats_from_metadata(&meta)
    }

    async fn read_file(&self, path: &str) -> Result<Bytes, FsError> {
        let host_path = self.resolve(path)?;
        log::debug!("reading {}", host_path.display());
        let contents = tokio::fs::read(&host_path).await?;
        Ok(Bytes::from(contents))
    }

    async fn write_file(&self, path: &str, contents: Bytes) -> Result<(), FsError> {
        let host_path = self.resolve(path)?;
        log::debug!("writing {} ({} bytes)", host_path.display(), contents.len());
        tokio::fs::write(&host_path, &contents).await?;
        Ok(())
    }

    async fn mkdir_recursive(&self, path: &str) -> Result<(), FsError> {
        let host_path = self.resolve(path)?;
        tokio::fs::create_dir_all(&host_path).await?;
        Ok(())
    }

    async fn touch(&self, path: &str) -> Result<(), FsError> {
        let host_path = self.resolve(path)?;
        // Creates the file when missing; the parent must already exist.
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .open(&host_path)
            .await?;
        file.into_std().await.set_modified(SystemTime::now())?;
        Ok(())
    }

    async fn remove_recursive(&self, path: &str) -> Result<(), FsError> {
        let host_path = self.resolve(path)?;
        let meta = tokio::fs::metadata(&host_path).await?;
        if meta.is_dir() {
            tokio::fs::remove_dir_all(&host_path).await?;
        } else {
            tokio::fs::remove_file(&host_path).await?;
        }
        Ok(())
    }

    async fn list_directory(&self, path: &str) -> Result<Vec<DirEntry>, FsError> {
        let host_path = self.resolve(path)?;
        let mut reader = tokio::fs::read_dir(&host_path).await?;

        let mut entries = Vec::new();
        while let Some(entry) = reader.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            let meta = entry.metadata().await?;
            entries.push(DirEntry {
                name,
                stats: stats_from_metadata(&meta)?,
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}
