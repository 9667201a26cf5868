//! In-memory filesystem store.
//!
//! Holds the whole tree in a map guarded by a mutex, so a single instance
//! can be shared across concurrent requests. Useful as the default sandbox
//! and as the substitution fake in engine tests.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::SystemTime;

use async_trait::async_trait;
use bytes::Bytes;

use crate::{DirEntry, FileSystem, FsError, NodeStats};

#[derive(Debug, Clone)]
enum Node {
    File {
        contents: Bytes,
        modified: SystemTime,
    },
    Directory {
        modified: SystemTime,
    },
}

impl Node {
    fn stats(&self) -> NodeStats {
        match self {
            Node::File { contents, modified } => {
                NodeStats::file(contents.len() as u64, *modified)
            }
            Node::Directory { modified } => NodeStats::directory(*modified),
        }
    }

    fn is_directory(&self) -> bool {
        matches!(self, Node::Directory { .. })
    }
}

/// An in-memory filesystem.
///
/// The root directory always exists. Paths are taken verbatim: components
/// are not validated or normalized beyond collapsing a trailing slash, so
/// `/a b/c.txt` is a perfectly good path.
///
/// # Example
///
/// ```rust
/// use webmount_fs::{FileSystem, MemoryFs, NodeKind};
/// use bytes::Bytes;
///
/// # async fn demo() -> Result<(), webmount_fs::FsError> {
/// let fs = MemoryFs::new();
/// fs.mkdir_recursive("/docs").await?;
/// fs.write_file("/docs/a.txt", Bytes::from_static(b"hi")).await?;
/// assert_eq!(fs.stat("/docs").await?.kind, NodeKind::Directory);
/// # Ok(())
/// # }
/// ```
pub struct MemoryFs {
    nodes: Mutex<BTreeMap<String, Node>>,
}

/// Collapse a path to its map key: `/`-rooted, no trailing slash except for
/// the root itself.
fn normalize(path: &str) -> String {
    let mut p = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };
    while p.len() > 1 && p.ends_with('/') {
        p.pop();
    }
    p
}

/// Parent key of a normalized path; `None` for the root.
fn parent(path: &str) -> Option<String> {
    if path == "/" {
        return None;
    }
    match path.rfind('/') {
        Some(0) => Some("/".to_string()),
        Some(i) => Some(path[..i].to_string()),
        None => None,
    }
}

/// Last component of a normalized path.
fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

impl MemoryFs {
    /// Create an empty filesystem containing only the root directory.
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            "/".to_string(),
            Node::Directory {
                modified: SystemTime::now(),
            },
        );
        Self {
            nodes: Mutex::new(nodes),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, Node>>, FsError> {
        self.nodes
            .lock()
            .map_err(|_| FsError::Io(std::io::Error::other("lock poisoned")))
    }
}

impl Default for MemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileSystem for MemoryFs {
    async fn stat(&self, path: &str) -> Result<NodeStats, FsError> {
        let key = normalize(path);
        let nodes = self.lock()?;
        nodes
            .get(&key)
            .map(Node::stats)
            .ok_or_else(|| FsError::not_found(&key))
    }

    async fn read_file(&self, path: &str) -> Result<Bytes, FsError> {
        let key = normalize(path);
        let nodes = self.lock()?;
        match nodes.get(&key) {
            Some(Node::File { contents, .. }) => Ok(contents.clone()),
            Some(Node::Directory { .. }) => {
                Err(FsError::Io(std::io::Error::other("is a directory")))
            }
            None => Err(FsError::not_found(&key)),
        }
    }

    async fn write_file(&self, path: &str, contents: Bytes) -> Result<(), FsError> {
        let key = normalize(path);
        if key == "/" {
            return Err(FsError::Io(std::io::Error::other("is a directory")));
        }
        let mut nodes = self.lock()?;

        let dir = parent(&key).ok_or_else(|| FsError::not_found(&key))?;
        match nodes.get(&dir) {
            Some(n) if n.is_directory() => {}
            Some(_) => return Err(FsError::NotADirectory { path: dir }),
            None => return Err(FsError::not_found(&dir)),
        }
        if let Some(existing) = nodes.get(&key) {
            if existing.is_directory() {
                return Err(FsError::Io(std::io::Error::other("is a directory")));
            }
        }

        nodes.insert(
            key,
            Node::File {
                contents,
                modified: SystemTime::now(),
            },
        );
        Ok(())
    }

    async fn mkdir_recursive(&self, path: &str) -> Result<(), FsError> {
        let key = normalize(path);
        let mut nodes = self.lock()?;

        // Create every missing ancestor, root first.
        let mut prefix = String::new();
        for component in key.split('/').filter(|c| !c.is_empty()) {
            prefix.push('/');
            prefix.push_str(component);
            match nodes.get(&prefix) {
                Some(n) if n.is_directory() => {}
                Some(_) => {
                    return Err(FsError::NotADirectory {
                        path: prefix.clone(),
                    })
                }
                None => {
                    nodes.insert(
                        prefix.clone(),
                        Node::Directory {
                            modified: SystemTime::now(),
                        },
                    );
                }
            }
        }
        Ok(())
    }

    async fn touch(&self, path: &str) -> Result<(), FsError> {
        let key = normalize(path);
        let mut nodes = self.lock()?;

        if let Some(node) = nodes.get_mut(&key) {
            let now = SystemTime::now();
            match node {
                Node::File { modified, .. } => *modified = now,
                Node::Directory { modified } => *modified = now,
            }
            return Ok(());
        }

        let dir = parent(&key).ok_or_else(|| FsError::not_found(&key))?;
        match nodes.get(&dir) {
            Some(n) if n.is_directory() => {}
            Some(_) => return Err(FsError::NotADirectory { path: dir }),
            None => return Err(FsError::not_found(&dir)),
        }
        nodes.insert(
            key,
            Node::File {
                contents: Bytes::new(),
                modified: SystemTime::now(),
            },
        );
        Ok(())
    }

    async fn remove_recursive(&self, path: &str) -> Result<(), FsError> {
        let key = normalize(path);
        let mut nodes = self.lock()?;

        if key == "/" {
            // Clearing the sandbox: drop everything under the root but keep
            // the root itself.
            nodes.retain(|k, _| k == "/");
            return Ok(());
        }

        if !nodes.contains_key(&key) {
            return Err(FsError::not_found(&key));
        }
        let subtree_prefix = format!("{}/", key);
        nodes.retain(|k, _| k != &key && !k.starts_with(&subtree_prefix));
        Ok(())
    }

    async fn list_directory(&self, path: &str) -> Result<Vec<DirEntry>, FsError> {
        let key = normalize(path);
        let nodes = self.lock()?;

        match nodes.get(&key) {
            Some(n) if n.is_directory() => {}
            Some(_) => return Err(FsError::NotADirectory { path: key }),
            None => return Err(FsError::not_found(&key)),
        }

        // BTreeMap iteration is ordered by key, so direct children come out
        // sorted by name already.
        let entries = nodes
            .iter()
            .filter(|(k, _)| parent(k).as_deref() == Some(key.as_str()))
            .map(|(k, node)| DirEntry {
                name: base_name(k).to_string(),
                stats: node.stats(),
            })
            .collect();
        Ok(entries)
    }
}
