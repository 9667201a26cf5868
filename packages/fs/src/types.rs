//! Node metadata types.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Whether a node is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Directory,
}

/// Metadata for a filesystem node.
///
/// Stats are read immediately before a response is built and are never
/// cached, so every request observes current state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeStats {
    pub kind: NodeKind,

    /// Byte size of a file; 0 for directories.
    pub size: u64,

    /// Last modification time.
    pub modified: SystemTime,
}

impl NodeStats {
    pub fn file(size: u64, modified: SystemTime) -> Self {
        Self {
            kind: NodeKind::File,
            size,
            modified,
        }
    }

    pub fn directory(modified: SystemTime) -> Self {
        Self {
            kind: NodeKind::Directory,
            size: 0,
            modified,
        }
    }

    /// Check if this node is a directory.
    pub fn is_directory(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    /// Seconds since the Unix epoch, saturating at zero for pre-epoch times.
    pub fn modified_epoch_secs(&self) -> u64 {
        self.modified
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// One entry of a directory listing: name plus stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    pub stats: NodeStats,
}
