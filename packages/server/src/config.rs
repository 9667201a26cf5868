//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Configuration consumed by the router and operation handlers.
///
/// The engine does not load this from anywhere; whoever embeds it supplies
/// one (deserialized from a config document or built in code).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Mount route: the path prefix under which requests are answered.
    /// A trailing slash is stripped when the matcher is built.
    pub route: String,

    /// Whether PUT and DELETE are served at all. When false the write rules
    /// are simply never registered and such requests fall through to the
    /// host.
    pub readwrite: bool,

    /// Administratively disable directory listings. A directory without its
    /// index document then reports 404 instead of a listing.
    pub disable_indexes: bool,

    /// Default document name probed for when a directory is requested.
    pub directory_index: String,

    /// Upper bound for an uploaded body, in bytes. `None` means unbounded;
    /// exceeding a configured bound is reported as a body-read failure.
    pub max_upload_bytes: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            route: "/fs".to_string(),
            readwrite: false,
            disable_indexes: false,
            directory_index: "index.html".to_string(),
            max_upload_bytes: None,
        }
    }
}
