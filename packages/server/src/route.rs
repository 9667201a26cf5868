//! Mount matching and virtual-path decoding.
//!
//! The mount route is a fixed path prefix. Everything below it resolves to
//! a virtual path; the route itself, requested without a trailing slash,
//! is the canonicalization edge case the router answers with a redirect.

use percent_encoding::percent_decode_str;
use url::Url;

/// Result of matching a URL path against the mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathMatch {
    /// The path addresses a node below the mount: the decoded virtual path,
    /// always beginning with `/`.
    Subtree(String),

    /// The path equals the mount route exactly, with no trailing segment.
    Bare,

    /// Not addressed to this mount.
    Miss,
}

/// The configured mount prefix.
///
/// Invariants: non-empty, begins with `/`, no trailing slash. Construction
/// normalizes whatever it is given into that shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountRoute {
    prefix: String,
}

impl MountRoute {
    pub fn new(route: &str) -> Self {
        let trimmed = route.trim_end_matches('/');
        let prefix = if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{}", trimmed)
        };
        Self { prefix }
    }

    /// The prefix, without a trailing slash.
    pub fn as_str(&self) -> &str {
        &self.prefix
    }

    /// Match a URL path (still percent-encoded) against the mount.
    ///
    /// The captured remainder is percent-decoded; no `..` or repeated-slash
    /// normalization happens here, since that hardening belongs to the
    /// filesystem. A remainder that fails to decode as UTF-8 makes the
    /// match a miss, so the rule simply does not fire.
    pub fn resolve(&self, url_path: &str) -> PathMatch {
        if url_path == self.prefix {
            return PathMatch::Bare;
        }

        let Some(remainder) = url_path.strip_prefix(self.prefix.as_str()) else {
            return PathMatch::Miss;
        };
        if !remainder.starts_with('/') {
            return PathMatch::Miss;
        }

        match percent_decode_str(remainder).decode_utf8() {
            Ok(decoded) => PathMatch::Subtree(decoded.into_owned()),
            Err(_) => PathMatch::Miss,
        }
    }

    /// The redirect target for a bare-mount request: `<mount>/` with the
    /// original query string preserved.
    pub fn slash_redirect_target(&self, url: &Url) -> String {
        match url.query() {
            Some(query) => format!("{}/?{}", self.prefix, query),
            None => format!("{}/", self.prefix),
        }
    }
}

/// Query-string flags altering operation behavior.
///
/// All flags are presence-based: `?json` counts as much as `?json=1`.
/// Nonsensical combinations are not rejected; each operation consults only
/// the flags it documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Machine-readable responses instead of raw/HTML ones.
    pub json: bool,

    /// Serve the file as an attachment (`?download` or `?dl`).
    pub download: bool,

    /// Create-or-stamp instead of writing contents.
    pub touch: bool,

    /// Create a directory instead of a file.
    pub folder: bool,
}

impl Modifiers {
    pub fn from_url(url: &Url) -> Self {
        let mut modifiers = Self::default();
        for (key, _) in url.query_pairs() {
            match key.as_ref() {
                "json" => modifiers.json = true,
                "download" | "dl" => modifiers.download = true,
                "touch" => modifiers.touch = true,
                "folder" => modifiers.folder = true,
                _ => {}
            }
        }
        modifiers
    }
}
