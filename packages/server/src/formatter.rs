//! Response formatting.
//!
//! Formatters are stateless translators from already-fetched filesystem
//! data (or errors) to response representations. Two variants exist: the
//! machine-readable `JsonFormatter` and the human-readable `HtmlFormatter`,
//! chosen per request from the `json` modifier.

use std::time::SystemTime;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::StatusCode;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde_json::json;

use webmount_fs::{DirEntry, FsError, NodeStats};

use crate::request::Response;
use crate::route::MountRoute;

/// Characters escaped when embedding an entry name in an href.
const HREF_ENCODE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'?')
    .add(b'%');

/// Convert filesystem outcomes into response representations.
///
/// Implementations must be stateless and side-effect-free; they only shape
/// data that handlers have already fetched.
pub trait Formatter: Send + Sync {
    /// The path does not exist.
    fn format_404(&self, path: &str) -> Response;

    /// A filesystem operation failed for a reason other than absence.
    fn format_500(&self, path: &str, err: &FsError) -> Response;

    /// A file was read successfully.
    fn format_file(&self, path: &str, contents: Bytes, stats: &NodeStats) -> Response;

    /// A directory listing, with links rooted at the mount route.
    fn format_dir(&self, route: &MountRoute, path: &str, entries: &[DirEntry]) -> Response;
}

/// Format a timestamp the way HTTP headers and listings expect.
pub(crate) fn http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

/// Machine-readable formatter: JSON envelopes around content and metadata.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_404(&self, path: &str) -> Response {
        Response::json(
            StatusCode::NOT_FOUND,
            &json!({"error": "Not found", "path": path}),
        )
    }

    fn format_500(&self, path: &str, err: &FsError) -> Response {
        Response::json(
            StatusCode::INTERNAL_SERVER_ERROR,
            &json!({"error": err.to_string(), "path": path}),
        )
    }

    fn format_file(&self, path: &str, contents: Bytes, stats: &NodeStats) -> Response {
        // UTF-8 content travels as a string; anything else as raw byte
        // values, so the envelope stays decodable either way.
        let (content, encoding) = match std::str::from_utf8(&contents) {
            Ok(text) => (json!(text), "utf-8"),
            Err(_) => (json!(contents.to_vec()), "bytes"),
        };
        Response::json(
            StatusCode::OK,
            &json!({
                "path": path,
                "size": stats.size,
                "modified": stats.modified_epoch_secs(),
                "encoding": encoding,
                "content": content,
            }),
        )
    }

    fn format_dir(&self, _route: &MountRoute, path: &str, entries: &[DirEntry]) -> Response {
        let entries: Vec<serde_json::Value> = entries
            .iter()
            .map(|entry| {
                json!({
                    "name": entry.name,
                    "kind": entry.stats.kind,
                    "size": entry.stats.size,
                    "modified": entry.stats.modified_epoch_secs(),
                })
            })
            .collect();
        Response::json(
            StatusCode::OK,
            &json!({"path": path, "entries": entries}),
        )
    }
}

/// Human-readable formatter: raw bytes for files, HTML pages for errors
/// and listings.
pub struct HtmlFormatter;

impl Formatter for HtmlFormatter {
    fn format_404(&self, path: &str) -> Response {
        let body = error_page("404 Not Found", &format!("{} was not found.", path));
        Response::with_body(StatusCode::NOT_FOUND, "text/html; charset=utf-8", body)
    }

    fn format_500(&self, path: &str, err: &FsError) -> Response {
        let body = error_page(
            "500 Internal Server Error",
            &format!("{}: {}", path, err),
        );
        Response::with_body(
            StatusCode::INTERNAL_SERVER_ERROR,
            "text/html; charset=utf-8",
            body,
        )
    }

    fn format_file(&self, path: &str, contents: Bytes, _stats: &NodeStats) -> Response {
        let mut response = Response::new(StatusCode::OK);
        response.headers.insert(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static(content_type_for(path)),
        );
        response.body = contents;
        response
    }

    fn format_dir(&self, route: &MountRoute, path: &str, entries: &[DirEntry]) -> Response {
        let base = format!("{}{}", route.as_str(), path);
        let base = base.trim_end_matches('/');

        let mut rows = String::new();
        if path != "/" {
            rows.push_str(&format!(
                "<tr><td><a href=\"{}/..\">..</a></td><td></td><td></td></tr>\n",
                base
            ));
        }
        for entry in entries {
            let href = format!(
                "{}/{}",
                base,
                utf8_percent_encode(&entry.name, HREF_ENCODE)
            );
            let label = if entry.stats.is_directory() {
                format!("{}/", escape_html(&entry.name))
            } else {
                escape_html(&entry.name)
            };
            rows.push_str(&format!(
                "<tr><td><a href=\"{}\">{}</a></td><td>{}</td><td>{}</td></tr>\n",
                href,
                label,
                entry.stats.size,
                http_date(entry.stats.modified),
            ));
        }

        let body = format!(
            "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Index of {title}</title></head>\n\
             <body>\n<h1>Index of {title}</h1>\n<table>\n\
             <tr><th>Name</th><th>Size</th><th>Modified</th></tr>\n{rows}</table>\n</body>\n</html>\n",
            title = escape_html(path),
            rows = rows,
        );
        Response::with_body(StatusCode::OK, "text/html; charset=utf-8", body)
    }
}

fn error_page(title: &str, detail: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body>\n<h1>{title}</h1>\n<p>{detail}</p>\n</body>\n</html>\n",
        title = escape_html(title),
        detail = escape_html(detail),
    )
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Content type inferred from the file extension. Unknown extensions are
/// served as opaque bytes.
fn content_type_for(path: &str) -> &'static str {
    let extension = path
        .rsplit('/')
        .next()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") | Some("mjs") => "text/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("txt") | Some("md") => "text/plain; charset=utf-8",
        Some("xml") => "application/xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("pdf") => "application/pdf",
        Some("wasm") => "application/wasm",
        Some("woff2") => "font/woff2",
        Some("mp3") => "audio/mpeg",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        _ => "application/octet-stream",
    }
}
