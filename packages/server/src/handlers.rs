//! Operation handlers: the translation from verb + path + flags to
//! filesystem primitives and back to a response.
//!
//! Every branch here resolves to a `Response`. Filesystem and stream
//! failures are converted at this boundary and never escape to the caller,
//! so the router always has something usable to hand back.

use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use http::header::{HeaderName, HeaderValue, CONTENT_DISPOSITION};
use http::StatusCode;
use serde_json::json;

use webmount_fs::{FileSystem, FsError, NodeStats};

use crate::config::ServerConfig;
use crate::formatter::{http_date, Formatter};
use crate::request::{Body, Response};
use crate::route::MountRoute;

/// Isolation/CORS headers stamped onto every file response.
fn isolation_headers() -> [(HeaderName, HeaderValue); 4] {
    [
        (
            HeaderName::from_static("cross-origin-embedder-policy"),
            HeaderValue::from_static("require-corp"),
        ),
        (
            HeaderName::from_static("cross-origin-opener-policy"),
            HeaderValue::from_static("same-origin"),
        ),
        (
            HeaderName::from_static("cross-origin-resource-policy"),
            HeaderValue::from_static("same-site"),
        ),
        (
            HeaderName::from_static("access-control-allow-origin"),
            HeaderValue::from_static("*"),
        ),
    ]
}

fn status_ok() -> Response {
    Response::json(StatusCode::OK, &json!({"status": "ok"}))
}

fn error_body(status: StatusCode, message: &str) -> Response {
    Response::json(status, &json!({"error": message}))
}

/// 404 for absence, 500 for everything else.
fn fs_error_response(formatter: &dyn Formatter, path: &str, err: &FsError) -> Response {
    if err.is_not_found() {
        formatter.format_404(path)
    } else {
        log::warn!("serving {} failed: {}", path, err);
        formatter.format_500(path, err)
    }
}

fn join_virtual(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{}{}", dir, name)
    } else {
        format!("{}/{}", dir, name)
    }
}

fn base_name(path: &str) -> &str {
    path.rsplit('/').find(|c| !c.is_empty()).unwrap_or(path)
}

/// RFC 2183-style attachment disposition.
fn content_disposition(path: &str, stats: &NodeStats) -> String {
    format!(
        "attachment; filename=\"{}\"; modification-date=\"{}\"; size={};",
        base_name(path),
        http_date(stats.modified),
        stats.size,
    )
}

/// Serve the node at `path`.
///
/// Directories are answered with their index document when present, with a
/// listing when the index is cleanly absent and listings are enabled, and
/// with a 404 when listings are disabled. The index probe always precedes
/// the listing, and the listing is attempted at most once.
pub async fn serve(
    fs: &dyn FileSystem,
    config: &ServerConfig,
    route: &MountRoute,
    path: &str,
    formatter: &dyn Formatter,
    download: bool,
) -> Response {
    let stats = match fs.stat(path).await {
        Ok(stats) => stats,
        Err(err) => return fs_error_response(formatter, path, &err),
    };

    if !stats.is_directory() {
        return serve_file(fs, path, &stats, formatter, download).await;
    }

    let index_path = join_virtual(path, &config.directory_index);
    match fs.stat(&index_path).await {
        Ok(index_stats) => serve_file(fs, &index_path, &index_stats, formatter, download).await,
        Err(err) if err.is_not_found() && !config.disable_indexes => {
            match fs.list_directory(path).await {
                Ok(entries) => formatter.format_dir(route, path, &entries),
                Err(err) => {
                    log::warn!("listing {} failed: {}", path, err);
                    formatter.format_500(path, &err)
                }
            }
        }
        Err(err) if err.is_not_found() => formatter.format_404(path),
        Err(err) => {
            log::warn!("index probe for {} failed: {}", path, err);
            formatter.format_500(path, &err)
        }
    }
}

async fn serve_file(
    fs: &dyn FileSystem,
    path: &str,
    stats: &NodeStats,
    formatter: &dyn Formatter,
    download: bool,
) -> Response {
    let contents = match fs.read_file(path).await {
        Ok(contents) => contents,
        Err(err) => {
            // The stat already succeeded, so absence here is a race; either
            // way the file could not be produced.
            log::warn!("reading {} failed: {}", path, err);
            return formatter.format_500(path, &err);
        }
    };

    let mut response = formatter.format_file(path, contents, stats);

    if response.status == StatusCode::OK && download {
        match HeaderValue::from_str(&content_disposition(path, stats)) {
            Ok(value) => {
                response.headers.insert(CONTENT_DISPOSITION, value);
            }
            Err(_) => log::warn!("disposition for {} not header-safe, skipped", path),
        }
    }

    for (name, value) in isolation_headers() {
        response.headers.insert(name, value);
    }
    response
}

/// Accumulate the whole body into one contiguous buffer, chunks in arrival
/// order, optionally bounded.
async fn drain_body(mut body: Body, cap: Option<u64>) -> std::io::Result<Bytes> {
    let mut buffer = BytesMut::new();
    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        if let Some(cap) = cap {
            if (buffer.len() + chunk.len()) as u64 > cap {
                return Err(std::io::Error::other("body exceeds the configured upload limit"));
            }
        }
        buffer.extend_from_slice(&chunk);
    }
    Ok(buffer.freeze())
}

/// Create or modify the node at `path`.
///
/// Precedence is fixed: `folder`, then `touch`, then body write; only the
/// first matching branch runs. Failure always reports 500 and success 200,
/// with the operation-specific message.
pub async fn update(
    fs: &dyn FileSystem,
    config: &ServerConfig,
    path: &str,
    contents: Option<Body>,
    touch: bool,
    folder: bool,
) -> Response {
    if folder {
        return match fs.mkdir_recursive(path).await {
            Ok(()) => status_ok(),
            Err(err) => {
                log::warn!("mkdir {} failed: {}", path, err);
                error_body(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to create directory",
                )
            }
        };
    }

    if touch {
        return match fs.touch(path).await {
            Ok(()) => status_ok(),
            Err(err) => {
                log::warn!("touch {} failed: {}", path, err);
                error_body(StatusCode::INTERNAL_SERVER_ERROR, "Failed to touch file")
            }
        };
    }

    let Some(body) = contents else {
        return error_body(StatusCode::BAD_REQUEST, "No file contents provided");
    };

    let buffer = match drain_body(body, config.max_upload_bytes).await {
        Ok(buffer) => buffer,
        Err(err) => {
            log::warn!("draining body for {} failed: {}", path, err);
            return error_body(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to read file contents",
            );
        }
    };

    match fs.write_file(path, buffer).await {
        Ok(()) => status_ok(),
        Err(err) => {
            log::warn!("writing {} failed: {}", path, err);
            error_body(StatusCode::INTERNAL_SERVER_ERROR, "Failed to write file")
        }
    }
}

/// Recursively remove the node at `path`.
///
/// Absence is not distinguished from other failures here: any error,
/// including "does not exist", reports the same 500.
pub async fn remove(fs: &dyn FileSystem, path: &str) -> Response {
    match fs.remove_recursive(path).await {
        Ok(()) => status_ok(),
        Err(err) => {
            log::warn!("removing {} failed: {}", path, err);
            error_body(StatusCode::INTERNAL_SERVER_ERROR, "Failed to delete file")
        }
    }
}
