//! webmount request engine: virtual-path routing and request-to-filesystem
//! translation.
//!
//! Requests addressed to a configured mount route are answered from a
//! filesystem collaborator instead of a network:
//! - `MountRoute`: matches URL paths against the mount and decodes the
//!   virtual path
//! - `Router`: the rule table plus `match_rule`/`handle`, the engine's
//!   whole public surface for a host
//! - `serve` / `update` / `remove`: the operations behind GET, PUT and
//!   DELETE
//! - `Formatter`: turns filesystem outcomes into responses, either
//!   machine-readable (`JsonFormatter`) or human-readable (`HtmlFormatter`)
//!
//! There is no host integration here. A runtime that intercepts requests
//! feeds them to `Router::handle` and passes the returned `Response` back;
//! a `None` result means the request is not for this engine and the host
//! should fall through to its default handling.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use webmount_fs::MemoryFs;
//! use webmount_server::{Request, Router, ServerConfig};
//!
//! # async fn demo() {
//! let config = ServerConfig {
//!     readwrite: true,
//!     ..ServerConfig::default()
//! };
//! let router = Router::new(config, Arc::new(MemoryFs::new()));
//!
//! let request = Request::get("http://localhost/fs/readme.txt").unwrap();
//! let response = router.handle(request).await.unwrap();
//! assert_eq!(response.status.as_u16(), 404);
//! # }
//! ```

mod config;
mod formatter;
mod handlers;
mod request;
mod route;
mod router;

pub use config::ServerConfig;
pub use formatter::{Formatter, HtmlFormatter, JsonFormatter};
pub use handlers::{remove, serve, update};
pub use request::{Body, Request, Response};
pub use route::{Modifiers, MountRoute, PathMatch};
pub use router::{Router, Rule, RulePattern};
