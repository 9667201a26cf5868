//! Request and response representations.
//!
//! These are the engine's protocol types. A `Request` is what a host hands
//! in for a matched interception; a `Response` is the
//! {status, headers, body} tuple handed back. Neither has a lifecycle
//! beyond one request.

use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};
use http::header::{HeaderValue, CONTENT_TYPE, LOCATION};
use http::{HeaderMap, Method, StatusCode};
use url::Url;

/// An uploaded request body: a stream of byte chunks in arrival order.
pub type Body = BoxStream<'static, std::io::Result<Bytes>>;

/// An intercepted request.
pub struct Request {
    pub method: Method,
    pub url: Url,

    /// Body stream, if the request carried one. `None` on a bodyless PUT
    /// is how "no file contents provided" is detected.
    pub body: Option<Body>,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            body: None,
        }
    }

    pub fn get(url: &str) -> Result<Self, url::ParseError> {
        Ok(Self::new(Method::GET, Url::parse(url)?))
    }

    pub fn put(url: &str) -> Result<Self, url::ParseError> {
        Ok(Self::new(Method::PUT, Url::parse(url)?))
    }

    pub fn delete(url: &str) -> Result<Self, url::ParseError> {
        Ok(Self::new(Method::DELETE, Url::parse(url)?))
    }

    /// Attach a body stream.
    pub fn with_body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach a single-chunk body.
    pub fn with_bytes(self, bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        self.with_body(stream::once(async move { Ok(bytes) }).boxed())
    }
}

/// The response representation handed back to the host.
#[derive(Debug)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Response with a body and a content type.
    pub fn with_body(
        status: StatusCode,
        content_type: &'static str,
        body: impl Into<Bytes>,
    ) -> Self {
        let mut response = Self::new(status);
        response
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        response.body = body.into();
        response
    }

    /// JSON response from a serializable value.
    pub fn json(status: StatusCode, value: &serde_json::Value) -> Self {
        Self::with_body(status, "application/json", value.to_string())
    }

    /// A 302 redirect to `target`.
    pub fn redirect(target: &str) -> Self {
        let mut response = Self::new(StatusCode::FOUND);
        match HeaderValue::from_str(target) {
            Ok(value) => {
                response.headers.insert(LOCATION, value);
            }
            Err(_) => {
                // A location we cannot express as a header is a programming
                // error in the mount route; answer with a bare 302 rather
                // than panic.
                log::warn!("redirect target not header-safe: {}", target);
            }
        }
        response
    }

    /// Check if the status indicates success (2xx).
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_response_sets_content_type() {
        let response = Response::json(StatusCode::OK, &serde_json::json!({"status": "ok"}));
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(
            response.headers.get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let parsed: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(parsed["status"], "ok");
    }

    #[test]
    fn redirect_sets_location() {
        let response = Response::redirect("/fs/?json");
        assert_eq!(response.status, StatusCode::FOUND);
        assert_eq!(response.headers.get(LOCATION).unwrap(), "/fs/?json");
    }

    #[tokio::test]
    async fn single_chunk_body() {
        let mut request = Request::put("http://localhost/fs/a.txt")
            .unwrap()
            .with_bytes(&b"hello"[..]);
        let body = request.body.take().unwrap();
        let chunks: Vec<Bytes> = body.map(|c| c.unwrap()).collect().await;
        assert_eq!(chunks, vec![Bytes::from_static(b"hello")]);
    }
}
