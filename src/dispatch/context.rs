//! Per-request context handed to handlers, factories and error callbacks.

use axum::body::Bytes;
use axum::http::{request::Parts, Extensions, HeaderMap, HeaderValue, Method};
use percent_encoding::percent_decode_str;

use crate::binding::Query;

/// Everything the dispatcher needs from one HTTP request.
#[derive(Debug)]
pub struct RequestContext {
    method: Method,
    path: String,
    query: Query,
    headers: HeaderMap,
    extensions: Extensions,
    body: Bytes,
}

impl RequestContext {
    /// A bare request, mostly useful in tests and for non-HTTP callers.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Query::default(),
            headers: HeaderMap::new(),
            extensions: Extensions::new(),
            body: Bytes::new(),
        }
    }

    /// Build from HTTP request parts and an already-buffered body.
    ///
    /// Path components are percent-decoded here so that template literals
    /// compare against decoded text.
    pub fn from_parts(parts: Parts, body: Bytes) -> Self {
        let query = parts.uri.query().map(Query::parse).unwrap_or_default();
        Self {
            path: decode_path(parts.uri.path()),
            method: parts.method,
            query,
            headers: parts.headers,
            extensions: parts.extensions,
            body,
        }
    }

    pub fn with_query(mut self, raw: &str) -> Self {
        self.query = Query::parse(raw);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_header(mut self, name: &'static str, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

/// Percent-decode each path component; an encoded `/` stays encoded.
pub fn decode_path(raw: &str) -> String {
    raw.split('/')
        .map(|component| {
            let decoded = percent_decode_str(component).decode_utf8_lossy();
            if decoded.contains('/') {
                component.to_string()
            } else {
                decoded.into_owned()
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[test]
    fn test_from_parts_decodes_path_and_query() {
        let (parts, _) = Request::builder()
            .method("PUT")
            .uri("/docs/hello%20world/count?limit=5&name=a%26b")
            .header("x-request-id", "abc")
            .body(())
            .unwrap()
            .into_parts();

        let ctx = RequestContext::from_parts(parts, Bytes::from_static(b"{}"));
        assert_eq!(ctx.method(), &Method::PUT);
        assert_eq!(ctx.path(), "/docs/hello world/count");
        assert_eq!(ctx.query().get("limit"), Some("5"));
        assert_eq!(ctx.query().get("name"), Some("a&b"));
        assert_eq!(ctx.headers().get("x-request-id").unwrap().to_str().unwrap(), "abc");
        assert_eq!(ctx.body().as_ref(), b"{}");
    }

    #[test]
    fn test_encoded_separator_is_kept() {
        assert_eq!(decode_path("/files/a%2Fb/x"), "/files/a%2Fb/x");
        assert_eq!(decode_path("/caf%C3%A9"), "/café");
    }
}
