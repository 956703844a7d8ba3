//! Handler results and dispatcher responses.

use std::future::Future;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderValue, StatusCode};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Error type returned by handler bodies.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// What a handler invocation produced.
pub enum Reply {
    /// No return value.
    Empty,
    /// A value available immediately.
    Value(Value),
    /// A value available after asynchronous completion; `None` means no payload.
    Eventual(BoxFuture<'static, Result<Option<Value>, HandlerError>>),
}

impl Reply {
    pub fn empty() -> Self {
        Reply::Empty
    }

    /// Serialize `value` now.
    pub fn value<T: Serialize>(value: T) -> Result<Self, HandlerError> {
        Ok(Reply::Value(serde_json::to_value(value)?))
    }

    /// A future whose output is serialized once it completes.
    pub fn eventual<F, T>(future: F) -> Self
    where
        F: Future<Output = Result<T, HandlerError>> + Send + 'static,
        T: Serialize + Send + 'static,
    {
        Reply::Eventual(
            async move {
                let value = future.await?;
                Ok::<_, HandlerError>(Some(serde_json::to_value(value)?))
            }
            .boxed(),
        )
    }

    /// A future that completes without a payload.
    pub fn eventual_empty<F>(future: F) -> Self
    where
        F: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        Reply::Eventual(future.map(|result| result.map(|()| None)).boxed())
    }

    /// Wait for completion if needed and return the payload to encode.
    ///
    /// A JSON `null` payload counts as no payload.
    pub async fn resolve(self) -> Result<Option<Value>, HandlerError> {
        let payload = match self {
            Reply::Empty => None,
            Reply::Value(value) => Some(value),
            Reply::Eventual(future) => future.await?,
        };
        Ok(payload.filter(|value| !value.is_null()))
    }
}

impl std::fmt::Debug for Reply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reply::Empty => f.write_str("Empty"),
            Reply::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Reply::Eventual(_) => f.write_str("Eventual(..)"),
        }
    }
}

/// Fault raised after a route was selected; never a client error.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The handler itself failed.
    #[error("handler for '{route}' failed: {source}")]
    Handler {
        route: String,
        #[source]
        source: HandlerError,
    },

    /// The handler's payload could not be encoded.
    #[error("failed to encode response for '{route}': {source}")]
    Encode {
        route: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Status plus optional JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: StatusCode,
    body: Option<Bytes>,
}

impl Response {
    /// Success without a body.
    pub fn empty() -> Self {
        Self::new(StatusCode::OK, None)
    }

    /// Encoded JSON with the given status.
    pub fn json(status: StatusCode, body: Bytes) -> Self {
        Self::new(status, Some(body))
    }

    pub fn new(status: StatusCode, body: Option<Bytes>) -> Self {
        Self { status, body }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Body as UTF-8 text, mostly for tests and logging.
    pub fn text(&self) -> Option<String> {
        self.body.as_ref().map(|b| String::from_utf8_lossy(b).into_owned())
    }

    pub fn into_http(self) -> axum::response::Response {
        let mut response = match self.body {
            Some(body) => {
                let mut response = axum::response::Response::new(Body::from(body));
                response.headers_mut().insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json; charset=utf-8"),
                );
                response
            }
            None => axum::response::Response::new(Body::empty()),
        };
        *response.status_mut() = self.status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test]
    async fn test_resolve_plain_and_empty() {
        assert_eq!(Reply::empty().resolve().await.unwrap(), None);
        assert_eq!(Reply::value("123").unwrap().resolve().await.unwrap(), Some(json!("123")));
        assert_eq!(Reply::value(Option::<i32>::None).unwrap().resolve().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_resolve_eventual() {
        let reply = Reply::eventual(async {
            tokio::time::sleep(Duration::from_millis(1)).await;
            Ok::<_, HandlerError>(vec![1, 2])
        });
        assert_eq!(reply.resolve().await.unwrap(), Some(json!([1, 2])));

        let reply = Reply::eventual_empty(async { Ok(()) });
        assert_eq!(reply.resolve().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_eventual_failure_propagates() {
        let reply = Reply::eventual_empty(async { Err("boom".into()) });
        assert_eq!(reply.resolve().await.unwrap_err().to_string(), "boom");
    }

    #[test]
    fn test_into_http_sets_content_type() {
        let response = Response::json(StatusCode::BAD_REQUEST, Bytes::from_static(b"{}")).into_http();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().contains_key(header::CONTENT_TYPE));

        let response = Response::empty().into_http();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(!response.headers().contains_key(header::CONTENT_TYPE));
    }
}
