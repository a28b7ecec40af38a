//! Live HTTP response wrapper.

use crate::{ClientError, Result, TransportError};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use http::{HeaderMap, StatusCode};
use meridian_discovery::Endpoint;

/// A response whose body has not been read yet.
///
/// Dropping it without reading the body releases the connection instead of
/// returning it to the pool.
#[derive(Debug)]
pub struct Response {
    inner: reqwest::Response,
    endpoint: Endpoint,
}

impl Response {
    pub(crate) fn new(inner: reqwest::Response, endpoint: Endpoint) -> Self {
        Self { inner, endpoint }
    }

    /// Get the status code.
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    /// Check if the response was successful (2xx).
    pub fn is_success(&self) -> bool {
        self.status().is_success()
    }

    /// Get the response headers.
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// Get a specific header value.
    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        self.headers()
            .get(name.as_ref())
            .and_then(|v| v.to_str().ok())
    }

    /// Get the content type if available.
    pub fn content_type(&self) -> Option<&str> {
        self.header(http::header::CONTENT_TYPE.as_str())
    }

    /// Get the content length if known.
    pub fn content_length(&self) -> Option<u64> {
        self.inner.content_length()
    }

    /// Get the final request URL.
    pub fn url(&self) -> &url::Url {
        self.inner.url()
    }

    /// The endpoint that served this response.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Read the next chunk of the body.
    pub async fn chunk(&mut self) -> Result<Option<Bytes>> {
        self.inner.chunk().await.map_err(transport)
    }

    /// Read the whole body.
    pub async fn bytes(self) -> Result<Bytes> {
        self.inner.bytes().await.map_err(transport)
    }

    /// Read the whole body as text, replacing invalid UTF-8.
    pub async fn text(self) -> Result<String> {
        let body = self.bytes().await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// Stream the body.
    pub fn bytes_stream(self) -> impl Stream<Item = Result<Bytes>> {
        self.inner.bytes_stream().map(|chunk| chunk.map_err(transport))
    }

    /// Turn a status outside 200..300 into [`ClientError::Status`], reading
    /// the body as its text.
    pub async fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }

        let status = self.status().as_u16();
        let body = match self.inner.bytes().await {
            Ok(body) => String::from_utf8_lossy(&body).into_owned(),
            Err(e) => format!("failed to read response body: {}", e),
        };
        Err(ClientError::Status { status, body })
    }

    /// Get the underlying reqwest response.
    pub fn into_inner(self) -> reqwest::Response {
        self.inner
    }
}

fn transport(err: reqwest::Error) -> ClientError {
    TransportError::Http(err).into()
}
