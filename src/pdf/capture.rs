//! In-memory stand-in for the downstream response sink.
//!
//! The downstream handler never reaches the client while a request is
//! intercepted: its status, headers and body land in a [`CapturedResponse`]
//! owned by that one request.

use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::Response;
use futures_util::StreamExt;

use crate::pdf::error::ConversionError;

/// Everything the downstream handler tried to send.
#[derive(Debug, Default)]
pub struct CapturedResponse {
    headers: HeaderMap,
    body: Vec<u8>,
    status: Option<StatusCode>,
}

impl CapturedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain a downstream response into a fresh capture.
    ///
    /// The body is pulled chunk by chunk until the stream ends. Nothing is
    /// bounded here; the whole document is held in memory.
    pub async fn capture(response: Response) -> Result<Self, ConversionError> {
        let (parts, body) = response.into_parts();
        let mut captured = Self::new();

        captured.set_status(parts.status);
        for (name, value) in parts.headers.iter() {
            captured.append_header(name.clone(), value.clone());
        }

        let mut stream = body.into_data_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(ConversionError::Capture)?;
            captured.append(&chunk);
        }

        Ok(captured)
    }

    /// Add a header value, keeping any earlier values for the same name.
    pub fn append_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.append(name, value);
    }

    /// Record the status the downstream asked for. Later calls win.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    pub fn append(&mut self, bytes: &[u8]) {
        self.body.extend_from_slice(bytes);
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Recorded status, `200 OK` when the downstream never set one.
    ///
    /// Only kept for inspection: the final response status is decided by the
    /// filter alone.
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// First `Content-Encoding` value, if it is valid text.
    pub fn content_encoding(&self) -> Option<&str> {
        self.headers
            .get(header::CONTENT_ENCODING)
            .and_then(|v| v.to_str().ok())
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }
}
