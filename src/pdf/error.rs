//! Error types for the capture-and-convert filter.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Body sent when a gzip-declared downstream body cannot be inflated.
pub const DECODE_ERROR_BODY: &str = "Original request error (gzip)";

/// Body sent when the downstream body stream fails while being buffered.
pub const CAPTURE_ERROR_BODY: &str = "Original request error";

/// Body sent when the conversion service cannot be reached.
pub const TRANSPORT_ERROR_BODY: &str = "Converter request error";

/// Raised while building a [`PdfLayer`](crate::pdf::PdfLayer).
///
/// A layer is either fully constructed or not at all.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("converter url is empty")]
    EmptyConverterUrl,

    #[error("converter url `{url}` is invalid: {source}")]
    InvalidConverterUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("converter url `{0}` must use http or https")]
    UnsupportedScheme(String),

    #[error("activation parameter is empty")]
    EmptyActivationParam,

    #[error("failed to build converter client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Request-scoped failure. Each variant is terminal for its request.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("downstream body is not a valid gzip stream: {0}")]
    Decode(#[source] std::io::Error),

    #[error("converter request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("downstream body could not be read: {0}")]
    Capture(#[source] axum::Error),
}

impl ConversionError {
    /// Status written to the client for this failure.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Decode(_) | Self::Capture(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Transport(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Fixed plain-text body written to the client for this failure.
    pub fn body(&self) -> &'static str {
        match self {
            Self::Decode(_) => DECODE_ERROR_BODY,
            Self::Capture(_) => CAPTURE_ERROR_BODY,
            Self::Transport(_) => TRANSPORT_ERROR_BODY,
        }
    }

    /// Metric label for this failure.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode_error",
            Self::Capture(_) => "capture_error",
            Self::Transport(_) => "transport_error",
        }
    }
}

impl IntoResponse for ConversionError {
    fn into_response(self) -> Response {
        (self.status(), self.body()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_maps_to_500() {
        let err = ConversionError::Decode(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "bad header",
        ));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body(), "Original request error (gzip)");
        assert_eq!(err.outcome(), "decode_error");
    }

    #[test]
    fn test_capture_error_response() {
        let err = ConversionError::Capture(axum::Error::new("stream reset"));
        let res = err.into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            res.headers()[axum::http::header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
    }
}
