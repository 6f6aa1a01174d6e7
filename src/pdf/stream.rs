//! Writes the final response to the real client.

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::TryStreamExt;

use crate::pdf::error::ConversionError;
use crate::pdf::payload::{ConversionRequest, Disposition};

/// `200 OK` carrying the converter's body verbatim.
///
/// The converter response is moved into the body stream, so its connection is
/// released as soon as the stream ends or the client goes away.
pub fn success(request: &ConversionRequest, converted: reqwest::Response) -> Response {
    let stream = converted.bytes_stream().inspect_err(|e| {
        tracing::warn!(error = %e, "Converter body ended early");
    });

    let mut response = Response::new(Body::from_stream(stream));
    *response.status_mut() = StatusCode::OK;
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/pdf"));
    headers.insert(
        header::CONTENT_DISPOSITION,
        content_disposition(request.disposition, &request.filename),
    );
    response
}

/// Fixed status and plain-text body for a failed request. No PDF headers.
pub fn failure(err: ConversionError) -> Response {
    err.into_response()
}

/// `<disposition>; filename="<filename>"`.
///
/// Control characters in the filename become spaces; everything else,
/// quotes included, is written as received.
pub fn content_disposition(disposition: Disposition, filename: &str) -> HeaderValue {
    let filename: String = filename
        .chars()
        .map(|c| if c.is_ascii_control() && c != '\t' { ' ' } else { c })
        .collect();
    let value = format!("{disposition}; filename=\"{filename}\"");
    HeaderValue::from_bytes(value.as_bytes())
        .unwrap_or_else(|_| HeaderValue::from_static(disposition.as_str()))
}
