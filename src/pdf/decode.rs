//! Turns a captured body into the HTML text sent for conversion.
//!
//! Only `gzip` is undone, and only when `Content-Encoding` is exactly `gzip`.
//! Anything else is taken as the text itself. Bytes that are not valid UTF-8
//! are replaced with U+FFFD, the same thing a JSON encoder does to them.
//!
//! A gzip body may hold several concatenated members; all of them are
//! inflated. An empty body or bytes after the last member that are not
//! another member are decode errors.

use std::io::{self, Read};

use flate2::read::MultiGzDecoder;

use crate::pdf::capture::CapturedResponse;
use crate::pdf::error::ConversionError;

const GZIP: &str = "gzip";

/// Decode a capture into text, consuming it.
pub fn decode(captured: CapturedResponse) -> Result<String, ConversionError> {
    let gzipped = captured.content_encoding() == Some(GZIP);
    let body = captured.into_body();

    if gzipped {
        let html = gunzip(&body)?;
        tracing::debug!(
            compressed = body.len(),
            decompressed = html.len(),
            "Inflated gzip body"
        );
        Ok(html)
    } else {
        Ok(into_text(body))
    }
}

fn gunzip(input: &[u8]) -> Result<String, ConversionError> {
    if input.is_empty() {
        return Err(ConversionError::Decode(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "empty gzip body",
        )));
    }
    let mut decoder = MultiGzDecoder::new(input);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(ConversionError::Decode)?;
    Ok(into_text(out))
}

fn into_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}
