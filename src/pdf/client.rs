//! Client for the external HTML → PDF conversion service.
//!
//! One POST per intercepted request. No timeout, no retry: any transport
//! failure ends the request, and whatever body the service sends back is
//! treated as the PDF, whatever its status.

use reqwest::Url;

use crate::pdf::error::{ConfigurationError, ConversionError};
use crate::pdf::payload::ConversionRequest;

#[derive(Debug, Clone)]
pub struct ConversionClient {
    http: reqwest::Client,
    url: Url,
}

impl ConversionClient {
    /// Build a client for `converter_url`, which must be an absolute http(s) URL.
    pub fn new(converter_url: &str) -> Result<Self, ConfigurationError> {
        let url = parse_converter_url(converter_url)?;
        // The converter is an internal service; environment proxies are not consulted.
        let http = reqwest::Client::builder()
            .no_proxy()
            .build()
            .map_err(ConfigurationError::Client)?;
        Ok(Self { http, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Send `request` and hand back the live response for streaming.
    pub async fn convert(
        &self,
        request: &ConversionRequest,
    ) -> Result<reqwest::Response, ConversionError> {
        let response = self
            .http
            .post(self.url.clone())
            .json(&request.payload())
            .send()
            .await?;

        tracing::debug!(
            converter = %self.url,
            status = %response.status(),
            content_length = ?response.content_length(),
            "Converter responded"
        );
        Ok(response)
    }
}

pub(crate) fn parse_converter_url(raw: &str) -> Result<Url, ConfigurationError> {
    if raw.trim().is_empty() {
        return Err(ConfigurationError::EmptyConverterUrl);
    }
    let url = Url::parse(raw).map_err(|source| ConfigurationError::InvalidConverterUrl {
        url: raw.to_string(),
        source,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ConfigurationError::UnsupportedScheme(raw.to_string())),
    }
}
