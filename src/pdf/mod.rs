//! Capture-and-convert filter: HTML responses in, PDF responses out.
//!
//! # Data Flow
//! ```text
//! request
//!     → activation parameter absent? → downstream, response returned untouched
//!     → downstream called once, response drained into capture.rs
//!     → decode.rs (undo gzip, yield HTML text)
//!     → payload.rs (resolve filename/disposition, build JSON)
//!     → client.rs (one POST to the conversion service)
//!     → stream.rs (PDF headers + converter body, or a fixed error)
//! ```
//!
//! # Design Decisions
//! - The downstream status and headers are never forwarded; the final status
//!   is `200` on success and comes from [`ConversionError`] otherwise
//! - The JSON payload always asks for an `inline` document, while the
//!   `Content-Disposition` header honours `content_disposition=attachment`
//! - No state is shared between requests apart from the read-only
//!   [`PdfLayer`] state

pub mod capture;
pub mod client;
pub mod decode;
pub mod error;
pub mod payload;
pub mod stream;

use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use futures_util::future::BoxFuture;
use tower::{Layer, Service};

use crate::config::PdfConfig;
use crate::observability::metrics;

pub use capture::CapturedResponse;
pub use client::ConversionClient;
pub use error::{ConfigurationError, ConversionError};
pub use payload::{ConversionRequest, Disposition, RequestOptions};

/// Read-only state shared by every request passing through the filter.
#[derive(Debug)]
struct FilterState {
    client: ConversionClient,
    activation_param: String,
}

impl FilterState {
    async fn intercept(
        &self,
        downstream: Response,
        options: RequestOptions,
        path: &str,
    ) -> Response {
        let started = Instant::now();
        match self.convert(downstream, &options).await {
            Ok(response) => {
                metrics::record_conversion("success", started);
                tracing::debug!(
                    path = %path,
                    filename = %options.filename,
                    disposition = %options.disposition,
                    "Streaming converted PDF"
                );
                response
            }
            Err(err) => {
                metrics::record_conversion(err.outcome(), started);
                tracing::warn!(
                    path = %path,
                    status = %err.status(),
                    error = %err,
                    "PDF conversion failed"
                );
                stream::failure(err)
            }
        }
    }

    async fn convert(
        &self,
        downstream: Response,
        options: &RequestOptions,
    ) -> Result<Response, ConversionError> {
        let captured = CapturedResponse::capture(downstream).await?;
        tracing::debug!(
            downstream_status = %captured.status(),
            content_encoding = ?captured.content_encoding(),
            captured_bytes = captured.body().len(),
            "Captured downstream response"
        );

        let html = decode::decode(captured)?;
        let request = ConversionRequest::new(html, options);
        let converted = self.client.convert(&request).await?;

        Ok(stream::success(&request, converted))
    }
}

/// Layer that applies the PDF filter to an inner service.
#[derive(Debug, Clone)]
pub struct PdfLayer {
    state: Arc<FilterState>,
}

impl PdfLayer {
    /// Build the filter, failing if the converter URL is missing or unusable.
    pub fn new(config: &PdfConfig) -> Result<Self, ConfigurationError> {
        if config.activation_param.is_empty() {
            return Err(ConfigurationError::EmptyActivationParam);
        }
        let client = ConversionClient::new(&config.converter_url)?;

        tracing::info!(
            converter = %client.url(),
            activation_param = %config.activation_param,
            "PDF conversion filter configured"
        );

        Ok(Self {
            state: Arc::new(FilterState {
                client,
                activation_param: config.activation_param.clone(),
            }),
        })
    }
}

impl<S> Layer<S> for PdfLayer {
    type Service = PdfService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        PdfService {
            inner,
            state: Arc::clone(&self.state),
        }
    }
}

/// Service produced by [`PdfLayer`].
#[derive(Debug, Clone)]
pub struct PdfService<S> {
    inner: S,
    state: Arc<FilterState>,
}

impl<S> Service<Request<Body>> for PdfService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Response, S::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let Some(options) =
            RequestOptions::from_query(req.uri().query(), &self.state.activation_param)
        else {
            return Box::pin(self.inner.call(req));
        };

        // Take the service that was driven to readiness, leave a fresh clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let state = Arc::clone(&self.state);

        Box::pin(async move {
            let path = req.uri().path().to_owned();
            tracing::debug!(path = %path, "Invoking downstream for PDF conversion");

            let downstream = inner.call(req).await?;
            Ok(state.intercept(downstream, options, &path).await)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    fn unreachable_converter() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        format!("http://{addr}/convert")
    }

    fn layer() -> PdfLayer {
        PdfLayer::new(&PdfConfig {
            converter_url: unreachable_converter(),
            ..PdfConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_layer_requires_converter_url() {
        let err = PdfLayer::new(&PdfConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigurationError::EmptyConverterUrl));
    }

    #[test]
    fn test_layer_requires_activation_param() {
        let config = PdfConfig {
            converter_url: "http://127.0.0.1:1/convert".into(),
            activation_param: String::new(),
        };
        let err = PdfLayer::new(&config).unwrap_err();
        assert!(matches!(err, ConfigurationError::EmptyActivationParam));
    }

    #[tokio::test]
    async fn test_passthrough_is_untouched() {
        let app = Router::new()
            .route(
                "/page",
                get(|| async {
                    (
                        StatusCode::IM_A_TEAPOT,
                        [(header::CONTENT_ENCODING, "gzip"), (header::ETAG, "\"v1\"")],
                        "not really gzip",
                    )
                }),
            )
            .layer(layer());

        let req = Request::builder()
            .uri("/page?filename=report.pdf")
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(res.headers()[header::ETAG], "\"v1\"");
        assert_eq!(res.headers()[header::CONTENT_ENCODING], "gzip");
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"not really gzip");
    }

    #[tokio::test]
    async fn test_unreachable_converter_returns_400() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let app = Router::new()
            .route(
                "/page",
                get(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    async { "<html>Hi</html>" }
                }),
            )
            .layer(layer());

        let req = Request::builder()
            .uri("/page?generate_pdf")
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(res.headers().get(header::CONTENT_DISPOSITION).is_none());
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Converter request error");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_corrupt_gzip_returns_500() {
        let app = Router::new()
            .route(
                "/page",
                get(|| async {
                    ([(header::CONTENT_ENCODING, "gzip")], b"\x1f\x8bgarbage".to_vec())
                }),
            )
            .layer(layer());

        let req = Request::builder()
            .uri("/page?generate_pdf=1")
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Original request error (gzip)");
    }
}
