//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::io::Write;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::Value;
use tokio::net::TcpListener;

/// A conversion service stand-in that records every call.
pub struct MockConverter {
    pub url: String,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

impl MockConverter {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// JSON payloads received so far, in arrival order.
    pub fn payloads(&self) -> Vec<Value> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(_, payload)| payload.clone())
            .collect()
    }

    /// `Content-Type` headers received so far, in arrival order.
    pub fn content_types(&self) -> Vec<Option<String>> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(content_type, _)| content_type.clone())
            .collect()
    }
}

/// Start a mock converter answering every POST with `status` and `body`.
pub async fn start_mock_converter(status: StatusCode, body: &'static [u8]) -> MockConverter {
    let calls = Arc::new(AtomicUsize::new(0));
    let requests = Arc::new(Mutex::new(Vec::new()));

    let handler = {
        let calls = Arc::clone(&calls);
        let requests = Arc::clone(&requests);
        move |headers: HeaderMap, payload: Bytes| {
            let calls = Arc::clone(&calls);
            let requests = Arc::clone(&requests);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                let content_type = headers
                    .get(header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                let payload = serde_json::from_slice(&payload).unwrap_or(Value::Null);
                requests.lock().unwrap().push((content_type, payload));
                (status, body)
            }
        }
    };

    let addr = serve(Router::new().route("/convert", post(handler))).await;
    MockConverter {
        url: format!("http://{addr}/convert"),
        calls,
        requests,
    }
}

/// Serve `router` on an ephemeral loopback port.
pub async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

/// A loopback URL nothing is listening on.
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/convert")
}

pub fn gzip(text: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(text.as_bytes()).unwrap();
    encoder.finish().unwrap()
}
