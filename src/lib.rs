//! PDF conversion gateway library.
//!
//! The core is [`pdf::PdfLayer`], a tower layer that leaves ordinary requests
//! alone and, when the activation query parameter is present, buffers the
//! downstream HTML response, sends it to an external conversion service and
//! streams the resulting PDF back instead.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod pdf;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use pdf::{PdfLayer, PdfService};
