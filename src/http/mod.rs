//! HTTP host for the PDF filter.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace, timeout)
//!     → pdf::PdfLayer (passthrough or capture-and-convert)
//!     → proxy.rs (forward to the origin)
//!     → response back out through the same layers
//! ```

pub mod proxy;
pub mod server;

pub use server::{AppState, HttpServer, ServerError};
