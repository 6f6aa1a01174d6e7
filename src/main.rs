//! PDF conversion gateway.
//!
//! Sits in front of an HTML origin. Requests carrying the activation query
//! parameter (`?generate_pdf` by default) get the origin's page back as a PDF
//! rendered by the external conversion service; everything else is proxied
//! untouched.
//!
//! ```text
//!   Client ──▶ request id / trace / timeout ──▶ PdfLayer ──▶ proxy ──▶ Origin
//!                                                 │
//!                                                 └──▶ Conversion service
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use pdf_gateway::config::{self, GatewayConfig};
use pdf_gateway::observability::{logging, metrics};
use pdf_gateway::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "pdf-gateway")]
#[command(about = "Reverse proxy that turns HTML pages into PDFs on request", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Copy `gateway.example.toml` to
    /// `gateway.toml` to use the default.
    #[arg(short, long, default_value = "gateway.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // The log format lives in the config file, so logging starts once it is read.
    let config: GatewayConfig = match config::load_config(&cli.config) {
        Ok(config) => {
            logging::init_logging(config.observability.log_format);
            config
        }
        Err(e) => {
            logging::init_logging(Default::default());
            tracing::error!(path = %cli.config.display(), error = %e, "Failed to load configuration");
            return Err(e.into());
        }
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        converter_url = %config.pdf.converter_url,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
