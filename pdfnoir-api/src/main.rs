//! # pdfnoir-api
//!
//! REST API server for pdfnoir, a dark-mode recoloring tool for PDF
//! documents. Exposes the `pdfnoir-core` rewriter over HTTP for
//! integration into web applications and microservice pipelines.
//!
//! ## Quick Start
//!
//! ```bash
//! cargo run -p pdfnoir-api
//! ```
//!
//! The server starts on `http://0.0.0.0:3000` by default.
//!
//! ```bash
//! curl -X POST http://localhost:3000/api/recolor \
//!   -F "file=@document.pdf" \
//!   -F "theme=midnight" \
//!   --output document.dark.pdf
//!
//! curl http://localhost:3000/api/health
//! ```
//!
//! ## Configuration
//!
//! `RUST_LOG` controls logging verbosity (default:
//! `pdfnoir_api=debug,tower_http=debug`). CORS is permissive by default;
//! tighten it before exposing this server outside a trusted network.

use pdfnoir_api::app;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdfnoir_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let app = app();

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();

    info!("pdfnoir API listening on http://0.0.0.0:3000");

    axum::serve(listener, app).await.unwrap();
}
