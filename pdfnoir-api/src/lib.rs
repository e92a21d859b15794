//! # pdfnoir-api
//!
//! REST API server for pdfnoir: exposes PDF dark-mode recoloring over HTTP.

mod api;
pub use api::{app, health_check, recolor_pdf, AppError, ErrorResponse};
