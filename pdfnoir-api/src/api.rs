use axum::{
    extract::Multipart,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use pdfnoir_core::{PdfNoirError, Theme};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

/// Standard error response structure, reused for every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Build the application router with all routes configured.
///
/// - `POST /api/recolor` - recolor an uploaded PDF for dark-mode viewing
/// - `GET /api/health` - health check endpoint
pub fn app() -> Router {
    Router::new()
        .route("/api/recolor", post(recolor_pdf))
        .route("/api/health", get(health_check))
        .layer(CorsLayer::permissive())
}

/// Recolor an uploaded PDF for dark-mode viewing.
///
/// Multipart fields:
/// - `file` (required): the PDF to recolor.
/// - `theme` (optional, default `classic`): one of `classic`, `claude`,
///   `chatgpt`, `sepia`, `midnight`, `forest`.
/// - `strict` (optional, default `false`): when `"true"`, an unrecognized
///   theme id is rejected with `400` instead of silently falling back to
///   `classic`.
///
/// Responds `200 application/pdf` with the recolored bytes on success,
/// `400` for a missing file or (in strict mode) an unknown theme, and
/// `500` if recoloring the PDF itself fails.
pub async fn recolor_pdf(mut multipart: Multipart) -> Result<Response, AppError> {
    let mut pdf_bytes: Option<Vec<u8>> = None;
    let mut theme_id = "classic".to_string();
    let mut strict = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("failed to read multipart field: {e}")))?
    {
        match field.name() {
            Some("file") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("failed to read file data: {e}")))?;
                pdf_bytes = Some(bytes.to_vec());
            }
            Some("theme") => {
                theme_id = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("failed to read theme field: {e}")))?;
            }
            Some("strict") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("failed to read strict field: {e}")))?;
                strict = value.eq_ignore_ascii_case("true") || value == "1";
            }
            _ => {}
        }
    }

    let pdf_bytes = pdf_bytes.ok_or_else(|| AppError::BadRequest("no file provided in upload".to_string()))?;

    if strict && Theme::find(&theme_id).is_none() {
        return Err(AppError::BadRequest(format!("unknown theme id: {theme_id}")));
    }

    let recolored = pdfnoir_core::process(&pdf_bytes, &theme_id).map_err(AppError::Pdf)?;

    Ok((
        StatusCode::OK,
        [
            ("Content-Type", "application/pdf"),
            ("Content-Disposition", "attachment; filename=\"recolored.pdf\""),
        ],
        recolored,
    )
        .into_response())
}

/// Health check endpoint for monitoring and load balancing.
///
/// Always returns 200 OK with service status, name, and version.
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "pdfnoir API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Application-specific error types for the API.
#[derive(Debug)]
pub enum AppError {
    /// A malformed request: missing file, unknown theme in strict mode.
    BadRequest(String),
    /// Recoloring the PDF itself failed.
    Pdf(PdfNoirError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Pdf(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
