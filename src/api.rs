//! Stateless JSON API.

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Form,
};
use serde_json::{json, Value};
use tracing::{error, info};

use crate::error::Error;
use crate::models::{DiagnosisRecord, HealthResponse, TranslateForm, TranslateResponse};
use crate::state::AppState;
use crate::upload::read_upload_form;

/// Error response with a FastAPI-style `{"detail": ...}` body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    /// Maps a service error; `context` prefixes model failures.
    fn from_service(context: &str, err: Error) -> Self {
        match err {
            Error::InvalidInput(msg) => Self::new(StatusCode::BAD_REQUEST, msg),
            Error::Upstream(_) | Error::Parse(_) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("{}: {}", context, err),
            ),
            Error::Config(msg) => Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg),
            // Only upstream error statuses are forwarded; anything else is a bad gateway.
            Error::UpstreamHttp { status, body } => Self::new(
                StatusCode::from_u16(status)
                    .ok()
                    .filter(|s| s.is_client_error() || s.is_server_error())
                    .unwrap_or(StatusCode::BAD_GATEWAY),
                format!("HTTP Error fetching mandi prices: {}", body),
            ),
            Error::UpstreamTransport(_) => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                format!("Service Unavailable: {}", err),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

/// POST /analyze
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<DiagnosisRecord>, ApiError> {
    let form = read_upload_form(&mut multipart)
        .await
        .map_err(|e| ApiError::new(e.status(), format!("Multipart error: {}", e)))?;

    let image = form
        .image
        .ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, "No file uploaded"))?;

    info!(
        "Received image: {} bytes, type: {}",
        image.data.len(),
        image.mime_type
    );

    let record = state
        .diagnosis
        .diagnose(&image.data, &image.mime_type)
        .await
        .map_err(|e| {
            error!("Analysis failed: {}", e);
            ApiError::from_service("Error during model call", e)
        })?;

    Ok(Json(record))
}

/// POST /translate
pub async fn translate(
    State(state): State<Arc<AppState>>,
    Form(form): Form<TranslateForm>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let translation = state
        .translation
        .translate(&form.text, &form.target_language)
        .await
        .map_err(|e| {
            error!("Translation failed: {}", e);
            ApiError::from_service("Error during translation", e)
        })?;

    Ok(Json(TranslateResponse { translation }))
}

/// GET /mandi-prices/{crop_name}
pub async fn mandi_prices(
    State(state): State<Arc<AppState>>,
    Path(crop_name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let result = state.prices.lookup_prices(&crop_name).await.map_err(|e| {
        error!("Mandi price lookup failed: {}", e);
        ApiError::from_service("Error fetching mandi prices", e)
    })?;

    Ok(Json(result.into_body()))
}

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model_configured: state.config.google_api_key.is_some(),
        prices_configured: state.prices.is_configured(),
    })
}
