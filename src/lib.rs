//! AgroSnap: crop diagnosis from a photo, with translation and mandi prices.
//!
//! A hosted vision model diagnoses the crop, the same model translates the
//! result, and the data.gov.in commodity API supplies market prices. Both the
//! JSON API and the dashboard are served from [`router`].

pub mod api;
pub mod config;
pub mod dashboard;
pub mod diagnosis;
pub mod error;
pub mod gemini;
pub mod mandi;
pub mod models;
pub mod prompts;
pub mod reply;
pub mod state;
pub mod translate;
pub mod upload;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use error::{Error, Result};
pub use state::AppState;

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(dashboard::index))
        .route("/health", get(api::health))
        .route("/analyze", post(api::analyze))
        .route("/translate", post(api::translate))
        .route("/mandi-prices/{crop_name}", get(api::mandi_prices))
        .route("/dashboard", get(dashboard::show))
        .route("/dashboard/generate", post(dashboard::generate))
        .nest_service("/static", ServeDir::new(&state.config.static_dir))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
