//! Interactive dashboard: upload a photo, read the diagnosis in English,
//! Hindi or Marathi, and check mandi prices for the crop.

pub mod labels;
pub mod render;
pub mod session;

use std::sync::Arc;

use axum::{
    extract::{Multipart, Query, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::{error, warn};

use crate::error::Error;
use crate::state::AppState;
use labels::Language;
use render::{PageView, PricesView, ResultView};
use session::{localize, session_id, Notice, SessionHandle};

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub lang: Option<String>,
}

fn language_from(raw: Option<&str>) -> Language {
    raw.and_then(|l| l.parse().ok()).unwrap_or_default()
}

fn with_session_cookie(handle: &SessionHandle, response: impl IntoResponse) -> Response {
    let mut response = response.into_response();
    if handle.created {
        if let Some(cookie) = handle.set_cookie() {
            response.headers_mut().insert(header::SET_COOKIE, cookie);
        }
    }
    response
}

pub async fn index() -> Redirect {
    Redirect::to("/dashboard")
}

/// GET /dashboard
pub async fn show(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let language = language_from(query.lang.as_deref());

    // Visitors without a session see the empty page; the first upload
    // starts one.
    let Some(handle) = state.sessions.get(session_id(&headers)).await else {
        return Html(render::page(&PageView {
            labels: &state.labels,
            language,
            notice: None,
            result: None,
        }))
        .into_response();
    };
    let mut session = handle.session.lock().await;
    let notice = session.notice.take();

    let result = match session.diagnosis.clone() {
        None => None,
        Some(diagnosis) => {
            let (shown, translation_error) = match localize(
                &diagnosis,
                language,
                &mut session.translations,
                &state.translation,
            )
            .await
            {
                Ok(shown) => (shown, None),
                Err(e) => {
                    error!("Translation to {} failed: {}", language, e);
                    (
                        diagnosis.clone(),
                        Some(format!("Translation to {} failed: {}", language, e)),
                    )
                }
            };

            // Prices are looked up with the original, untranslated crop name.
            let prices = match diagnosis.crop_name.as_deref() {
                Some(crop) => PricesView::from(state.prices.lookup_prices(crop).await),
                None => PricesView::MissingCrop,
            };

            Some((shown, translation_error, prices))
        }
    };

    let html = render::page(&PageView {
        labels: &state.labels,
        language,
        notice,
        result: result.map(|(diagnosis, translation_error, prices)| ResultView {
            image: session.image.as_ref(),
            diagnosis,
            translation_error,
            prices,
        }),
    });

    drop(session);
    Html(html).into_response()
}

/// POST /dashboard/generate
///
/// A successful diagnosis replaces the session's diagnosis and clears its
/// translations. Any failure leaves the previous state alone and queues a
/// notice instead.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let handle = state.sessions.open(session_id(&headers)).await;
    let mut session = handle.session.lock().await;

    let form = match crate::upload::read_upload_form(&mut multipart).await {
        Ok(form) => form,
        Err(e) => {
            warn!("Could not read dashboard upload: {}", e);
            session.notice = Some(Notice::error(format!("Failed to read upload: {}", e)));
            drop(session);
            return with_session_cookie(&handle, Redirect::to("/dashboard"));
        }
    };

    let language = language_from(form.fields.get("lang").map(String::as_str));
    let target = format!("/dashboard?lang={}", language.name());

    match form.image {
        None => {
            session.notice = Some(Notice::warning("Please upload a file to start"));
        }
        Some(image) if !image.is_supported() => {
            session.notice = Some(Notice::warning(
                "Unsupported file type. Please upload a jpg, jpeg or png image.",
            ));
        }
        Some(image) => match state.diagnosis.diagnose(&image.data, &image.mime_type).await {
            Ok(diagnosis) => session.set_diagnosis(diagnosis, image),
            Err(Error::Parse(e)) => {
                warn!("Diagnosis reply was not valid JSON: {}", e);
                session.notice = Some(Notice::warning(
                    "Failed to parse the response from Gemini. The response was not valid JSON.",
                ));
            }
            Err(e) => {
                error!("Diagnosis failed: {}", e);
                session.notice = Some(Notice::error(format!("Diagnosis failed: {}", e)));
            }
        },
    }

    drop(session);
    with_session_cookie(&handle, Redirect::to(&target))
}
