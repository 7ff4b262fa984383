#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use agrosnap::config::Config;
use agrosnap::gemini::{GenerativeModel, Part};
use agrosnap::{AppState, Error, Result};
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, Response};
use axum::Router;
use reqwest::Client;

pub const BOUNDARY: &str = "agrosnap-test-boundary";

pub const RICE_REPLY: &str = "```json\n{\"crop_name\": \"Rice\", \"disease_pest\": \"Blast\", \"treatment\": \"Spray tricyclazole\"}\n```";
pub const WHEAT_REPLY: &str =
    "{\"crop_name\": \"Wheat\", \"disease_pest\": \"Yellow rust\", \"treatment\": \"Propiconazole\"}";

/// Stand-in for the hosted model. Image prompts get the queued diagnosis
/// replies; text prompts are translations, answered as `[<language>] <text>`.
#[derive(Default)]
pub struct FakeModel {
    diagnosis_replies: Mutex<Vec<Result<String>>>,
    pub image_calls: AtomicUsize,
    pub text_calls: AtomicUsize,
    pub fail_translations: AtomicBool,
    pub last_mime_type: Mutex<Option<String>>,
}

impl FakeModel {
    pub fn with_diagnoses(replies: Vec<Result<String>>) -> Arc<Self> {
        let mut replies = replies;
        replies.reverse();
        Arc::new(Self {
            diagnosis_replies: Mutex::new(replies),
            ..Self::default()
        })
    }

    pub fn translations(&self) -> usize {
        self.text_calls.load(Ordering::SeqCst)
    }

    pub fn diagnoses(&self) -> usize {
        self.image_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerativeModel for FakeModel {
    async fn generate(&self, parts: Vec<Part>) -> Result<String> {
        let image = parts.iter().find_map(|p| match p {
            Part::Image { mime_type, .. } => Some(mime_type.clone()),
            Part::Text(_) => None,
        });

        if let Some(mime_type) = image {
            self.image_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_mime_type.lock().unwrap() = Some(mime_type);
            return self
                .diagnosis_replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(Error::Upstream("no diagnosis queued".into())));
        }

        self.text_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_translations.load(Ordering::SeqCst) {
            return Err(Error::Upstream("translation quota exceeded".into()));
        }

        let prompt = match parts.first() {
            Some(Part::Text(prompt)) => prompt.clone(),
            _ => String::new(),
        };
        let (instruction, text) = prompt.split_once("\n\n").unwrap_or(("", ""));
        let language = instruction
            .trim_start_matches("Translate the following text to ")
            .trim_end_matches(':');
        Ok(format!("[{}] {}", language, text))
    }
}

pub fn app(model: Arc<FakeModel>, config: Config) -> Router {
    app_with_state(model, config).0
}

/// Like [`app`], but also hands back the state so tests can inspect it.
pub fn app_with_state(model: Arc<FakeModel>, config: Config) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::with_model(config, Client::new(), model).unwrap());
    (agrosnap::router(state.clone()), state)
}

pub enum FormPart<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        data: &'a [u8],
    },
}

pub fn multipart_body(parts: &[FormPart]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            FormPart::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            FormPart::File {
                name,
                file_name,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, file_name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_request(uri: &str, parts: &[FormPart], cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(multipart_body(parts))).unwrap()
}

pub fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn leaf_jpg() -> FormPart<'static> {
    FormPart::File {
        name: "file",
        file_name: "leaf.jpg",
        content_type: "image/jpeg",
        data: &[0xff, 0xd8, 0xff, 0xe0],
    }
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

/// `name=value` part of a Set-Cookie header, ready to send back.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}
