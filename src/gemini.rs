use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{GeminiBlob, GeminiContent, GeminiPart, GeminiRequest, GeminiResponse};

/// One piece of a multimodal prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    Image { mime_type: String, data: Vec<u8> },
}

/// A hosted text/vision model. Returns the reply text of a single generation.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(&self, parts: Vec<Part>) -> Result<String>;
}

pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            api_key: config.google_api_key.clone(),
            base_url: config.gemini_api_url.trim_end_matches('/').to_string(),
            model: config.gemini_model.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

fn to_wire(part: Part) -> GeminiPart {
    match part {
        Part::Text(text) => GeminiPart::Text { text },
        Part::Image { mime_type, data } => GeminiPart::InlineData {
            inline_data: GeminiBlob {
                mime_type,
                data: STANDARD.encode(data),
            },
        },
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, parts: Vec<Part>) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Upstream("GOOGLE_API_KEY not configured".to_string()))?;

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: parts.into_iter().map(to_wire).collect(),
            }],
        };

        info!("Sending request to Gemini ({})...", self.model);

        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("Gemini request failed: {}", e)))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| Error::Upstream(format!("Failed to read Gemini response: {}", e)))?;

        if !status.is_success() {
            return Err(Error::Upstream(format!("Gemini API error ({}): {}", status, body)));
        }

        let parsed: GeminiResponse = serde_json::from_str(&body).map_err(|e| {
            Error::Upstream(format!("Failed to parse Gemini response: {} (body: {})", e, body))
        })?;

        reply_text(parsed)
    }
}

/// Joins the text parts of the first candidate.
fn reply_text(resp: GeminiResponse) -> Result<String> {
    if let Some(reason) = resp.prompt_feedback.and_then(|f| f.block_reason) {
        warn!("Gemini blocked the prompt: {}", reason);
        return Err(Error::Upstream(format!("Gemini blocked the prompt: {}", reason)));
    }

    let candidate = resp
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| Error::Upstream("Gemini returned no candidates".to_string()))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
        return Err(Error::Upstream(format!(
            "Gemini returned no text (finish reason: {})",
            reason
        )));
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, api_key: Option<&str>) -> GeminiClient {
        let config = Config {
            google_api_key: api_key.map(str::to_string),
            gemini_api_url: format!("{}/v1beta/", server.uri()),
            ..Config::default()
        };
        GeminiClient::new(Client::new(), &config)
    }

    #[tokio::test]
    async fn sends_image_inline_and_joins_text_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "contents": [{ "parts": [
                    { "inline_data": { "mime_type": "image/png", "data": "AQID" } },
                    { "text": "describe" }
                ]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "{\"crop_name\":" }, { "text": "\"Maize\"}" }] },
                    "finishReason": "STOP"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let model = client_for(&server, Some("test-key"));
        let reply = model
            .generate(vec![
                Part::Image {
                    mime_type: "image/png".into(),
                    data: vec![1, 2, 3],
                },
                Part::Text("describe".into()),
            ])
            .await
            .unwrap();

        assert_eq!(reply, "{\"crop_name\":\"Maize\"}");
    }

    #[tokio::test]
    async fn non_success_status_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let err = client_for(&server, Some("k"))
            .generate(vec![Part::Text("hi".into())])
            .await
            .unwrap_err();

        match err {
            Error::Upstream(msg) => assert!(msg.contains("quota exceeded")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn blocked_prompt_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server, Some("k"))
            .generate(vec![Part::Text("hi".into())])
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Upstream(ref msg) if msg.contains("SAFETY")));
    }

    #[tokio::test]
    async fn missing_key_fails_without_a_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client_for(&server, None)
            .generate(vec![Part::Text("hi".into())])
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Upstream(_)));
    }
}
