use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// --- Domain types ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisRecord {
    pub crop_name: Option<String>,
    pub disease_pest: Option<String>,
    pub treatment: Option<String>,
}

impl DiagnosisRecord {
    /// Picks the three diagnosis keys out of a parsed reply object.
    /// Absent or null keys stay `None`; non-string values keep their JSON text.
    pub fn from_fields(fields: &Map<String, Value>) -> Self {
        let field = |key: &str| match fields.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        };

        Self {
            crop_name: field("crop_name"),
            disease_pest: field("disease_pest"),
            treatment: field("treatment"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslationRecord {
    pub language: String,
    pub disease_pest: Option<String>,
    pub treatment: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PriceQueryResult {
    /// Upstream payload, untouched. Its `records` array is non-empty.
    Found(Value),
    NoData { crop: String },
}

impl PriceQueryResult {
    pub fn from_payload(crop: &str, payload: Value) -> Self {
        let has_records = payload
            .get("records")
            .and_then(Value::as_array)
            .is_some_and(|records| !records.is_empty());

        if has_records {
            Self::Found(payload)
        } else {
            Self::NoData {
                crop: crop.to_string(),
            }
        }
    }

    pub fn records(&self) -> &[Value] {
        match self {
            Self::Found(payload) => payload
                .get("records")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or(&[]),
            Self::NoData { .. } => &[],
        }
    }

    pub fn no_data_message(crop: &str) -> String {
        format!("No mandi price data found for {}", crop)
    }

    /// Body returned by the price endpoint of the web API.
    pub fn into_body(self) -> Value {
        match self {
            Self::Found(payload) => payload,
            Self::NoData { crop } => serde_json::json!({ "message": Self::no_data_message(&crop) }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TranslateForm {
    pub text: String,
    pub target_language: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranslateResponse {
    pub translation: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub model_configured: bool,
    pub prices_configured: bool,
}

// --- Gemini API types ---

#[derive(Debug, Serialize)]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize)]
pub struct GeminiContent {
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum GeminiPart {
    Text { text: String },
    InlineData { inline_data: GeminiBlob },
}

#[derive(Debug, Serialize)]
pub struct GeminiBlob {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    pub prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    pub content: Option<GeminiCandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GeminiCandidateContent {
    #[serde(default)]
    pub parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct GeminiResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiPromptFeedback {
    pub block_reason: Option<String>,
}
